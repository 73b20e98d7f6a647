//! Progress events and the end-of-run summary.

use std::fmt;

/// Something the user should hear about while a run progresses.
///
/// File and object names are bare file names, not full paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// The compiler is about to run on a source.
    CompileStarted(String),
    /// The compiler succeeded on a source.
    Compiled(String),
    /// The compiler failed on a source; the run aborts.
    CompileFailed(String),
    /// A source was up to date and not recompiled.
    Skipped(String),
    /// No source needed compiling.
    NothingToCompile,
    /// Members of removed sources were deleted from the archive.
    Pruned(Vec<String>),
    /// An object is about to be inserted into the archive.
    InsertStarted(String),
    /// An object was inserted and its standalone file deleted.
    Inserted(String),
    /// Inserting an object failed; the run aborts.
    InsertFailed(String),
    /// The archive is missing and is being created from every object present.
    Creating(String),
    /// Creating the archive failed; the run aborts.
    CreateFailed(String),
    /// The archive phase finished.
    ArchiveFinished {
        /// Archive file name.
        archive: String,
        /// What happened to it.
        outcome: ArchiveOutcome,
    },
}

/// Final state of the archive after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Nothing was inserted or removed.
    UpToDate,
    /// Members were inserted or removed in an existing archive.
    Updated,
    /// The archive did not exist before this run and does now.
    Created,
    /// The archive does not exist and there was nothing to put in it.
    Empty,
}

impl fmt::Display for ArchiveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveOutcome::UpToDate => write!(f, "up to date"),
            ArchiveOutcome::Updated => write!(f, "updated"),
            ArchiveOutcome::Created => write!(f, "created"),
            ArchiveOutcome::Empty => write!(f, "empty"),
        }
    }
}

/// Receives [`BuildEvent`]s as they happen.
pub trait Reporter {
    /// Handles one event.
    fn report(&mut self, event: BuildEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _event: BuildEvent) {}
}

impl Reporter for Vec<BuildEvent> {
    fn report(&mut self, event: BuildEvent) {
        self.push(event);
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Source file names that were compiled.
    pub compiled: Vec<String>,
    /// Source file names that were up to date.
    pub skipped: Vec<String>,
    /// Object file names inserted into the archive.
    pub archived: Vec<String>,
    /// Archive members removed because their source is gone.
    pub pruned: Vec<String>,
    /// Final state of the archive.
    pub archive: ArchiveOutcome,
}

impl BuildSummary {
    /// Returns `true` if the run neither compiled nor touched the archive.
    pub fn is_noop(&self) -> bool {
        self.compiled.is_empty() && self.archive == ArchiveOutcome::UpToDate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_reporter_collects_in_order() {
        let mut events: Vec<BuildEvent> = Vec::new();
        events.report(BuildEvent::CompileStarted("a.cpp".into()));
        events.report(BuildEvent::Compiled("a.cpp".into()));
        assert_eq!(
            events,
            vec![
                BuildEvent::CompileStarted("a.cpp".into()),
                BuildEvent::Compiled("a.cpp".into())
            ]
        );
    }

    #[test]
    fn noop_summary() {
        let summary = BuildSummary {
            compiled: vec![],
            skipped: vec!["a.cpp".into()],
            archived: vec![],
            pruned: vec![],
            archive: ArchiveOutcome::UpToDate,
        };
        assert!(summary.is_noop());
        let busy = BuildSummary {
            archive: ArchiveOutcome::Updated,
            ..summary
        };
        assert!(!busy.is_noop());
    }

    #[test]
    fn outcome_display() {
        assert_eq!(ArchiveOutcome::UpToDate.to_string(), "up to date");
        assert_eq!(ArchiveOutcome::Created.to_string(), "created");
    }
}
