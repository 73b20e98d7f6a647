//! The compile phase.
//!
//! Walks the sources in path order, recompiles the stale ones and produces
//! the fresh record table that the archive phase and the final save use.

use std::path::Path;

use incbuild_cache::{
    compile_decision, object_available, BuildCache, CompilationRecord, CompileDecision,
    SourceProbe,
};
use incbuild_common::{ContentHash, DetectionPolicy, ObjectMarker};

use crate::error::BuildError;
use crate::report::{BuildEvent, Reporter};
use crate::scan::SourceFile;
use crate::toolchain::Toolchain;

/// Fixed inputs of the compile phase.
#[derive(Debug, Clone, Copy)]
pub struct CompileSettings<'a> {
    /// Directory passed to the compiler with `-I`.
    pub include_dir: &'a Path,
    /// Directory receiving the objects.
    pub output_dir: &'a Path,
    /// Extension of object files, without the dot.
    pub object_extension: &'a str,
    /// How source changes are detected.
    pub policy: DetectionPolicy,
    /// Whether the archive existed when the run started.
    pub archive_exists: bool,
}

/// Result of the compile phase.
#[derive(Debug, Default)]
pub struct CompileOutcome {
    /// Fresh records for every source seen this run.
    pub records: BuildCache,
    /// File names of the sources that were compiled.
    pub compiled: Vec<String>,
    /// File names of the sources that were up to date.
    pub skipped: Vec<String>,
}

/// Compiles every stale source and records the state of all of them.
///
/// Stops at the first compiler failure; nothing compiled so far is undone.
pub fn compile_sources(
    sources: &[SourceFile],
    previous: &BuildCache,
    settings: &CompileSettings<'_>,
    toolchain: &mut dyn Toolchain,
    reporter: &mut dyn Reporter,
) -> Result<CompileOutcome, BuildError> {
    let mut outcome = CompileOutcome::default();

    for source in sources {
        let prior = previous.get(&source.key);
        let object = source.object_path(settings.output_dir, settings.object_extension);

        let size = std::fs::metadata(&source.path)
            .map_err(|e| BuildError::io(&source.path, e))?
            .len();
        let content_hash = if settings.policy.uses_hash() {
            Some(ContentHash::from_file(&source.path).map_err(|e| BuildError::io(&source.path, e))?)
        } else {
            None
        };
        let standalone = ObjectMarker::of_file(&object).map_err(|e| BuildError::io(&object, e))?;

        let probe = SourceProbe {
            size,
            content_hash,
            object_available: object_available(
                prior,
                standalone.is_some(),
                settings.archive_exists,
            ),
        };

        let marker = match compile_decision(prior, &probe, settings.policy) {
            CompileDecision::UpToDate => {
                tracing::debug!(source = %source.key, "up to date");
                reporter.report(BuildEvent::Skipped(source.file_name.clone()));
                outcome.skipped.push(source.file_name.clone());
                standalone
                    .or(prior.map(|r| r.object_marker))
                    .unwrap_or(ObjectMarker::NONE)
            }
            CompileDecision::Rebuild(reason) => {
                tracing::info!(source = %source.key, %reason, "compiling");
                let marker = compile_one(source, &object, settings.include_dir, toolchain, reporter)?;
                outcome.compiled.push(source.file_name.clone());
                marker
            }
        };

        outcome.records.insert(
            source.key.clone(),
            CompilationRecord::new(size, marker).with_hash(content_hash),
        );
    }

    if outcome.compiled.is_empty() {
        reporter.report(BuildEvent::NothingToCompile);
    }

    Ok(outcome)
}

fn compile_one(
    source: &SourceFile,
    object: &Path,
    include_dir: &Path,
    toolchain: &mut dyn Toolchain,
    reporter: &mut dyn Reporter,
) -> Result<ObjectMarker, BuildError> {
    reporter.report(BuildEvent::CompileStarted(source.file_name.clone()));

    if let Err(e) = toolchain.compile(&source.path, object, include_dir) {
        reporter.report(BuildEvent::CompileFailed(source.file_name.clone()));
        return Err(BuildError::Compile {
            file: source.file_name.clone(),
            source: e,
        });
    }

    match ObjectMarker::of_file(object).map_err(|e| BuildError::io(object, e))? {
        Some(marker) => {
            reporter.report(BuildEvent::Compiled(source.file_name.clone()));
            Ok(marker)
        }
        None => {
            reporter.report(BuildEvent::CompileFailed(source.file_name.clone()));
            Err(BuildError::ObjectNotProduced(object.to_path_buf()))
        }
    }
}
