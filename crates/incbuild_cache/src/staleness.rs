//! Recompile and re-archive decisions.
//!
//! These are pure functions over a previous [`CompilationRecord`] and the
//! current state of a source. All filesystem probing happens in the caller.

use std::fmt;

use incbuild_common::{ContentHash, DetectionPolicy};

use crate::record::CompilationRecord;

/// Current on-disk state of one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceProbe {
    /// Current byte length of the source.
    pub size: u64,
    /// Current content hash, computed only under the hash policy.
    pub content_hash: Option<ContentHash>,
    /// Whether the source's object exists, standalone or inside the archive.
    pub object_available: bool,
}

/// Why a source has to be recompiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileReason {
    /// No record exists for the source.
    NewSource,
    /// The recorded byte length differs.
    SizeChanged {
        /// Recorded size.
        previous: u64,
        /// Current size.
        current: u64,
    },
    /// The recorded content hash differs or was never recorded.
    ContentChanged,
    /// The object exists neither in the output directory nor in the archive.
    ObjectMissing,
}

impl fmt::Display for CompileReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileReason::NewSource => write!(f, "new source"),
            CompileReason::SizeChanged { previous, current } => {
                write!(f, "size changed from {previous} to {current} bytes")
            }
            CompileReason::ContentChanged => write!(f, "content changed"),
            CompileReason::ObjectMissing => write!(f, "object missing"),
        }
    }
}

/// Outcome of the staleness check for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileDecision {
    /// The recorded state still matches.
    UpToDate,
    /// The source must be recompiled.
    Rebuild(CompileReason),
}

/// Decides whether a source must be recompiled.
///
/// Checks run in order: missing record, size change, content change (hash
/// policy only), missing object. Equal size with an available object is
/// treated as up to date under the size policy, so a same-size edit is not
/// detected there.
pub fn compile_decision(
    previous: Option<&CompilationRecord>,
    probe: &SourceProbe,
    policy: DetectionPolicy,
) -> CompileDecision {
    let Some(previous) = previous else {
        return CompileDecision::Rebuild(CompileReason::NewSource);
    };

    if previous.source_size != probe.size {
        return CompileDecision::Rebuild(CompileReason::SizeChanged {
            previous: previous.source_size,
            current: probe.size,
        });
    }

    if policy.uses_hash()
        && (previous.content_hash.is_none() || previous.content_hash != probe.content_hash)
    {
        return CompileDecision::Rebuild(CompileReason::ContentChanged);
    }

    if !probe.object_available {
        return CompileDecision::Rebuild(CompileReason::ObjectMissing);
    }

    CompileDecision::UpToDate
}

/// Returns `true` if the source's object can be found.
///
/// A standalone object file always counts. Otherwise the object counts as
/// archived when the archive exists and the previous run recorded a marker
/// for it.
pub fn object_available(
    previous: Option<&CompilationRecord>,
    standalone_exists: bool,
    archive_exists: bool,
) -> bool {
    standalone_exists
        || (archive_exists && previous.is_some_and(|r| !r.object_marker.is_none()))
}

/// Decides whether an object in the output directory must be inserted into
/// the archive.
///
/// True when the source was recompiled this run, had no previous record, or
/// its object marker moved. A recompiled object can carry the same marker as
/// the one already archived when the filesystem's mtime resolution is coarse.
pub fn needs_archive(
    previous: Option<&CompilationRecord>,
    current: &CompilationRecord,
    recompiled: bool,
) -> bool {
    if recompiled {
        return true;
    }
    match previous {
        None => true,
        Some(prev) => prev.object_marker != current.object_marker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incbuild_common::ObjectMarker;

    fn rec(size: u64, marker: u64) -> CompilationRecord {
        CompilationRecord::new(size, ObjectMarker::from_raw(marker))
    }

    fn probe(size: u64, available: bool) -> SourceProbe {
        SourceProbe {
            size,
            content_hash: None,
            object_available: available,
        }
    }

    #[test]
    fn new_source_needs_compile() {
        let d = compile_decision(None, &probe(100, true), DetectionPolicy::Size);
        assert_eq!(d, CompileDecision::Rebuild(CompileReason::NewSource));
    }

    #[test]
    fn size_change_needs_compile() {
        let prev = rec(100, 5);
        let d = compile_decision(Some(&prev), &probe(120, true), DetectionPolicy::Size);
        assert_eq!(
            d,
            CompileDecision::Rebuild(CompileReason::SizeChanged {
                previous: 100,
                current: 120
            })
        );
    }

    #[test]
    fn same_size_with_object_is_up_to_date() {
        let prev = rec(100, 5);
        let d = compile_decision(Some(&prev), &probe(100, true), DetectionPolicy::Size);
        assert_eq!(d, CompileDecision::UpToDate);
    }

    #[test]
    fn missing_object_forces_rebuild() {
        let prev = rec(100, 5);
        let d = compile_decision(Some(&prev), &probe(100, false), DetectionPolicy::Size);
        assert_eq!(d, CompileDecision::Rebuild(CompileReason::ObjectMissing));
    }

    #[test]
    fn size_policy_ignores_same_size_edit() {
        let prev = rec(4, 5).with_hash(Some(ContentHash::from_bytes(b"a+b;")));
        let mut p = probe(4, true);
        p.content_hash = Some(ContentHash::from_bytes(b"a-b;"));
        assert_eq!(
            compile_decision(Some(&prev), &p, DetectionPolicy::Size),
            CompileDecision::UpToDate
        );
    }

    #[test]
    fn hash_policy_catches_same_size_edit() {
        let prev = rec(4, 5).with_hash(Some(ContentHash::from_bytes(b"a+b;")));
        let mut p = probe(4, true);
        p.content_hash = Some(ContentHash::from_bytes(b"a-b;"));
        assert_eq!(
            compile_decision(Some(&prev), &p, DetectionPolicy::Hash),
            CompileDecision::Rebuild(CompileReason::ContentChanged)
        );
    }

    #[test]
    fn hash_policy_without_recorded_hash_rebuilds() {
        let prev = rec(4, 5);
        let mut p = probe(4, true);
        p.content_hash = Some(ContentHash::from_bytes(b"a+b;"));
        assert!(matches!(
            compile_decision(Some(&prev), &p, DetectionPolicy::Hash),
            CompileDecision::Rebuild(_)
        ));
    }

    #[test]
    fn hash_policy_matching_hash_is_up_to_date() {
        let hash = ContentHash::from_bytes(b"a+b;");
        let prev = rec(4, 5).with_hash(Some(hash));
        let mut p = probe(4, true);
        p.content_hash = Some(hash);
        assert_eq!(
            compile_decision(Some(&prev), &p, DetectionPolicy::Hash),
            CompileDecision::UpToDate
        );
    }

    #[test]
    fn availability_rules() {
        let archived = rec(1, 9);
        let never_built = rec(1, 0);
        assert!(object_available(None, true, false));
        assert!(object_available(Some(&archived), false, true));
        assert!(!object_available(Some(&archived), false, false));
        assert!(!object_available(Some(&never_built), false, true));
        assert!(!object_available(None, false, true));
    }

    #[test]
    fn archive_when_no_previous_record() {
        assert!(needs_archive(None, &rec(1, 1), false));
    }

    #[test]
    fn archive_when_marker_moved() {
        assert!(needs_archive(Some(&rec(1, 1)), &rec(1, 2), false));
        assert!(!needs_archive(Some(&rec(1, 2)), &rec(1, 2), false));
    }

    #[test]
    fn recompiled_object_is_archived_even_with_same_marker() {
        assert!(needs_archive(Some(&rec(1, 2)), &rec(3, 2), true));
    }

    #[test]
    fn reason_display() {
        let r = CompileReason::SizeChanged {
            previous: 100,
            current: 120,
        };
        assert_eq!(r.to_string(), "size changed from 100 to 120 bytes");
        assert_eq!(CompileReason::ObjectMissing.to_string(), "object missing");
    }
}
