//! Persisted compilation records and staleness decisions.
//!
//! The record file maps every tracked source path to the byte size it had and
//! the object marker its object file carried at the last successful run. This
//! crate loads and saves that file and decides, from a record and the current
//! state on disk, whether a source must be recompiled and whether its object
//! must be (re)inserted into the archive.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod record;
pub mod staleness;

pub use cache::BuildCache;
pub use error::CacheError;
pub use record::CompilationRecord;
pub use staleness::{
    compile_decision, needs_archive, object_available, CompileDecision, CompileReason,
    SourceProbe,
};
