//! Build orchestration: compile changed sources, fold fresh objects into a
//! static archive, and persist the records that make the next run cheap.
//!
//! A run is strictly sequential and fail-fast:
//! 1. Load the previous records (fail-soft)
//! 2. Compile every source whose size, hash, or object says it is stale
//! 3. Insert every freshly built object into the archive and delete it
//! 4. Save the new records, only if everything above succeeded
//!
//! The compiler and archiver sit behind the [`Toolchain`] trait and progress
//! is delivered to a [`Reporter`].

#![warn(missing_docs)]

pub mod archive;
pub mod compile;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod scan;
pub mod toolchain;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::BuildError;
pub use orchestrator::{run, BuildRequest};
pub use report::{ArchiveOutcome, BuildEvent, BuildSummary, NullReporter, Reporter};
pub use toolchain::{SystemToolchain, ToolError, Toolchain};
