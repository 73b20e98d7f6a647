//! One complete build run.

use std::path::{Component, Path, PathBuf};

use incbuild_cache::BuildCache;
use incbuild_config::BuildConfig;

use crate::archive::{archive_path, update_archive, ArchiveSettings};
use crate::compile::{compile_sources, CompileSettings};
use crate::error::BuildError;
use crate::report::{BuildSummary, Reporter};
use crate::scan::list_sources;
use crate::toolchain::Toolchain;

/// The four positional inputs of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Directory scanned for sources.
    pub source_dir: PathBuf,
    /// Directory passed to the compiler as the include path.
    pub include_dir: PathBuf,
    /// Directory receiving objects and the archive. Created if absent.
    pub output_dir: PathBuf,
    /// File name of the archive inside `output_dir`.
    pub archive_name: String,
}

impl BuildRequest {
    /// Creates a request.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        include_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        archive_name: impl Into<String>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            include_dir: include_dir.into(),
            output_dir: output_dir.into(),
            archive_name: archive_name.into(),
        }
    }

    /// Full path of the archive.
    pub fn archive_path(&self) -> PathBuf {
        archive_path(&self.output_dir, &self.archive_name)
    }

    fn validate(&self) -> Result<(), BuildError> {
        let mut components = Path::new(&self.archive_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(BuildError::InvalidArchiveName(self.archive_name.clone())),
        }
    }
}

/// Runs the build: compile stale sources, update the archive, save records.
///
/// The record file named by `config.cache.file` is only written when both
/// phases succeed. Any error leaves it untouched, so the next run repeats
/// whatever was not finished.
pub fn run(
    request: &BuildRequest,
    config: &BuildConfig,
    toolchain: &mut dyn Toolchain,
    reporter: &mut dyn Reporter,
) -> Result<BuildSummary, BuildError> {
    request.validate()?;

    let previous = BuildCache::load(&config.cache.file);
    std::fs::create_dir_all(&request.output_dir)
        .map_err(|e| BuildError::io(&request.output_dir, e))?;

    let archive = request.archive_path();
    let object_extension = config.sources.object_extension.as_str();

    let sources = list_sources(&request.source_dir, &config.sources)?;
    tracing::debug!(
        sources = sources.len(),
        previous = previous.len(),
        policy = %config.cache.detection,
        "starting build"
    );

    let compiled = compile_sources(
        &sources,
        &previous,
        &CompileSettings {
            include_dir: &request.include_dir,
            output_dir: &request.output_dir,
            object_extension,
            policy: config.cache.detection,
            archive_exists: archive.exists(),
        },
        toolchain,
        reporter,
    )?;

    let archived = update_archive(
        &compiled.records,
        &previous,
        &compiled.compiled,
        &ArchiveSettings {
            output_dir: &request.output_dir,
            archive: &archive,
            object_extension,
            prune: config.archive.prune,
        },
        toolchain,
        reporter,
    )?;

    compiled.records.save(&config.cache.file)?;

    Ok(BuildSummary {
        compiled: compiled.compiled,
        skipped: compiled.skipped,
        archived: archived.archived,
        pruned: archived.pruned,
        archive: archived.outcome,
    })
}
