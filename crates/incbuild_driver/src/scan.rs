//! Directory scans for sources and objects.
//!
//! Scans are flat (no recursion) and results are sorted by path, so runs are
//! deterministic regardless of directory iteration order.

use std::path::{Path, PathBuf};

use incbuild_config::SourcesConfig;

use crate::error::BuildError;

/// A compilable file found in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Full path, as the source directory joined with the file name.
    pub path: PathBuf,
    /// Record key: the path rendered as a string.
    pub key: String,
    /// Bare file name, used in messages and for exclusion.
    pub file_name: String,
    /// File name without extension; the object shares it.
    pub stem: String,
}

impl SourceFile {
    /// Builds a `SourceFile` from a path, or `None` if it has no file name.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        let stem = path.file_stem()?.to_string_lossy().into_owned();
        let key = path.to_string_lossy().into_owned();
        Some(Self {
            path,
            key,
            file_name,
            stem,
        })
    }

    /// Path of the object this source compiles to.
    pub fn object_path(&self, output_dir: &Path, object_extension: &str) -> PathBuf {
        output_dir.join(object_file_name(&self.stem, object_extension))
    }
}

/// Object file name for a stem, e.g. `widget.o`.
pub fn object_file_name(stem: &str, object_extension: &str) -> String {
    format!("{stem}.{object_extension}")
}

/// Lists the compilable sources in `dir`.
///
/// Keeps regular files with the configured extension whose name is not in
/// the exclude list.
pub fn list_sources(dir: &Path, config: &SourcesConfig) -> Result<Vec<SourceFile>, BuildError> {
    let mut sources: Vec<SourceFile> = files_with_extension(dir, &config.extension)?
        .into_iter()
        .filter_map(SourceFile::from_path)
        .filter(|s| !config.exclude.iter().any(|ex| ex == &s.file_name))
        .collect();
    sources.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(sources)
}

/// Lists the object files currently in `dir`.
pub fn list_objects(dir: &Path, object_extension: &str) -> Result<Vec<PathBuf>, BuildError> {
    let mut objects = files_with_extension(dir, object_extension)?;
    objects.sort();
    Ok(objects)
}

fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, BuildError> {
    let entries = std::fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BuildError::io(dir, e))?.path();
        if path.extension().is_some_and(|e| e == ext) && path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
