//! The in-memory record table and its persisted form.
//!
//! A `BuildCache` is loaded once at the start of a run and a fresh one is
//! built from the sources seen during that run. Only the fresh table is
//! saved, so records of sources that disappeared drop out on the next save.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::error::CacheError;
use crate::record::{decode_line, encode_line, CompilationRecord};

/// Mapping from source key to its [`CompilationRecord`].
///
/// Keys are kept sorted so the saved file is byte-for-byte stable when
/// nothing changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildCache {
    records: BTreeMap<String, CompilationRecord>,
}

impl BuildCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the record file at `path`.
    ///
    /// This is fail-safe: a missing file, an unreadable file, or any malformed
    /// line yields an empty cache, which costs one full rebuild.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no record file, starting empty");
                return Self::new();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable record file, starting empty");
                return Self::new();
            }
        };

        match Self::parse(&content) {
            Ok(cache) => {
                tracing::debug!(path = %path.display(), records = cache.len(), "loaded record file");
                cache
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding record file");
                Self::new()
            }
        }
    }

    /// Parses record file content. Blank lines are ignored.
    pub fn parse(content: &str) -> Result<Self, CacheError> {
        let mut records = BTreeMap::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, record) = decode_line(line).map_err(|reason| CacheError::Malformed {
                line: idx + 1,
                reason,
            })?;
            records.insert(key, record);
        }
        Ok(Self { records })
    }

    /// Renders the record file content.
    ///
    /// Keys that cannot be written on one line are skipped with a warning;
    /// those sources are recompiled on every run.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, record) in &self.records {
            match encode_line(key, record) {
                Some(line) => {
                    out.push_str(&line);
                    out.push('\n');
                }
                None => {
                    tracing::warn!(source = ?key, "source path cannot be recorded, it will be rebuilt every run");
                }
            }
        }
        out
    }

    /// Atomically replaces the record file at `path` with this cache.
    ///
    /// The content is written to a temporary file in the same directory and
    /// renamed over the target, so readers never see a partial file.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let written = tmp
            .write_all(self.render().as_bytes())
            .and_then(|()| tmp.as_file().sync_all());
        written.map_err(|e| CacheError::Io {
            path: tmp.path().to_path_buf(),
            source: e,
        })?;
        tmp.persist(path).map_err(|e| CacheError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        tracing::debug!(path = %path.display(), records = self.len(), "saved record file");
        Ok(())
    }

    /// Returns the record for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&CompilationRecord> {
        self.records.get(key)
    }

    /// Inserts or replaces the record for `key`.
    pub fn insert(&mut self, key: impl Into<String>, record: CompilationRecord) {
        self.records.insert(key.into(), record);
    }

    /// Returns `true` if a record exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Iterates records in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CompilationRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys present in `self` but absent from `current`, in key order.
    ///
    /// Used with the previous run's cache to find sources that were removed.
    pub fn keys_missing_from<'a>(&'a self, current: &BuildCache) -> Vec<&'a str> {
        self.records
            .keys()
            .filter(|k| !current.contains(k))
            .map(String::as_str)
            .collect()
    }
}
