//! In-memory toolchain for unit tests.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, UNIX_EPOCH};

use crate::toolchain::{ToolError, Toolchain};

static STAMP: AtomicU64 = AtomicU64::new(1);

/// Writes a source file of exactly `size` bytes.
pub fn write_source(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, "x".repeat(size)).unwrap();
    path
}

/// Gives `path` a modification time no other file in the test run shares,
/// so each rebuilt object gets a fresh marker.
pub fn stamp(path: &Path) {
    let n = STAMP.fetch_add(1, Ordering::Relaxed);
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(1_000_000 + n))
        .unwrap();
}

/// Writes objects and archive members as plain text, recording every call.
#[derive(Debug)]
pub struct FakeToolchain {
    pub compiled: Vec<PathBuf>,
    pub archived: Vec<Vec<PathBuf>>,
    pub removed: Vec<Vec<String>>,
    pub fail_compile: Option<String>,
    pub fail_archive: bool,
    pub produce_objects: bool,
    /// Seconds since the epoch given to every object, like a filesystem
    /// whose clock is too coarse to tell two builds apart.
    pub fixed_mtime: Option<u64>,
}

impl Default for FakeToolchain {
    fn default() -> Self {
        Self {
            compiled: Vec::new(),
            archived: Vec::new(),
            removed: Vec::new(),
            fail_compile: None,
            fail_archive: false,
            produce_objects: true,
            fixed_mtime: None,
        }
    }
}

impl FakeToolchain {
    /// Member names currently listed in a fake archive.
    pub fn members(archive: &Path) -> Vec<String> {
        std::fs::read_to_string(archive)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn failure(program: &str) -> ToolError {
        ToolError::Failed {
            program: program.to_string(),
            code: Some(1),
        }
    }
}

impl Toolchain for FakeToolchain {
    fn compile(
        &mut self,
        source: &Path,
        object: &Path,
        _include_dir: &Path,
    ) -> Result<(), ToolError> {
        let name = source.file_name().unwrap().to_string_lossy();
        if self.fail_compile.as_deref() == Some(name.as_ref()) {
            return Err(Self::failure("fake-cc"));
        }
        self.compiled.push(source.to_path_buf());
        if self.produce_objects {
            File::create(object).unwrap();
            match self.fixed_mtime {
                Some(secs) => {
                    let file = OpenOptions::new().write(true).open(object).unwrap();
                    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))
                        .unwrap();
                }
                None => stamp(object),
            }
        }
        Ok(())
    }

    fn archive(&mut self, archive: &Path, objects: &[PathBuf]) -> Result<(), ToolError> {
        if self.fail_archive {
            return Err(Self::failure("fake-ar"));
        }
        self.archived.push(objects.to_vec());
        let mut members = Self::members(archive);
        for object in objects {
            let name = object.file_name().unwrap().to_string_lossy().into_owned();
            if !members.contains(&name) {
                members.push(name);
            }
        }
        let mut file = File::create(archive).unwrap();
        for member in &members {
            writeln!(file, "{member}").unwrap();
        }
        Ok(())
    }

    fn remove_members(&mut self, archive: &Path, members: &[String]) -> Result<(), ToolError> {
        if self.fail_archive {
            return Err(Self::failure("fake-ar"));
        }
        self.removed.push(members.to_vec());
        let kept: Vec<String> = Self::members(archive)
            .into_iter()
            .filter(|m| !members.contains(m))
            .collect();
        let mut file = File::create(archive).unwrap();
        for member in &kept {
            writeln!(file, "{member}").unwrap();
        }
        Ok(())
    }
}
