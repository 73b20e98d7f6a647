//! Scenario test helpers for incbuild.
//!
//! Provides a scratch [`Project`] laid out like a real checkout and a
//! [`ScriptedToolchain`] that stands in for the compiler and archiver. The
//! scripted archive is a text file listing one member name per line, which is
//! enough to assert membership without a real `ar`.

#![warn(missing_docs)]

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, UNIX_EPOCH};

use incbuild_config::BuildConfig;
use incbuild_driver::{run, BuildError, BuildEvent, BuildRequest, BuildSummary, ToolError, Toolchain};

static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

/// Gives `path` a modification time unique within the test process.
pub fn restamp(path: &Path) -> std::io::Result<()> {
    let n = NEXT_STAMP.fetch_add(1, Ordering::Relaxed);
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_modified(UNIX_EPOCH + Duration::from_secs(1_600_000_000 + n))
}

/// One external tool call made through a [`ScriptedToolchain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Source file name that was compiled.
    Compile(String),
    /// Object file names inserted in one archiver call.
    Insert(Vec<String>),
    /// Member names deleted in one archiver call.
    Remove(Vec<String>),
}

/// A toolchain that writes placeholder files and logs every call.
#[derive(Debug, Default)]
pub struct ScriptedToolchain {
    /// Calls made so far, in order.
    pub log: Vec<Invocation>,
    /// Source file name whose compilation fails.
    pub fail_compile: Option<String>,
    /// Whether every archiver call fails.
    pub fail_archive: bool,
    /// Seconds since the epoch given to every object instead of a unique
    /// stamp, like a filesystem with a coarse clock.
    pub fixed_mtime: Option<u64>,
}

impl ScriptedToolchain {
    /// Creates a toolchain where every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a toolchain whose compiler fails on `file_name`.
    pub fn failing_compile(file_name: &str) -> Self {
        Self {
            fail_compile: Some(file_name.to_string()),
            ..Self::default()
        }
    }

    /// Creates a toolchain whose archiver always fails.
    pub fn failing_archive() -> Self {
        Self {
            fail_archive: true,
            ..Self::default()
        }
    }

    /// Creates a toolchain that gives every object the same mtime.
    pub fn coarse_clock(secs: u64) -> Self {
        Self {
            fixed_mtime: Some(secs),
            ..Self::default()
        }
    }

    /// File names of the sources compiled so far.
    pub fn compiled(&self) -> Vec<String> {
        self.log
            .iter()
            .filter_map(|call| match call {
                Invocation::Compile(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of archiver calls made so far.
    pub fn archiver_calls(&self) -> usize {
        self.log
            .iter()
            .filter(|call| !matches!(call, Invocation::Compile(_)))
            .count()
    }

    fn failed(program: &str) -> ToolError {
        ToolError::Failed {
            program: program.to_string(),
            code: Some(1),
        }
    }

    fn io_error(program: &str, source: std::io::Error) -> ToolError {
        ToolError::Spawn {
            program: program.to_string(),
            source,
        }
    }

    fn write_members(archive: &Path, members: &[String]) -> std::io::Result<()> {
        let mut file = File::create(archive)?;
        for member in members {
            writeln!(file, "{member}")?;
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Toolchain for ScriptedToolchain {
    fn compile(
        &mut self,
        source: &Path,
        object: &Path,
        _include_dir: &Path,
    ) -> Result<(), ToolError> {
        let name = file_name(source);
        self.log.push(Invocation::Compile(name.clone()));
        if self.fail_compile.as_deref() == Some(name.as_str()) {
            return Err(Self::failed("scripted-cc"));
        }
        let fixed_mtime = self.fixed_mtime;
        std::fs::write(object, format!("object for {name}"))
            .and_then(|()| match fixed_mtime {
                Some(secs) => OpenOptions::new()
                    .write(true)
                    .open(object)?
                    .set_modified(UNIX_EPOCH + Duration::from_secs(secs)),
                None => restamp(object),
            })
            .map_err(|e| Self::io_error("scripted-cc", e))
    }

    fn archive(&mut self, archive: &Path, objects: &[PathBuf]) -> Result<(), ToolError> {
        let names: Vec<String> = objects.iter().map(|o| file_name(o)).collect();
        self.log.push(Invocation::Insert(names.clone()));
        if self.fail_archive {
            return Err(Self::failed("scripted-ar"));
        }
        let mut members = archive_members(archive);
        for name in names {
            if !members.contains(&name) {
                members.push(name);
            }
        }
        Self::write_members(archive, &members).map_err(|e| Self::io_error("scripted-ar", e))
    }

    fn remove_members(&mut self, archive: &Path, members: &[String]) -> Result<(), ToolError> {
        self.log.push(Invocation::Remove(members.to_vec()));
        if self.fail_archive {
            return Err(Self::failed("scripted-ar"));
        }
        let kept: Vec<String> = archive_members(archive)
            .into_iter()
            .filter(|m| !members.contains(m))
            .collect();
        Self::write_members(archive, &kept).map_err(|e| Self::io_error("scripted-ar", e))
    }
}

/// Member names listed in a scripted archive, empty if it does not exist.
pub fn archive_members(archive: &Path) -> Vec<String> {
    std::fs::read_to_string(archive)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// A scratch checkout: `src/`, `include/`, an output directory that does not
/// exist yet, and a record file inside the scratch root.
pub struct Project {
    root: tempfile::TempDir,
    /// Request passed to every run.
    pub request: BuildRequest,
    /// Configuration passed to every run.
    pub config: BuildConfig,
}

impl Project {
    /// Creates an empty project building `libdemo.a`.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create scratch directory");
        let src = root.path().join("src");
        let include = root.path().join("include");
        std::fs::create_dir_all(&src).expect("create src");
        std::fs::create_dir_all(&include).expect("create include");

        let mut config = BuildConfig::default();
        config.cache.file = root.path().join(".last_sizes.txt");

        let request = BuildRequest::new(src, include, root.path().join("build"), "libdemo.a");
        Self {
            root,
            request,
            config,
        }
    }

    /// The scratch root.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Writes a source of exactly `size` bytes.
    pub fn write_source(&self, name: &str, size: usize) -> PathBuf {
        self.write_source_text(name, &"/".repeat(size))
    }

    /// Writes a source with the given content.
    pub fn write_source_text(&self, name: &str, content: &str) -> PathBuf {
        let path = self.request.source_dir.join(name);
        std::fs::write(&path, content).expect("write source");
        path
    }

    /// Deletes a source.
    pub fn remove_source(&self, name: &str) {
        std::fs::remove_file(self.request.source_dir.join(name)).expect("remove source");
    }

    /// Path of an object in the output directory.
    pub fn object(&self, name: &str) -> PathBuf {
        self.request.output_dir.join(name)
    }

    /// Path of the archive.
    pub fn archive(&self) -> PathBuf {
        self.request.archive_path()
    }

    /// Members currently in the archive.
    pub fn members(&self) -> Vec<String> {
        archive_members(&self.archive())
    }

    /// Contents of the record file, if it exists.
    pub fn records(&self) -> Option<String> {
        std::fs::read_to_string(&self.config.cache.file).ok()
    }

    /// Runs a build, collecting the emitted events.
    pub fn build(
        &self,
        toolchain: &mut ScriptedToolchain,
    ) -> (Result<BuildSummary, BuildError>, Vec<BuildEvent>) {
        let mut events: Vec<BuildEvent> = Vec::new();
        let result = run(&self.request, &self.config, toolchain, &mut events);
        (result, events)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}
