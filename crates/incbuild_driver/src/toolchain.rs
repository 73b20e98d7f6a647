//! The external compiler and archiver.
//!
//! Tools are spawned directly with argument vectors, never through a shell,
//! so paths containing spaces or quotes need no escaping. Only the exit
//! status is inspected; tool output goes straight to the user's terminal.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use incbuild_config::ToolchainConfig;

/// Failure of an external tool invocation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The program could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        /// The program name.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The program ran and reported failure.
    #[error("{program} {}", describe_exit(.code))]
    Failed {
        /// The program name.
        program: String,
        /// The exit code, absent when terminated by a signal.
        code: Option<i32>,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exited with code {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// The two collaborators the orchestrator drives.
///
/// Every call blocks until the tool exits. An `Err` aborts the run.
pub trait Toolchain {
    /// Compiles `source` into exactly one object at `object`, searching
    /// `include_dir` for headers.
    fn compile(&mut self, source: &Path, object: &Path, include_dir: &Path)
        -> Result<(), ToolError>;

    /// Inserts or replaces `objects` in `archive`, creating it if needed.
    fn archive(&mut self, archive: &Path, objects: &[PathBuf]) -> Result<(), ToolError>;

    /// Deletes the named members from `archive`.
    fn remove_members(&mut self, archive: &Path, members: &[String]) -> Result<(), ToolError>;
}

/// A [`Toolchain`] backed by real programs on the host, `g++` and `ar` style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemToolchain {
    compiler: String,
    archiver: String,
}

impl SystemToolchain {
    /// Creates a toolchain from program names or paths.
    pub fn new(compiler: impl Into<String>, archiver: impl Into<String>) -> Self {
        Self {
            compiler: compiler.into(),
            archiver: archiver.into(),
        }
    }

    /// Creates a toolchain from the `[toolchain]` configuration section.
    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self::new(&config.compiler, &config.archiver)
    }

    /// Arguments passed to the compiler.
    pub fn compile_args(source: &Path, object: &Path, include_dir: &Path) -> Vec<OsString> {
        let mut include = OsString::from("-I");
        include.push(include_dir);
        vec![
            "-c".into(),
            source.into(),
            "-o".into(),
            object.into(),
            include,
        ]
    }

    /// Arguments passed to the archiver to insert or replace members.
    pub fn insert_args(archive: &Path, objects: &[PathBuf]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["r".into(), archive.into()];
        args.extend(objects.iter().map(OsString::from));
        args
    }

    /// Arguments passed to the archiver to delete members.
    pub fn delete_args(archive: &Path, members: &[String]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["d".into(), archive.into()];
        args.extend(members.iter().map(OsString::from));
        args
    }

    fn invoke(program: &str, args: Vec<OsString>) -> Result<(), ToolError> {
        let mut cmd = Command::new(program);
        cmd.args(&args);
        tracing::debug!(?cmd, "running tool");

        let status = cmd.status().map_err(|e| ToolError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed {
                program: program.to_string(),
                code: status.code(),
            })
        }
    }
}

impl Default for SystemToolchain {
    fn default() -> Self {
        Self::from_config(&ToolchainConfig::default())
    }
}

impl Toolchain for SystemToolchain {
    fn compile(
        &mut self,
        source: &Path,
        object: &Path,
        include_dir: &Path,
    ) -> Result<(), ToolError> {
        Self::invoke(
            &self.compiler,
            Self::compile_args(source, object, include_dir),
        )
    }

    fn archive(&mut self, archive: &Path, objects: &[PathBuf]) -> Result<(), ToolError> {
        Self::invoke(&self.archiver, Self::insert_args(archive, objects))
    }

    fn remove_members(&mut self, archive: &Path, members: &[String]) -> Result<(), ToolError> {
        Self::invoke(&self.archiver, Self::delete_args(archive, members))
    }
}
