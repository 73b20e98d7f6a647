//! incbuild CLI: compile changed C++ sources and keep a static library current.
//!
//! ```text
//! incbuild [OPTIONS] <SOURCE_DIR> <INCLUDE_DIR> <OUTPUT_DIR> <ARCHIVE>
//! ```

#![warn(missing_docs)]

mod build;
mod logging;
mod terminal;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use incbuild_common::DetectionPolicy;

/// Incremental compile-and-archive helper.
#[derive(Parser, Debug)]
#[command(
    name = "incbuild",
    version,
    about = "Compile changed sources and update a static library"
)]
pub struct Cli {
    /// Directory containing the sources to compile.
    pub source_dir: PathBuf,

    /// Directory passed to the compiler as the include path.
    pub include_dir: PathBuf,

    /// Directory receiving object files and the library. Created if absent.
    pub output_dir: PathBuf,

    /// File name of the static library inside the output directory.
    pub archive: String,

    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// List skipped files and enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to an `incbuild.toml` configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// How source changes are detected, overriding the configuration.
    #[arg(long, value_enum)]
    pub detect: Option<DetectArg>,

    /// Remove library members whose source no longer exists.
    #[arg(long)]
    pub prune: bool,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stdout is a terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Change detection selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DetectArg {
    /// Compare byte sizes.
    Size,
    /// Compare content hashes.
    Hash,
}

impl From<DetectArg> for DetectionPolicy {
    fn from(arg: DetectArg) -> Self {
        match arg {
            DetectArg::Size => DetectionPolicy::Size,
            DetectArg::Hash => DetectionPolicy::Hash,
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to list skipped files.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a configuration file.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    logging::initialize(cli.verbose);

    let color = match cli.color {
        ColorChoice::Auto => std::io::stdout().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config.clone(),
    };

    match build::run(&cli, &global) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_positionals() {
        let cli = Cli::parse_from(["incbuild", "src", "include", "build", "libdemo.a"]);
        assert_eq!(cli.source_dir, PathBuf::from("src"));
        assert_eq!(cli.include_dir, PathBuf::from("include"));
        assert_eq!(cli.output_dir, PathBuf::from("build"));
        assert_eq!(cli.archive, "libdemo.a");
        assert!(!cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Auto);
        assert!(cli.detect.is_none());
        assert!(!cli.prune);
    }

    #[test]
    fn missing_positionals_is_an_error() {
        let err = Cli::try_parse_from(["incbuild", "src", "include", "build"]).unwrap_err();
        assert!(err.use_stderr());
        assert!(Cli::try_parse_from(["incbuild"]).is_err());
    }

    #[test]
    fn extra_positional_is_an_error() {
        assert!(Cli::try_parse_from(["incbuild", "a", "b", "c", "d", "e"]).is_err());
    }

    #[test]
    fn help_is_not_an_error_exit() {
        let err = Cli::try_parse_from(["incbuild", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }

    #[test]
    fn parse_options() {
        let cli = Cli::parse_from([
            "incbuild",
            "--quiet",
            "--color",
            "never",
            "--detect",
            "hash",
            "--prune",
            "--config",
            "ci/incbuild.toml",
            "src",
            "include",
            "build",
            "libdemo.a",
        ]);
        assert!(cli.quiet);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.detect, Some(DetectArg::Hash));
        assert!(cli.prune);
        assert_eq!(cli.config, Some(PathBuf::from("ci/incbuild.toml")));
    }

    #[test]
    fn flags_after_positionals() {
        let cli = Cli::parse_from(["incbuild", "src", "inc", "out", "lib.a", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn detect_maps_to_policy() {
        assert_eq!(DetectionPolicy::from(DetectArg::Size), DetectionPolicy::Size);
        assert_eq!(DetectionPolicy::from(DetectArg::Hash), DetectionPolicy::Hash);
    }

    #[test]
    fn unknown_detect_value_is_rejected() {
        assert!(
            Cli::try_parse_from(["incbuild", "--detect", "mtime", "a", "b", "c", "d"]).is_err()
        );
    }
}
