//! The build command: resolve configuration and drive one run.

use std::path::Path;

use incbuild_config::{discover_config, BuildConfig, ConfigOverrides};
use incbuild_driver::{BuildRequest, SystemToolchain};

use crate::terminal::TerminalReporter;
use crate::{Cli, GlobalArgs};

/// Runs the build described by the command line.
///
/// Returns exit code 0 on success, or 1 when a tool failure was already
/// printed by the reporter. Other failures come back as errors and are
/// turned into exit code 1 by `main`.
pub fn run(cli: &Cli, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(cli, global, Path::new("."))?;
    tracing::debug!(?config, "resolved configuration");

    let request = BuildRequest::new(
        &cli.source_dir,
        &cli.include_dir,
        &cli.output_dir,
        &cli.archive,
    );
    let mut toolchain = SystemToolchain::from_config(&config.toolchain);
    let mut reporter = TerminalReporter::stdio(global.color, global.quiet, global.verbose);

    let summary = match incbuild_driver::run(&request, &config, &mut toolchain, &mut reporter) {
        Ok(summary) => summary,
        Err(e) if reporter.reported_failure() => {
            tracing::debug!(error = %e, "build failed");
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };
    tracing::debug!(
        compiled = summary.compiled.len(),
        skipped = summary.skipped.len(),
        archived = summary.archived.len(),
        pruned = summary.pruned.len(),
        archive = %summary.archive,
        "build finished"
    );

    Ok(0)
}

/// Loads the configuration file, if any, and applies command-line overrides.
fn resolve_config(
    cli: &Cli,
    global: &GlobalArgs,
    work_dir: &Path,
) -> Result<BuildConfig, Box<dyn std::error::Error>> {
    let config = discover_config(work_dir, global.config.as_deref())?;
    let overrides = ConfigOverrides {
        detection: cli.detect.map(Into::into),
        prune: cli.prune,
    };
    Ok(overrides.apply(config))
}
