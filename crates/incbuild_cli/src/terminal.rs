//! Human-readable progress output.
//!
//! Progress goes to stdout, failures to stderr. A compile or insert prints
//! its name first and completes the line once the tool returns, so a long
//! compile shows which file it is working on.

use std::io::{self, Write};

use incbuild_driver::{ArchiveOutcome, BuildEvent, Reporter};

const BLUE: &str = "\x1b[34m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const MAGENTA: &str = "\x1b[35m";
const YELLOW: &str = "\x1b[33m";
const ITALIC: &str = "\x1b[3m";
const RESET: &str = "\x1b[0m";

/// Prints [`BuildEvent`]s as colored terminal lines.
pub struct TerminalReporter<O: Write, E: Write> {
    out: O,
    err: E,
    /// Whether to use ANSI color codes in output.
    pub color: bool,
    /// Whether to suppress everything but failures.
    pub quiet: bool,
    /// Whether to list up-to-date files.
    pub verbose: bool,
    failed: bool,
}

impl TerminalReporter<io::Stdout, io::Stderr> {
    /// Creates a reporter writing to the process's stdout and stderr.
    pub fn stdio(color: bool, quiet: bool, verbose: bool) -> Self {
        Self::new(io::stdout(), io::stderr(), color, quiet, verbose)
    }
}

impl<O: Write, E: Write> TerminalReporter<O, E> {
    /// Creates a reporter over arbitrary writers.
    pub fn new(out: O, err: E, color: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            out,
            err,
            color,
            quiet,
            verbose,
            failed: false,
        }
    }

    /// Whether a failure has already been printed to stderr.
    pub fn reported_failure(&self) -> bool {
        self.failed
    }

    /// Consumes the reporter, returning its writers.
    #[cfg(test)]
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn name(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{ITALIC}{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn progress(&mut self, text: &str) {
        if !self.quiet {
            let _ = write!(self.out, "{text}");
            let _ = self.out.flush();
        }
    }

    fn line(&mut self, text: &str) {
        if !self.quiet {
            let _ = writeln!(self.out, "{text}");
        }
    }

    fn failure(&mut self, text: &str) {
        self.line(&self.paint(RED, " error"));
        self.error_line(text);
    }

    fn error_line(&mut self, text: &str) {
        self.failed = true;
        let message = self.paint(RED, text);
        let _ = writeln!(self.err, "{message}");
    }
}

impl<O: Write, E: Write> Reporter for TerminalReporter<O, E> {
    fn report(&mut self, event: BuildEvent) {
        match event {
            BuildEvent::CompileStarted(file) => {
                let text = format!("Compiling {}...", self.name(BLUE, &file));
                self.progress(&text);
            }
            BuildEvent::Compiled(_) => self.line(&self.paint(GREEN, " compiled")),
            BuildEvent::CompileFailed(file) => {
                self.failure(&format!("Compilation of {file} failed."));
            }
            BuildEvent::Skipped(file) => {
                if self.verbose {
                    self.line(&format!("Up to date: {file}"));
                }
            }
            BuildEvent::NothingToCompile => {
                self.line(&self.paint(GREEN, "No changes detected, skipping compilation."));
            }
            BuildEvent::Pruned(members) => {
                let text = format!("Removed {} from library", members.join(", "));
                self.line(&text);
            }
            BuildEvent::InsertStarted(object) => {
                let text = format!("Adding {} to library...", self.name(MAGENTA, &object));
                self.progress(&text);
            }
            BuildEvent::Inserted(_) => self.line(&self.paint(GREEN, " added")),
            BuildEvent::InsertFailed(object) => {
                self.failure(&format!("Failed to add {object} to library."));
            }
            BuildEvent::Creating(archive) => {
                let text = format!("Creating static library {}...", self.paint(YELLOW, &archive));
                self.line(&text);
            }
            BuildEvent::CreateFailed(archive) => {
                self.error_line(&format!("Failed to create library {archive}"));
            }
            BuildEvent::ArchiveFinished { archive, outcome } => {
                let text = match outcome {
                    ArchiveOutcome::UpToDate => {
                        self.paint(GREEN, &format!("Static library {archive} is up to date."))
                    }
                    ArchiveOutcome::Updated | ArchiveOutcome::Created => self.paint(
                        YELLOW,
                        &format!("Static library {archive} updated successfully."),
                    ),
                    ArchiveOutcome::Empty => self.paint(
                        YELLOW,
                        &format!("No object files to archive, {archive} not created."),
                    ),
                };
                self.line(&text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(events: Vec<BuildEvent>, color: bool, quiet: bool, verbose: bool) -> (String, String) {
        let mut reporter = TerminalReporter::new(Vec::new(), Vec::new(), color, quiet, verbose);
        for event in events {
            reporter.report(event);
        }
        let (out, err) = reporter.into_inner();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn compile_line_is_completed_in_place() {
        let (out, err) = render(
            vec![
                BuildEvent::CompileStarted("a.cpp".into()),
                BuildEvent::Compiled("a.cpp".into()),
            ],
            false,
            false,
            false,
        );
        assert_eq!(out, "Compiling a.cpp... compiled\n");
        assert!(err.is_empty());
    }

    #[test]
    fn colored_compile_line() {
        let (out, _) = render(
            vec![BuildEvent::CompileStarted("a.cpp".into())],
            true,
            false,
            false,
        );
        assert_eq!(out, "Compiling \x1b[3m\x1b[34ma.cpp\x1b[0m...");
    }

    #[test]
    fn failure_goes_to_stderr_even_when_quiet() {
        let (out, err) = render(
            vec![
                BuildEvent::CompileStarted("a.cpp".into()),
                BuildEvent::CompileFailed("a.cpp".into()),
            ],
            false,
            true,
            false,
        );
        assert!(out.is_empty());
        assert_eq!(err, "Compilation of a.cpp failed.\n");
    }

    #[test]
    fn failures_are_remembered() {
        let mut reporter = TerminalReporter::new(Vec::new(), Vec::new(), false, false, false);
        reporter.report(BuildEvent::CompileStarted("a.cpp".into()));
        reporter.report(BuildEvent::Compiled("a.cpp".into()));
        assert!(!reporter.reported_failure());

        reporter.report(BuildEvent::CreateFailed("libdemo.a".into()));
        assert!(reporter.reported_failure());
        let (_, err) = reporter.into_inner();
        assert_eq!(String::from_utf8(err).unwrap(), "Failed to create library libdemo.a\n");
    }

    #[test]
    fn skipped_files_only_when_verbose() {
        let events = || vec![BuildEvent::Skipped("a.cpp".into())];
        assert_eq!(render(events(), false, false, false).0, "");
        assert_eq!(render(events(), false, false, true).0, "Up to date: a.cpp\n");
    }

    #[test]
    fn archive_messages() {
        let (out, _) = render(
            vec![
                BuildEvent::InsertStarted("a.o".into()),
                BuildEvent::Inserted("a.o".into()),
                BuildEvent::ArchiveFinished {
                    archive: "libdemo.a".into(),
                    outcome: ArchiveOutcome::Updated,
                },
            ],
            false,
            false,
            false,
        );
        assert_eq!(
            out,
            "Adding a.o to library... added\nStatic library libdemo.a updated successfully.\n"
        );
    }

    #[test]
    fn up_to_date_rerun() {
        let (out, _) = render(
            vec![
                BuildEvent::NothingToCompile,
                BuildEvent::ArchiveFinished {
                    archive: "libdemo.a".into(),
                    outcome: ArchiveOutcome::UpToDate,
                },
            ],
            false,
            false,
            false,
        );
        assert_eq!(
            out,
            "No changes detected, skipping compilation.\nStatic library libdemo.a is up to date.\n"
        );
    }

    #[test]
    fn quiet_suppresses_progress() {
        let (out, err) = render(
            vec![
                BuildEvent::CompileStarted("a.cpp".into()),
                BuildEvent::Compiled("a.cpp".into()),
                BuildEvent::NothingToCompile,
            ],
            true,
            true,
            true,
        );
        assert!(out.is_empty());
        assert!(err.is_empty());
    }
}
