// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    errors::{TestdoxExitCode, source_name_str},
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
};
use testdox_runner::{
    config::{ConfigLocation, ReporterConfig},
    events::TestEvent,
    reporter::{ReporterBuilder, RunStats, SessionReporter},
};
use tracing::{debug, info};

/// Render a stream of test events as testdox-style progress output.
///
/// Events are read as JSON lines, one event per line. Each finished test is
/// printed as it arrives, grouped by test class. At the end of the run,
/// tests that did not succeed are summarized.
#[derive(Debug, Parser)]
#[command(version, name = "testdox")]
pub struct TestdoxApp {
    /// File to read events from, or `-` for standard input
    #[arg(long, short, value_name = "PATH", default_value = "-")]
    events: Utf8PathBuf,

    #[command(flatten)]
    config_opts: ConfigOpts,

    #[command(flatten)]
    output: OutputOpts,
}

#[derive(Debug, Args)]
struct ConfigOpts {
    /// Config file [default: .config/testdox.toml if it exists]
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        env = "TESTDOX_CONFIG",
        conflicts_with = "no_config"
    )]
    config: Option<Utf8PathBuf>,

    /// Ignore config files and use the built-in defaults
    #[arg(long, global = true)]
    no_config: bool,
}

impl ConfigOpts {
    fn make_config(&self, cwd: &Utf8Path) -> Result<ReporterConfig, ExpectedError> {
        let location = if self.no_config {
            ConfigLocation::Isolated
        } else if let Some(path) = &self.config {
            ConfigLocation::Explicit(path)
        } else {
            ConfigLocation::Default { cwd }
        };
        Ok(ReporterConfig::load(location)?)
    }
}

impl TestdoxApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the process exit code on success.
    pub fn exec(
        self,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32, ExpectedError> {
        let cwd = current_dir()?;
        let config = self.config_opts.make_config(&cwd)?;

        let mut builder = ReporterBuilder::default();
        builder
            .apply_config(&config)
            .set_colorize(output.color.should_colorize(supports_color::Stream::Stdout));
        // The command line can only turn verbose output on.
        if output.verbose {
            builder.set_verbose(true);
        }

        let reader = open_events(&self.events)?;
        let mut reporter = builder.build(output_writer.reporter_output());
        let stats = run_events(&mut reporter, reader, &self.events)?;

        if stats.has_hard_failures() {
            Err(ExpectedError::TestRunFailed)
        } else {
            Ok(TestdoxExitCode::OK)
        }
    }
}

fn current_dir() -> Result<Utf8PathBuf, ExpectedError> {
    let cwd = std::env::current_dir().map_err(|error| ExpectedError::CurrentDirInvalid { error })?;
    Utf8PathBuf::try_from(cwd).map_err(|error| ExpectedError::CurrentDirInvalidUtf8 { error })
}

fn open_events(path: &Utf8Path) -> Result<Box<dyn BufRead>, ExpectedError> {
    if path.as_str() == "-" {
        debug!("reading events from stdin");
        return Ok(Box::new(io::stdin().lock()));
    }
    debug!("reading events from {path}");
    let file = File::open(path).map_err(|error| ExpectedError::event_read_error(path, error))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Forwards every event in `reader` to the reporter, then finalizes the
/// session if the stream didn't.
fn run_events(
    reporter: &mut SessionReporter<'_>,
    reader: impl BufRead,
    path: &Utf8Path,
) -> Result<RunStats, ExpectedError> {
    let reporter_error = |line_number, error| ExpectedError::ReporterError {
        source_name: source_name_str(path),
        line_number,
        error,
    };

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|error| ExpectedError::event_read_error(path, error))?;
        if line.trim().is_empty() {
            continue;
        }

        let event: TestEvent =
            serde_json::from_str(&line).map_err(|error| ExpectedError::EventParseError {
                source_name: source_name_str(path),
                line_number,
                error,
            })?;
        reporter
            .report_event(&event)
            .map_err(|error| reporter_error(Some(line_number), error))?;
    }

    if reporter.is_finalized() {
        return Ok(reporter.stats());
    }

    let finished = reporter.stats().finished;
    info!("event stream ended without a run-finished event, assuming {finished} tests ran");
    reporter
        .finalize(finished)
        .map_err(|error| reporter_error(None, error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use testdox_runner::errors::ReporterError;

    fn run_app(args: &[&str], events: &str) -> (Result<i32, ExpectedError>, String) {
        let dir = Utf8TempDir::new().unwrap();
        let events_path = dir.path().join("events.jsonl");
        std::fs::write(&events_path, events).unwrap();

        let mut argv = vec!["testdox", "--events", events_path.as_str(), "--no-config"];
        argv.extend_from_slice(args);
        let app = TestdoxApp::try_parse_from(argv).unwrap();
        let output = app.init_output();

        let mut output_writer = OutputWriter::Test {
            stdout: String::new(),
        };
        let result = app.exec(output, &mut output_writer);
        let OutputWriter::Test { stdout } = output_writer else {
            unreachable!("output writer is a test writer");
        };
        (result, stdout)
    }

    const PASSING: &str = indoc! {r#"
        {"event": "test-started", "test": {"class": "StackTest", "name": "testPush"}}
        {"event": "test-finished", "elapsed": 0.001, "test": {"class": "StackTest", "name": "testPush"}}
        {"event": "test-started", "test": {"class": "StackTest", "name": "testPop"}}
        {"event": "test-outcome", "outcome": "incomplete", "detail": "pop is not implemented"}
        {"event": "test-finished", "elapsed": 0.001, "test": {"class": "StackTest", "name": "testPop"}}
        {"event": "run-finished", "executed": 2}
    "#};

    #[test]
    fn passing_run() {
        let (result, stdout) = run_app(&["--color", "never"], PASSING);
        assert_eq!(result.unwrap(), TestdoxExitCode::OK);
        assert!(
            stdout.starts_with("Stack\n ✔ Push [1.00 ms]\n ∅ Pop [1.00 ms]\n\nTime: "),
            "unexpected output:\n{stdout}"
        );
        assert!(
            stdout.ends_with(indoc! {"
                Summary of non-successful tests:

                Stack
                 ∅ Pop [1.00 ms]
                OK, but incomplete, skipped, or risky tests!
                Tests: 2, Incomplete: 1.
            "}),
            "unexpected output:\n{stdout}"
        );
    }

    #[test]
    fn verbose_flag() {
        let (result, stdout) = run_app(&["--color", "never", "--verbose"], PASSING);
        result.unwrap();
        assert!(
            stdout.contains(" ∅ Pop [1.00 ms]\n   │\n   │ pop is not implemented\n"),
            "unexpected output:\n{stdout}"
        );
    }

    #[test]
    fn failing_run() {
        let (result, stdout) = run_app(
            &["--color", "never"],
            indoc! {r#"
                {"event": "test-started", "test": {"class": "StackTest", "name": "testPush"}}
                {"event": "test-outcome", "outcome": "failure", "detail": "stack is empty"}
                {"event": "test-finished", "elapsed": 0.001, "test": {"class": "StackTest", "name": "testPush"}}
            "#},
        );
        let error = result.unwrap_err();
        assert!(
            matches!(error, ExpectedError::TestRunFailed),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.process_exit_code(), TestdoxExitCode::TEST_RUN_FAILED);
        // Without a run-finished event, the number of finished tests is used.
        assert!(
            stdout.ends_with("FAILURES!\nTests: 1, Failures: 1.\n"),
            "unexpected output:\n{stdout}"
        );
    }

    #[test]
    fn malformed_event() {
        let (result, _) = run_app(
            &[],
            indoc! {r#"
                {"event": "test-started", "test": {"class": "StackTest", "name": "testPush"}}

                {"event": "test-exploded"}
            "#},
        );
        let error = result.unwrap_err();
        assert!(
            matches!(error, ExpectedError::EventParseError { line_number: 3, .. }),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.process_exit_code(), TestdoxExitCode::EVENT_STREAM_ERROR);
    }

    #[test]
    fn protocol_violation() {
        let (result, stdout) = run_app(
            &[],
            indoc! {r#"
                {"event": "test-outcome", "outcome": "error", "detail": "orphan"}
            "#},
        );
        let error = result.unwrap_err();
        assert!(
            matches!(
                error,
                ExpectedError::ReporterError {
                    line_number: Some(1),
                    error: ReporterError::PrecedingLifecycle { .. },
                    ..
                }
            ),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.process_exit_code(), TestdoxExitCode::PROTOCOL_VIOLATION);
        assert_eq!(stdout, "");
    }

    #[test]
    fn events_after_run_finished() {
        let events = format!(
            "{PASSING}{}\n",
            r#"{"event": "test-started", "test": {"class": "StackTest", "name": "testPeek"}}"#
        );
        let (result, _) = run_app(&[], &events);
        let error = result.unwrap_err();
        assert!(
            matches!(
                error,
                ExpectedError::ReporterError {
                    line_number: Some(7),
                    error: ReporterError::AlreadyFinalized,
                    ..
                }
            ),
            "unexpected error: {error:?}"
        );
    }

    #[test]
    fn missing_events_file() {
        let dir = Utf8TempDir::new().unwrap();
        let path = dir.path().join("missing.jsonl");
        let app =
            TestdoxApp::try_parse_from(["testdox", "--events", path.as_str(), "--no-config"])
                .unwrap();
        let output = app.init_output();
        let error = app
            .exec(output, &mut OutputWriter::Test { stdout: String::new() })
            .unwrap_err();
        assert!(
            matches!(error, ExpectedError::EventReadError { .. }),
            "unexpected error: {error:?}"
        );
    }

    #[test]
    fn explicit_config_file() {
        let dir = Utf8TempDir::new().unwrap();
        let config_path = dir.path().join("testdox.toml");
        std::fs::write(&config_path, "[reporter]\nverbose = true\n").unwrap();
        let events_path = dir.path().join("events.jsonl");
        std::fs::write(&events_path, PASSING).unwrap();

        let app = TestdoxApp::try_parse_from([
            "testdox",
            "--events",
            events_path.as_str(),
            "--config",
            config_path.as_str(),
            "--color",
            "never",
        ])
        .unwrap();
        let output = app.init_output();
        let mut output_writer = OutputWriter::Test {
            stdout: String::new(),
        };
        app.exec(output, &mut output_writer).unwrap();

        let OutputWriter::Test { stdout } = output_writer else {
            unreachable!("output writer is a test writer");
        };
        assert!(
            stdout.contains("   │ pop is not implemented\n"),
            "verbose set by config:\n{stdout}"
        );
    }

    #[test]
    fn config_and_no_config_conflict() {
        let result =
            TestdoxApp::try_parse_from(["testdox", "--config", "a.toml", "--no-config"]);
        assert!(result.is_err(), "--config conflicts with --no-config");
    }
}
