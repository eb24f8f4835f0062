// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8Path;
use owo_colors::OwoColorize;
use std::error::Error;
use testdox_runner::errors::{ConfigError, ReporterError};
use thiserror::Error;
use tracing::error;

/// Process exit codes returned by `testdox`.
pub enum TestdoxExitCode {}

impl TestdoxExitCode {
    /// No errors occurred and all tests passed, or only had benign outcomes.
    pub const OK: i32 = 0;

    /// At least one test errored, failed or produced a warning.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// An error occurred before any events were processed, for example while
    /// loading configuration.
    pub const SETUP_ERROR: i32 = 96;

    /// The event stream could not be read or contained malformed events.
    pub const EVENT_STREAM_ERROR: i32 = 104;

    /// The event stream violated the test lifecycle contract.
    pub const PROTOCOL_VIOLATION: i32 = 105;

    /// Writing reporter output failed.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}

// Note that the #[error()] strings are mostly placeholder messages -- the
// expected way to print out errors is with the display_to_stderr method, which
// colorizes errors.

/// An error that `testdox` expects to report to the user, as opposed to a bug.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("current directory is invalid")]
    CurrentDirInvalid {
        #[source]
        error: std::io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 {
        #[source]
        error: camino::FromPathBufError,
    },
    #[error("config error")]
    ConfigError {
        #[from]
        error: ConfigError,
    },
    #[error("failed to read events from {source_name}")]
    EventReadError {
        source_name: String,
        #[source]
        error: std::io::Error,
    },
    #[error("failed to parse event on line {line_number}")]
    EventParseError {
        source_name: String,
        line_number: usize,
        #[source]
        error: serde_json::Error,
    },
    #[error("reporter error")]
    ReporterError {
        source_name: String,
        line_number: Option<usize>,
        #[source]
        error: ReporterError,
    },
    #[error("test run failed")]
    TestRunFailed,
}

impl ExpectedError {
    pub(crate) fn event_read_error(source_name: &Utf8Path, error: std::io::Error) -> Self {
        Self::EventReadError {
            source_name: source_name_str(source_name),
            error,
        }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirInvalid { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigError { .. } => TestdoxExitCode::SETUP_ERROR,
            Self::EventReadError { .. } | Self::EventParseError { .. } => {
                TestdoxExitCode::EVENT_STREAM_ERROR
            }
            Self::ReporterError {
                error: ReporterError::Io(_),
                ..
            } => TestdoxExitCode::WRITE_OUTPUT_ERROR,
            Self::ReporterError { .. } => TestdoxExitCode::PROTOCOL_VIOLATION,
            Self::TestRunFailed => TestdoxExitCode::TEST_RUN_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::CurrentDirInvalid { error } => {
                error!("could not determine the current directory");
                Some(error as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { error } => {
                error!(
                    "current directory `{}` is not valid UTF-8",
                    error.as_path().display()
                );
                None
            }
            Self::ConfigError { error } => {
                error!("{error}");
                error.source()
            }
            Self::EventReadError { source_name, error } => {
                error!(
                    "failed to read events from {}",
                    source_name.style(styles.bold)
                );
                Some(error as &dyn Error)
            }
            Self::EventParseError {
                source_name,
                line_number,
                error,
            } => {
                error!(
                    "failed to parse event at {}",
                    format!("{source_name}:{line_number}").style(styles.bold)
                );
                Some(error as &dyn Error)
            }
            Self::ReporterError {
                source_name,
                line_number,
                error,
            } => {
                match line_number {
                    Some(line_number) => error!(
                        "{error} (at {})",
                        format!("{source_name}:{line_number}").style(styles.bold)
                    ),
                    None => error!("{error}"),
                }
                error.source()
            }
            Self::TestRunFailed => {
                error!("test run failed");
                None
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

pub(crate) fn source_name_str(path: &Utf8Path) -> String {
    if path.as_str() == "-" {
        "<stdin>".to_owned()
    } else {
        path.to_string()
    }
}
