// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by testdox-runner.

use crate::events::FailureKind;
use camino::Utf8PathBuf;
use std::{fmt, io};
use thiserror::Error;

/// A result record was asked to fail a second time.
///
/// A test cannot fail in two distinct ways, so this indicates that the event
/// source delivered more than one outcome for the same test.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RecordError {
    /// The record already carries a non-successful outcome.
    #[error(
        "test `{label}` already failed as {existing}, cannot also fail as {attempted}"
    )]
    AlreadyFailed {
        /// The label of the test.
        label: String,

        /// The outcome the record already carries.
        existing: FailureKind,

        /// The outcome that was rejected.
        attempted: FailureKind,
    },
}

/// The lifecycle event that arrived without a matching in-progress test.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LifecycleEvent {
    /// An outcome callback.
    Outcome(FailureKind),

    /// A test finished.
    Finished,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outcome(kind) => write!(f, "{kind} outcome"),
            Self::Finished => write!(f, "test finished"),
        }
    }
}

/// An error that occurs while reporting an event.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReporterError {
    /// An event arrived with no preceding test start.
    ///
    /// This is a violation of the event source contract and aborts the run.
    #[error("{event} event received without a preceding test start")]
    PrecedingLifecycle {
        /// The event that arrived out of order.
        event: LifecycleEvent,
    },

    /// A result record rejected a state transition.
    #[error("invalid result record state")]
    InvalidState(#[from] RecordError),

    /// An event arrived after the session was finalized.
    #[error("event received after the session was finalized")]
    AlreadyFinalized,

    /// An error occurred while writing to the output.
    #[error("error writing to output")]
    Io(#[source] io::Error),
}

/// An error that occurs while loading reporter configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file at {path}")]
    Read {
        /// The path to the config file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The config file could not be parsed.
    #[error("failed to parse config file at {path}")]
    Parse {
        /// The path to the config file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: toml::de::Error,
    },

    /// The config file was explicitly requested but does not exist.
    #[error("config file not found at {path}")]
    FileNotFound {
        /// The path that was requested.
        path: Utf8PathBuf,
    },
}
