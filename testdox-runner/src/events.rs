// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test lifecycle events consumed by the reporter.
//!
//! Events are produced by an event source at the boundary (for example, the
//! `testdox` CLI reading a JSON-lines stream) and consumed, in order, by a
//! [`SessionReporter`](crate::reporter::SessionReporter).

use serde::{Deserialize, Deserializer, de::Error as _};
use std::{fmt, time::Duration};

/// A test lifecycle event.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TestEvent {
    /// A test started.
    TestStarted {
        /// The test that started.
        test: TestIdentity,
    },

    /// The test in progress did not succeed.
    ///
    /// At most one outcome may be reported per test.
    TestOutcome {
        /// How the test failed.
        outcome: FailureKind,

        /// Message and trace information for the failure.
        #[serde(default)]
        detail: String,
    },

    /// A test finished.
    TestFinished {
        /// The test that finished.
        test: TestIdentity,

        /// The time the test took to run.
        #[serde(deserialize_with = "deserialize_secs")]
        elapsed: Duration,
    },

    /// The run finished.
    RunFinished {
        /// The total number of tests executed.
        executed: usize,
    },
}

/// The kind of a test, decided once by the event source.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    /// A standard unit test: a method on a test class.
    #[default]
    Standard,

    /// A script-based test, identified by its file.
    ScriptBased,

    /// Anything else. The reporter ignores these.
    #[serde(other)]
    Unrecognized,
}

impl TestKind {
    /// Returns true if the reporter renders tests of this kind.
    pub fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

/// The data variant a parameterized test ran with.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataSet {
    /// A positional data set.
    Index(usize),

    /// A named data set.
    Named(String),
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "data set #{index}"),
            Self::Named(name) => write!(f, "data set \"{name}\""),
        }
    }
}

/// Human-authored display names attached to a test.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct TestdoxMetadata {
    /// The display name of the test's group, from the class annotation.
    #[serde(default)]
    pub group: Option<String>,

    /// The display name of the test itself, from the method annotation.
    #[serde(default)]
    pub label: Option<String>,
}

/// Identifies a test.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestIdentity {
    /// The kind of test.
    #[serde(default)]
    pub kind: TestKind,

    /// The class (or, for script-based tests, the file) the test belongs to.
    pub class: String,

    /// The method name (or, for script-based tests, the test name).
    pub name: String,

    /// The data set this run used, if the test is parameterized.
    #[serde(default)]
    pub data_set: Option<DataSet>,

    /// Display names supplied by annotations.
    #[serde(default)]
    pub testdox: TestdoxMetadata,
}

impl TestIdentity {
    /// Creates a standard test identity with no data set or metadata.
    pub fn standard(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: TestKind::Standard,
            class: class.into(),
            name: name.into(),
            data_set: None,
            testdox: TestdoxMetadata::default(),
        }
    }
}

/// The ways in which a test can fail to succeed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The test raised an unexpected error.
    Error,

    /// An assertion failed.
    Failure,

    /// The test produced a warning.
    Warning,

    /// The test is marked incomplete.
    Incomplete,

    /// The test is flagged as risky.
    Risky,

    /// The test was skipped.
    Skipped,
}

impl FailureKind {
    /// Returns true for outcomes that are tracked as non-successful but are not
    /// hard failures: incomplete, risky and skipped tests.
    pub fn is_benign(self) -> bool {
        matches!(self, Self::Incomplete | Self::Risky | Self::Skipped)
    }

    /// Returns a short, lowercase name for this kind.
    pub fn to_static_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Failure => "failure",
            Self::Warning => "warning",
            Self::Incomplete => "incomplete",
            Self::Risky => "risky",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_static_str())
    }
}

/// The outcome of a finished test.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Outcome {
    /// The test passed.
    Success,
    /// See [`FailureKind::Error`].
    Error,
    /// See [`FailureKind::Failure`].
    Failure,
    /// See [`FailureKind::Warning`].
    Warning,
    /// See [`FailureKind::Incomplete`].
    Incomplete,
    /// See [`FailureKind::Risky`].
    Risky,
    /// See [`FailureKind::Skipped`].
    Skipped,
}

impl Outcome {
    /// Returns true for incomplete, risky and skipped outcomes.
    pub fn is_benign(self) -> bool {
        matches!(self, Self::Incomplete | Self::Risky | Self::Skipped)
    }
}

impl From<FailureKind> for Outcome {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Error => Self::Error,
            FailureKind::Failure => Self::Failure,
            FailureKind::Warning => Self::Warning,
            FailureKind::Incomplete => Self::Incomplete,
            FailureKind::Risky => Self::Risky,
            FailureKind::Skipped => Self::Skipped,
        }
    }
}

fn deserialize_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs)
        .map_err(|error| D::Error::custom(format!("invalid elapsed time {secs}: {error}")))
}
