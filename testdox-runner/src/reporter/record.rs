// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    formatter::{Colorize, OutcomeFormatter, ResultLine},
    grouping::write_group_header,
};
use crate::{
    errors::RecordError,
    events::{FailureKind, Outcome},
};
use smol_str::SmolStr;
use std::time::Duration;

#[derive(Clone, Debug, Eq, PartialEq)]
struct RecordFailure {
    kind: FailureKind,
    detail: String,
}

/// The result of a test that is still running.
///
/// Becomes a [`ResultRecord`] once its runtime is known.
#[derive(Clone, Debug)]
pub struct PendingRecord {
    group: SmolStr,
    label: String,
    failure: Option<RecordFailure>,
}

impl PendingRecord {
    /// Creates a record for a test in `group`, displayed as `label`.
    pub fn new(group: impl Into<SmolStr>, label: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            label: label.into(),
            failure: None,
        }
    }

    /// The group this test belongs to.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The display name of this test.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Marks this test as not successful.
    ///
    /// A test fails at most once: a second call returns
    /// [`RecordError::AlreadyFailed`] and leaves the record unchanged.
    pub fn fail(&mut self, kind: FailureKind, detail: impl Into<String>) -> Result<(), RecordError> {
        if let Some(existing) = &self.failure {
            return Err(RecordError::AlreadyFailed {
                label: self.label.clone(),
                existing: existing.kind,
                attempted: kind,
            });
        }
        self.failure = Some(RecordFailure {
            kind,
            detail: detail.into(),
        });
        Ok(())
    }

    /// Returns true if [`fail`](Self::fail) was never called.
    pub fn is_successful(&self) -> bool {
        self.failure.is_none()
    }

    /// Completes the record with the test's runtime.
    pub fn set_runtime(self, elapsed: Duration) -> ResultRecord {
        ResultRecord {
            group: self.group,
            label: self.label,
            failure: self.failure,
            elapsed,
        }
    }
}

/// The result of a finished test.
///
/// Immutable once created.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultRecord {
    group: SmolStr,
    label: String,
    failure: Option<RecordFailure>,
    elapsed: Duration,
}

impl ResultRecord {
    /// The group this test belongs to.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The display name of this test.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The outcome of this test.
    pub fn outcome(&self) -> Outcome {
        match &self.failure {
            Some(failure) => failure.kind.into(),
            None => Outcome::Success,
        }
    }

    /// Failure details. `None` if and only if the test succeeded.
    pub fn detail(&self) -> Option<&str> {
        self.failure.as_ref().map(|failure| failure.detail.as_str())
    }

    /// How long the test took.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns true if the test succeeded.
    pub fn is_successful(&self) -> bool {
        self.failure.is_none()
    }

    /// Returns true if the test was incomplete, risky or skipped.
    pub fn is_benign(&self) -> bool {
        self.failure
            .as_ref()
            .is_some_and(|failure| failure.kind.is_benign())
    }

    /// Renders this record.
    ///
    /// The output starts with a group header if `previous` is absent or
    /// belongs to a different group.
    pub fn render(
        &self,
        previous: Option<&ResultRecord>,
        verbose: bool,
        formatter: &OutcomeFormatter,
        colorize: &dyn Colorize,
    ) -> String {
        let mut out = String::new();
        write_group_header(previous, self, colorize, &mut out);
        out.push_str(&formatter.render(&self.line(), verbose, colorize));
        out
    }

    fn line(&self) -> ResultLine<'_> {
        ResultLine {
            outcome: self.outcome(),
            label: &self.label,
            elapsed: self.elapsed,
            detail: self.detail(),
        }
    }
}
