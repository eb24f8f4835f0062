// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    formatter::{OutcomeFormatter, StyleSheet},
    record::{PendingRecord, ResultRecord},
    stats::RunStats,
    summary::write_summary,
};
use crate::{
    config::{ReporterConfig, RuntimeThresholds},
    errors::{LifecycleEvent, ReporterError},
    events::{FailureKind, TestEvent, TestIdentity},
    naming::{DefaultPrettifier, NamePrettifier, resolve_names},
    resource_usage::{ProcessResourceUsage, ResourceUsage},
    write_str::WriteStr,
};
use std::{
    io::{self, BufWriter},
    time::Duration,
};
use tracing::{debug, warn};

/// Where the reporter writes its output.
///
/// This is usually the terminal, but can be an in-memory buffer for tests.
pub enum ReporterOutput<'a> {
    /// Write to standard output, flushing after each finished test.
    Terminal,

    /// Write output to a buffer.
    Buffer(&'a mut String),
}

impl ReporterOutput<'_> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        match self {
            Self::Terminal => {
                let mut writer = BufWriter::new(io::stdout());
                writer.write_str(text)?;
                writer.write_str_flush()
            }
            Self::Buffer(buf) => buf.write_str(text),
        }
    }
}

/// Session reporter builder.
#[derive(Debug, Default)]
pub struct ReporterBuilder {
    verbose: bool,
    should_colorize: bool,
    thresholds: RuntimeThresholds,
}

impl ReporterBuilder {
    /// Sets verbose output.
    ///
    /// In verbose mode, details of incomplete, risky and skipped tests are
    /// shown as well.
    pub fn set_verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = verbose;
        self
    }

    /// Set to true if the reporter should colorize output.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.should_colorize = should_colorize;
        self
    }

    /// Sets the thresholds above which runtimes are highlighted.
    pub fn set_runtime_thresholds(&mut self, thresholds: RuntimeThresholds) -> &mut Self {
        self.thresholds = thresholds;
        self
    }

    /// Applies settings from a loaded configuration.
    pub fn apply_config(&mut self, config: &ReporterConfig) -> &mut Self {
        self.verbose = config.verbose;
        self.thresholds = config.runtime;
        self
    }
}

impl ReporterBuilder {
    /// Creates a new session reporter.
    ///
    /// Resource usage is measured from this call.
    pub fn build<'a>(&self, output: ReporterOutput<'a>) -> SessionReporter<'a> {
        SessionReporter {
            output,
            verbose: self.verbose,
            formatter: OutcomeFormatter::new(self.thresholds),
            styles: StyleSheet::new(self.should_colorize),
            prettifier: Box::new(DefaultPrettifier),
            resource_usage: Box::new(ProcessResourceUsage::start()),
            state: SessionState::default(),
        }
    }
}

#[derive(Debug, Default)]
enum Phase {
    #[default]
    Idle,
    InTest(PendingRecord),
    Finalized,
}

/// State for one reporting run. Only mutated by [`SessionReporter`]'s event
/// handlers.
#[derive(Debug, Default)]
struct SessionState {
    phase: Phase,
    // The last record rendered to the live output.
    previous: Option<ResultRecord>,
    non_successful: Vec<ResultRecord>,
    stats: RunStats,
}

/// Renders the results of a single run as it progresses.
///
/// Events must arrive in order: for each test, a start, at most one outcome,
/// then a finish. After all tests ran, [`finalize`](Self::finalize) prints the
/// summary. A reporter is not reusable across runs.
pub struct SessionReporter<'a> {
    output: ReporterOutput<'a>,
    verbose: bool,
    formatter: OutcomeFormatter,
    styles: StyleSheet,
    prettifier: Box<dyn NamePrettifier>,
    resource_usage: Box<dyn ResourceUsage>,
    state: SessionState,
}

impl SessionReporter<'_> {
    /// Replaces the prettifier used for tests without testdox annotations.
    pub fn with_prettifier(mut self, prettifier: Box<dyn NamePrettifier>) -> Self {
        self.prettifier = prettifier;
        self
    }

    /// Replaces the source of the resource usage line printed by
    /// [`finalize`](Self::finalize).
    pub fn with_resource_usage(mut self, resource_usage: Box<dyn ResourceUsage>) -> Self {
        self.resource_usage = resource_usage;
        self
    }

    /// Statistics for the tests that finished so far.
    pub fn stats(&self) -> RunStats {
        self.state.stats
    }

    /// Returns true once [`finalize`](Self::finalize) has been called.
    pub fn is_finalized(&self) -> bool {
        matches!(self.state.phase, Phase::Finalized)
    }

    /// Reports a test event.
    ///
    /// A [`TestEvent::RunFinished`] event finalizes the session.
    pub fn report_event(&mut self, event: &TestEvent) -> Result<(), ReporterError> {
        match event {
            TestEvent::TestStarted { test } => self.start_test(test),
            TestEvent::TestOutcome { outcome, detail } => self.add_outcome(*outcome, detail),
            TestEvent::TestFinished { test, elapsed } => self.end_test(test, *elapsed),
            TestEvent::RunFinished { executed } => self.finalize(*executed).map(|_| ()),
        }
    }

    /// Called when a test starts.
    ///
    /// Tests of an unrecognized kind are ignored.
    pub fn start_test(&mut self, test: &TestIdentity) -> Result<(), ReporterError> {
        if matches!(self.state.phase, Phase::Finalized) {
            return Err(ReporterError::AlreadyFinalized);
        }
        let Some(names) = resolve_names(test, self.prettifier.as_ref()) else {
            debug!(
                "ignoring start of unrecognized test {}::{}",
                test.class, test.name
            );
            return Ok(());
        };

        if let Phase::InTest(pending) = &self.state.phase {
            warn!(
                "test `{}` did not finish before `{}` started, discarding it",
                pending.label(),
                names.label
            );
        }
        debug!("test started: {} / {}", names.group, names.label);
        self.state.phase = Phase::InTest(PendingRecord::new(names.group, names.label));
        Ok(())
    }

    /// Called when the test in progress did not succeed.
    ///
    /// Returns [`ReporterError::PrecedingLifecycle`] if no test is in
    /// progress. Nothing is written in that case.
    pub fn add_outcome(&mut self, kind: FailureKind, detail: &str) -> Result<(), ReporterError> {
        match &mut self.state.phase {
            Phase::InTest(pending) => {
                debug!("test `{}`: {kind}", pending.label());
                pending.fail(kind, detail)?;
                Ok(())
            }
            Phase::Idle => Err(ReporterError::PrecedingLifecycle {
                event: LifecycleEvent::Outcome(kind),
            }),
            Phase::Finalized => Err(ReporterError::AlreadyFinalized),
        }
    }

    /// Called when a test finishes. Writes the test's result.
    ///
    /// Tests of an unrecognized kind are ignored.
    pub fn end_test(&mut self, test: &TestIdentity, elapsed: Duration) -> Result<(), ReporterError> {
        if !test.kind.is_recognized() {
            debug!(
                "ignoring finish of unrecognized test {}::{}",
                test.class, test.name
            );
            return Ok(());
        }

        let pending = match std::mem::take(&mut self.state.phase) {
            Phase::InTest(pending) => pending,
            Phase::Idle => {
                return Err(ReporterError::PrecedingLifecycle {
                    event: LifecycleEvent::Finished,
                });
            }
            Phase::Finalized => {
                self.state.phase = Phase::Finalized;
                return Err(ReporterError::AlreadyFinalized);
            }
        };

        let record = pending.set_runtime(elapsed);
        let text = record.render(
            self.state.previous.as_ref(),
            self.verbose,
            &self.formatter,
            &self.styles,
        );
        self.output.write(&text).map_err(ReporterError::Io)?;

        self.state.stats.on_test_finished(&record);
        if !record.is_successful() {
            self.state.non_successful.push(record.clone());
        }
        self.state.previous = Some(record);
        Ok(())
    }

    /// Ends the session: writes resource usage, the summary of non-successful
    /// tests and a status footer.
    ///
    /// `total_executed` is the number of tests the run executed. Returns the
    /// statistics for the run.
    pub fn finalize(&mut self, total_executed: usize) -> Result<RunStats, ReporterError> {
        match std::mem::replace(&mut self.state.phase, Phase::Finalized) {
            Phase::Idle => {}
            Phase::InTest(pending) => {
                warn!(
                    "run finished while test `{}` was in progress, discarding it",
                    pending.label()
                );
            }
            Phase::Finalized => return Err(ReporterError::AlreadyFinalized),
        }
        debug!(
            "finalizing: {} of {total_executed} tests did not succeed",
            self.state.non_successful.len()
        );

        let mut out = String::new();
        self.write_final(total_executed, &mut out)
            .map_err(ReporterError::Io)?;
        self.output.write(&out).map_err(ReporterError::Io)?;

        Ok(self.state.stats)
    }

    fn write_final(&self, total_executed: usize, out: &mut String) -> io::Result<()> {
        write!(out, "\n{}\n\n", self.resource_usage.describe())?;
        write_summary(
            &self.state.non_successful,
            total_executed,
            self.verbose,
            &self.formatter,
            &self.styles,
            out,
        )?;
        self.state
            .stats
            .write_footer(total_executed, &self.styles, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::{TestKind, TestdoxMetadata},
        resource_usage::FixedResourceUsage,
    };
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn test_in(group: &str, name: &str) -> TestIdentity {
        let mut test = TestIdentity::standard("SomeTest", name);
        test.testdox = TestdoxMetadata {
            group: Some(group.to_owned()),
            label: Some(name.to_owned()),
        };
        test
    }

    fn reporter(out: &mut String) -> SessionReporter<'_> {
        ReporterBuilder::default()
            .build(ReporterOutput::Buffer(out))
            .with_resource_usage(Box::new(FixedResourceUsage("Time: 0.030s".to_owned())))
    }

    #[test]
    fn end_to_end() {
        let mut out = String::new();
        let mut reporter = reporter(&mut out);

        let t1 = test_in("X", "T1");
        let t2 = test_in("X", "T2");
        reporter.start_test(&t1).unwrap();
        reporter.add_outcome(FailureKind::Failure, "boom").unwrap();
        reporter.end_test(&t1, Duration::from_millis(20)).unwrap();
        reporter.start_test(&t2).unwrap();
        reporter.end_test(&t2, Duration::from_millis(10)).unwrap();
        let stats = reporter.finalize(2).unwrap();
        drop(reporter);

        assert_eq!(stats.finished, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(
            out,
            indoc! {"
                X
                 ✘ T1 [20.00 ms]
                   │
                   │ boom

                 ✔ T2 [10.00 ms]

                Time: 0.030s

                Summary of non-successful tests:

                X
                 ✘ T1 [20.00 ms]
                   │
                   │ boom

                FAILURES!
                Tests: 2, Failures: 1.
            "}
        );
    }

    #[test]
    fn outcome_without_start_writes_nothing() {
        let mut out = String::new();
        let mut reporter = reporter(&mut out);

        let error = reporter
            .add_outcome(FailureKind::Error, "stray")
            .unwrap_err();
        assert!(
            matches!(
                error,
                ReporterError::PrecedingLifecycle {
                    event: LifecycleEvent::Outcome(FailureKind::Error)
                }
            ),
            "unexpected error: {error:?}"
        );
        drop(reporter);
        assert_eq!(out, "");
    }

    #[test]
    fn outcome_after_finish_is_rejected() {
        let mut out = String::new();
        let mut reporter = reporter(&mut out);

        let test = test_in("X", "T1");
        reporter.start_test(&test).unwrap();
        reporter.end_test(&test, Duration::ZERO).unwrap();

        let error = reporter
            .add_outcome(FailureKind::Failure, "late")
            .unwrap_err();
        assert!(
            matches!(error, ReporterError::PrecedingLifecycle { .. }),
            "unexpected error: {error:?}"
        );
        let error = reporter.end_test(&test, Duration::ZERO).unwrap_err();
        assert!(
            matches!(
                error,
                ReporterError::PrecedingLifecycle {
                    event: LifecycleEvent::Finished
                }
            ),
            "unexpected error: {error:?}"
        );
    }

    #[test]
    fn second_outcome_is_invalid_state() {
        let mut out = String::new();
        let mut reporter = reporter(&mut out);

        reporter.start_test(&test_in("X", "T1")).unwrap();
        reporter.add_outcome(FailureKind::Risky, "no assertions").unwrap();
        let error = reporter
            .add_outcome(FailureKind::Failure, "boom")
            .unwrap_err();
        assert!(
            matches!(error, ReporterError::InvalidState(_)),
            "unexpected error: {error:?}"
        );
    }

    #[test]
    fn unrecognized_tests_are_ignored() {
        let mut out = String::new();
        let mut reporter = reporter(&mut out);

        let mut bench = TestIdentity::standard("Bench", "run");
        bench.kind = TestKind::Unrecognized;
        reporter.start_test(&bench).unwrap();
        reporter.end_test(&bench, Duration::ZERO).unwrap();
        assert_eq!(reporter.stats(), RunStats::default());

        // An unrecognized finish doesn't end the test in progress.
        let test = test_in("X", "T1");
        reporter.start_test(&test).unwrap();
        reporter.end_test(&bench, Duration::ZERO).unwrap();
        reporter.add_outcome(FailureKind::Skipped, "later").unwrap();
        reporter.end_test(&test, Duration::ZERO).unwrap();
        assert_eq!(reporter.stats().skipped, 1);
    }

    #[test]
    fn events_after_finalize() {
        let mut out = String::new();
        let mut reporter = reporter(&mut out);

        reporter.finalize(0).unwrap();
        assert!(reporter.is_finalized());
        assert!(matches!(
            reporter.finalize(0),
            Err(ReporterError::AlreadyFinalized)
        ));
        assert!(matches!(
            reporter.start_test(&test_in("X", "T1")),
            Err(ReporterError::AlreadyFinalized)
        ));
        assert!(matches!(
            reporter.add_outcome(FailureKind::Error, "late"),
            Err(ReporterError::AlreadyFinalized)
        ));
        assert!(matches!(
            reporter.end_test(&test_in("X", "T1"), Duration::ZERO),
            Err(ReporterError::AlreadyFinalized)
        ));
        drop(reporter);
        assert_eq!(out, "\nTime: 0.030s\n\nOK (0 tests)\n");
    }

    #[test]
    fn report_event_dispatch() {
        let mut out = String::new();
        let mut reporter = reporter(&mut out);

        let events = [
            TestEvent::TestStarted {
                test: TestIdentity::standard("App\\StackTest", "testPushesItems"),
            },
            TestEvent::TestFinished {
                test: TestIdentity::standard("App\\StackTest", "testPushesItems"),
                elapsed: Duration::from_millis(1),
            },
            TestEvent::RunFinished { executed: 1 },
        ];
        for event in &events {
            reporter.report_event(event).unwrap();
        }
        assert!(reporter.is_finalized());
        drop(reporter);

        assert_eq!(
            out,
            indoc! {"
                Stack
                 ✔ Pushes items [1.00 ms]

                Time: 0.030s

                OK (1 test)
            "}
        );
    }

    #[test]
    fn verbose_shows_benign_details() {
        let mut out = String::new();
        let mut reporter = ReporterBuilder::default()
            .set_verbose(true)
            .build(ReporterOutput::Buffer(&mut out))
            .with_resource_usage(Box::new(FixedResourceUsage(String::new())));

        let test = test_in("X", "T1");
        reporter.start_test(&test).unwrap();
        reporter.add_outcome(FailureKind::Incomplete, "todo").unwrap();
        reporter.end_test(&test, Duration::ZERO).unwrap();
        drop(reporter);

        assert_eq!(out, "X\n ∅ T1 [0.00 ms]\n   │\n   │ todo\n\n");
    }
}
