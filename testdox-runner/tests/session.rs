// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for a reporting session, driven through the public API.

use indoc::indoc;
use pretty_assertions::assert_eq;
use testdox_runner::{
    errors::ReporterError,
    events::TestEvent,
    naming::NamePrettifier,
    reporter::{ReporterBuilder, ReporterOutput, RunStats},
    resource_usage::FixedResourceUsage,
};

fn parse_events(input: &str) -> Vec<TestEvent> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("event fixture is valid"))
        .collect()
}

fn run(input: &str, verbose: bool) -> (String, Result<RunStats, ReporterError>) {
    let mut out = String::new();
    let mut reporter = ReporterBuilder::default()
        .set_verbose(verbose)
        .build(ReporterOutput::Buffer(&mut out))
        .with_resource_usage(Box::new(FixedResourceUsage(
            "Time: 1.500s, Memory: 12.0 MiB".to_owned(),
        )));

    let mut result = Ok(RunStats::default());
    for event in parse_events(input) {
        if let Err(error) = reporter.report_event(&event) {
            result = Err(error);
            break;
        }
    }
    if result.is_ok() {
        result = Ok(reporter.stats());
    }
    drop(reporter);
    (out, result)
}

const MIXED_RUN: &str = indoc! {r#"
    {"event": "test-started", "test": {"class": "App\\CartTest", "name": "testAddsItems"}}
    {"event": "test-finished", "elapsed": 0.002, "test": {"class": "App\\CartTest", "name": "testAddsItems"}}
    {"event": "test-started", "test": {"class": "App\\CartTest", "name": "testAppliesDiscount"}}
    {"event": "test-outcome", "outcome": "failure", "detail": "Failed asserting that 90 equals 85."}
    {"event": "test-finished", "elapsed": 0.004, "test": {"class": "App\\CartTest", "name": "testAppliesDiscount"}}

    {"event": "test-started", "test": {"kind": "benchmark", "class": "CartBench", "name": "add"}}
    {"event": "test-finished", "elapsed": 1.0, "test": {"kind": "benchmark", "class": "CartBench", "name": "add"}}

    {"event": "test-started", "test": {"class": "App\\MailerTest", "name": "test_sends_mail", "testdox": {"group": "The mailer"}}}
    {"event": "test-outcome", "outcome": "skipped", "detail": "SMTP server unavailable"}
    {"event": "test-finished", "elapsed": 0.0, "test": {"class": "App\\MailerTest", "name": "test_sends_mail"}}
    {"event": "test-started", "test": {"class": "App\\CartTest", "name": "testRemovesItems", "data-set": {"index": 1}}}
    {"event": "test-finished", "elapsed": 0.001, "test": {"class": "App\\CartTest", "name": "testRemovesItems"}}
    {"event": "test-started", "test": {"kind": "script-based", "class": "tests/cli/help.phpt", "name": "help output"}}
    {"event": "test-finished", "elapsed": 0.030, "test": {"kind": "script-based", "class": "tests/cli/help.phpt", "name": "help output"}}
    {"event": "run-finished", "executed": 5}
"#};

#[test]
fn mixed_run() {
    let (out, result) = run(MIXED_RUN, false);
    let stats = result.unwrap();

    assert_eq!(stats.finished, 5);
    assert_eq!(stats.passed, 3);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.skipped, 1);
    assert!(stats.has_hard_failures());

    assert_eq!(
        out,
        indoc! {"
            Cart
             ✔ Adds items [2.00 ms]
             ✘ Applies discount [4.00 ms]
               │
               │ Failed asserting that 90 equals 85.


            The mailer
             → Sends mail [0.00 ms]

            Cart
             ✔ Removes items with data set #1 [1.00 ms]

            tests/cli/help.phpt
             ✔ help output [30.00 ms]

            Time: 1.500s, Memory: 12.0 MiB

            Summary of non-successful tests:

            Cart
             ✘ Applies discount [4.00 ms]
               │
               │ Failed asserting that 90 equals 85.


            → Skipped Tests: 1

            FAILURES!
            Tests: 5, Failures: 1, Skipped: 1.
        "}
    );
}

#[test]
fn verbose_run_shows_skip_reasons() {
    let (out, result) = run(MIXED_RUN, true);
    result.unwrap();
    assert!(
        out.contains(" → Sends mail [0.00 ms]\n   │\n   │ SMTP server unavailable\n"),
        "skip reason shown in verbose mode:\n{out}"
    );
}

#[test]
fn noisy_run_has_no_summary() {
    let (out, result) = run(
        indoc! {r#"
            {"event": "test-started", "test": {"class": "ATest", "name": "testOne"}}
            {"event": "test-outcome", "outcome": "error", "detail": "RuntimeException"}
            {"event": "test-finished", "elapsed": 0.001, "test": {"class": "ATest", "name": "testOne"}}
            {"event": "test-started", "test": {"class": "ATest", "name": "testTwo"}}
            {"event": "test-outcome", "outcome": "warning", "detail": "deprecated call"}
            {"event": "test-finished", "elapsed": 0.001, "test": {"class": "ATest", "name": "testTwo"}}
            {"event": "test-started", "test": {"class": "ATest", "name": "testThree"}}
            {"event": "test-outcome", "outcome": "failure", "detail": "1 !== 2"}
            {"event": "test-finished", "elapsed": 0.001, "test": {"class": "ATest", "name": "testThree"}}
            {"event": "test-started", "test": {"class": "ATest", "name": "testFour"}}
            {"event": "test-finished", "elapsed": 0.001, "test": {"class": "ATest", "name": "testFour"}}
            {"event": "run-finished", "executed": 4}
        "#},
        false,
    );
    let stats = result.unwrap();
    // 3 of 4 tests did not succeed, which is above the noise ratio.
    assert_eq!(stats.non_successful(), 3);
    assert!(!out.contains("Summary of non-successful tests:"), "{out}");
    assert!(
        out.ends_with("ERRORS!\nTests: 4, Errors: 1, Failures: 1, Warnings: 1.\n"),
        "{out}"
    );
}

#[test]
fn protocol_violation_aborts() {
    let (out, result) = run(
        indoc! {r#"
            {"event": "test-outcome", "outcome": "failure", "detail": "orphan"}
            {"event": "run-finished", "executed": 0}
        "#},
        false,
    );
    let error = result.unwrap_err();
    assert!(
        matches!(error, ReporterError::PrecedingLifecycle { .. }),
        "unexpected error: {error:?}"
    );
    assert_eq!(
        error.to_string(),
        "failure outcome event received without a preceding test start"
    );
    assert_eq!(out, "");
}

struct ShoutingPrettifier;

impl NamePrettifier for ShoutingPrettifier {
    fn prettify_group(&self, class: &str) -> String {
        class.to_uppercase()
    }

    fn prettify_label(&self, method: &str) -> String {
        method.to_uppercase()
    }
}

#[test]
fn custom_prettifier() {
    let mut out = String::new();
    let mut reporter = ReporterBuilder::default()
        .build(ReporterOutput::Buffer(&mut out))
        .with_prettifier(Box::new(ShoutingPrettifier));

    let events = parse_events(indoc! {r#"
        {"event": "test-started", "test": {"class": "Queue", "name": "pop", "testdox": {"label": "pops the head"}}}
        {"event": "test-finished", "elapsed": 0.001, "test": {"class": "Queue", "name": "pop"}}
    "#});
    for event in &events {
        reporter.report_event(event).unwrap();
    }
    drop(reporter);

    assert_eq!(out, "QUEUE\n ✔ pops the head [1.00 ms]\n");
}
