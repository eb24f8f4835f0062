// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run statistics and the final status footer.

use super::{
    formatter::{ColorName, Colorize},
    record::ResultRecord,
};
use crate::{events::Outcome, helpers::plural, write_str::WriteStr};
use std::io;
use swrite::{SWrite, swrite};

/// Counts of finished tests by outcome.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// The number of tests that finished.
    pub finished: usize,
    /// The number of tests that passed.
    pub passed: usize,
    /// The number of tests that errored.
    pub errors: usize,
    /// The number of tests with a failed assertion.
    pub failures: usize,
    /// The number of tests that produced a warning.
    pub warnings: usize,
    /// The number of incomplete tests.
    pub incomplete: usize,
    /// The number of risky tests.
    pub risky: usize,
    /// The number of skipped tests.
    pub skipped: usize,
}

impl RunStats {
    /// Records a finished test.
    pub fn on_test_finished(&mut self, record: &ResultRecord) {
        self.finished += 1;
        match record.outcome() {
            Outcome::Success => self.passed += 1,
            Outcome::Error => self.errors += 1,
            Outcome::Failure => self.failures += 1,
            Outcome::Warning => self.warnings += 1,
            Outcome::Incomplete => self.incomplete += 1,
            Outcome::Risky => self.risky += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    /// Returns true if any test errored, failed or produced a warning.
    pub fn has_hard_failures(&self) -> bool {
        self.errors > 0 || self.failures > 0 || self.warnings > 0
    }

    /// The number of tests that did not succeed.
    pub fn non_successful(&self) -> usize {
        self.finished - self.passed
    }

    /// Writes the footer for a run in which `total_executed` tests ran.
    pub(super) fn write_footer(
        &self,
        total_executed: usize,
        colorize: &dyn Colorize,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        if self.non_successful() == 0 {
            let ok = format!(
                "OK ({} {})",
                total_executed,
                plural::tests_str(total_executed)
            );
            return writeln!(writer, "{}", colorize.colorize(ColorName::FgGreen, &ok));
        }

        let (heading, color) = if self.errors > 0 {
            ("ERRORS!", ColorName::FgRed)
        } else if self.failures > 0 {
            ("FAILURES!", ColorName::FgRed)
        } else if self.warnings > 0 {
            ("WARNINGS!", ColorName::FgRed)
        } else {
            (
                "OK, but incomplete, skipped, or risky tests!",
                ColorName::FgYellow,
            )
        };

        writeln!(writer, "{}", colorize.colorize(color, heading))?;
        writeln!(
            writer,
            "{}",
            colorize.colorize(color, &self.counts_line(total_executed))
        )
    }

    fn counts_line(&self, total_executed: usize) -> String {
        let mut line = format!("Tests: {total_executed}");
        let counts = [
            ("Errors", self.errors),
            ("Failures", self.failures),
            ("Warnings", self.warnings),
            ("Skipped", self.skipped),
            ("Incomplete", self.incomplete),
            ("Risky", self.risky),
        ];
        for (name, count) in counts {
            if count > 0 {
                swrite!(line, ", {name}: {count}");
            }
        }
        line.push('.');
        line
    }
}
