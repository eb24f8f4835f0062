// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The summary of non-successful tests printed at the end of a run.

use super::{
    formatter::{ColorName, Colorize, OutcomeFormatter, SKIP_SYMBOL},
    record::ResultRecord,
};
use crate::{events::Outcome, write_str::WriteStr};
use std::io;

/// If at least this fraction of executed tests did not succeed, the summary
/// is not printed: a near-total failure report isn't actionable.
pub const SUMMARY_NOISE_RATIO: f64 = 0.7;

/// Returns true if a summary should be printed for `non_successful` out of
/// `total_executed` tests.
pub fn should_summarize(non_successful: usize, total_executed: usize) -> bool {
    if non_successful == 0 {
        return false;
    }
    // With no executed tests the ratio is infinite, which suppresses the
    // summary as well.
    (non_successful as f64 / total_executed as f64) < SUMMARY_NOISE_RATIO
}

/// Replays non-successful records, in arrival order, as a summary.
///
/// Group headers are computed against the records shown in the summary, not
/// against the live output. Skipped tests are not listed individually: they
/// are collapsed into a single count at the end.
pub(super) fn write_summary(
    records: &[ResultRecord],
    total_executed: usize,
    verbose: bool,
    formatter: &OutcomeFormatter,
    colorize: &dyn Colorize,
    writer: &mut dyn WriteStr,
) -> io::Result<()> {
    if !should_summarize(records.len(), total_executed) {
        return Ok(());
    }

    write!(
        writer,
        "{}\n\n",
        colorize.colorize(ColorName::FgYellow, "Summary of non-successful tests:")
    )?;

    let mut previous = None;
    let mut skipped = 0;
    for record in records {
        if record.outcome() == Outcome::Skipped {
            skipped += 1;
            continue;
        }
        writer.write_str(&record.render(previous, verbose, formatter, colorize))?;
        previous = Some(record);
    }

    if skipped > 0 {
        let line = format!("{SKIP_SYMBOL} Skipped Tests: {skipped}");
        write!(
            writer,
            "\n{}\n\n",
            colorize.colorize(ColorName::FgYellow, &line)
        )?;
    }

    Ok(())
}
