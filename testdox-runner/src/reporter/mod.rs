// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Render test results as grouped, human-readable output.
//!
//! The main type here is [`SessionReporter`], which is constructed via a
//! [`ReporterBuilder`].

mod formatter;
mod grouping;
mod imp;
mod record;
mod stats;
mod summary;

pub use formatter::{
    ColorName, Colorize, Glyph, NoColor, OutcomeFormatter, ResultLine, SKIP_SYMBOL, StyleSheet,
};
pub use grouping::needs_group_header;
pub use imp::*;
pub use record::{PendingRecord, ResultRecord};
pub use stats::RunStats;
pub use summary::{SUMMARY_NOISE_RATIO, should_summarize};
