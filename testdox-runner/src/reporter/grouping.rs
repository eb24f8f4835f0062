// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decides where group headers go.
//!
//! A header is printed once per contiguous run of records in the same group,
//! not once per group: for groups `A, B, A` the `A` header appears twice.

use super::{
    formatter::{ColorName, Colorize},
    record::ResultRecord,
};
use swrite::{SWrite, swrite};

/// Returns true if a group header must be printed before `current`.
pub fn needs_group_header(previous: Option<&ResultRecord>, current: &ResultRecord) -> bool {
    previous.is_none_or(|previous| previous.group() != current.group())
}

/// Writes the group header for `current` to `out`, if one is needed.
///
/// Headers after the first are separated from the previous group by a blank
/// line.
pub(super) fn write_group_header(
    previous: Option<&ResultRecord>,
    current: &ResultRecord,
    colorize: &dyn Colorize,
    out: &mut String,
) {
    if !needs_group_header(previous, current) {
        return;
    }
    if previous.is_some() {
        out.push('\n');
    }
    swrite!(
        out,
        "{}\n",
        colorize.colorize(ColorName::Underlined, current.group())
    );
}
