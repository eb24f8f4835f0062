// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for `testdox`: render a stream of test lifecycle events
//! as grouped, human-readable progress output, followed by a summary of the
//! tests that did not succeed.
//!
//! The main entry point is [`reporter::SessionReporter`], constructed via a
//! [`reporter::ReporterBuilder`]. Events are described in [`events`].

pub mod config;
pub mod errors;
pub mod events;
mod helpers;
pub mod naming;
pub mod reporter;
pub mod resource_usage;
pub mod write_str;
