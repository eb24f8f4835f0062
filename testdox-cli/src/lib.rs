// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Render a stream of test lifecycle events as testdox-style progress output.
//!
//! The `testdox` binary reads events as JSON lines from a file or standard
//! input and prints each finished test as it arrives, grouped by test class,
//! followed by a summary of the tests that did not succeed. The rendering
//! itself lives in [`testdox_runner`].

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputWriter;
