// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Symbols, colors and the text of a single result line.

use crate::{config::RuntimeThresholds, events::Outcome};
use owo_colors::{OwoColorize, Style};
use std::time::Duration;
use swrite::{SWrite, swrite};

/// The symbol shown for skipped tests.
pub const SKIP_SYMBOL: &str = "→";

/// The gutter drawn to the left of failure details.
const DETAIL_GUTTER: &str = "   │";

/// A named color a [`Colorize`] implementation knows how to apply.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ColorName {
    /// Red foreground.
    FgRed,
    /// Yellow foreground.
    FgYellow,
    /// Green foreground.
    FgGreen,
    /// Underlined text, used for group headers.
    Underlined,
}

/// Applies colors to text.
///
/// Implementations must be pure: the same inputs always produce the same
/// output.
pub trait Colorize {
    /// Returns `text` wrapped in the escape codes for `color`, or unchanged if
    /// colors are disabled.
    fn colorize(&self, color: ColorName, text: &str) -> String;
}

/// Leaves text unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoColor;

impl Colorize for NoColor {
    fn colorize(&self, _color: ColorName, text: &str) -> String {
        text.to_owned()
    }
}

/// A [`Colorize`] implementation backed by terminal styles.
///
/// The default stylesheet applies no styling. Whether to colorize is decided
/// by the caller, typically from a `--color` option and terminal detection.
#[derive(Clone, Debug, Default)]
pub struct StyleSheet {
    is_colorized: bool,
    red: Style,
    yellow: Style,
    green: Style,
    underlined: Style,
}

impl StyleSheet {
    /// Creates a stylesheet, colorized if `should_colorize` is true.
    pub fn new(should_colorize: bool) -> Self {
        let mut styles = Self::default();
        if should_colorize {
            styles.use_colors();
        }
        styles
    }

    /// Returns true if this stylesheet produces escape codes.
    pub fn is_colorized(&self) -> bool {
        self.is_colorized
    }

    fn use_colors(&mut self) {
        self.is_colorized = true;
        self.red = Style::new().red();
        self.yellow = Style::new().yellow();
        self.green = Style::new().green();
        self.underlined = Style::new().underline();
    }
}

impl Colorize for StyleSheet {
    fn colorize(&self, color: ColorName, text: &str) -> String {
        if !self.is_colorized {
            return text.to_owned();
        }
        let style = match color {
            ColorName::FgRed => self.red,
            ColorName::FgYellow => self.yellow,
            ColorName::FgGreen => self.green,
            ColorName::Underlined => self.underlined,
        };
        text.style(style).to_string()
    }
}

/// The symbol and color an outcome is displayed with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Glyph {
    /// The symbol.
    pub symbol: &'static str,
    /// The color of the symbol.
    pub color: ColorName,
}

impl Glyph {
    /// Returns the glyph for an outcome.
    pub fn for_outcome(outcome: Outcome) -> Self {
        let (symbol, color) = match outcome {
            Outcome::Success => ("✔", ColorName::FgGreen),
            Outcome::Failure => ("✘", ColorName::FgRed),
            Outcome::Error | Outcome::Warning => ("✘", ColorName::FgYellow),
            Outcome::Incomplete => ("∅", ColorName::FgYellow),
            Outcome::Risky => ("☢", ColorName::FgYellow),
            Outcome::Skipped => (SKIP_SYMBOL, ColorName::FgYellow),
        };
        Self { symbol, color }
    }

    fn render(self, colorize: &dyn Colorize) -> String {
        colorize.colorize(self.color, self.symbol)
    }
}

/// The data a result line is rendered from.
#[derive(Clone, Copy, Debug)]
pub struct ResultLine<'a> {
    /// The outcome of the test.
    pub outcome: Outcome,
    /// The display name of the test.
    pub label: &'a str,
    /// How long the test took.
    pub elapsed: Duration,
    /// Failure details, present for non-successful outcomes.
    pub detail: Option<&'a str>,
}

/// Renders result lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutcomeFormatter {
    thresholds: RuntimeThresholds,
}

impl OutcomeFormatter {
    /// Creates a formatter that highlights runtimes above the given
    /// thresholds.
    pub fn new(thresholds: RuntimeThresholds) -> Self {
        Self { thresholds }
    }

    /// Renders a result line, followed by its details if they're shown.
    ///
    /// Details of errors, failures and warnings are always shown. Details of
    /// incomplete, risky and skipped tests are only shown if `verbose` is
    /// true.
    pub fn render(&self, line: &ResultLine<'_>, verbose: bool, colorize: &dyn Colorize) -> String {
        let mut out = format!(
            " {} {} {}\n",
            Glyph::for_outcome(line.outcome).render(colorize),
            line.label,
            self.render_runtime(line.elapsed, colorize),
        );

        let detail = line
            .detail
            .filter(|detail| !detail.trim().is_empty())
            .filter(|_| verbose || !line.outcome.is_benign());
        if let Some(detail) = detail {
            write_detail(detail, &mut out);
        }

        out
    }

    fn render_runtime(&self, elapsed: Duration, colorize: &dyn Colorize) -> String {
        let runtime = format!("[{:.2} ms]", elapsed.as_secs_f64() * 1000.0);
        if elapsed > self.thresholds.very_slow {
            colorize.colorize(ColorName::FgRed, &runtime)
        } else if elapsed > self.thresholds.slow {
            colorize.colorize(ColorName::FgYellow, &runtime)
        } else {
            runtime
        }
    }
}

fn write_detail(detail: &str, out: &mut String) {
    swrite!(out, "{DETAIL_GUTTER}\n");
    for line in detail.trim_end().lines() {
        if line.is_empty() {
            swrite!(out, "{DETAIL_GUTTER}\n");
        } else {
            swrite!(out, "{DETAIL_GUTTER} {line}\n");
        }
    }
    out.push('\n');
}
