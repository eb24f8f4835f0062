// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display names for groups and tests.
//!
//! A test's group and label come from its testdox annotations when present.
//! Otherwise they're derived from the class and method identifiers by a
//! [`NamePrettifier`], which can be swapped out independently of the
//! reporter.

use crate::{
    events::{TestIdentity, TestKind},
    helpers::capitalize_first,
};
use swrite::{SWrite, swrite};

/// Turns code identifiers into display names.
pub trait NamePrettifier {
    /// Returns the display name for a test class.
    fn prettify_group(&self, class: &str) -> String;

    /// Returns the display name for a test method.
    fn prettify_label(&self, method: &str) -> String;
}

/// The default [`NamePrettifier`].
///
/// * Groups: the last path segment of the class, with a `Test`/`Tests`
///   prefix or suffix removed. `App\Tests\UserRepositoryTest` becomes
///   `UserRepository`.
/// * Labels: the method name without its `test` prefix, split into words.
///   `testParsesHTTPHeaders` becomes `Parses HTTP headers`, and
///   `test_it_works_for_2_users` becomes `It works for 2 users`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPrettifier;

impl NamePrettifier for DefaultPrettifier {
    fn prettify_group(&self, class: &str) -> String {
        let segment = class.rsplit("::").next().unwrap_or(class);
        let segment = segment.rsplit(['\\', '.']).next().unwrap_or(segment);

        let mut title = segment;
        for suffix in ["Tests", "Test"] {
            if let Some(rest) = title.strip_suffix(suffix) {
                title = rest;
                break;
            }
        }
        for prefix in ["Tests", "Test"] {
            if let Some(rest) = title.strip_prefix(prefix) {
                // Don't turn `Testimonial` into `imonial`.
                if rest.starts_with(|c: char| c.is_uppercase() || c == '_') {
                    title = rest;
                }
                break;
            }
        }

        let title = title.trim_matches('_');
        if title.is_empty() {
            segment.to_owned()
        } else {
            title.to_owned()
        }
    }

    fn prettify_label(&self, method: &str) -> String {
        let name = strip_test_prefix(method);

        if name.contains('_') {
            let words: Vec<_> = name.split('_').filter(|word| !word.is_empty()).collect();
            return capitalize_first(&words.join(" "));
        }

        let words: Vec<_> = split_camel_case(name)
            .into_iter()
            .map(|word| {
                if is_acronym(&word) {
                    word
                } else {
                    word.to_lowercase()
                }
            })
            .collect();
        capitalize_first(&words.join(" "))
    }
}

fn strip_test_prefix(method: &str) -> &str {
    if let Some(rest) = method.strip_prefix("test_") {
        if !rest.is_empty() {
            return rest;
        }
    }
    if let Some(rest) = method.strip_prefix("test") {
        if rest.starts_with(|c: char| c.is_uppercase() || c.is_ascii_digit()) {
            return rest;
        }
    }
    method
}

/// Splits at lower-to-upper transitions, at the end of an acronym, and
/// around digit runs.
fn split_camel_case(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (index, &c) in chars.iter().enumerate() {
        if let Some(&prev) = index.checked_sub(1).and_then(|i| chars.get(i)) {
            let next = chars.get(index + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.is_some_and(|next| next.is_lowercase()))
                || prev.is_ascii_digit() != c.is_ascii_digit();
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn is_acronym(word: &str) -> bool {
    word.chars().count() > 1 && word.chars().all(|c| c.is_uppercase())
}

/// The group and label a test is displayed with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisplayNames {
    /// The group header the test is listed under.
    pub group: String,

    /// The test's own display name.
    pub label: String,
}

/// Resolves the display names for a test.
///
/// Returns `None` for [`TestKind::Unrecognized`] tests.
pub fn resolve_names(
    test: &TestIdentity,
    prettifier: &dyn NamePrettifier,
) -> Option<DisplayNames> {
    match test.kind {
        TestKind::Standard => {
            let group = match &test.testdox.group {
                Some(group) => group.clone(),
                None => prettifier.prettify_group(&test.class),
            };
            let mut label = match &test.testdox.label {
                Some(label) => label.clone(),
                None => prettifier.prettify_label(&test.name),
            };
            if let Some(data_set) = &test.data_set {
                swrite!(label, " with {data_set}");
            }
            Some(DisplayNames { group, label })
        }
        TestKind::ScriptBased => Some(DisplayNames {
            group: test.class.clone(),
            label: test.name.clone(),
        }),
        TestKind::Unrecognized => None,
    }
}
