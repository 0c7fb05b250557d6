// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Phone number normalization.
//!
//! DMCC phone fields are free text. Normalization is best effort: anything
//! that looks like a North American number becomes `AAA-EEE-NNNN`, and
//! anything else falls back to a default.

use regex::Regex;
use std::sync::LazyLock;

/// Phone number used when none can be extracted.
pub const DEFAULT_PHONE: &str = "555-555-5555";

// Area code, exchange, and line number separated by any run of non-digits,
// followed by an optional extension that runs to the end of the input.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{3})[^0-9]*([0-9]{3})[^0-9]*([0-9]{4})[^0-9]*([0-9]*)$")
        .expect("phone pattern is valid")
});

/// Extract phone number from free text in `AAA-EEE-NNNN` form.
///
/// Extensions are dropped. Returns [`None`] if no ten digit run can be found.
pub fn extract_phone(text: &str) -> Option<String> {
    let captures = PHONE_PATTERN.captures(text)?;
    Some(format!(
        "{}-{}-{}",
        &captures[1], &captures[2], &captures[3]
    ))
}

/// Normalize phone number, or use fallback.
pub fn normalize_phone(text: Option<&str>, fallback: &str) -> String {
    text.filter(|text| !text.is_empty())
        .and_then(extract_phone)
        .unwrap_or_else(|| fallback.to_string())
}
