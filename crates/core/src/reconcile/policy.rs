//! Field-level rules applied while reconciling a row.

use crate::canon;
use crate::error::{AutomationError, Result};
use crate::records::NOT_ASSESSED;

/// What to do with a mark input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkInput {
    Write,
    /// Left untouched: the student is exempt from the subject.
    Exempt,
}

/// Decide how to treat a student's mark input.
///
/// Only religion may render a disabled input, meaning the student opted out;
/// a mark supplied for such a student is a data error.
pub fn mark_input(subject: &str, input_enabled: bool, student: &str, mark: &str) -> Result<MarkInput> {
    if input_enabled {
        return Ok(MarkInput::Write);
    }
    if !canon::is_religion(subject) {
        return Err(AutomationError::not_found(format!(
            "disabled mark input in subject \"{}\"",
            subject
        )));
    }
    if !mark.trim().is_empty() {
        return Err(AutomationError::not_found(format!(
            "religion mark supplied for exempt student \"{}\"",
            student
        )));
    }
    Ok(MarkInput::Exempt)
}

/// Absence count with a blank cell read as zero.
pub fn coerce_count(text: &str) -> Result<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .map_err(|_| AutomationError::other(format!("not a count: \"{}\"", text)))
}

pub fn counts_match(rendered: &str, expected: &str) -> Result<bool> {
    Ok(coerce_count(rendered)? == coerce_count(expected)?)
}

/// Decimal with either separator; blank reads as zero.
pub fn parse_decimal(text: &str) -> Result<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0.0);
    }
    text.replace(',', ".")
        .parse()
        .map_err(|_| AutomationError::other(format!("not a number: \"{}\"", text)))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Number of subjects, religion aside, marked as not assessed.
pub fn excluded_subjects<'a, I>(marks: I) -> usize
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    marks
        .into_iter()
        .filter(|(subject, mark)| *mark == NOT_ASSESSED && !canon::is_religion(subject))
        .count()
}

/// Average recomputed without the not-assessed subjects.
///
/// `subject_count` includes religion, which never weighs on the average.
pub fn derated_average(raw: f64, subject_count: usize, excluded: usize) -> f64 {
    if excluded == 0 || subject_count < 2 {
        return raw;
    }
    let weighed = subject_count.saturating_sub(1 + excluded) as f64;
    round2((raw * weighed).round() / (subject_count - 1) as f64)
}

/// Numeric average check; a blank expectation means zero.
pub fn average_matches(observed: f64, expected: &str) -> Result<bool> {
    let expected = parse_decimal(expected)?;
    Ok((observed - expected).abs() < 1e-9)
}

/// Textual average check for grids that print averages verbatim; a blank
/// expectation matches the literal `0.00`.
pub fn text_average_matches(observed: &str, expected: &str) -> bool {
    let observed = observed.trim();
    let expected = expected.trim();
    observed == expected || (expected.is_empty() && observed == "0.00")
}

/// Credit check; a blank expectation means zero.
pub fn credit_matches(observed: &str, expected: &str) -> Result<bool> {
    Ok(coerce_count(observed)? == coerce_count(expected)?)
}
