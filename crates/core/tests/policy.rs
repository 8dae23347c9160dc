//! Tests for field-level reconciliation rules.

use argosync_core::canon::RELIGION;
use argosync_core::reconcile::policy::{self, MarkInput};
use pretty_assertions::assert_eq;

#[test]
fn test_derated_average() {
    let recomputed = policy::derated_average(7.00, 5, 1);
    assert_eq!(recomputed, 5.25);
    assert!(policy::average_matches(recomputed, "5.25").unwrap());
    assert!(policy::average_matches(recomputed, "5,25").unwrap());
    assert!(!policy::average_matches(recomputed, "7.00").unwrap());
}

#[test]
fn test_derating_is_identity_without_exclusions() {
    assert_eq!(policy::derated_average(6.83, 12, 0), 6.83);
}

#[test]
fn test_rounding_half_away_from_zero() {
    assert_eq!(policy::round2(0.125), 0.13);
    assert_eq!(policy::round2(-0.125), -0.13);
    assert_eq!(policy::round2(1.0049), 1.0);
}

#[test]
fn test_excluded_subjects_ignore_religion() {
    let marks = [("MATEMATICA", "N"), (RELIGION, "N"), ("STORIA", "7"), ("FISICA", "N")];
    assert_eq!(policy::excluded_subjects(marks), 2);
}

#[test]
fn test_blank_absences_read_as_zero() {
    assert!(policy::counts_match("", "").unwrap());
    assert!(policy::counts_match("", "0").unwrap());
    assert!(policy::counts_match(" ", "0").unwrap());
    assert!(!policy::counts_match("", "1").unwrap());
    assert!(policy::counts_match("12", "12").unwrap());
    assert!(policy::counts_match("x", "0").is_err());
}

#[test]
fn test_credit_blank_is_zero() {
    assert!(policy::credit_matches("0", "").unwrap());
    assert!(policy::credit_matches("", "").unwrap());
    assert!(!policy::credit_matches("9", "10").unwrap());
}

#[test]
fn test_text_average() {
    assert!(policy::text_average_matches("7.25", "7.25"));
    assert!(policy::text_average_matches("0.00", ""));
    assert!(!policy::text_average_matches("7.2", "7.25"));
}

#[test]
fn test_decimal_accepts_comma() {
    assert_eq!(policy::parse_decimal("7,5").unwrap(), 7.5);
    assert_eq!(policy::parse_decimal("").unwrap(), 0.0);
    assert!(policy::parse_decimal("sette").is_err());
}

#[test]
fn test_enabled_input_is_written() {
    assert_eq!(policy::mark_input("STORIA", true, "Rossi", "7").unwrap(), MarkInput::Write);
    assert_eq!(policy::mark_input(RELIGION, true, "Rossi", "").unwrap(), MarkInput::Write);
}

#[test]
fn test_religion_exemption() {
    assert_eq!(policy::mark_input(RELIGION, false, "Rossi", "").unwrap(), MarkInput::Exempt);
    let err = policy::mark_input(RELIGION, false, "Rossi", "8").unwrap_err();
    assert!(err.to_string().contains("Rossi"), "{}", err);
}

#[test]
fn test_disabled_input_outside_religion_fails() {
    let err = policy::mark_input("STORIA", false, "Rossi", "").unwrap_err();
    assert!(err.to_string().contains("STORIA"), "{}", err);
}
