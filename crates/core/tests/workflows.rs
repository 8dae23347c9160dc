//! Tests for workflow inputs, grid layouts and early workflow failures.

mod common;

use argosync_core::context::{ClassPeriodContext, Period, SchoolClass};
use argosync_core::error::ErrorClass;
use argosync_core::records::{ClassAbsences, ClassMarks, OutcomeCode, OutcomeEntry};
use argosync_core::workflows::admissions::{expected_comment, xml_char_refs};
use argosync_core::workflows::marks::SummaryLayout;
use argosync_core::workflows;
use common::FakeBrowser;
use pretty_assertions::assert_eq;

const MARKS_JSON: &str = r#"{
    "class": { "year": "3", "section": "A" },
    "period": "final_session",
    "subjects": [
        {
            "subject": "MATEMATICA",
            "students": [
                { "name": "Bianchi Anna", "birth_date": "03/04/2005", "mark": "7", "absences": "4" },
                { "name": "Città Luca", "birth_date": "11/12/2004", "mark": "N" }
            ]
        }
    ],
    "outcomes": [
        { "name": "Bianchi Anna", "birth_date": "03/04/2005", "average": "7.00", "credit": "9", "outcome": "A", "judgement": "Ammessa all'esame" },
        { "name": "Città Luca", "birth_date": "11/12/2004", "outcome": "SO" }
    ]
}"#;

#[test]
fn test_class_marks_document() {
    let data: ClassMarks = serde_json::from_str(MARKS_JSON).unwrap();
    assert_eq!(data.class.id(), "3A");
    assert_eq!(data.period, Period::FinalSession);
    let luca = &data.subjects[0].students[1];
    assert_eq!(luca.payload.mark, "N");
    assert_eq!(luca.payload.absences, "");
    assert_eq!(luca.canonical_name(), "CITTA' LUCA");
    assert_eq!(data.outcomes[0].payload.outcome, OutcomeCode::Admitted);
    assert_eq!(data.outcomes[1].payload.outcome, OutcomeCode::Suspended);
    assert_eq!(data.outcomes[1].payload.credit, "");
}

#[test]
fn test_class_absences_document() {
    let data: ClassAbsences = serde_json::from_str(
        r#"{
            "class": { "year": "1", "section": "B" },
            "school_year": 2019,
            "months": [
                { "month": 10, "students": [ { "name": "Rossi Mario", "days": [3, 17] } ] }
            ]
        }"#,
    )
    .unwrap();
    let october = data.month(10).unwrap();
    assert!(october.students[0].payload.absent_on(17));
    assert!(!october.students[0].payload.absent_on(18));
    assert!(data.month(11).is_none());
}

#[test]
fn test_outcome_codes_and_labels() {
    assert_eq!(OutcomeCode::Admitted.code(), "A");
    assert_eq!(OutcomeCode::NotAssessed.to_string(), "NS");
    assert_eq!(OutcomeCode::Suspended.label(), "SO - Sospensione del giudizio");
    assert_eq!(OutcomeCode::default(), OutcomeCode::Unset);
}

#[test]
fn test_summary_layout_regular_periods() {
    let layout = SummaryLayout::new(Period::FinalSession, 10);
    assert_eq!(layout.mark_cell(0), 1);
    assert_eq!(layout.absences_cell(0), 2);
    assert_eq!(layout.mark_cell(3), 7);
    assert_eq!(layout.tail_cell(0), 20);
    assert_eq!(layout.tail_cell(4), 24);
    assert_eq!(SummaryLayout::new(Period::FirstTerm, 10), layout);
}

#[test]
fn test_summary_layout_resumption() {
    let layout = SummaryLayout::new(Period::SuspendedResumption, 4);
    assert_eq!(layout.mark_cell(0), 2);
    assert_eq!(layout.absences_cell(0), 3);
    assert_eq!(layout.mark_cell(1), 5);
    assert_eq!(layout.tail_cell(0), 12);
}

#[test]
fn test_xml_char_refs() {
    assert_eq!(xml_char_refs("Ammessa all'esame"), "Ammessa all'esame");
    assert_eq!(xml_char_refs("Città è"), "Citt&#224; &#232;");
    assert_eq!(xml_char_refs("€"), "&#8364;");
}

#[test]
fn test_comment_only_for_admitted() {
    let admitted = OutcomeEntry {
        outcome: OutcomeCode::Admitted,
        judgement: "Ottimo".to_string(),
        ..OutcomeEntry::default()
    };
    let suspended = OutcomeEntry {
        outcome: OutcomeCode::Suspended,
        judgement: "Ottimo".to_string(),
        ..OutcomeEntry::default()
    };
    assert_eq!(expected_comment(&admitted), "Ottimo");
    assert_eq!(expected_comment(&suspended), "");
}

#[test]
fn test_verify_without_outcomes_fails_before_login() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    let mut session = common::session(&browser, dir.path());
    let mut data: ClassMarks = serde_json::from_str(MARKS_JSON).unwrap();
    data.outcomes.clear();
    let context = ClassPeriodContext::new(data.class.clone(), data.period);

    let err = workflows::verify_marks(&mut session, &context, &data).unwrap_err();
    assert_eq!(err.to_string(), "verify error class 3A");
    assert_eq!(err.class, ErrorClass::Unanticipated);
    assert!(browser.actions().is_empty());
}

#[test]
fn test_data_for_another_class_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    let mut session = common::session(&browser, dir.path());
    let data: ClassMarks = serde_json::from_str(MARKS_JSON).unwrap();
    let context = ClassPeriodContext::new(SchoolClass::new("3", "B"), Period::FinalSession);

    let err = workflows::import_marks(&mut session, &context, &data).unwrap_err();
    assert_eq!(err.to_string(), "import error class 3B");
    assert!(browser.actions().is_empty());
}

#[test]
fn test_import_fails_cleanly_when_portal_is_down() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    let mut session = common::session(&browser, dir.path());
    let data: ClassMarks = serde_json::from_str(MARKS_JSON).unwrap();
    let context = ClassPeriodContext::new(data.class.clone(), data.period);

    let err = workflows::import_marks(&mut session, &context, &data).unwrap_err();
    assert_eq!(err.class, ErrorClass::Timeout);
    assert_eq!(err.to_string(), "import error class 3A");
}
