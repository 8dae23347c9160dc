//! Admission comments driven through a scripted legacy comment list.

mod common;

use argosync_core::browser::ElementRef;
use argosync_core::contract;
use argosync_core::error::ErrorClass;
use argosync_core::records::ClassAdmissions;
use argosync_core::workflows;
use common::FakeBrowser;
use pretty_assertions::assert_eq;

const CLASS_5B: &str = r#"{
    "class": { "year": "5", "section": "B" },
    "students": [
        { "name": "Bianchi Anna", "outcome": "A", "judgement": "Ammessa, è meritevole" },
        { "name": "Città Luca", "outcome": "SO", "judgement": "Non ammesso" }
    ]
}"#;

/// Comment list of 5B: Bianchi, a withdrawn Verdi, then Città. Opening a
/// student shows the text in `stored`.
fn comment_list(browser: &FakeBrowser, stored: [&str; 2]) {
    common::portal(browser, contract::LEGACY_VERSION_ELEMENT, "Versione 2.2.0");
    browser.add(contract::toolbar_button(contract::LEGACY_COMMENTS_TOOL), "comments-tool");
    browser.add(contract::legacy_class_search(), "class-search");
    common::class_list(browser, "5", "B");
    browser.add(contract::form_button(contract::LEGACY_CLASS_FORM, contract::CONFIRM), "class-ok");
    browser.add(contract::legacy_panel_choice(), "panel-choice");
    browser.add(contract::combobox_button(contract::LEGACY_PANEL_COMBO), "panel-combo");
    browser.add(contract::dropdown_option(contract::ADMISSION_PANEL), "panel-option");
    browser.add(contract::combobox_button(contract::LEGACY_PERIOD_COMBO), "period-combo");
    browser.add(contract::dropdown_option(contract::ADMISSION_PERIOD), "period-option");
    browser.add(contract::form_button(contract::LEGACY_PANEL_FORM, contract::CONFIRM), "panel-ok");
    browser.add(contract::comment_list(), "comment-list");

    let text = browser.add(contract::comment_text(), "comment");
    let rows = [("BIANCHI", "ANNA", false), ("VERDI", "UGO", true), ("CITTA'", "LUCA", false)];
    let mut shown = stored.iter();
    for (i, (surname, first, withdrawn)) in rows.iter().enumerate() {
        let row = browser.add_text(contract::comment_row_surname(i), &format!("surname-{}", i), surname);
        browser.add_text(contract::comment_row_first_name(i), &format!("first-{}", i), first);
        if *withdrawn {
            browser.add(contract::comment_row_withdrawn(i), &format!("withdrawn-{}", i));
            continue;
        }
        browser.add(
            contract::comment_student_title(&format!("{} {}", surname, first)),
            &format!("title-{}", i),
        );
        if let Some(comment) = shown.next() {
            browser.on_click_show(&row, &text, comment);
        }
    }
    browser.add(contract::comment_modify(), "modify");
    browser.add(contract::comment_edit(), "edit");
    browser.add(contract::comment_save(), "comment-save");
    browser.add(contract::comment_close(), "comment-close");
    browser.add(contract::comment_list_close(), "list-close");
    browser.add(contract::status_bar_user("docente"), "status-user");
}

#[test]
fn test_import_writes_char_refs_for_admitted_only() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    comment_list(&browser, ["", ""]);
    let data: ClassAdmissions = serde_json::from_str(CLASS_5B).unwrap();
    let mut session = common::session(&browser, dir.path());

    workflows::import_admission_comments(&mut session, &data).unwrap();

    let actions = browser.actions();
    let typed: Vec<&str> = actions
        .iter()
        .map(String::as_str)
        .filter(|a| a.starts_with("keys comment "))
        .collect();
    assert_eq!(typed, vec!["keys comment Ammessa, &#232; meritevole"]);
    assert_eq!(actions.iter().filter(|a| *a == "clear comment").count(), 2);
    assert_eq!(actions.iter().filter(|a| *a == "click comment-save").count(), 2);
    assert!(!actions.contains(&"click surname-1".to_string()));
    assert_eq!(actions.last(), Some(&"click portal".to_string()));
}

#[test]
fn test_verify_compares_stored_comments() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    comment_list(&browser, ["Ammessa, è meritevole", ""]);
    let data: ClassAdmissions = serde_json::from_str(CLASS_5B).unwrap();
    let mut session = common::session(&browser, dir.path());

    workflows::verify_admission_comments(&mut session, &data).unwrap();
    assert!(!browser.actions().contains(&"click comment-save".to_string()));
}

#[test]
fn test_verify_flags_comment_on_non_admitted_student() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    comment_list(&browser, ["Ammessa, è meritevole", "Non ammesso"]);
    let data: ClassAdmissions = serde_json::from_str(CLASS_5B).unwrap();
    let mut session = common::session(&browser, dir.path());

    let err = workflows::verify_admission_comments(&mut session, &data).unwrap_err();
    assert_eq!(err.to_string(), "verify error class 5B");
    assert_eq!(err.class, ErrorClass::NotFound);
    assert!(!browser.actions().contains(&"click list-close".to_string()));
}

#[test]
fn test_missing_student_stops_the_walk() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    comment_list(&browser, ["", ""]);
    browser.set_text(&ElementRef("surname-2".to_string()), "NERI");
    let data: ClassAdmissions = serde_json::from_str(CLASS_5B).unwrap();
    let mut session = common::session(&browser, dir.path());

    let err = workflows::import_admission_comments(&mut session, &data).unwrap_err();
    assert_eq!(err.class, ErrorClass::NotFound);
    assert!(!browser.actions().contains(&"click surname-2".to_string()));
}
