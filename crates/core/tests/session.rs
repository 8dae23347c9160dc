//! Tests for the session lifecycle, navigation and error classification.

mod common;

use argosync_core::browser::{Key, Locator};
use argosync_core::context::{ClassPeriodContext, Period, SchoolClass};
use argosync_core::contract;
use argosync_core::error::{AutomationError, ErrorClass, OperationKind};
use argosync_core::secret::EncryptedCredentials;
use argosync_core::session::{Session, SessionState};
use common::{fast_config, FakeBrowser};
use pretty_assertions::assert_eq;

fn login_page(browser: &FakeBrowser) {
    browser.add(Locator::name(contract::LOGIN_FORM), "form");
    browser.add(Locator::id(contract::USERNAME_INPUT), "user");
    browser.add(Locator::id(contract::PASSWORD_INPUT), "pass");
    browser.add(Locator::name(contract::SUBMIT), "submit");
}

#[test]
fn test_login_accepts_either_landing_page() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    login_page(&browser);
    browser.add(Locator::id("_idJsp181"), "landing");

    let mut session = common::session(&browser, dir.path());
    assert_eq!(session.state(), SessionState::Anonymous);
    session.login("Alunni Web").unwrap();

    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(session.username(), Some("docente"));
    let actions = browser.actions();
    assert_eq!(actions[0], format!("navigate {}", contract_portal()));
    assert!(actions.contains(&"keys user docente".to_string()));
    assert!(actions.contains(&"keys pass segreta".to_string()));
    assert!(actions.contains(&format!("keys submit {}", Key::Return.code())));
}

fn contract_portal() -> String {
    argosync_core::config::PORTAL_URL.to_string()
}

#[test]
fn test_login_times_out_without_landing_page() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    login_page(&browser);
    let mut session = common::session(&browser, dir.path());
    let err = session.login("Alunni Web").unwrap_err();
    assert!(matches!(err, AutomationError::Timeout(_)), "{}", err);
    assert_eq!(session.username(), None);
}

#[test]
fn test_login_without_credentials_never_navigates() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    let mut session = Session::new(
        Box::new(browser.clone()),
        Box::new(EncryptedCredentials::default()),
        &fast_config(dir.path()),
    );
    let err = session.login("Alunni Web").unwrap_err();
    assert!(matches!(err, AutomationError::Other(_)));
    assert!(browser.actions().is_empty());
}

#[test]
fn test_version_check() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    let version = browser.add(Locator::id(contract::VERSION_ELEMENT), "version");
    browser.set_text(&version, " Versione 3.37.0 ");
    let mut session = common::session(&browser, dir.path());

    session
        .check_version(&Locator::id(contract::VERSION_ELEMENT), "Versione 3.37.0")
        .unwrap();
    let err = session
        .check_version(&Locator::id(contract::VERSION_ELEMENT), "Versione 3.35.0")
        .unwrap_err();
    assert!(matches!(err, AutomationError::NotFound(_)));
    assert!(err.to_string().contains("3.37.0"));
}

#[test]
fn test_run_collapses_failures_into_domain_error() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    let mut session = common::session(&browser, dir.path());

    let err = session
        .run(OperationKind::Import, "3A", |_| -> argosync_core::error::Result<()> {
            Err(AutomationError::Timeout("grid never loaded".to_string()))
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "import error class 3A");
    assert_eq!(err.class, ErrorClass::Timeout);
    assert_eq!(session.state(), SessionState::Faulted);

    let err = session
        .run(OperationKind::Verify, "5B", |_| -> argosync_core::error::Result<()> {
            Err(AutomationError::not_found("student \"X\" not present"))
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "verify error class 5B");
    assert_eq!(err.class, ErrorClass::NotFound);

    let err = session
        .run(OperationKind::Lock, "1C", |_| -> argosync_core::error::Result<()> {
            Err(AutomationError::other("socket closed"))
        })
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Unanticipated);
}

#[test]
fn test_run_passes_value_through() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    let mut session = common::session(&browser, dir.path());
    assert_eq!(session.run(OperationKind::Download, "3A", |_| Ok(7)).unwrap(), 7);
}

#[test]
fn test_failure_banner_goes_to_debug_log() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    let mut config = fast_config(dir.path());
    config.debug = argosync_core::debug::DebugLevel::Normal;
    let mut session = Session::new(Box::new(browser.clone()), Box::new(common::credentials()), &config);
    let _ = session.run(OperationKind::Import, "3A", |_| -> argosync_core::error::Result<()> {
        Err(AutomationError::not_found("row 4"))
    });

    let log = std::fs::read_to_string(session.debug_sink().log_path()).unwrap();
    assert!(log.contains("::: Driver started at"));
    assert!(log.contains("***** ELEMENT NOT FOUND *****"));
    assert!(log.contains("Not found: row 4"));
}

#[test]
fn test_logout_accepts_pending_alert() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    browser.add(contract::toolbar_button(contract::RETURN_TO_PORTAL), "portal");
    browser.add(contract::portal_home(), "home");
    browser.open_alert();
    let mut session = common::session(&browser, dir.path());

    session.logout().unwrap();
    assert_eq!(session.state(), SessionState::Anonymous);
    let actions = browser.actions();
    assert_eq!(
        actions,
        vec![
            "frame default".to_string(),
            "accept alert".to_string(),
            "click portal".to_string(),
        ]
    );
}

#[test]
fn test_close_and_drop_quit_the_browser() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    common::session(&browser, dir.path()).close().unwrap();
    assert!(browser.has_quit());

    let other = FakeBrowser::new();
    drop(common::session(&other, dir.path()));
    assert!(other.has_quit());
}

#[test]
fn test_type_and_confirm_skips_empty_value() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    let input = browser.add(Locator::id("mark"), "mark");
    let mut session = common::session(&browser, dir.path());
    session.type_and_confirm(&input, "").unwrap();
    assert_eq!(
        browser.actions(),
        vec!["clear mark".to_string(), format!("keys mark {}", Key::Return.code())]
    );
}

#[test]
fn test_assert_context_checks_both_titles() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    let context = ClassPeriodContext::new(SchoolClass::new("3", "A"), Period::FinalSession);
    let [class_title, period_title] = context.title_postconditions();
    browser.add(class_title, "class-title");
    let mut session = common::session(&browser, dir.path());

    assert!(session.assert_context(&context).is_err());
    browser.add(period_title, "period-title");
    session.assert_context(&context).unwrap();
}

#[test]
fn test_menu_walks_keys_then_picks_option() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    browser.add(contract::menu(contract::MENU_CURRICULUM), "menu");
    browser.add(contract::menu_option(contract::MENU_CURRICULUM, contract::OPTION_MARKS), "marks");
    browser.add(contract::module_frame(), "frame");
    let mut session = common::session(&browser, dir.path());

    session
        .menu(
            contract::MENU_CURRICULUM,
            contract::OPTION_MARKS,
            &[Key::ArrowDown, Key::ArrowDown],
            Some(&contract::module_frame()),
        )
        .unwrap();
    let down = format!("keys menu {}", Key::ArrowDown.code());
    assert_eq!(
        browser.actions(),
        vec!["click menu".to_string(), down.clone(), down, "click marks".to_string()]
    );
    assert_eq!(session.state(), SessionState::Authenticated);
}

#[test]
fn test_choose_class_in_list_reports_missing_class() {
    let dir = tempfile::tempdir().unwrap();
    let browser = FakeBrowser::new();
    browser.add(contract::class_search_root("ISTITUTO DI PROVA"), "root");
    browser.add(contract::class_search_tree_node(), "node");
    browser.add(contract::class_list_ready(), "ready");
    let row = browser.add(contract::class_list_rows(), "row-1");
    let cells: Vec<_> = ["ITI", "4", "B"]
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let cell = browser.add_child(&row, contract::class_list_values(), &format!("cell-{}", i));
            browser.set_text(&cell, text);
            cell
        })
        .collect();
    let mut session = common::session(&browser, dir.path());

    let err = session
        .choose_class_in_list(&SchoolClass::new("3", "A"), None)
        .unwrap_err();
    assert!(err.to_string().contains("class \"3A\" not present"), "{}", err);

    browser.add_child(&cells[2], contract::grandparent(), "row-1-link");
    browser.add(contract::class_search_confirm(), "confirm");
    session.choose_class_in_list(&SchoolClass::new("4", "B"), None).unwrap();
    let actions = browser.actions();
    assert!(actions.contains(&"click row-1-link".to_string()));
    assert_eq!(actions.last(), Some(&"click confirm".to_string()));
}
