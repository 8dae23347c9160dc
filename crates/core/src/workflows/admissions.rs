//! State-exam admission comments, kept in the older grading application.

use super::{content, GridRow};
use crate::browser::Locator;
use crate::contract;
use crate::error::{AutomationError, DomainError, OperationKind, Result};
use crate::reconcile::{self, RowSource};
use crate::records::{ByName, ClassAdmissions, OutcomeCode, OutcomeEntry, StudentRecord};
use crate::session::Session;

const APPLICATION: &str = "Scrutinio Web";

/// Encode every non-ASCII character as an XML character reference, the only
/// form the comment editor stores faithfully.
pub fn xml_char_refs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(&format!("&#{};", c as u32));
        }
    }
    out
}

/// Comment expected on file: only admitted students get one.
pub fn expected_comment(entry: &OutcomeEntry) -> &str {
    if entry.outcome == OutcomeCode::Admitted {
        &entry.judgement
    } else {
        ""
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Enter,
    Check,
}

/// Student list of the comment module, addressed by row number.
struct CommentGrid<'s> {
    session: &'s mut Session,
    mode: Mode,
}

impl CommentGrid<'_> {
    fn student(&mut self, row: &GridRow, record: &StudentRecord<OutcomeEntry>) -> Result<()> {
        let name = self.label(row)?;
        let s = &mut *self.session;
        s.browser().click(&row.element)?;
        s.click(&contract::comment_modify())?;
        s.wait_present(&contract::comment_student_title(&name))?;
        s.wait_loading()?;

        let expected = expected_comment(&record.payload);
        match self.mode {
            Mode::Enter => {
                s.click(&contract::comment_edit())?;
                s.wait_loading()?;
                let text = s.find(&contract::comment_text())?;
                s.browser().clear(&text)?;
                if !expected.is_empty() {
                    s.browser().send_keys(&text, &xml_char_refs(expected))?;
                    s.debug_screen(&format!("Comment for {}", name));
                }
                s.click(&contract::comment_save())?;
                s.wait_loading()?;
            }
            Mode::Check => {
                let text = s.find(&contract::comment_text())?;
                let stored = s.browser().text_content(&text)?;
                if stored != expected {
                    return Err(AutomationError::not_found(format!("student \"{}\": wrong comment", name)));
                }
            }
        }
        s.click(&contract::comment_close())?;
        s.wait_loading()
    }
}

impl RowSource for CommentGrid<'_> {
    type Row = GridRow;

    fn row_at(&mut self, cursor: usize) -> Result<Option<GridRow>> {
        let surname = self.session.try_find(&contract::comment_row_surname(cursor))?;
        let first = self.session.try_find(&contract::comment_row_first_name(cursor))?;
        Ok(match (surname, first) {
            (Some(element), Some(_)) => Some(GridRow { index: cursor, element }),
            _ => None,
        })
    }

    /// Surname and first name as the list shows them.
    fn label(&mut self, row: &GridRow) -> Result<String> {
        self.session.browser().scroll_into_view(&row.element)?;
        let surname = content(self.session, &row.element)?;
        let first = self.session.find(&contract::comment_row_first_name(row.index))?;
        let first = content(self.session, &first)?;
        Ok(format!("{} {}", surname, first))
    }

    fn is_withdrawn(&mut self, row: &GridRow) -> Result<bool> {
        Ok(self
            .session
            .try_find(&contract::comment_row_withdrawn(row.index))?
            .is_some())
    }
}

fn run_comments(session: &mut Session, data: &ClassAdmissions, mode: Mode) -> Result<()> {
    session.login(APPLICATION)?;
    let version = session.versions().legacy.clone();
    session.check_version(&Locator::id(contract::LEGACY_VERSION_ELEMENT), &version)?;

    session.toolbar(contract::LEGACY_COMMENTS_TOOL, &contract::legacy_class_search())?;
    session.select_class_in_list(&data.class, None)?;
    session.button(contract::LEGACY_CLASS_FORM, contract::CONFIRM, &contract::legacy_panel_choice())?;
    session.combobox(contract::LEGACY_PANEL_COMBO, contract::ADMISSION_PANEL)?;
    session.combobox(contract::LEGACY_PERIOD_COMBO, contract::ADMISSION_PERIOD)?;
    session.button(contract::LEGACY_PANEL_FORM, contract::CONFIRM, &contract::comment_list())?;

    let students: Vec<ByName<'_, OutcomeEntry>> = data.students.iter().map(ByName).collect();
    let mut grid = CommentGrid {
        session: &mut *session,
        mode,
    };
    reconcile::walk(&mut grid, &students, |grid, row, _, record| grid.student(row, record.0))?;

    session.click(&contract::comment_list_close())?;
    let username = session
        .username()
        .ok_or_else(|| AutomationError::other("session has no user"))?
        .to_string();
    session.wait_present(&contract::status_bar_user(&username))?;
    session.wait_loading()?;
    session.debug_screen(match mode {
        Mode::Enter => "Comments entered",
        Mode::Check => "Comments verified",
    });
    session.logout()
}

/// Write the admission comment of every admitted student and clear the
/// others.
pub fn import_admission_comments(session: &mut Session, data: &ClassAdmissions) -> std::result::Result<(), DomainError> {
    session.remove_images();
    session.run(OperationKind::Import, &data.class.id(), |s| run_comments(s, data, Mode::Enter))
}

pub fn verify_admission_comments(session: &mut Session, data: &ClassAdmissions) -> std::result::Result<(), DomainError> {
    session.run(OperationKind::Verify, &data.class.id(), |s| run_comments(s, data, Mode::Check))
}
