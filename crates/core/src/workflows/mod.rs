//! Top-level procedures composed from the session, navigation and
//! reconciliation layers.
//!
//! Every public entry point runs inside [`Session::run`], so it either
//! completes or fails with exactly one [`crate::error::DomainError`].

pub mod absences;
pub mod admissions;
pub mod marks;

use crate::browser::ElementRef;
use crate::error::Result;
use crate::session::Session;

pub use absences::{download_absence_reports, import_absences, verify_absences};
pub use admissions::{import_admission_comments, verify_admission_comments};
pub use marks::{import_marks, lock_marks, verify_marks};

/// A rendered grid row and its logical position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub index: usize,
    pub element: ElementRef,
}

/// Trimmed `textContent` of an element.
fn content(session: &mut Session, element: &ElementRef) -> Result<String> {
    Ok(session.browser().text_content(element)?.trim().to_string())
}

/// Trimmed rendered text of an element.
fn rendered(session: &mut Session, element: &ElementRef) -> Result<String> {
    Ok(session.browser().text(element)?.trim().to_string())
}
