//! The class and period a workflow is operating on.
//!
//! Where the application shows "Classe: 3A ..." and "Periodo: ..." in its
//! title bars, those titles are checked against this context as explicit
//! postconditions of navigation.

use crate::browser::Locator;
use crate::contract;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolClass {
    /// Class year, e.g. `"3"`.
    pub year: String,
    /// Section letter(s), e.g. `"A"`.
    pub section: String,
}

impl SchoolClass {
    pub fn new(year: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            section: section.into(),
        }
    }

    /// Identifier the application prints, e.g. `"3A"`.
    pub fn id(&self) -> String {
        format!("{}{}", self.year, self.section)
    }
}

impl fmt::Display for SchoolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.year, self.section)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    FirstTerm,
    FinalSession,
    /// Resumed grading for students whose final outcome was deferred.
    SuspendedResumption,
}

impl Period {
    /// Label in the period picker and in the class title bar.
    pub fn label(&self) -> &'static str {
        match self {
            Period::FirstTerm => "PRIMO TRIMESTRE",
            Period::FinalSession => "SCRUTINIO FINALE",
            Period::SuspendedResumption => "RIPRESA DELLO SCRUTINIO",
        }
    }

    /// Label in the per-subject detail title, which abbreviates the
    /// resumption period.
    pub fn detail_label(&self) -> &'static str {
        match self {
            Period::SuspendedResumption => "RIPRESA SCRUTINIO",
            other => other.label(),
        }
    }

    /// Header of the mark column in the per-subject detail grid.
    pub fn mark_header(&self) -> &'static str {
        match self {
            Period::SuspendedResumption => "Voto Ripresa",
            _ => "Voto",
        }
    }

    /// Board template offered by the print dialog.
    pub fn board_template(&self) -> &'static str {
        match self {
            Period::FirstTerm => "scrutinio primo trimestre (1T)",
            _ => "Scrutinio finale atti (SF)",
        }
    }

    /// Final and resumed sessions carry credit and outcome columns.
    pub fn has_outcomes(&self) -> bool {
        !matches!(self, Period::FirstTerm)
    }

    /// The resumption screen is reached from its own menu entry and has no
    /// period picker.
    pub fn has_period_picker(&self) -> bool {
        !matches!(self, Period::SuspendedResumption)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPeriodContext {
    pub class: SchoolClass,
    pub period: Period,
}

impl ClassPeriodContext {
    pub fn new(class: SchoolClass, period: Period) -> Self {
        Self { class, period }
    }

    pub fn class_id(&self) -> String {
        self.class.id()
    }

    /// Title bars that must be showing once the class grid is open.
    pub fn title_postconditions(&self) -> [Locator; 2] {
        [
            contract::title_starting_with(&format!("Classe: {} ", self.class.id())),
            contract::title_starting_with(&format!("Periodo: {}", self.period.label())),
        ]
    }

    /// Title bar of the per-subject detail view.
    pub fn subject_postcondition(&self, display_name: &str) -> Locator {
        contract::title_starting_with(&format!(
            "Periodo: {} - Materia: {}",
            self.period.detail_label(),
            display_name
        ))
    }
}

impl fmt::Display for ClassPeriodContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.class, self.period)
    }
}
