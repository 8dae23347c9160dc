//! Expected ground truth supplied by the caller.

use crate::canon;
use crate::context::{Period, SchoolClass};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mark value for a subject the student was not assessed in.
pub const NOT_ASSESSED: &str = "N";

/// One student's expected data, in on-screen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord<P> {
    pub name: String,
    /// As printed next to the name, e.g. `"01/02/2005"`.
    #[serde(default)]
    pub birth_date: String,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> StudentRecord<P> {
    pub fn new(name: impl Into<String>, birth_date: impl Into<String>, payload: P) -> Self {
        Self {
            name: name.into(),
            birth_date: birth_date.into(),
            payload,
        }
    }

    pub fn canonical_name(&self) -> String {
        canon::canonicalize_student_name(&self.name)
    }
}

/// Anything the reconciliation walk can match against a rendered row.
pub trait Keyed {
    /// Key compared with [`canon::match_key`] of the row label.
    fn match_key(&self) -> String;

    /// Name used in error messages.
    fn display_name(&self) -> &str;
}

impl<P> Keyed for StudentRecord<P> {
    fn match_key(&self) -> String {
        canon::match_key(&format!("{}{}", self.name, self.birth_date))
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Matches on the name alone, for lists that do not print birth dates.
#[derive(Debug, Clone, Copy)]
pub struct ByName<'a, P>(pub &'a StudentRecord<P>);

impl<P> Keyed for ByName<'_, P> {
    fn match_key(&self) -> String {
        canon::match_key(&self.0.name)
    }

    fn display_name(&self) -> &str {
        &self.0.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkEntry {
    pub mark: String,
    #[serde(default)]
    pub absences: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMarks {
    /// Long-form subject name from the catalog.
    pub subject: String,
    pub students: Vec<StudentRecord<MarkEntry>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutcomeCode {
    #[serde(rename = "A")]
    Admitted,
    #[serde(rename = "N")]
    NotAdmitted,
    #[serde(rename = "SO")]
    Suspended,
    #[serde(rename = "NS")]
    NotAssessed,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl OutcomeCode {
    /// Code shown in the summary grid.
    pub fn code(&self) -> &'static str {
        match self {
            OutcomeCode::Admitted => "A",
            OutcomeCode::NotAdmitted => "N",
            OutcomeCode::Suspended => "SO",
            OutcomeCode::NotAssessed => "NS",
            OutcomeCode::Unset => "",
        }
    }

    /// Entry in the outcome picker.
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeCode::Admitted => "A - Ammesso/a",
            OutcomeCode::NotAdmitted => "N - Non Ammesso/a",
            OutcomeCode::Suspended => "SO - Sospensione del giudizio",
            OutcomeCode::NotAssessed => "NS - Non Scrutinato/a",
            OutcomeCode::Unset => "(Nessuno)",
        }
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeEntry {
    pub average: String,
    pub credit: String,
    pub previous_credit: String,
    pub outcome: OutcomeCode,
    /// Admission comment, written only for admitted students.
    pub judgement: String,
}

/// Days of one month on which the student was absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsenceEntry {
    #[serde(default)]
    pub days: Vec<u32>,
}

impl AbsenceEntry {
    pub fn absent_on(&self, day: u32) -> bool {
        self.days.contains(&day)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthAbsences {
    /// Calendar month, 1..=12.
    pub month: u32,
    pub students: Vec<StudentRecord<AbsenceEntry>>,
}

// --- Input documents ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMarks {
    pub class: SchoolClass,
    pub period: Period,
    pub subjects: Vec<SubjectMarks>,
    #[serde(default)]
    pub outcomes: Vec<StudentRecord<OutcomeEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAbsences {
    pub class: SchoolClass,
    /// Starting year of the school year, e.g. 2019 for 2019/20.
    pub school_year: i32,
    pub months: Vec<MonthAbsences>,
}

impl ClassAbsences {
    pub fn month(&self, month: u32) -> Option<&MonthAbsences> {
        self.months.iter().find(|m| m.month == month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAdmissions {
    pub class: SchoolClass,
    pub students: Vec<StudentRecord<OutcomeEntry>>,
}
