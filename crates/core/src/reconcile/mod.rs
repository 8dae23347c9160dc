//! Lockstep reconciliation of rendered student rows with expected records.
//!
//! Row identity on screen is positional, so the walk is a cursor over two
//! ordered sequences, never a keyed join. Every mismatch that is not a
//! withdrawn student stops the walk.

pub mod policy;

use crate::canon;
use crate::error::{AutomationError, Result};
use crate::records::Keyed;

/// A dynamically sized list of rendered rows.
pub trait RowSource {
    type Row;

    /// Row at logical position `cursor`, or `None` past the last row.
    fn row_at(&mut self, cursor: usize) -> Result<Option<Self::Row>>;

    /// Rendered text identifying the student (name and birth date).
    fn label(&mut self, row: &Self::Row) -> Result<String>;

    /// Whether the row carries the withdrawn/transferred flag.
    fn is_withdrawn(&mut self, row: &Self::Row) -> Result<bool>;
}

/// Outcome of comparing one row with the current expected record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Matched { cursor: usize, index: usize },
    SkippedWithdrawn { cursor: usize, label: String },
    Mismatch { cursor: usize, label: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Expected records consumed.
    pub matched: usize,
    /// Labels of the withdrawn rows that were skipped.
    pub withdrawn: Vec<String>,
    /// Rows visited.
    pub rows: usize,
}

pub fn not_present(label: &str) -> AutomationError {
    AutomationError::not_found(format!("student \"{}\" not present", label.trim()))
}

pub fn not_exported(label: &str) -> AutomationError {
    AutomationError::not_found(format!("student \"{}\" not exported", label.trim()))
}

/// Compare the row at `cursor` with `expected[index]`.
pub fn classify<S, T>(source: &mut S, cursor: usize, row: &S::Row, expected: &[T], index: usize) -> Result<Step>
where
    S: RowSource,
    T: Keyed,
{
    let label = source.label(row)?;
    if let Some(record) = expected.get(index) {
        if canon::match_key(&label) == record.match_key() {
            return Ok(Step::Matched { cursor, index });
        }
    }
    if source.is_withdrawn(row)? {
        Ok(Step::SkippedWithdrawn { cursor, label })
    } else {
        Ok(Step::Mismatch { cursor, label })
    }
}

/// Walk every rendered row, applying `apply` to each match.
///
/// Withdrawn rows are skipped without consuming an expected record. The walk
/// succeeds only if the rows run out exactly when the expected records do.
pub fn walk<S, T, F>(source: &mut S, expected: &[T], mut apply: F) -> Result<WalkReport>
where
    S: RowSource,
    T: Keyed,
    F: FnMut(&mut S, &S::Row, usize, &T) -> Result<()>,
{
    let mut report = WalkReport::default();
    let mut cursor = 0;
    let mut index = 0;

    while let Some(row) = source.row_at(cursor)? {
        match classify(source, cursor, &row, expected, index)? {
            Step::Matched { index: i, .. } => {
                apply(&mut *source, &row, i, &expected[i])?;
                index += 1;
                report.matched += 1;
            }
            Step::SkippedWithdrawn { label, .. } => {
                log::debug!("skipping withdrawn student {}", label.trim());
                report.withdrawn.push(label);
            }
            Step::Mismatch { label, .. } => {
                return Err(if index >= expected.len() {
                    not_exported(&label)
                } else {
                    not_present(&label)
                });
            }
        }
        cursor += 1;
    }

    report.rows = cursor;
    if index != expected.len() {
        return Err(AutomationError::not_found(format!(
            "rows not fully entered: {} of {} students reconciled",
            index,
            expected.len()
        )));
    }
    Ok(report)
}

/// Strict positional walk for grids that list only active students: row `i`
/// must be expected record `i`, and no row may follow the last one.
pub fn walk_positional<S, T, F>(source: &mut S, expected: &[T], mut apply: F) -> Result<WalkReport>
where
    S: RowSource,
    T: Keyed,
    F: FnMut(&mut S, &S::Row, usize, &T) -> Result<()>,
{
    for (index, record) in expected.iter().enumerate() {
        let row = source.row_at(index)?.ok_or_else(|| {
            AutomationError::not_found(format!(
                "student \"{}\" missing at row {}",
                record.display_name(),
                index
            ))
        })?;
        let label = source.label(&row)?;
        if canon::match_key(&label) != record.match_key() {
            return Err(not_present(&label));
        }
        apply(&mut *source, &row, index, record)?;
    }
    ensure_no_trailing_row(source, expected.len())?;
    Ok(WalkReport {
        matched: expected.len(),
        withdrawn: Vec::new(),
        rows: expected.len(),
    })
}

/// Fail if any row exists at `cursor`, whatever it contains.
pub fn ensure_no_trailing_row<S: RowSource>(source: &mut S, cursor: usize) -> Result<()> {
    match source.row_at(cursor)? {
        Some(row) => {
            let label = source.label(&row).unwrap_or_default();
            Err(not_exported(&label))
        }
        None => Ok(()),
    }
}
