//! Marks: per-subject entry, summary verification, outcomes and lock.

use super::{content, rendered, GridRow};
use crate::browser::{ElementRef, Key, Locator};
use crate::canon;
use crate::config::VersionPins;
use crate::context::{ClassPeriodContext, Period};
use crate::contract;
use crate::error::{AutomationError, DomainError, OperationKind, Result};
use crate::reconcile::policy::{self, MarkInput};
use crate::reconcile::{self, RowSource};
use crate::records::{ClassMarks, Keyed, MarkEntry, OutcomeEntry, StudentRecord, SubjectMarks};
use crate::session::Session;

const APPLICATION: &str = "Alunni Web";

/// Key presses that walk the curriculum menu down to mark entry.
const MARKS_MENU_KEYS: [Key; 9] = [Key::ArrowDown; 9];

fn version_for<'a>(pins: &'a VersionPins, period: Period, lock: bool) -> &'a str {
    match period {
        Period::FirstTerm => &pins.first_term,
        Period::FinalSession if lock => &pins.final_lock,
        Period::FinalSession => &pins.final_import,
        Period::SuspendedResumption => &pins.suspended,
    }
}

/// Log in and open the class mark grid for `context`.
fn open_class_grid(session: &mut Session, context: &ClassPeriodContext, lock: bool) -> Result<()> {
    session.login(APPLICATION)?;
    let version = version_for(session.versions(), context.period, lock).to_string();
    session.check_version(&Locator::id(contract::VERSION_ELEMENT), &version)?;

    let frame = contract::module_frame();
    match context.period {
        Period::SuspendedResumption => {
            session.menu(contract::MENU_CURRICULUM, contract::OPTION_RESUMPTION, &[], Some(&frame))?
        }
        _ => session.menu(
            contract::MENU_CURRICULUM,
            contract::OPTION_MARKS,
            &MARKS_MENU_KEYS,
            Some(&frame),
        )?,
    }
    session.choose_class(&context.class)?;
    if context.period.has_period_picker() {
        session.labelled_option(contract::PERIOD_FIELD, context.period.label())?;
    }
    session.assert_context(context)
}

fn ensure_same_class(context: &ClassPeriodContext, data: &ClassMarks) -> Result<()> {
    if data.class != context.class || data.period != context.period {
        return Err(AutomationError::other(format!(
            "data for {} {} supplied to {}",
            data.class, data.period, context
        )));
    }
    Ok(())
}

// --- Import ---

/// Enter every subject's marks and absences, then the period-end data.
pub fn import_marks(session: &mut Session, context: &ClassPeriodContext, data: &ClassMarks) -> std::result::Result<(), DomainError> {
    session.remove_images();
    session.run(OperationKind::Import, &context.class_id(), |s| {
        ensure_same_class(context, data)?;
        open_class_grid(s, context, false)?;
        for subject in &data.subjects {
            enter_subject(s, context, subject)?;
        }
        match context.period {
            Period::FirstTerm => fill_averages(s)?,
            _ => enter_outcomes(s, context, &data.outcomes)?,
        }
        s.logout()
    })
}

/// Per-subject detail grid: mark textbox and absence spinner per student.
struct DetailGrid<'s> {
    session: &'s mut Session,
    subject: &'static str,
    suspended: bool,
}

impl DetailGrid<'_> {
    fn mark_column(&self) -> usize {
        if self.suspended {
            2
        } else {
            1
        }
    }

    fn write(&mut self, row: &GridRow, record: &StudentRecord<MarkEntry>) -> Result<()> {
        self.session.browser().scroll_into_view(&row.element)?;
        let column = self.mark_column();
        let input = self
            .session
            .find(&contract::grid_input(row.index, column, contract::ROLE_TEXTBOX))?;
        let enabled = self.session.browser().is_displayed(&input)?
            && self.session.browser().attribute(&input, "disabled")?.is_none();
        let entry = &record.payload;
        if policy::mark_input(self.subject, enabled, &record.name, &entry.mark)? == MarkInput::Exempt {
            log::debug!("{} exempt from {}", record.name, self.subject);
            return Ok(());
        }
        self.session.type_and_confirm(&input, &entry.mark)?;
        if !canon::is_conduct(self.subject) {
            let absences = self
                .session
                .find(&contract::grid_input(row.index, column + 1, contract::ROLE_SPINBUTTON))?;
            self.session.type_and_confirm(&absences, &entry.absences)?;
        }
        Ok(())
    }
}

impl RowSource for DetailGrid<'_> {
    type Row = GridRow;

    fn row_at(&mut self, cursor: usize) -> Result<Option<GridRow>> {
        Ok(self
            .session
            .try_find(&contract::grid_record(cursor))?
            .map(|element| GridRow { index: cursor, element }))
    }

    fn label(&mut self, row: &GridRow) -> Result<String> {
        content(self.session, &row.element)
    }

    fn is_withdrawn(&mut self, row: &GridRow) -> Result<bool> {
        Ok(self
            .session
            .browser()
            .find_child(&row.element, &contract::withdrawn_icon())?
            .is_some())
    }
}

fn enter_subject(session: &mut Session, context: &ClassPeriodContext, subject: &SubjectMarks) -> Result<()> {
    let entry = canon::lookup(&subject.subject)?;
    let header = session.find(&contract::column_header(entry.abbreviated))?;
    session.browser().scroll_into_view(&header)?;
    let suspended = context.period == Period::SuspendedResumption;
    if suspended {
        // The resumption grid keeps its headers under a mask.
        session.browser().script_click(&header)?;
        session.settle();
    } else {
        session.browser().click(&header)?;
    }
    session.wait_visible(&contract::column_header(context.period.mark_header()))?;
    session.wait_present(&context.subject_postcondition(entry.display))?;

    let mut grid = DetailGrid {
        session: &mut *session,
        subject: entry.name,
        suspended,
    };
    let report = reconcile::walk(&mut grid, &subject.students, |grid, row, _, record| {
        grid.write(row, record)
    })?;
    session.debug_screen(&format!(
        "Marks entered, subject \"{}\" ({} students, {} withdrawn)",
        entry.name,
        report.matched,
        report.withdrawn.len()
    ));
    session.save_and_back(contract::DETAIL_VIEW)
}

/// First term: let the application compute the averages.
fn fill_averages(session: &mut Session) -> Result<()> {
    session.actions_menu(contract::AUTO_AVERAGE)?;
    session.confirm_dialog(contract::YES)?;
    session.wait_busy()?;
    session.settle();
    session.debug_screen("Averages filled in");
    Ok(())
}

/// Quick-entry grid: credit, integration, average and outcome picker.
struct QuickEntryGrid<'s> {
    session: &'s mut Session,
}

impl QuickEntryGrid<'_> {
    fn write(&mut self, row: &GridRow, record: &StudentRecord<OutcomeEntry>) -> Result<()> {
        let s = &mut *self.session;
        s.browser().scroll_into_view(&row.element)?;
        let id = s.attribute(&row.element, "data-recordid")?;
        let entry = &record.payload;

        let credit = s.find(&contract::record_input(row.index, &id, 1, contract::ROLE_SPINBUTTON))?;
        s.type_and_confirm(&credit, &entry.credit)?;
        let integration = s.find(&contract::record_input(row.index, &id, 2, contract::ROLE_SPINBUTTON))?;
        s.type_and_confirm(&integration, "")?;
        let average = s.find(&contract::record_input(row.index, &id, 4, contract::ROLE_SPINBUTTON))?;
        s.type_and_confirm(&average, &entry.average.replace(',', "."))?;

        let trigger = s.find(&contract::record_picker_trigger(row.index, &id, 5))?;
        s.browser().click(&trigger)?;
        let picker = s.attribute(&trigger, "id")?.replace("-trigger-picker", "-picker");
        let option = s.find(&contract::grid_picker_option(&picker, entry.outcome.label()))?;
        s.scroll_and_click(&option)
    }
}

impl RowSource for QuickEntryGrid<'_> {
    type Row = GridRow;

    fn row_at(&mut self, cursor: usize) -> Result<Option<GridRow>> {
        Ok(self
            .session
            .try_find(&contract::quick_entry_record(cursor))?
            .map(|element| GridRow { index: cursor, element }))
    }

    fn label(&mut self, row: &GridRow) -> Result<String> {
        content(self.session, &row.element)
    }

    /// The quick-entry grid lists active students only.
    fn is_withdrawn(&mut self, _row: &GridRow) -> Result<bool> {
        Ok(false)
    }
}

fn enter_outcomes(
    session: &mut Session,
    context: &ClassPeriodContext,
    outcomes: &[StudentRecord<OutcomeEntry>],
) -> Result<()> {
    session.actions_menu(contract::QUICK_ENTRY)?;
    session.settle();
    let [class_title, _] = context.title_postconditions();
    session.wait_present(&class_title)?;

    let mut grid = QuickEntryGrid { session: &mut *session };
    reconcile::walk_positional(&mut grid, outcomes, |grid, row, _, record| grid.write(row, record))?;
    session.debug_screen("Outcomes entered");
    session.save_and_back(contract::QUICK_ENTRY_VIEW)
}

// --- Verify ---

/// Compare the class summary grid with `data`, then print the board and,
/// for period-end sessions, carry outcomes over to the annual records.
pub fn verify_marks(session: &mut Session, context: &ClassPeriodContext, data: &ClassMarks) -> std::result::Result<(), DomainError> {
    session.run(OperationKind::Verify, &context.class_id(), |s| {
        ensure_same_class(context, data)?;
        if data.outcomes.is_empty() {
            return Err(AutomationError::other(format!("no outcomes supplied for class {}", data.class)));
        }
        open_class_grid(s, context, false)?;
        check_summary(s, context.period, data)?;
        print_board(s, context.period)?;
        if context.period.has_outcomes() {
            transfer_to_records(s)?;
        }
        s.debug("Data verified");
        s.logout()
    })
}

/// Cell layout of the summary grid for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLayout {
    /// Cells per subject.
    pub stride: usize,
    /// 1-based cell of the first subject's mark.
    pub first_mark: usize,
    pub subjects: usize,
}

impl SummaryLayout {
    pub fn new(period: Period, subjects: usize) -> Self {
        match period {
            Period::SuspendedResumption => Self {
                stride: 3,
                first_mark: 2,
                subjects,
            },
            _ => Self {
                stride: 2,
                first_mark: 1,
                subjects,
            },
        }
    }

    pub fn mark_cell(&self, column: usize) -> usize {
        column * self.stride + self.first_mark
    }

    pub fn absences_cell(&self, column: usize) -> usize {
        self.mark_cell(column) + 1
    }

    /// `offset`-th cell after the subject block. Conduct, the last subject,
    /// has no absence cell, so the tail starts where that cell would be.
    pub fn tail_cell(&self, offset: usize) -> usize {
        self.subjects * self.stride + offset
    }
}

/// Two-table summary grid: names on the locked side, values on the other.
struct SummaryGrid<'s> {
    session: &'s mut Session,
    layout: SummaryLayout,
}

impl SummaryGrid<'_> {
    fn cell(&mut self, row: &GridRow, column: usize) -> Result<ElementRef> {
        let s = &mut *self.session;
        s.browser().scroll_into_view(&row.element)?;
        let record = s.attribute(&row.element, "data-recordid")?;
        let view = s.attribute(&row.element, "data-boundview")?;
        s.find(&contract::summary_cell(row.index, record.trim(), view.trim(), column))
    }

    fn cell_text(&mut self, row: &GridRow, column: usize) -> Result<String> {
        let cell = self.cell(row, column)?;
        rendered(self.session, &cell)
    }

    fn check_mark(
        &mut self,
        row: &GridRow,
        subject: &str,
        column: usize,
        record: &StudentRecord<MarkEntry>,
    ) -> Result<()> {
        let mark = self.cell_text(row, self.layout.mark_cell(column))?;
        if mark != record.payload.mark.trim() {
            return Err(AutomationError::not_found(format!(
                "student \"{}\": mark \"{}\" in {}, expected \"{}\"",
                record.name, mark, subject, record.payload.mark
            )));
        }
        if !canon::is_conduct(subject) {
            let absences = self.cell_text(row, self.layout.absences_cell(column))?;
            if !policy::counts_match(&absences, &record.payload.absences)? {
                return Err(AutomationError::not_found(format!(
                    "student \"{}\": {} absences in {}, expected \"{}\"",
                    record.name, absences, subject, record.payload.absences
                )));
            }
        }
        Ok(())
    }

    /// Both average columns of the first term against the same value.
    fn check_term_averages(&mut self, row: &GridRow, record: &StudentRecord<OutcomeEntry>) -> Result<()> {
        for offset in 0..2 {
            let average = self.cell_text(row, self.layout.tail_cell(offset))?;
            if !policy::text_average_matches(&average, &record.payload.average) {
                return Err(AutomationError::not_found(format!(
                    "student \"{}\": average{} {}, expected \"{}\"",
                    record.name,
                    offset + 1,
                    average,
                    record.payload.average
                )));
            }
        }
        Ok(())
    }

    fn check_outcome(&mut self, row: &GridRow, record: &StudentRecord<OutcomeEntry>, excluded: usize) -> Result<()> {
        let entry = &record.payload;
        let wrong = |field: &str, found: &str| {
            AutomationError::not_found(format!("student \"{}\": {} {}", record.name, field, found))
        };

        let credit = self.cell_text(row, self.layout.tail_cell(0))?;
        if !policy::credit_matches(&credit, &entry.credit)? {
            return Err(wrong("credit", &credit));
        }
        let integration = self.cell_text(row, self.layout.tail_cell(1))?;
        if policy::coerce_count(&integration)? != 0 {
            return Err(wrong("integration", &integration));
        }

        let raw = policy::parse_decimal(&self.cell_text(row, self.layout.tail_cell(2))?)?;
        let first = policy::derated_average(raw, self.layout.subjects, excluded);
        if !policy::average_matches(first, &entry.average)? {
            return Err(wrong("average1", &format!("{:.2}", first)));
        }
        let second = policy::parse_decimal(&self.cell_text(row, self.layout.tail_cell(3))?)?;
        if !policy::average_matches(second, &entry.average)? {
            return Err(wrong("average2", &format!("{:.2}", second)));
        }

        let cell = self.cell(row, self.layout.tail_cell(4))?;
        let outcome = content(self.session, &cell)?;
        if outcome != entry.outcome.code() {
            return Err(wrong("outcome", &outcome));
        }
        Ok(())
    }
}

impl RowSource for SummaryGrid<'_> {
    type Row = GridRow;

    fn row_at(&mut self, cursor: usize) -> Result<Option<GridRow>> {
        Ok(self
            .session
            .try_find(&contract::summary_record(cursor))?
            .map(|element| GridRow { index: cursor, element }))
    }

    fn label(&mut self, row: &GridRow) -> Result<String> {
        content(self.session, &row.element)
    }

    /// The summary is compared positionally, row `i` against student `i`.
    fn is_withdrawn(&mut self, _row: &GridRow) -> Result<bool> {
        Ok(false)
    }
}

/// Abbreviated subject headers of the summary grid, in column order.
fn summary_headers(session: &mut Session, period: Period) -> Result<Vec<String>> {
    let mut headers = Vec::new();
    if period == Period::FirstTerm {
        for el in session.browser().find_elements(&contract::summary_headers_by_tooltip())? {
            headers.push(session.attribute(&el, "data-qtip")?.trim().to_string());
        }
    } else {
        for el in session.browser().find_elements(&contract::summary_header_texts())? {
            headers.push(content(session, &el)?);
        }
    }
    Ok(headers)
}

/// Marks of `student` not assessed, religion aside. Students are found in
/// each subject list by name and birth date.
fn excluded_for(data: &ClassMarks, student: &StudentRecord<OutcomeEntry>) -> usize {
    let key = student.match_key();
    policy::excluded_subjects(data.subjects.iter().filter_map(|subject| {
        subject
            .students
            .iter()
            .find(|record| record.match_key() == key)
            .map(|record| (subject.subject.as_str(), record.payload.mark.trim()))
    }))
}

fn check_summary(session: &mut Session, period: Period, data: &ClassMarks) -> Result<()> {
    let headers = summary_headers(session, period)?;
    if headers.len() != data.subjects.len() {
        return Err(AutomationError::not_found(format!(
            "subject count mismatch: {} columns, {} subjects",
            headers.len(),
            data.subjects.len()
        )));
    }
    let layout = SummaryLayout::new(period, headers.len());

    for subject in &data.subjects {
        let abbreviated = canon::to_abbreviated(&subject.subject)?;
        let column = headers
            .iter()
            .position(|h| h == abbreviated)
            .ok_or_else(|| AutomationError::not_found(format!("no column for subject \"{}\"", subject.subject)))?;
        let mut grid = SummaryGrid {
            session: &mut *session,
            layout,
        };
        reconcile::walk_positional(&mut grid, &subject.students, |grid, row, _, record| {
            grid.check_mark(row, &subject.subject, column, record)
        })?;
        session.debug(&format!("Subject \"{}\" verified", subject.subject));
    }

    let mut grid = SummaryGrid {
        session: &mut *session,
        layout,
    };
    reconcile::walk_positional(&mut grid, &data.outcomes, |grid, row, _, record| {
        if period.has_outcomes() {
            grid.check_outcome(row, record, excluded_for(data, record))
        } else {
            grid.check_term_averages(row, record)
        }
    })?;
    session.debug("Averages and outcomes verified");
    Ok(())
}

/// Save the class board as PDF through the print dialog.
fn print_board(session: &mut Session, period: Period) -> Result<()> {
    session.actions_menu(contract::PRINT_BOARD)?;
    session.wait_busy()?;
    session.labelled_combo(contract::BOARD_TEMPLATE_FIELD, period.board_template())?;
    session.check_label(contract::EXCLUDE_WITHDRAWN)?;
    session.labelled_combo(contract::OPERATION_FIELD, contract::SAVE_PDF)?;
    let print = session.find(&contract::aria_button(contract::PRINT))?;
    session.scroll_and_click(&print)?;
    session.wait_busy()?;
    session.settle();
    session.view_button(contract::BOARD_OPTIONS_VIEW, contract::BACK)?;
    session.debug_screen("Board saved to file");
    Ok(())
}

fn transfer_to_records(session: &mut Session) -> Result<()> {
    session.actions_menu(contract::TRANSFER_TO_RECORDS)?;
    session.confirm_alert_dialog(contract::YES)?;
    session.wait_busy()?;
    session.settle();
    session.debug("Outcome and average carried to annual records");
    Ok(())
}

// --- Lock ---

/// Make the period's marks final.
pub fn lock_marks(session: &mut Session, context: &ClassPeriodContext) -> std::result::Result<(), DomainError> {
    session.remove_images();
    session.run(OperationKind::Lock, &context.class_id(), |s| {
        open_class_grid(s, context, true)?;
        let lock = s.wait_present(&contract::dialog_button(contract::LOCK_MARKS))?;
        s.scroll_and_click(&lock)?;
        s.confirm_dialog(contract::YES)?;
        s.debug_screen("Marks locked");
        s.wait_busy()?;
        s.logout()
    })
}
