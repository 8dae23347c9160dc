//! Monthly class absences: entry, verification and register printouts.

use super::{content, rendered, GridRow};
use crate::browser::{ElementRef, Key, Locator};
use crate::context::SchoolClass;
use crate::contract;
use crate::error::{AutomationError, DomainError, OperationKind, Result};
use crate::markers::{self, MonthMarkers, SCHOOL_MONTHS};
use crate::reconcile::{self, RowSource};
use crate::records::{AbsenceEntry, ByName, ClassAbsences, MonthAbsences};
use crate::session::Session;
use std::fs;
use std::path::PathBuf;

const APPLICATION: &str = "Alunni Web";

/// Unfolds "Assenze" inside the curriculum menu.
const ABSENCES_MENU_KEYS: [Key; 8] = [
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowRight,
];

/// Reaches the absence register inside the printouts menu.
const REGISTER_MENU_KEYS: [Key; 12] = [
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowRight,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowDown,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Enter,
    Check,
}

fn login(session: &mut Session) -> Result<()> {
    session.login(APPLICATION)?;
    let version = session.versions().absences.clone();
    session.check_version(&Locator::id(contract::VERSION_ELEMENT), &version)
}

fn open_class_absences(session: &mut Session, data: &ClassAbsences) -> Result<()> {
    session.submenu(
        contract::MENU_CURRICULUM,
        contract::OPTION_ABSENCES,
        &ABSENCES_MENU_KEYS,
        contract::OPTION_CLASS_ABSENCES,
    )?;
    session.choose_class_in_list(&data.class, Some(data.school_year))?;
    session.wait_visible(&contract::absence_class_banner(&data.class.year, &data.class.section))?;
    Ok(())
}

/// Enter absences month by month, skipping months already on record in
/// `markers`. Each month is recorded as soon as it is saved.
pub fn import_absences(
    session: &mut Session,
    data: &ClassAbsences,
    markers: &mut MonthMarkers,
) -> std::result::Result<(), DomainError> {
    session.remove_images();
    session.run(OperationKind::Import, &data.class.id(), |s| {
        let months = supplied_months(data, &markers.pending())?;
        login(s)?;
        open_class_absences(s, data)?;
        for expected in months {
            select_month(s, data.school_year, expected.month)?;
            walk_month(s, Mode::Enter, data.school_year, expected)?;
            markers.mark_done(expected.month)?;
        }
        s.logout()
    })
}

/// Compare the selected absence kind of every day with `data`.
pub fn verify_absences(session: &mut Session, data: &ClassAbsences) -> std::result::Result<(), DomainError> {
    session.run(OperationKind::Verify, &data.class.id(), |s| {
        let months = supplied_months(data, &SCHOOL_MONTHS)?;
        login(s)?;
        open_class_absences(s, data)?;
        for expected in months {
            select_month(s, data.school_year, expected.month)?;
            walk_month(s, Mode::Check, data.school_year, expected)?;
        }
        s.logout()
    })
}

/// Data of every month in `months`; a missing month stops the run.
fn supplied_months<'a>(data: &'a ClassAbsences, months: &[u32]) -> Result<Vec<&'a MonthAbsences>> {
    months
        .iter()
        .map(|&month| {
            data.month(month)
                .ok_or_else(|| AutomationError::not_found(format!("no absences for month {}", month)))
        })
        .collect()
}

fn select_month(session: &mut Session, school_year: i32, month: u32) -> Result<()> {
    let label = markers::month_label(school_year, month)
        .ok_or_else(|| AutomationError::other(format!("invalid month {}", month)))?;
    session.debug(&format!("Absences for {}", label));
    session.wait_loading()?;
    session.combobox(contract::ABSENCE_MONTH_COMBO, &label)
}

/// Day of month at the start of a day-row label such as `"5 Lun"` or `"12"`.
pub fn day_number(label: &str) -> Option<u32> {
    let head: String = label.trim().chars().take(2).collect();
    head.trim().parse().ok()
}

/// Student list of the class absence screen.
struct AbsenceGrid<'s> {
    session: &'s mut Session,
    mode: Mode,
    /// `MM/YYYY`, for the debug log.
    period: String,
}

impl AbsenceGrid<'_> {
    fn open_student(&mut self, row: &GridRow) -> Result<String> {
        let s = &mut *self.session;
        let name: String = rendered(s, &row.element)?.split_whitespace().collect();
        s.scroll_and_click(&row.element)?;
        s.wait_loading()?;
        s.wait_visible(&contract::absence_student_header(&name))?;
        s.wait_visible(&contract::absence_day_table())?;
        Ok(name)
    }

    fn student(&mut self, row: &GridRow, entry: &AbsenceEntry) -> Result<()> {
        let name = self.open_student(row)?;
        let days = self.session.browser().find_elements(&contract::absence_day_rows())?;
        for day_row in days {
            self.session.browser().scroll_into_view(&day_row)?;
            let (position, day) = self.day_of(&day_row)?;
            let absent = entry.absent_on(day);
            match self.mode {
                Mode::Enter => self.set_day(&day_row, position, absent)?,
                Mode::Check => self.check_day(&day_row, &name, day, absent)?,
            }
            if absent {
                self.session
                    .debug(&format!("*** Student \"{}\" absent on {}/{}", name, day, self.period));
            }
        }
        let s = &mut *self.session;
        if self.mode == Mode::Enter {
            s.click(&contract::absence_save())?;
            s.accept_alert_if_present()?;
            s.wait_loading()?;
            s.accept_alert_if_present()?;
        }
        s.click(&contract::absence_close())?;
        s.wait_loading()
    }

    /// Drop-down position and day of month of a day row.
    fn day_of(&mut self, day_row: &ElementRef) -> Result<(usize, u32)> {
        let s = &mut *self.session;
        let id = s.attribute(day_row, "id")?;
        let position = id
            .rsplit_once(":row_")
            .and_then(|(_, n)| n.parse().ok())
            .ok_or_else(|| AutomationError::other(format!("unexpected day row id \"{}\"", id)))?;
        let label = s.find_in(day_row, &contract::absence_day_label())?;
        let text = rendered(s, &label)?;
        let day = day_number(&text)
            .ok_or_else(|| AutomationError::other(format!("unexpected day label \"{}\"", text)))?;
        Ok((position, day))
    }

    /// Pick `option` in the drop-down opened for day row `position`.
    fn pick(&mut self, day_row: &ElementRef, column: usize, option: &str, position: usize, sibling: Option<&str>) -> Result<()> {
        let s = &mut *self.session;
        let combo = s.find_in(day_row, &contract::absence_day_combo(column))?;
        s.browser().click(&combo)?;
        let options = s.browser().find_elements(&contract::dropdown_option(option))?;
        let mut cell = options
            .get(position)
            .cloned()
            .ok_or_else(|| AutomationError::not_found(format!("drop-down {} for day row {}", option, position)))?;
        if let Some(sibling) = sibling {
            cell = s.find_in(&cell, &contract::dropdown_sibling(sibling))?;
        }
        s.scroll_and_click(&cell)?;
        s.wait_loading()
    }

    fn set_day(&mut self, day_row: &ElementRef, position: usize, absent: bool) -> Result<()> {
        if absent {
            self.pick(day_row, 2, contract::ABSENT, position, None)?;
            self.pick(day_row, 3, contract::ABSENCE_REASON, position, None)
        } else {
            self.pick(day_row, 2, contract::ABSENT, position, Some(contract::NOT_ABSENT))
        }
    }

    fn check_day(&mut self, day_row: &ElementRef, name: &str, day: u32, absent: bool) -> Result<()> {
        let s = &mut *self.session;
        let input = s.find_in(day_row, &contract::absence_day_value())?;
        let value = s.attribute(&input, "value")?;
        let shown_absent = value.trim() == contract::ABSENT;
        if shown_absent != absent {
            return Err(AutomationError::not_found(format!(
                "student \"{}\": day {}/{} shows \"{}\"",
                name,
                day,
                self.period,
                value.trim()
            )));
        }
        Ok(())
    }
}

impl RowSource for AbsenceGrid<'_> {
    type Row = GridRow;

    fn row_at(&mut self, cursor: usize) -> Result<Option<GridRow>> {
        Ok(self
            .session
            .try_find(&contract::absence_row_link(cursor + 1))?
            .map(|element| GridRow { index: cursor, element }))
    }

    fn label(&mut self, row: &GridRow) -> Result<String> {
        content(self.session, &row.element)
    }

    fn is_withdrawn(&mut self, row: &GridRow) -> Result<bool> {
        Ok(self
            .session
            .browser()
            .find_child(&row.element, &contract::absence_row_withdrawn())?
            .is_some())
    }
}

fn walk_month(session: &mut Session, mode: Mode, school_year: i32, expected: &MonthAbsences) -> Result<()> {
    let period = format!("{:02}/{}", expected.month, markers::calendar_year(school_year, expected.month));
    let students: Vec<ByName<'_, AbsenceEntry>> = expected.students.iter().map(ByName).collect();
    let mut grid = AbsenceGrid {
        session: &mut *session,
        mode,
        period: period.clone(),
    };
    reconcile::walk(&mut grid, &students, |grid, row, _, record| {
        grid.student(row, &record.0.payload)
    })?;
    session.debug_screen(&format!("Absences of {} done", period));
    Ok(())
}

/// Save the monthly absence register of every school month as PDF and
/// return the renamed files.
pub fn download_absence_reports(
    session: &mut Session,
    class: &SchoolClass,
    school_year: i32,
) -> std::result::Result<Vec<PathBuf>, DomainError> {
    session.remove_images();
    session.run(OperationKind::Download, &class.id(), |s| {
        login(s)?;
        let dir = s.download_dir().clone();
        let fresh = dir.join(format!("{}.pdf", contract::ABSENCE_REPORT));
        let mut saved = Vec::new();
        for month in SCHOOL_MONTHS {
            let name = markers::month_name(month)
                .ok_or_else(|| AutomationError::other(format!("invalid month {}", month)))?;
            if fresh.exists() {
                fs::remove_file(&fresh)?;
            }
            s.menu(contract::MENU_PRINTOUTS, contract::OPTION_ABSENCE_REGISTER, &REGISTER_MENU_KEYS, None)?;
            s.choose_class_in_list(class, Some(school_year))?;
            s.wait_visible(&contract::report_options_sheet())?;
            s.combobox(contract::REPORT_MONTH_COMBO, name)?;
            s.button(contract::REPORT_OPTIONS_FORM, contract::CONFIRM, &contract::print_options_sheet())?;
            s.combobox(contract::PRINT_OPERATION_COMBO, contract::SAVE_PDF)?;
            s.button(contract::PRINT_OPTIONS_FORM, contract::CONFIRM, &contract::status_bar())?;

            let waiter = s.waiter().clone();
            waiter.poll(waiter.timeout, "absence register download", || Ok(fresh.exists().then_some(())))?;
            let target = dir.join(format!("{}-{}-{}.pdf", contract::ABSENCE_REPORT, class.id(), month));
            fs::rename(&fresh, &target)?;
            s.debug_screen(&format!("Absence register for {} saved as {}", name, target.display()));
            saved.push(target);
        }
        s.logout()?;
        Ok(saved)
    })
}
