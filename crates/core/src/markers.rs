//! Per-class record of absence months already committed.
//!
//! One month number per line in `<dir>/<year><section>-months.done`. A month
//! is appended only after its save went through, so an interrupted import
//! resumes at the first month not on file.

use crate::context::SchoolClass;
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Months of a school year in calendar order, September to June.
pub const SCHOOL_MONTHS: [u32; 10] = [9, 10, 11, 12, 1, 2, 3, 4, 5, 6];

const MONTH_NAMES: [&str; 12] = [
    "Gennaio",
    "Febbraio",
    "Marzo",
    "Aprile",
    "Maggio",
    "Giugno",
    "Luglio",
    "Agosto",
    "Settembre",
    "Ottobre",
    "Novembre",
    "Dicembre",
];

/// Italian month name, as the application lists it.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get((month as usize).checked_sub(1)?).copied()
}

/// Calendar year a school-year month falls in.
pub fn calendar_year(school_year: i32, month: u32) -> i32 {
    if month >= 9 {
        school_year
    } else {
        school_year + 1
    }
}

/// Month entry of the absence screen, e.g. `"Settembre 2019"`.
pub fn month_label(school_year: i32, month: u32) -> Option<String> {
    month_name(month).map(|name| format!("{} {}", name, calendar_year(school_year, month)))
}

#[derive(Debug)]
pub struct MonthMarkers {
    path: PathBuf,
    done: BTreeSet<u32>,
}

impl MonthMarkers {
    pub fn path_for(dir: &Path, class: &SchoolClass) -> PathBuf {
        dir.join(format!("{}-months.done", class.id()))
    }

    /// Read the marker file for `class`; a missing file means no month done.
    pub fn load(dir: &Path, class: &SchoolClass) -> io::Result<Self> {
        let path = Self::path_for(dir, class);
        let mut done = BTreeSet::new();
        match fs::read_to_string(&path) {
            Ok(text) => {
                for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    match line.parse() {
                        Ok(month) => {
                            done.insert(month);
                        }
                        Err(_) => log::warn!("ignoring bad marker line {:?} in {}", line, path.display()),
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Ok(Self { path, done })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_done(&self, month: u32) -> bool {
        self.done.contains(&month)
    }

    /// Months of the school year still to import, in order.
    pub fn pending(&self) -> Vec<u32> {
        SCHOOL_MONTHS.iter().copied().filter(|m| !self.is_done(*m)).collect()
    }

    /// Record `month` as committed and flush it to disk.
    pub fn mark_done(&mut self, month: u32) -> io::Result<()> {
        if !self.done.insert(month) {
            return Ok(());
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", month)?;
        file.flush()
    }
}
