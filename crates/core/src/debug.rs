//! Per-run debug sink: a plain-text log plus numbered screenshots.

use crate::browser::Browser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How much the sink records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DebugLevel {
    /// Nothing is written.
    None,
    /// Log lines only.
    Normal,
    /// Log lines and a screenshot for every step that asks for one.
    Screen,
}

impl FromStr for DebugLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(DebugLevel::None),
            "NORMAL" => Ok(DebugLevel::Normal),
            "SCREEN" => Ok(DebugLevel::Screen),
            other => Err(format!("unknown debug level: {}", other)),
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DebugLevel::None => "NONE",
            DebugLevel::Normal => "NORMAL",
            DebugLevel::Screen => "SCREEN",
        };
        f.write_str(s)
    }
}

pub struct DebugSink {
    level: DebugLevel,
    dir: PathBuf,
    base: String,
    step: u32,
}

impl DebugSink {
    pub fn new(level: DebugLevel, dir: impl Into<PathBuf>, base: impl Into<String>) -> Self {
        Self {
            level,
            dir: dir.into(),
            base: base.into(),
            step: 0,
        }
    }

    pub fn level(&self) -> DebugLevel {
        self.level
    }

    /// Number of screenshots taken so far.
    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.base))
    }

    pub fn screenshot_path(&self, step: u32) -> PathBuf {
        self.dir.join(format!("{}_{:03}.png", self.base, step))
    }

    /// Append `::: message` to the log file.
    pub fn message(&mut self, message: &str) -> io::Result<()> {
        log::debug!("{}", message);
        if self.level == DebugLevel::None {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())?;
        writeln!(file, "::: {}", message)
    }

    /// Save the next numbered screenshot when running at `SCREEN` level.
    pub fn capture(&mut self, browser: &mut dyn Browser) -> crate::error::Result<Option<PathBuf>> {
        if self.level != DebugLevel::Screen {
            return Ok(None);
        }
        let path = self.screenshot_path(self.step);
        browser.screenshot(&path)?;
        self.step += 1;
        Ok(Some(path))
    }

    /// Delete every screenshot of this sink's base name. Returns how many.
    pub fn remove_images(&self) -> io::Result<usize> {
        remove_images(&self.dir, &self.base)
    }
}

pub fn remove_images(dir: &Path, base: &str) -> io::Result<usize> {
    let mut removed = 0;
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(base) && name.ends_with(".png") {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}
