//! Bounded polling waits over a [`Browser`].

use crate::browser::{Browser, ElementRef, Locator};
use crate::error::{AutomationError, Result};
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_SHORT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_ALERT_WINDOW: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(2);

/// Element-level state to wait for.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Presence(Locator),
    Visibility(Locator),
    /// Holds when the element is absent or hidden.
    Invisibility(Locator),
    AlertPresent,
    /// First of several alternatives to appear.
    AnyPresence(Vec<Locator>),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Presence(l) => write!(f, "presence of {}", l),
            Condition::Visibility(l) => write!(f, "visibility of {}", l),
            Condition::Invisibility(l) => write!(f, "invisibility of {}", l),
            Condition::AlertPresent => write!(f, "alert"),
            Condition::AnyPresence(ls) => {
                let names: Vec<String> = ls.iter().map(|l| l.to_string()).collect();
                write!(f, "presence of any of [{}]", names.join(", "))
            }
        }
    }
}

/// Timeout tier chosen per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Session default, for page loads.
    Long,
    /// Transient feedback such as confirmation dialogs.
    Short,
}

#[derive(Debug, Clone)]
pub struct Waiter {
    pub timeout: Duration,
    pub short_timeout: Duration,
    pub alert_window: Duration,
    pub poll_interval: Duration,
    /// Pause after actions whose completion the page does not signal.
    pub settle: Duration,
}

impl Default for Waiter {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            short_timeout: DEFAULT_SHORT_TIMEOUT,
            alert_window: DEFAULT_ALERT_WINDOW,
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle: DEFAULT_SETTLE,
        }
    }
}

impl Waiter {
    pub fn tier(&self, tier: Tier) -> Duration {
        match tier {
            Tier::Long => self.timeout,
            Tier::Short => self.short_timeout,
        }
    }

    /// Poll `check` until it yields a value or `timeout` elapses.
    ///
    /// `check` always runs at least once. Errors from `check` abort the wait.
    pub fn poll<T, F>(&self, timeout: Duration, what: &str, mut check: F) -> Result<T>
    where
        F: FnMut() -> Result<Option<T>>,
    {
        let start = Instant::now();
        loop {
            if let Some(value) = check()? {
                return Ok(value);
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(AutomationError::Timeout(format!(
                    "{} not satisfied within {}ms",
                    what,
                    timeout.as_millis()
                )));
            }
            thread::sleep(self.poll_interval.min(timeout - elapsed));
        }
    }

    /// Block until `condition` holds; element conditions return the element.
    pub fn until(
        &self,
        browser: &mut dyn Browser,
        condition: &Condition,
        timeout: Duration,
    ) -> Result<Option<ElementRef>> {
        let what = condition.to_string();
        self.poll(timeout, &what, || check(&mut *browser, condition))
    }

    /// Best-effort dialog check: `true` if a dialog shows up within the
    /// check window. Failures count as "no dialog".
    pub fn alert_shows(&self, browser: &mut dyn Browser) -> bool {
        self.until(browser, &Condition::AlertPresent, self.alert_window).is_ok()
    }
}

/// One evaluation of `condition`: `Some(found)` when it holds.
fn check(browser: &mut dyn Browser, condition: &Condition) -> Result<Option<Option<ElementRef>>> {
    match condition {
        Condition::Presence(locator) => Ok(browser.find_element(locator)?.map(Some)),
        Condition::Visibility(locator) => match browser.find_element(locator)? {
            Some(el) => match browser.is_displayed(&el) {
                Ok(true) => Ok(Some(Some(el))),
                Ok(false) | Err(AutomationError::NotFound(_)) => Ok(None),
                Err(e) => Err(e),
            },
            None => Ok(None),
        },
        Condition::Invisibility(locator) => match browser.find_element(locator)? {
            None => Ok(Some(None)),
            Some(el) => match browser.is_displayed(&el) {
                Ok(true) => Ok(None),
                Ok(false) | Err(AutomationError::NotFound(_)) => Ok(Some(None)),
                Err(e) => Err(e),
            },
        },
        Condition::AlertPresent => Ok(browser.alert_present()?.then_some(None)),
        Condition::AnyPresence(locators) => {
            for locator in locators {
                if let Some(el) = browser.find_element(locator)? {
                    return Ok(Some(Some(el)));
                }
            }
            Ok(None)
        }
    }
}
