//! Authenticated browser session with waits, diagnostics and error
//! classification.

use crate::browser::{Browser, ElementRef, Key, Locator};
use crate::config::{DriverConfig, VersionPins};
use crate::contract;
use crate::debug::DebugSink;
use crate::error::{AutomationError, DomainError, OperationKind, Result};
use crate::secret::SecretProvider;
use crate::wait::{Condition, Tier, Waiter};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    LoggingIn,
    Authenticated,
    NavigatingModule,
    LoggingOut,
    /// An error escaped a workflow and was reported.
    Faulted,
}

/// The single driver session of a process.
pub struct Session {
    browser: Box<dyn Browser>,
    waiter: Waiter,
    sink: DebugSink,
    secrets: Box<dyn SecretProvider>,
    portal_url: String,
    school_name: String,
    versions: VersionPins,
    download_dir: PathBuf,
    log_dir: PathBuf,
    state: SessionState,
    username: Option<String>,
    started: Instant,
    closed: bool,
}

impl Session {
    pub fn new(browser: Box<dyn Browser>, secrets: Box<dyn SecretProvider>, config: &DriverConfig) -> Self {
        let mut session = Self {
            browser,
            waiter: config.waiter(),
            sink: DebugSink::new(config.debug, &config.log_dir, &config.log_file),
            secrets,
            portal_url: config.portal_url.clone(),
            school_name: config.school_name.clone(),
            versions: config.versions.clone(),
            download_dir: config.download_dir(),
            log_dir: config.log_dir.clone(),
            state: SessionState::Anonymous,
            username: None,
            started: Instant::now(),
            closed: false,
        };
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        session.debug(&format!("Driver started at {}", now));
        session.debug(&format!("Configuration: {}", config.summary()));
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub fn browser(&mut self) -> &mut dyn Browser {
        self.browser.as_mut()
    }

    pub fn waiter(&self) -> &Waiter {
        &self.waiter
    }

    pub fn versions(&self) -> &VersionPins {
        &self.versions
    }

    pub fn school_name(&self) -> &str {
        &self.school_name
    }

    pub fn download_dir(&self) -> &PathBuf {
        &self.download_dir
    }

    pub fn log_dir(&self) -> &PathBuf {
        &self.log_dir
    }

    /// Logged-in user name, once authenticated.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn debug_sink(&self) -> &DebugSink {
        &self.sink
    }

    // --- Diagnostics ---

    /// Append a line to the debug log. Sink failures are only warned about.
    pub fn debug(&mut self, message: &str) {
        if let Err(e) = self.sink.message(message) {
            log::warn!("debug log unavailable: {}", e);
        }
    }

    /// Append a line and, at `SCREEN` level, a screenshot of the page.
    pub fn debug_screen(&mut self, message: &str) {
        self.debug(message);
        if let Err(e) = self.sink.capture(self.browser.as_mut()) {
            log::warn!("screenshot failed: {}", e);
        }
    }

    pub fn remove_images(&mut self) {
        match self.sink.remove_images() {
            Ok(n) if n > 0 => log::debug!("removed {} screenshots", n),
            Ok(_) => {}
            Err(e) => log::warn!("cannot remove screenshots: {}", e),
        }
    }

    // --- Waits ---

    pub fn wait_for(&mut self, condition: Condition, tier: Tier) -> Result<Option<ElementRef>> {
        let timeout = self.waiter.tier(tier);
        self.waiter.until(self.browser.as_mut(), &condition, timeout)
    }

    /// Wait for an element to be attached to the page and return it.
    pub fn wait_present(&mut self, locator: &Locator) -> Result<ElementRef> {
        self.wait_for(Condition::Presence(locator.clone()), Tier::Long)?
            .ok_or_else(|| AutomationError::not_found(locator.to_string()))
    }

    pub fn wait_visible(&mut self, locator: &Locator) -> Result<ElementRef> {
        self.wait_for(Condition::Visibility(locator.clone()), Tier::Long)?
            .ok_or_else(|| AutomationError::not_found(locator.to_string()))
    }

    pub fn wait_visible_short(&mut self, locator: &Locator) -> Result<ElementRef> {
        self.wait_for(Condition::Visibility(locator.clone()), Tier::Short)?
            .ok_or_else(|| AutomationError::not_found(locator.to_string()))
    }

    pub fn wait_gone(&mut self, locator: &Locator) -> Result<()> {
        self.wait_for(Condition::Invisibility(locator.clone()), Tier::Long)?;
        Ok(())
    }

    /// Wait for the page-level loading overlay to go away.
    pub fn wait_loading(&mut self) -> Result<()> {
        self.wait_gone(&contract::loading_overlay())
    }

    /// Wait for the in-module busy message to go away.
    pub fn wait_busy(&mut self) -> Result<()> {
        self.wait_gone(&contract::busy_message())
    }

    /// Pause for feedback the page does not signal through the DOM.
    pub fn settle(&self) {
        if !self.waiter.settle.is_zero() {
            thread::sleep(self.waiter.settle);
        }
    }

    /// Probe for a native dialog and accept it. Returns whether one was open.
    pub fn accept_alert_if_present(&mut self) -> Result<bool> {
        if self.waiter.alert_shows(self.browser.as_mut()) {
            self.browser.accept_alert()?;
            return Ok(true);
        }
        Ok(false)
    }

    // --- Element helpers ---

    pub fn find(&mut self, locator: &Locator) -> Result<ElementRef> {
        self.browser
            .find_element(locator)?
            .ok_or_else(|| AutomationError::not_found(locator.to_string()))
    }

    pub fn try_find(&mut self, locator: &Locator) -> Result<Option<ElementRef>> {
        self.browser.find_element(locator)
    }

    pub fn find_in(&mut self, parent: &ElementRef, locator: &Locator) -> Result<ElementRef> {
        self.browser
            .find_child(parent, locator)?
            .ok_or_else(|| AutomationError::not_found(locator.to_string()))
    }

    pub fn click(&mut self, locator: &Locator) -> Result<ElementRef> {
        let el = self.find(locator)?;
        self.browser.click(&el)?;
        Ok(el)
    }

    pub fn scroll_and_click(&mut self, element: &ElementRef) -> Result<()> {
        self.browser.scroll_into_view(element)?;
        self.browser.click(element)
    }

    /// Clear an input, type `value` and confirm it with Return.
    pub fn type_and_confirm(&mut self, element: &ElementRef, value: &str) -> Result<()> {
        self.browser.clear(element)?;
        if !value.is_empty() {
            self.browser.send_keys(element, value)?;
        }
        self.browser.send_key(element, Key::Return)
    }

    pub fn attribute(&mut self, element: &ElementRef, name: &str) -> Result<String> {
        Ok(self.browser.attribute(element, name)?.unwrap_or_default())
    }

    // --- Lifecycle ---

    /// Sign in through the portal login form.
    ///
    /// Credentials are decrypted here and the password is dropped as soon as
    /// it has been typed.
    pub fn login(&mut self, application: &str) -> Result<()> {
        self.state = SessionState::LoggingIn;
        let credentials = self
            .secrets
            .credentials()
            .map_err(|e| AutomationError::other(format!("credentials: {}", e)))?;

        let url = self.portal_url.clone();
        self.browser.navigate(&url)?;
        self.wait_visible(&Locator::name(contract::LOGIN_FORM))?;
        self.debug_screen(&format!("Login page loaded {}", application));

        let user = self.find(&Locator::id(contract::USERNAME_INPUT))?;
        self.browser.clear(&user)?;
        self.browser.send_keys(&user, &credentials.username)?;
        let password = self.find(&Locator::id(contract::PASSWORD_INPUT))?;
        self.browser.clear(&password)?;
        self.browser.send_keys(&password, &credentials.password)?;
        let submit = self.find(&Locator::name(contract::SUBMIT))?;
        self.browser.send_key(&submit, Key::Return)?;
        self.debug_screen("Login form submitted");

        self.wait_for(Condition::AnyPresence(contract::landing_signals()), Tier::Long)?;
        self.wait_loading()?;

        self.username = Some(credentials.username);
        self.state = SessionState::Authenticated;
        self.debug_screen(&format!("Main page loaded {}", application));
        log::info!("logged in {}", application);
        Ok(())
    }

    /// Refuse to go on against an application release the steps were not
    /// written for.
    pub fn check_version(&mut self, locator: &Locator, expected: &str) -> Result<()> {
        let el = self.find(locator)?;
        let found = self.browser.text(&el)?;
        self.debug(&format!("Application version: {}", found));
        if found.trim() != expected {
            return Err(AutomationError::not_found(format!(
                "unexpected application version: {}",
                found.trim()
            )));
        }
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.state = SessionState::LoggingOut;
        self.browser.switch_to_default_content()?;
        if self.browser.alert_present()? {
            self.debug("Alert pending before logout");
            self.browser.accept_alert()?;
        }
        self.click(&contract::toolbar_button(contract::RETURN_TO_PORTAL))?;
        if self.accept_alert_if_present()? {
            self.debug("Alert at logout");
        }
        self.wait_present(&contract::portal_home())?;
        self.username = None;
        self.state = SessionState::Anonymous;
        self.debug_screen("Logged out");
        Ok(())
    }

    /// Run one top-level workflow, collapsing any failure into a
    /// [`DomainError`] after writing the cause to the debug log.
    pub fn run<T, F>(&mut self, operation: OperationKind, class_id: &str, body: F) -> std::result::Result<T, DomainError>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        log::info!("{} class {}", operation, class_id);
        match body(self) {
            Ok(value) => {
                self.debug("Completed without errors");
                Ok(value)
            }
            Err(err) => {
                let class = err.class();
                let banner = class.banner();
                self.state = SessionState::Faulted;
                self.debug_screen(&format!("{}\n{}\n{}", banner, err, "*".repeat(banner.len())));
                log::error!("{} class {} failed: {}", operation, class_id, err);
                Err(DomainError {
                    operation,
                    class_id: class_id.to_string(),
                    class,
                })
            }
        }
    }

    /// Quit the browser and log the session duration.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        let result = self.browser.quit();
        let elapsed = self.started.elapsed().as_secs();
        self.debug(&format!(
            "Driver stopped after {}:{:02}:{:02}",
            elapsed / 3600,
            elapsed / 60 % 60,
            elapsed % 60
        ));
        result
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.browser.quit() {
                log::warn!("browser did not quit cleanly: {}", e);
            }
        }
    }
}
