//! Scripted in-memory browser for driving sessions without Firefox.

#![allow(dead_code)]

use argosync_core::browser::{Browser, ElementRef, Locator};
use argosync_core::contract;
use argosync_core::config::DriverConfig;
use argosync_core::debug::DebugLevel;
use argosync_core::error::{AutomationError, Result};
use argosync_core::secret::Credentials;
use argosync_core::session::Session;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;

/// Everything the fake knows about the current page.
#[derive(Default)]
pub struct Page {
    pub elements: HashMap<Locator, Vec<ElementRef>>,
    pub children: HashMap<(ElementRef, Locator), Vec<ElementRef>>,
    pub attributes: HashMap<(ElementRef, String), String>,
    pub texts: HashMap<ElementRef, String>,
    pub hidden: HashSet<ElementRef>,
    /// Lookups a locator must see before it resolves.
    pub delays: HashMap<Locator, usize>,
    pub lookups: HashMap<Locator, usize>,
    pub alert_open: bool,
    /// Text changes a click on the key element applies.
    pub on_click: HashMap<ElementRef, Vec<(ElementRef, String)>>,
    pub actions: Vec<String>,
    pub quit: bool,
}

/// Cheap to clone; clones share the same page so a test can inspect what a
/// session did with the copy it owns.
#[derive(Clone, Default)]
pub struct FakeBrowser {
    pub page: Rc<RefCell<Page>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element reachable through `locator`.
    pub fn add(&self, locator: Locator, id: &str) -> ElementRef {
        let el = ElementRef(id.to_string());
        self.page
            .borrow_mut()
            .elements
            .entry(locator)
            .or_default()
            .push(el.clone());
        el
    }

    pub fn add_child(&self, parent: &ElementRef, locator: Locator, id: &str) -> ElementRef {
        let el = ElementRef(id.to_string());
        self.page
            .borrow_mut()
            .children
            .entry((parent.clone(), locator))
            .or_default()
            .push(el.clone());
        el
    }

    pub fn remove(&self, locator: &Locator) {
        self.page.borrow_mut().elements.remove(locator);
    }

    pub fn set_text(&self, el: &ElementRef, text: &str) {
        self.page.borrow_mut().texts.insert(el.clone(), text.to_string());
    }

    pub fn set_attr(&self, el: &ElementRef, name: &str, value: &str) {
        self.page
            .borrow_mut()
            .attributes
            .insert((el.clone(), name.to_string()), value.to_string());
    }

    pub fn hide(&self, el: &ElementRef) {
        self.page.borrow_mut().hidden.insert(el.clone());
    }

    /// Make `locator` resolve only from its `n`-th lookup on.
    pub fn delay(&self, locator: Locator, n: usize) {
        self.page.borrow_mut().delays.insert(locator, n);
    }

    /// When `trigger` is clicked, `target` starts showing `text`.
    pub fn on_click_show(&self, trigger: &ElementRef, target: &ElementRef, text: &str) {
        self.page
            .borrow_mut()
            .on_click
            .entry(trigger.clone())
            .or_default()
            .push((target.clone(), text.to_string()));
    }

    /// Register an element showing `text`.
    pub fn add_text(&self, locator: Locator, id: &str, text: &str) -> ElementRef {
        let el = self.add(locator, id);
        self.set_text(&el, text);
        el
    }

    pub fn open_alert(&self) {
        self.page.borrow_mut().alert_open = true;
    }

    pub fn actions(&self) -> Vec<String> {
        self.page.borrow().actions.clone()
    }

    pub fn has_quit(&self) -> bool {
        self.page.borrow().quit
    }

    fn record(&self, action: String) {
        self.page.borrow_mut().actions.push(action);
    }
}

impl Browser for FakeBrowser {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.record(format!("navigate {}", url));
        Ok(())
    }

    fn find_element(&mut self, locator: &Locator) -> Result<Option<ElementRef>> {
        Ok(self.find_elements(locator)?.into_iter().next())
    }

    fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementRef>> {
        let mut page = self.page.borrow_mut();
        let seen = {
            let count = page.lookups.entry(locator.clone()).or_default();
            *count += 1;
            *count
        };
        if page.delays.get(locator).is_some_and(|&n| seen < n) {
            return Ok(Vec::new());
        }
        Ok(page.elements.get(locator).cloned().unwrap_or_default())
    }

    fn find_child(&mut self, parent: &ElementRef, locator: &Locator) -> Result<Option<ElementRef>> {
        Ok(self.find_children(parent, locator)?.into_iter().next())
    }

    fn find_children(&mut self, parent: &ElementRef, locator: &Locator) -> Result<Vec<ElementRef>> {
        let page = self.page.borrow();
        Ok(page
            .children
            .get(&(parent.clone(), locator.clone()))
            .cloned()
            .unwrap_or_default())
    }

    fn click(&mut self, element: &ElementRef) -> Result<()> {
        self.record(format!("click {}", element.0));
        let mut page = self.page.borrow_mut();
        let changes = page.on_click.get(element).cloned().unwrap_or_default();
        for (target, text) in changes {
            page.texts.insert(target, text);
        }
        Ok(())
    }

    fn clear(&mut self, element: &ElementRef) -> Result<()> {
        self.record(format!("clear {}", element.0));
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<()> {
        self.record(format!("keys {} {}", element.0, text));
        Ok(())
    }

    fn attribute(&mut self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let page = self.page.borrow();
        if name == "textContent" {
            if let Some(text) = page.texts.get(element) {
                return Ok(Some(text.clone()));
            }
        }
        Ok(page.attributes.get(&(element.clone(), name.to_string())).cloned())
    }

    fn text(&mut self, element: &ElementRef) -> Result<String> {
        Ok(self.page.borrow().texts.get(element).cloned().unwrap_or_default())
    }

    fn is_displayed(&mut self, element: &ElementRef) -> Result<bool> {
        Ok(!self.page.borrow().hidden.contains(element))
    }

    fn scroll_into_view(&mut self, element: &ElementRef) -> Result<()> {
        self.record(format!("scroll {}", element.0));
        Ok(())
    }

    fn script_click(&mut self, element: &ElementRef) -> Result<()> {
        self.record(format!("script-click {}", element.0));
        Ok(())
    }

    fn switch_to_default_content(&mut self) -> Result<()> {
        self.record("frame default".to_string());
        Ok(())
    }

    fn switch_to_frame(&mut self, frame: &ElementRef) -> Result<()> {
        self.record(format!("frame {}", frame.0));
        Ok(())
    }

    fn alert_present(&mut self) -> Result<bool> {
        Ok(self.page.borrow().alert_open)
    }

    fn accept_alert(&mut self) -> Result<()> {
        let mut page = self.page.borrow_mut();
        if !page.alert_open {
            return Err(AutomationError::not_found("no alert open"));
        }
        page.alert_open = false;
        page.actions.push("accept alert".to_string());
        Ok(())
    }

    fn screenshot(&mut self, path: &Path) -> Result<()> {
        std::fs::write(path, b"png")?;
        self.record(format!("screenshot {}", path.display()));
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        self.page.borrow_mut().quit = true;
        Ok(())
    }
}

/// Configuration with zero waits, so a missing element fails on first look.
pub fn fast_config(log_dir: &Path) -> DriverConfig {
    DriverConfig {
        timeout_secs: 0,
        short_timeout_secs: 0,
        alert_window_secs: 0,
        poll_interval_ms: 1,
        settle_ms: 0,
        debug: DebugLevel::None,
        log_dir: log_dir.to_path_buf(),
        school_name: "ISTITUTO DI PROVA".to_string(),
        ..DriverConfig::default()
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        username: "docente".to_string(),
        password: "segreta".to_string(),
    }
}

/// A session over `browser` with zero waits.
pub fn session(browser: &FakeBrowser, log_dir: &Path) -> Session {
    Session::new(Box::new(browser.clone()), Box::new(credentials()), &fast_config(log_dir))
}

/// Login form, landing page, `version` banner in `version_element` and the
/// way back to the portal.
pub fn portal(browser: &FakeBrowser, version_element: &str, version: &str) {
    browser.add(Locator::name(contract::LOGIN_FORM), "form");
    browser.add(Locator::id(contract::USERNAME_INPUT), "user");
    browser.add(Locator::id(contract::PASSWORD_INPUT), "pass");
    browser.add(Locator::name(contract::SUBMIT), "submit");
    browser.add(Locator::id("_idJsp181"), "landing");
    browser.add_text(Locator::id(version_element), "version", version);
    browser.add(contract::toolbar_button(contract::RETURN_TO_PORTAL), "portal");
    browser.add(contract::portal_home(), "home");
}

/// Class-search list holding one row for `year` and `section`.
pub fn class_list(browser: &FakeBrowser, year: &str, section: &str) {
    browser.add(contract::class_search_root("ISTITUTO DI PROVA"), "school");
    browser.add(contract::class_search_tree_node(), "school-node");
    browser.add(contract::class_list_ready(), "class-list");
    let row = browser.add(contract::class_list_rows(), "class-row");
    let mut last = None;
    for (i, text) in ["LICEO", year, section].iter().enumerate() {
        let cell = browser.add_child(&row, contract::class_list_values(), &format!("class-cell-{}", i));
        browser.set_text(&cell, text);
        last = Some(cell);
    }
    if let Some(cell) = last {
        browser.add_child(&cell, contract::grandparent(), "class-link");
    }
    browser.add(contract::class_search_confirm(), "class-confirm");
}
