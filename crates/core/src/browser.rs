//! The browser capability the engine drives.
//!
//! `Browser` covers locating, acting and reading. Waiting is layered on
//! top by [`crate::wait`], and the concrete W3C client lives in
//! [`crate::webdriver`].

use crate::error::Result;
use std::fmt;
use std::path::Path;

/// How to find an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    Name(String),
    XPath(String),
    Tag(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Locator::Name(name.into())
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Locator::XPath(xpath.into())
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Locator::Tag(tag.into())
    }

    /// W3C location strategy and selector value.
    ///
    /// Ids in the target application contain `:` which CSS would need to
    /// escape, so ids and names are expressed as XPath.
    pub fn strategy(&self) -> (&'static str, String) {
        match self {
            Locator::Id(id) => ("xpath", format!("//*[@id={}]", xpath_literal(id))),
            Locator::Name(name) => ("xpath", format!("//*[@name={}]", xpath_literal(name))),
            Locator::XPath(xpath) => ("xpath", xpath.clone()),
            Locator::Tag(tag) => ("tag name", tag.clone()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(v) => write!(f, "id={}", v),
            Locator::Name(v) => write!(f, "name={}", v),
            Locator::XPath(v) => write!(f, "xpath={}", v),
            Locator::Tag(v) => write!(f, "tag={}", v),
        }
    }
}

/// Quote `value` as an XPath string literal, whatever quotes it contains.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value.split('"').map(|p| format!("\"{}\"", p)).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

/// Opaque handle to an element on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

/// Special keys sent through `send_keys`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Return,
    ArrowDown,
    ArrowRight,
}

impl Key {
    /// Codepoint from the WebDriver key table.
    pub fn code(&self) -> char {
        match self {
            Key::Return => '\u{E006}',
            Key::ArrowRight => '\u{E014}',
            Key::ArrowDown => '\u{E015}',
        }
    }
}

pub trait Browser {
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// First element matching `locator`, or `None`.
    fn find_element(&mut self, locator: &Locator) -> Result<Option<ElementRef>>;

    fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementRef>>;

    /// Search relative to `parent`; XPath locators are evaluated with `parent`
    /// as the context node.
    fn find_child(&mut self, parent: &ElementRef, locator: &Locator) -> Result<Option<ElementRef>>;

    fn find_children(&mut self, parent: &ElementRef, locator: &Locator) -> Result<Vec<ElementRef>>;

    fn click(&mut self, element: &ElementRef) -> Result<()>;

    fn clear(&mut self, element: &ElementRef) -> Result<()>;

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<()>;

    /// DOM property when present, markup attribute otherwise.
    fn attribute(&mut self, element: &ElementRef, name: &str) -> Result<Option<String>>;

    /// Rendered (visible) text.
    fn text(&mut self, element: &ElementRef) -> Result<String>;

    fn is_displayed(&mut self, element: &ElementRef) -> Result<bool>;

    fn scroll_into_view(&mut self, element: &ElementRef) -> Result<()>;

    /// Click through a script, for headers the grid keeps under an overlay.
    fn script_click(&mut self, element: &ElementRef) -> Result<()>;

    fn switch_to_default_content(&mut self) -> Result<()>;

    fn switch_to_frame(&mut self, frame: &ElementRef) -> Result<()>;

    /// Whether a native dialog is open right now. Never waits.
    fn alert_present(&mut self) -> Result<bool>;

    fn accept_alert(&mut self) -> Result<()>;

    fn screenshot(&mut self, path: &Path) -> Result<()>;

    fn quit(&mut self) -> Result<()>;

    fn send_key(&mut self, element: &ElementRef, key: Key) -> Result<()> {
        self.send_keys(element, &key.code().to_string())
    }

    /// `textContent`, including text hidden from rendering.
    fn text_content(&mut self, element: &ElementRef) -> Result<String> {
        Ok(self.attribute(element, "textContent")?.unwrap_or_default())
    }
}
