//! W3C WebDriver client driving a Firefox session.
//! Gated behind the "webdriver" feature flag.

use crate::browser::{Browser, ElementRef, Locator};
use crate::config::DriverConfig;
use crate::error::{AutomationError, Result};
use base64::Engine;
use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Key under which the protocol wraps element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Map a protocol error code to an engine error.
fn protocol_error(code: &str, message: &str) -> AutomationError {
    match code {
        "no such element" | "stale element reference" | "no such frame" | "no such alert" => {
            AutomationError::not_found(format!("{}: {}", code, message))
        }
        "timeout" | "script timeout" => AutomationError::Timeout(format!("{}: {}", code, message)),
        _ => AutomationError::other(format!("{}: {}", code, message)),
    }
}

fn element_arg(element: &ElementRef) -> Value {
    json!({ ELEMENT_KEY: element.0 })
}

fn element_from(value: &Value) -> Result<ElementRef> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(|id| ElementRef(id.to_string()))
        .ok_or_else(|| AutomationError::other(format!("not an element reference: {}", value)))
}

fn elements_from(value: &Value) -> Result<Vec<ElementRef>> {
    value
        .as_array()
        .ok_or_else(|| AutomationError::other(format!("not an element list: {}", value)))?
        .iter()
        .map(element_from)
        .collect()
}

/// `Ok(None)` for a missing element, the error otherwise.
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AutomationError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Property or attribute value rendered as text; `false` and null are absent.
fn attribute_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Firefox capabilities: window mode and silent PDF downloads.
pub fn capabilities(config: &DriverConfig) -> Value {
    let mut args = Vec::new();
    if !config.local {
        args.push("-headless");
    }
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "firefox",
                "acceptInsecureCerts": true,
                "timeouts": { "pageLoad": config.timeout_secs * 1000 },
                "moz:firefoxOptions": {
                    "args": args,
                    "prefs": {
                        "browser.download.folderList": 2,
                        "browser.download.useDownloadDir": true,
                        "browser.download.dir": config.download_dir().display().to_string(),
                        "browser.download.manager.showWhenStarting": false,
                        "browser.helperApps.neverAsk.saveToDisk": "application/pdf",
                        "pdfjs.disabled": true
                    }
                }
            }
        }
    })
}

pub struct WebDriver {
    client: Client,
    base: Url,
    session_id: String,
    closed: bool,
}

impl WebDriver {
    /// Start a browser session on the configured WebDriver endpoint.
    pub fn connect(config: &DriverConfig) -> Result<Self> {
        let base = Url::parse(&format!("{}/", config.webdriver_url.trim_end_matches('/')))
            .map_err(|e| AutomationError::other(format!("invalid WebDriver URL: {}", e)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs + 30))
            .build()
            .map_err(|e| AutomationError::other(format!("HTTP client: {}", e)))?;

        let url = base
            .join("session")
            .map_err(|e| AutomationError::other(e.to_string()))?;
        let value = Self::send(&client, Method::POST, url, Some(capabilities(config)))?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| AutomationError::other("WebDriver returned no session id"))?
            .to_string();
        log::info!("browser session {} started", session_id);

        let driver = Self {
            client,
            base,
            session_id,
            closed: false,
        };
        driver.post(
            "window/rect",
            json!({ "width": config.width, "height": config.height }),
        )?;
        Ok(driver)
    }

    fn send(client: &Client, method: Method, url: Url, body: Option<Value>) -> Result<Value> {
        let mut request = client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request
            .send()
            .map_err(|e| AutomationError::other(format!("WebDriver: {}", e)))?;
        let status = response.status();
        let payload: Value = response
            .json()
            .map_err(|e| AutomationError::other(format!("WebDriver response: {}", e)))?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(value);
        }
        let code = value.get("error").and_then(Value::as_str).unwrap_or("unknown error");
        let message = value.get("message").and_then(Value::as_str).unwrap_or("");
        Err(protocol_error(code, message))
    }

    fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let suffix = if path.is_empty() {
            format!("session/{}", self.session_id)
        } else {
            format!("session/{}/{}", self.session_id, path)
        };
        let url = self
            .base
            .join(&suffix)
            .map_err(|e| AutomationError::other(e.to_string()))?;
        Self::send(&self.client, method, url, body)
    }

    fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.command(Method::POST, path, Some(body))
    }

    fn get(&self, path: &str) -> Result<Value> {
        self.command(Method::GET, path, None)
    }

    fn execute(&self, script: &str, element: &ElementRef) -> Result<Value> {
        self.post(
            "execute/sync",
            json!({ "script": script, "args": [element_arg(element)] }),
        )
    }

    fn locate(locator: &Locator) -> Value {
        let (using, value) = locator.strategy();
        json!({ "using": using, "value": value })
    }
}

impl Browser for WebDriver {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.post("url", json!({ "url": url }))?;
        Ok(())
    }

    fn find_element(&mut self, locator: &Locator) -> Result<Option<ElementRef>> {
        optional(self.post("element", Self::locate(locator)).and_then(|v| element_from(&v)))
    }

    fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementRef>> {
        elements_from(&self.post("elements", Self::locate(locator))?)
    }

    fn find_child(&mut self, parent: &ElementRef, locator: &Locator) -> Result<Option<ElementRef>> {
        let path = format!("element/{}/element", parent.0);
        optional(self.post(&path, Self::locate(locator)).and_then(|v| element_from(&v)))
    }

    fn find_children(&mut self, parent: &ElementRef, locator: &Locator) -> Result<Vec<ElementRef>> {
        let path = format!("element/{}/elements", parent.0);
        elements_from(&self.post(&path, Self::locate(locator))?)
    }

    fn click(&mut self, element: &ElementRef) -> Result<()> {
        self.post(&format!("element/{}/click", element.0), json!({}))?;
        Ok(())
    }

    fn clear(&mut self, element: &ElementRef) -> Result<()> {
        self.post(&format!("element/{}/clear", element.0), json!({}))?;
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<()> {
        self.post(&format!("element/{}/value", element.0), json!({ "text": text }))?;
        Ok(())
    }

    fn attribute(&mut self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let property = self.get(&format!("element/{}/property/{}", element.0, name))?;
        if !property.is_null() {
            return Ok(attribute_text(&property));
        }
        let attribute = self.get(&format!("element/{}/attribute/{}", element.0, name))?;
        Ok(attribute_text(&attribute))
    }

    fn text(&mut self, element: &ElementRef) -> Result<String> {
        let value = self.get(&format!("element/{}/text", element.0))?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn is_displayed(&mut self, element: &ElementRef) -> Result<bool> {
        let value = self.get(&format!("element/{}/displayed", element.0))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn scroll_into_view(&mut self, element: &ElementRef) -> Result<()> {
        self.execute("arguments[0].scrollIntoView();", element)?;
        Ok(())
    }

    fn script_click(&mut self, element: &ElementRef) -> Result<()> {
        self.execute("arguments[0].click();", element)?;
        Ok(())
    }

    fn switch_to_default_content(&mut self) -> Result<()> {
        self.post("frame", json!({ "id": null }))?;
        Ok(())
    }

    fn switch_to_frame(&mut self, frame: &ElementRef) -> Result<()> {
        self.post("frame", json!({ "id": element_arg(frame) }))?;
        Ok(())
    }

    fn alert_present(&mut self) -> Result<bool> {
        match self.get("alert/text") {
            Ok(_) => Ok(true),
            Err(AutomationError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn accept_alert(&mut self) -> Result<()> {
        self.post("alert/accept", json!({}))?;
        Ok(())
    }

    fn screenshot(&mut self, path: &Path) -> Result<()> {
        let value = self.get("screenshot")?;
        let encoded = value
            .as_str()
            .ok_or_else(|| AutomationError::other("screenshot is not a string"))?;
        let png = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| AutomationError::other(format!("screenshot: {}", e)))?;
        std::fs::write(path, png)?;
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.command(Method::DELETE, "", None)?;
        log::info!("browser session {} closed", self.session_id);
        Ok(())
    }
}

impl Drop for WebDriver {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.quit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_errors_map_to_tiers() {
        assert!(matches!(protocol_error("no such element", ""), AutomationError::NotFound(_)));
        assert!(matches!(protocol_error("stale element reference", ""), AutomationError::NotFound(_)));
        assert!(matches!(protocol_error("timeout", ""), AutomationError::Timeout(_)));
        assert!(matches!(protocol_error("unknown command", ""), AutomationError::Other(_)));
    }

    #[test]
    fn test_attribute_text_follows_boolean_convention() {
        assert_eq!(attribute_text(&json!(true)), Some("true".to_string()));
        assert_eq!(attribute_text(&json!(false)), None);
        assert_eq!(attribute_text(&Value::Null), None);
        assert_eq!(attribute_text(&json!(3)), Some("3".to_string()));
        assert_eq!(attribute_text(&json!("3A")), Some("3A".to_string()));
    }

    #[test]
    fn test_element_reference_round_trip() {
        let el = ElementRef("abc".to_string());
        assert_eq!(element_from(&element_arg(&el)).unwrap(), el);
        assert!(element_from(&json!({ "foo": "bar" })).is_err());
    }

    #[test]
    fn test_headless_only_in_server_mode() {
        let mut config = DriverConfig::default();
        let caps = capabilities(&config);
        let args = &caps["capabilities"]["alwaysMatch"]["moz:firefoxOptions"]["args"];
        assert_eq!(args, &json!(["-headless"]));
        config.local = true;
        let caps = capabilities(&config);
        let args = &caps["capabilities"]["alwaysMatch"]["moz:firefoxOptions"]["args"];
        assert_eq!(args, &json!([]));
    }
}
