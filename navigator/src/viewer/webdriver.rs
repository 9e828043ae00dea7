//! Minimal W3C WebDriver client.
//!
//! Covers only what the viewers need: one session, navigation, element
//! lookup by tag, pointer actions, and synchronous script execution. The
//! browser itself is launched by the WebDriver server (e.g. chromedriver),
//! which must already be listening.
//!
//! # Example
//!
//! ```no_run
//! use navigator::viewer::WebDriverClient;
//!
//! let mut client = WebDriverClient::new("http://localhost:9515");
//! client.new_session(&["disable-infobars".to_string()])?;
//! client.navigate("http://www.gigapan.com/gigapans/117375")?;
//! let canvas = client.find_element_by_tag("canvas")?;
//! let rect = client.element_rect(&canvas)?;
//! println!("Canvas at ({}, {})", rect.x, rect.y);
//! # Ok::<(), navigator::viewer::ViewerError>(())
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace, warn};
use ureq::Agent;

use super::{ViewerError, ViewerResult};

/// Key under which W3C WebDriver serializes element references
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Page loads on the real Gigapan site can be slow
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque handle to a DOM element in the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}

/// Element position and size in CSS pixels, relative to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Coordinate origin for a pointer move
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Origin {
    /// `"viewport"` or `"pointer"`
    Named(&'static str),
    /// Offset from the element's center
    Element(ElementRef),
}

impl Origin {
    pub fn viewport() -> Self {
        Origin::Named("viewport")
    }
}

/// One step of a pointer input source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerAction {
    PointerMove {
        duration: u64,
        x: i64,
        y: i64,
        origin: Origin,
    },
    PointerDown {
        button: u8,
    },
    PointerUp {
        button: u8,
    },
}

impl PointerAction {
    /// Instant move to `(x, y)` relative to `origin`
    pub fn move_to(x: i64, y: i64, origin: Origin) -> Self {
        PointerAction::PointerMove {
            duration: 0,
            x,
            y,
            origin,
        }
    }

    pub fn down() -> Self {
        PointerAction::PointerDown { button: 0 }
    }

    pub fn up() -> Self {
        PointerAction::PointerUp { button: 0 }
    }
}

/// A blocking client bound to at most one WebDriver session.
///
/// The session is deleted (closing the browser) when the client is dropped.
pub struct WebDriverClient {
    agent: Agent,
    base_url: String,
    session_id: Option<String>,
}

impl WebDriverClient {
    /// Create a client for the WebDriver server at `base_url`.
    ///
    /// No request is made until [`new_session`](Self::new_session).
    pub fn new(base_url: &str) -> Self {
        // WebDriver reports failures as JSON bodies on 4xx/5xx; keep them readable
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(DEFAULT_TIMEOUT))
            .build();

        Self {
            agent: Agent::new_with_config(config),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    // === Internal HTTP helpers ===

    fn post(&self, path: &str, body: &Value) -> ViewerResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        trace!("WebDriver POST {path}: {body}");
        let mut response = self.agent.post(&url).send_json(body)?;
        let success = response.status().is_success();
        let payload: Value = response.body_mut().read_json()?;
        Self::unwrap_value(success, payload)
    }

    fn delete(&self, path: &str) -> ViewerResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        trace!("WebDriver DELETE {path}");
        let mut response = self.agent.delete(&url).call()?;
        let success = response.status().is_success();
        let payload: Value = response.body_mut().read_json()?;
        Self::unwrap_value(success, payload)
    }

    /// Pull `value` out of a response envelope, surfacing WebDriver errors
    fn unwrap_value(success: bool, mut payload: Value) -> ViewerResult<Value> {
        let value = payload
            .get_mut("value")
            .map(Value::take)
            .ok_or_else(|| ViewerError::InvalidResponse(format!("No value in {payload}")))?;

        if let Some(error) = value.get("error").and_then(Value::as_str) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            return Err(ViewerError::WebDriver {
                error: error.to_string(),
                message: message.to_string(),
            });
        }

        if !success {
            return Err(ViewerError::InvalidResponse(format!(
                "Request failed without error payload: {value}"
            )));
        }

        Ok(value)
    }

    fn session_path(&self, suffix: &str) -> ViewerResult<String> {
        let id = self.session_id.as_ref().ok_or(ViewerError::NoSession)?;
        Ok(format!("/session/{id}{suffix}"))
    }

    // === Session ===

    /// Start a Chrome session with the given command-line flags.
    ///
    /// Returns the new session id. Any previous session is deleted first.
    pub fn new_session(&mut self, chrome_args: &[String]) -> ViewerResult<String> {
        if self.session_id.is_some() {
            self.delete_session()?;
        }

        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": chrome_args },
                }
            }
        });
        let value = self.post("/session", &body)?;
        let id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| ViewerError::InvalidResponse(format!("No sessionId in {value}")))?
            .to_string();

        debug!("WebDriver session {id} started");
        self.session_id = Some(id.clone());
        Ok(id)
    }

    /// End the current session, if any
    pub fn delete_session(&mut self) -> ViewerResult<()> {
        let Some(id) = self.session_id.take() else {
            return Ok(());
        };
        self.delete(&format!("/session/{id}"))?;
        debug!("WebDriver session {id} deleted");
        Ok(())
    }

    // === Navigation and elements ===

    /// Load `url` and wait for the page load to complete
    pub fn navigate(&self, url: &str) -> ViewerResult<()> {
        let path = self.session_path("/url")?;
        self.post(&path, &json!({ "url": url }))?;
        Ok(())
    }

    /// First element with the given tag name
    pub fn find_element_by_tag(&self, tag: &str) -> ViewerResult<ElementRef> {
        let path = self.session_path("/element")?;
        let value = self.post(&path, &json!({ "using": "tag name", "value": tag }))?;
        serde_json::from_value(value)
            .map_err(|e| ViewerError::InvalidResponse(format!("Bad element reference: {e}")))
    }

    pub fn element_rect(&self, element: &ElementRef) -> ViewerResult<ElementRect> {
        let path = self.session_path(&format!("/element/{}/rect", element.id))?;
        let url = format!("{}{}", self.base_url, path);
        let mut response = self.agent.get(&url).call()?;
        let success = response.status().is_success();
        let payload: Value = response.body_mut().read_json()?;
        let value = Self::unwrap_value(success, payload)?;
        serde_json::from_value(value)
            .map_err(|e| ViewerError::InvalidResponse(format!("Bad element rect: {e}")))
    }

    // === Input and scripts ===

    /// Perform a sequence of mouse actions
    pub fn perform_pointer_actions(&self, actions: &[PointerAction]) -> ViewerResult<()> {
        let path = self.session_path("/actions")?;
        let body = json!({
            "actions": [{
                "type": "pointer",
                "id": "mouse",
                "parameters": { "pointerType": "mouse" },
                "actions": actions,
            }]
        });
        self.post(&path, &body)?;
        Ok(())
    }

    /// Run `script` synchronously in the page; `args` are exposed as `arguments`
    pub fn execute_script(&self, script: &str, args: Vec<Value>) -> ViewerResult<Value> {
        let path = self.session_path("/execute/sync")?;
        self.post(&path, &json!({ "script": script, "args": args }))
    }
}

impl Drop for WebDriverClient {
    fn drop(&mut self) {
        if let Err(e) = self.delete_session() {
            warn!("Failed to close WebDriver session: {e}");
        }
    }
}
