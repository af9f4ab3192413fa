//! Session and element commands over the WebDriver HTTP wire protocol.

use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::{Value, json};

use super::WdResult;
use super::error::WebDriverError;

/// W3C element reference key in `find element` responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Poll interval for [`Session::wait_for`].
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One remote browser session.
///
/// Owned exclusively by the active renewal pass; closed in the pass's
/// cleanup step.
pub struct Session {
    client: Client,
    base: String,
    session_id: String,
}

/// A located element within a [`Session`].
pub struct Element<'a> {
    session: &'a Session,
    element_id: String,
}

impl Session {
    /// Open a new session against a running driver endpoint.
    pub async fn start(endpoint: &str, headless: bool) -> WdResult<Self> {
        let client = Client::new();
        let mut args = vec!["--window-size=1280,1024".to_string()];
        if headless {
            args.push("--headless=new".to_string());
            args.push("--disable-gpu".to_string());
        }
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let base = endpoint.trim_end_matches('/').to_string();
        let value = execute(
            &client,
            Method::POST,
            &format!("{base}/session"),
            Some(body),
            None,
        )
        .await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WebDriverError::Parse {
                detail: "new session response has no sessionId".to_string(),
            })?
            .to_string();
        log::debug!("webdriver session {session_id} opened");

        Ok(Self {
            client,
            base,
            session_id,
        })
    }

    /// Navigate to a URL.
    pub async fn goto(&self, url: &str) -> WdResult<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })), None)
            .await?;
        Ok(())
    }

    /// Current page URL.
    pub async fn current_url(&self) -> WdResult<String> {
        let value = self.command(Method::GET, "/url", None, None).await?;
        as_string(&value, "current url")
    }

    /// Find the first element matching a CSS selector.
    pub async fn find(&self, selector: &str) -> WdResult<Element<'_>> {
        let value = self
            .command(
                Method::POST,
                "/element",
                Some(locator(selector)),
                Some(selector),
            )
            .await?;
        self.element_from(&value, selector)
    }

    /// Find all elements matching a CSS selector. Empty match is `Ok(vec![])`.
    pub async fn find_all(&self, selector: &str) -> WdResult<Vec<Element<'_>>> {
        let value = self
            .command(
                Method::POST,
                "/elements",
                Some(locator(selector)),
                Some(selector),
            )
            .await?;
        self.elements_from(&value, selector)
    }

    /// Poll [`find`](Self::find) until the selector matches or `timeout`
    /// elapses.
    pub async fn wait_for(&self, selector: &str, timeout: Duration) -> WdResult<Element<'_>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.find(selector).await {
                Ok(element) => return Ok(element),
                Err(WebDriverError::NoSuchElement { .. }) => {}
                Err(e) => return Err(e),
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(WebDriverError::WaitTimeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    /// Delete the session. Best effort.
    pub async fn close(self) -> WdResult<()> {
        self.command(Method::DELETE, "", None, None).await?;
        log::debug!("webdriver session {} closed", self.session_id);
        Ok(())
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        selector: Option<&str>,
    ) -> WdResult<Value> {
        let url = format!("{}/session/{}{}", self.base, self.session_id, path);
        execute(&self.client, method, &url, body, selector).await
    }

    fn element_from(&self, value: &Value, selector: &str) -> WdResult<Element<'_>> {
        let element_id = value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| WebDriverError::Parse {
                detail: format!("find element response for '{selector}' has no element reference"),
            })?
            .to_string();
        Ok(Element {
            session: self,
            element_id,
        })
    }

    fn elements_from(&self, value: &Value, selector: &str) -> WdResult<Vec<Element<'_>>> {
        let items = value.as_array().ok_or_else(|| WebDriverError::Parse {
            detail: format!("find elements response for '{selector}' is not an array"),
        })?;
        items
            .iter()
            .map(|item| self.element_from(item, selector))
            .collect()
    }
}

impl Element<'_> {
    /// Find the first descendant matching a CSS selector.
    pub async fn find(&self, selector: &str) -> WdResult<Element<'_>> {
        let value = self
            .command(
                Method::POST,
                "/element",
                Some(locator(selector)),
                Some(selector),
            )
            .await?;
        self.session.element_from(&value, selector)
    }

    /// Find all descendants matching a CSS selector.
    pub async fn find_all(&self, selector: &str) -> WdResult<Vec<Element<'_>>> {
        let value = self
            .command(
                Method::POST,
                "/elements",
                Some(locator(selector)),
                Some(selector),
            )
            .await?;
        self.session.elements_from(&value, selector)
    }

    /// Click the element.
    pub async fn click(&self) -> WdResult<()> {
        self.command(Method::POST, "/click", Some(json!({})), None)
            .await?;
        Ok(())
    }

    /// Type text into the element.
    pub async fn type_text(&self, text: &str) -> WdResult<()> {
        self.command(Method::POST, "/value", Some(json!({ "text": text })), None)
            .await?;
        Ok(())
    }

    /// Visible text content.
    pub async fn text(&self) -> WdResult<String> {
        let value = self.command(Method::GET, "/text", None, None).await?;
        as_string(&value, "element text")
    }

    /// Attribute value, `None` if the attribute is absent.
    pub async fn attr(&self, name: &str) -> WdResult<Option<String>> {
        let value = self
            .command(Method::GET, &format!("/attribute/{name}"), None, None)
            .await?;
        Ok(value.as_str().map(ToString::to_string))
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        selector: Option<&str>,
    ) -> WdResult<Value> {
        let url = format!(
            "{}/session/{}/element/{}{}",
            self.session.base, self.session.session_id, self.element_id, path
        );
        execute(&self.session.client, method, &url, body, selector).await
    }
}

fn locator(selector: &str) -> Value {
    json!({ "using": "css selector", "value": selector })
}

fn as_string(value: &Value, what: &str) -> WdResult<String> {
    value
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| WebDriverError::Parse {
            detail: format!("{what} is not a string"),
        })
}

/// Send one wire command and unwrap the `value` envelope.
async fn execute(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
    selector: Option<&str>,
) -> WdResult<Value> {
    log::debug!("{method} {url}");

    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await.map_err(|e| WebDriverError::Http {
        detail: e.to_string(),
    })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| WebDriverError::Http {
        detail: format!("failed to read response body: {e}"),
    })?;
    log::trace!("webdriver response {status}: {text}");

    parse_wire_response(status.is_success(), &text, selector)
}

/// Decode the `{"value": ...}` envelope, mapping W3C error payloads.
///
/// Split out of [`execute`] so the decoding paths are unit testable
/// without an HTTP endpoint.
fn parse_wire_response(ok: bool, body: &str, selector: Option<&str>) -> WdResult<Value> {
    let parsed: Value = serde_json::from_str(body).map_err(|e| WebDriverError::Parse {
        detail: format!("invalid JSON from driver: {e}"),
    })?;
    let value = parsed.get("value").cloned().unwrap_or(Value::Null);

    // Error payloads carry {"value": {"error": code, "message": ...}}.
    // Some drivers return them with 2xx status, so check the shape too.
    if let Some(code) = value.get("error").and_then(Value::as_str) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(WebDriverError::from_wire(code, message, selector));
    }
    if !ok {
        return Err(WebDriverError::Parse {
            detail: format!("driver returned an error status with body: {body}"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_plain_value() {
        let value = parse_wire_response(true, r#"{"value":"https://example.com/"}"#, None)
            .expect("valid envelope");
        assert_eq!(value.as_str(), Some("https://example.com/"));
    }

    #[test]
    fn null_value_is_ok() {
        let value = parse_wire_response(true, r#"{"value":null}"#, None).expect("valid envelope");
        assert!(value.is_null());
    }

    #[test]
    fn maps_no_such_element() {
        let err = parse_wire_response(
            false,
            r#"{"value":{"error":"no such element","message":"not found"}}"#,
            Some(".table-striped"),
        )
        .expect_err("error payload");
        match err {
            WebDriverError::NoSuchElement { selector } => assert_eq!(selector, ".table-striped"),
            other => panic!("expected NoSuchElement, got {other:?}"),
        }
    }

    #[test]
    fn maps_invalid_session() {
        let err = parse_wire_response(
            false,
            r#"{"value":{"error":"invalid session id","message":"session deleted"}}"#,
            None,
        )
        .expect_err("error payload");
        assert!(matches!(err, WebDriverError::InvalidSession));
    }

    #[test]
    fn unknown_code_becomes_api_error() {
        let err = parse_wire_response(
            false,
            r#"{"value":{"error":"stale element reference","message":"gone"}}"#,
            None,
        )
        .expect_err("error payload");
        match err {
            WebDriverError::Api { code, message } => {
                assert_eq!(code, "stale element reference");
                assert_eq!(message, "gone");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn error_shape_wins_over_success_status() {
        let err = parse_wire_response(
            true,
            r#"{"value":{"error":"no such element","message":""}}"#,
            Some("#username"),
        )
        .expect_err("error payload");
        assert!(matches!(err, WebDriverError::NoSuchElement { .. }));
    }

    #[test]
    fn rejects_non_json_body() {
        let err = parse_wire_response(true, "<html>proxy error</html>", None)
            .expect_err("invalid JSON");
        assert!(matches!(err, WebDriverError::Parse { .. }));
    }
}
