//! Error types for the WebDriver wire client.

use std::time::Duration;

use thiserror::Error;

/// Errors from the WebDriver endpoint or the driver process itself.
#[derive(Debug, Error)]
pub enum WebDriverError {
    /// The driver process could not be started or never became ready.
    #[error("failed to start webdriver: {detail}")]
    Startup { detail: String },

    /// Network-level failure talking to the driver endpoint.
    #[error("webdriver request failed: {detail}")]
    Http { detail: String },

    /// The driver returned a W3C error payload we have no specific
    /// variant for.
    #[error("webdriver error '{code}': {message}")]
    Api { code: String, message: String },

    /// `no such element` for the given CSS selector.
    #[error("no such element: {selector}")]
    NoSuchElement { selector: String },

    /// The session was closed or expired on the driver side.
    #[error("webdriver session is no longer valid")]
    InvalidSession,

    /// [`Session::wait_for`](super::Session::wait_for) gave up.
    #[error("element '{selector}' did not appear within {timeout:?}")]
    WaitTimeout {
        selector: String,
        timeout: Duration,
    },

    /// The response body was not the expected JSON shape.
    #[error("unexpected webdriver response: {detail}")]
    Parse { detail: String },
}

impl WebDriverError {
    /// Map a W3C error code from the wire to a typed variant.
    pub(crate) fn from_wire(code: &str, message: String, selector: Option<&str>) -> Self {
        match code {
            "no such element" => Self::NoSuchElement {
                selector: selector.unwrap_or("<unknown>").to_string(),
            },
            "invalid session id" => Self::InvalidSession,
            _ => Self::Api {
                code: code.to_string(),
                message,
            },
        }
    }
}
