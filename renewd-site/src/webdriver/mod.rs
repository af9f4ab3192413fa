//! Minimal W3C WebDriver wire client.
//!
//! JSON over HTTP against a chromedriver endpoint, covering only the
//! commands the portal adapter needs: session lifecycle, navigation,
//! CSS element lookup, click/type/read, and a polling wait helper.

mod client;
mod error;
mod process;

pub use client::{Element, Session};
pub use error::WebDriverError;
pub use process::DriverProcess;

/// Result alias for WebDriver operations.
pub type WdResult<T> = std::result::Result<T, WebDriverError>;
