//! Unified error type for portal operations.

use thiserror::Error;

use crate::webdriver::WebDriverError;

/// Errors produced while driving the portal.
///
/// The controller in `renewd-core` scopes these: `LoginTimeout` and
/// `ListingParse` abort one account's pass, `RenewalTimeout` and other
/// per-domain failures skip one domain, and only `Driver` startup
/// failures are fatal for the whole pass.
#[derive(Debug, Error)]
pub enum SiteError {
    /// The renewals listing did not render within the login timeout.
    /// Covers both rejected credentials and a slow/unreachable site.
    #[error("login for {username} timed out after {timeout_secs}s")]
    LoginTimeout { username: String, timeout_secs: u64 },

    /// The listing table did not match the expected column layout.
    #[error("failed to parse renewals listing: {detail}")]
    ListingParse { detail: String },

    /// The renewal confirmation did not appear within the timeout.
    #[error("renewal of {domain_name} timed out after {timeout_secs}s")]
    RenewalTimeout {
        domain_name: String,
        timeout_secs: u64,
    },

    /// The renewal form did not match the expected structure.
    #[error("renewal page for {domain_name} has unexpected structure: {detail}")]
    RenewalPage {
        domain_name: String,
        detail: String,
    },

    /// Underlying WebDriver failure (session, navigation, element lookup).
    #[error(transparent)]
    Driver(#[from] WebDriverError),
}

/// Result alias for portal operations.
pub type SiteResult<T> = std::result::Result<T, SiteError>;
