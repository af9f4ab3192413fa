//! Site adapter contract consumed by the renewal controller.

use async_trait::async_trait;

use crate::error::SiteResult;
use crate::types::Domain;

/// The portal interactions the renewal controller depends on.
///
/// One implementation drives the real portal through a WebDriver session
/// ([`crate::PortalSite`]); tests substitute a scripted mock. All calls
/// are sequential against a single browser session, so implementations
/// take `&self` but are not expected to be called concurrently.
#[async_trait]
pub trait RenewalSite: Send + Sync {
    /// Log in and wait for the renewals listing to render.
    async fn login(&self, username: &str, password: &str) -> SiteResult<()>;

    /// Log out. Best effort; invoked even after failures.
    async fn logout(&self) -> SiteResult<()>;

    /// Parse the currently rendered renewals listing.
    ///
    /// Reading the listing twice without intervening portal state change
    /// returns equal sequences.
    async fn list_domains(&self) -> SiteResult<Vec<Domain>>;

    /// Submit a renewal for one domain and return the confirmed order id.
    async fn renew(&self, domain: &Domain) -> SiteResult<String>;
}
