//! # renewd-site
//!
//! External-collaborator layer for the renewd domain renewer: a minimal
//! W3C WebDriver wire client plus the concrete adapter that drives the
//! registrar portal's login, listing, and renewal pages.
//!
//! The crate is split into two layers:
//!
//! - **`webdriver`**: JSON-over-HTTP WebDriver client (session, element
//!   lookup, click/type/read) and chromedriver process management.
//! - **`portal`**: the portal adapter implementing [`RenewalSite`] on top
//!   of a live [`webdriver::Session`]. Page URLs and selectors are
//!   versioned constants; if the site changes markup, this is the layer
//!   that breaks.
//!
//! Business logic lives in `renewd-core`; it only sees the
//! [`RenewalSite`] trait and the [`Domain`] records produced here.

pub mod error;
pub mod portal;
pub mod traits;
pub mod types;
pub mod webdriver;

pub use error::{SiteError, SiteResult};
pub use portal::PortalSite;
pub use traits::RenewalSite;
pub use types::{Domain, DomainStatus};
pub use webdriver::{DriverProcess, Session, WebDriverError};
