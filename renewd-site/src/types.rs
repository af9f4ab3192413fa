//! Domain records as read from the portal's renewals listing.

use serde::{Deserialize, Serialize};

/// Registration status shown in the listing's status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainStatus {
    /// Registration is live; only this status is renewable.
    Active,
    /// Registration was cancelled by the operator or the registrar.
    Cancelled,
    /// Registration is suspended (typically pending abuse review).
    Suspended,
}

impl DomainStatus {
    /// Parse the status cell text. The portal renders exactly these three
    /// strings; anything else is a listing-layout change.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "Active" => Some(Self::Active),
            "Cancelled" => Some(Self::Cancelled),
            "Suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

/// One row of the renewals listing.
///
/// Built fresh from a page read on every listing fetch and discarded after
/// the account's pass; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Fully qualified domain name.
    pub domain_name: String,
    /// Registration status.
    pub status: DomainStatus,
    /// Days until the registration expires.
    pub days_until_expiry: u32,
    /// Whether the portal currently offers renewal for this domain.
    pub renewable: bool,
    /// Opaque site-assigned identifier, taken from the row's renewal link.
    pub domain_id: String,
}
