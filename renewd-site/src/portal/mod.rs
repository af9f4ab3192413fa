//! Adapter for the registrar portal.
//!
//! URLs, selectors, and the renewal-period option below are a versioned
//! contract with the portal's markup. A silent layout change on the site
//! breaks this module first; nothing here tries to outlive that.

mod parse;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{SiteError, SiteResult};
use crate::traits::RenewalSite;
use crate::types::Domain;
use crate::webdriver::{Element, Session, WebDriverError};

/// Renewals listing (also the login form when logged out).
const RENEWALS_URL: &str = "https://my.freenom.com/domains.php?a=renewals";
/// Per-domain renewal page; the site-assigned domain id is appended.
const RENEW_DOMAIN_URL: &str = "https://my.freenom.com/domains.php?a=renewdomain&domain=";
/// Logout endpoint.
const LOGOUT_URL: &str = "https://my.freenom.com/logout.php";

/// Fixed renewal period submitted for every renewal.
const RENEWAL_PERIOD: &str = "12M";

/// Both the renewals listing and the renewal form render as this table.
const LISTING_TABLE: &str = ".table-striped";

/// Default wait for a page to render its expected markup.
const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives the portal through a live WebDriver session.
pub struct PortalSite {
    session: Session,
    page_timeout: Duration,
}

impl PortalSite {
    /// Wrap a session with the default page timeout.
    pub fn new(session: Session) -> Self {
        Self {
            session,
            page_timeout: DEFAULT_PAGE_TIMEOUT,
        }
    }

    /// Override the page timeout.
    #[must_use]
    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Close the underlying browser session. Best effort.
    pub async fn close(self) {
        if let Err(e) = self.session.close().await {
            log::warn!("failed to close browser session: {e}");
        }
    }

    /// Read one listing row into column texts plus the renewal link href.
    async fn read_row(&self, row: &Element<'_>) -> SiteResult<(Vec<String>, String)> {
        let columns = row.find_all("td").await.map_err(listing_error)?;
        let mut cells = Vec::with_capacity(4);
        for column in columns.iter().take(4) {
            cells.push(column.text().await.map_err(listing_error)?);
        }
        let href = match columns.get(4) {
            Some(link_column) => link_column
                .find("a")
                .await
                .map_err(listing_error)?
                .attr("href")
                .await
                .map_err(listing_error)?
                .unwrap_or_default(),
            None => String::new(),
        };
        Ok((cells, href))
    }
}

#[async_trait]
impl RenewalSite for PortalSite {
    async fn login(&self, username: &str, password: &str) -> SiteResult<()> {
        self.session.goto(RENEWALS_URL).await?;
        self.session.find("#username").await?.type_text(username).await?;
        self.session.find("#password").await?.type_text(password).await?;
        self.session.find("input[type=submit]").await?.click().await?;

        // Logged in once the renewals table renders. A credential
        // rejection re-renders the login form, so it surfaces here as
        // the same timeout.
        match self.session.wait_for(LISTING_TABLE, self.page_timeout).await {
            Ok(_) => Ok(()),
            Err(WebDriverError::WaitTimeout { .. }) => Err(SiteError::LoginTimeout {
                username: username.to_string(),
                timeout_secs: self.page_timeout.as_secs(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn logout(&self) -> SiteResult<()> {
        self.session.goto(LOGOUT_URL).await?;
        Ok(())
    }

    async fn list_domains(&self) -> SiteResult<Vec<Domain>> {
        let table = self
            .session
            .find(LISTING_TABLE)
            .await
            .map_err(listing_error)?;
        let body = table.find("tbody").await.map_err(listing_error)?;
        let rows = body.find_all("tr").await.map_err(listing_error)?;

        let mut domains = Vec::with_capacity(rows.len());
        for row in &rows {
            let (cells, href) = self.read_row(row).await?;
            let domain = parse::parse_row(&cells, &href)
                .map_err(|detail| SiteError::ListingParse { detail })?;
            domains.push(domain);
        }
        Ok(domains)
    }

    async fn renew(&self, domain: &Domain) -> SiteResult<String> {
        log::info!(
            "renewing {} (expires in {} days)",
            domain.domain_name,
            domain.days_until_expiry
        );
        self.session
            .goto(&format!("{RENEW_DOMAIN_URL}{}", domain.domain_id))
            .await?;

        // First row of the renewal form table holds the period dropdown
        // in its fourth column.
        let find_period = async {
            let row = self
                .session
                .find(&format!("{LISTING_TABLE} tbody tr"))
                .await?;
            let columns = row.find_all("td").await?;
            match columns.into_iter().nth(3) {
                Some(column) => {
                    let dropdown = column.find("select").await?;
                    dropdown
                        .find(&format!("option[value=\"{RENEWAL_PERIOD}\"]"))
                        .await?
                        .click()
                        .await
                }
                None => Err(WebDriverError::NoSuchElement {
                    selector: "td:nth-child(4)".to_string(),
                }),
            }
        };
        find_period.await.map_err(|e| renewal_page_error(domain, e))?;

        self.session
            .find("input[type=submit]")
            .await
            .map_err(|e| renewal_page_error(domain, e))?
            .click()
            .await?;

        // The confirmation page renders the order id in a <strong>.
        match self.session.wait_for("strong", self.page_timeout).await {
            Ok(confirmation) => {
                let text = confirmation.text().await?;
                Ok(parse::order_id_from_confirmation(&text))
            }
            Err(WebDriverError::WaitTimeout { .. }) => Err(SiteError::RenewalTimeout {
                domain_name: domain.domain_name.clone(),
                timeout_secs: self.page_timeout.as_secs(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Structural lookup failures while reading the listing are an
/// account-scoped parse error, not a driver fault.
fn listing_error(e: WebDriverError) -> SiteError {
    match e {
        WebDriverError::NoSuchElement { selector } => SiteError::ListingParse {
            detail: format!("expected listing element '{selector}' is missing"),
        },
        other => SiteError::Driver(other),
    }
}

fn renewal_page_error(domain: &Domain, e: WebDriverError) -> SiteError {
    match e {
        WebDriverError::NoSuchElement { selector } => SiteError::RenewalPage {
            domain_name: domain.domain_name.clone(),
            detail: format!("expected form element '{selector}' is missing"),
        },
        other => SiteError::Driver(other),
    }
}
