//! The renewal controller: one pass over all accounts.

use std::time::Duration;

use renewd_site::{RenewalSite, SiteResult};

use crate::types::{Account, AccountOutcome, DomainOutcome, RunSummary};

/// Iterates accounts and their domains, renewing every eligible domain
/// while containing failures at the narrowest scope: a failed renewal
/// skips one domain, a failed login or listing skips one account, and
/// no site failure stops the pass.
pub struct RenewalController {
    account_interval: Duration,
}

impl RenewalController {
    /// `account_interval` is the politeness pause between accounts; it
    /// throttles request rate against the site, not a performance knob.
    pub fn new(account_interval: Duration) -> Self {
        Self { account_interval }
    }

    /// Run one full pass over `accounts`, in order, against `site`.
    ///
    /// Logout is invoked exactly once per account, whether or not its
    /// slice of the pass failed.
    pub async fn run<S: RenewalSite>(&self, accounts: &[Account], site: &S) -> RunSummary {
        let mut results = Vec::with_capacity(accounts.len());

        for (index, account) in accounts.iter().enumerate() {
            log::info!("renewing account {}", account.username);
            let outcome = self.process_account(account, site).await;
            if let Some(error) = &outcome.error {
                log::warn!("account {} skipped: {error}", account.username);
            }

            if let Err(e) = site.logout().await {
                log::warn!("logout for {} failed: {e}", account.username);
            }
            results.push(outcome);

            if index + 1 < accounts.len() && !self.account_interval.is_zero() {
                log::info!(
                    "waiting {}s before renewing next account",
                    self.account_interval.as_secs()
                );
                tokio::time::sleep(self.account_interval).await;
            }
        }

        let summary = RunSummary { accounts: results };
        log::info!("renewed {} domain(s) in total", summary.total_renewed());
        summary
    }

    async fn process_account<S: RenewalSite>(&self, account: &Account, site: &S) -> AccountOutcome {
        match self.try_account(account, site).await {
            Ok(outcomes) => AccountOutcome {
                username: account.username.clone(),
                outcomes,
                error: None,
            },
            // Login or listing failed; the account is skipped but the
            // pass continues.
            Err(e) => AccountOutcome {
                username: account.username.clone(),
                outcomes: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }

    async fn try_account<S: RenewalSite>(
        &self,
        account: &Account,
        site: &S,
    ) -> SiteResult<Vec<DomainOutcome>> {
        site.login(&account.username, &account.password).await?;
        let domains = site.list_domains().await?;

        let mut outcomes = Vec::new();
        for domain in &domains {
            if !account.is_eligible(domain) {
                log::debug!(
                    "skipping {} (status {:?}, renewable {}, days left {})",
                    domain.domain_name,
                    domain.status,
                    domain.renewable,
                    domain.days_until_expiry
                );
                continue;
            }
            match site.renew(domain).await {
                Ok(order_id) => {
                    log::info!("renewed {} (order {order_id})", domain.domain_name);
                    outcomes.push(DomainOutcome::Renewed {
                        domain_name: domain.domain_name.clone(),
                        order_id,
                    });
                }
                Err(e) => {
                    log::warn!("failed to renew {}: {e}", domain.domain_name);
                    outcomes.push(DomainOutcome::Failed {
                        domain_name: domain.domain_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(outcomes)
    }
}
