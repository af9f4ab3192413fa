//! Scripted [`RenewalSite`] mock for controller tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use renewd_site::{Domain, RenewalSite, SiteError, SiteResult};

/// Call recorded by the mock, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteCall {
    Login(String),
    Logout,
    ListDomains,
    Renew(String),
}

#[derive(Default)]
struct MockAccount {
    domains: Vec<Domain>,
    fail_login: bool,
    fail_listing: bool,
}

/// In-memory portal with per-account scripted domains and failures.
pub struct MockSite {
    accounts: Mutex<HashMap<String, MockAccount>>,
    failing_renewals: Mutex<HashSet<String>>,
    current_user: Mutex<Option<String>>,
    calls: Mutex<Vec<SiteCall>>,
}

impl MockSite {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            failing_renewals: Mutex::new(HashSet::new()),
            current_user: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_account(self, username: &str, domains: Vec<Domain>) -> Self {
        self.accounts.lock().unwrap().insert(
            username.to_string(),
            MockAccount {
                domains,
                ..MockAccount::default()
            },
        );
        self
    }

    /// Make login fail for one account.
    pub fn failing_login(self, username: &str) -> Self {
        self.accounts.lock().unwrap().insert(
            username.to_string(),
            MockAccount {
                fail_login: true,
                ..MockAccount::default()
            },
        );
        self
    }

    /// Make the listing fetch fail for an already scripted account.
    pub fn failing_listing(self, username: &str) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .entry(username.to_string())
            .or_default()
            .fail_listing = true;
        self
    }

    /// Make renewal of one domain fail.
    pub fn failing_renewal(self, domain_name: &str) -> Self {
        self.failing_renewals
            .lock()
            .unwrap()
            .insert(domain_name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<SiteCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of renewal submissions for one domain.
    pub fn renew_count(&self, domain_name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == SiteCall::Renew(domain_name.to_string()))
            .count()
    }

    /// Number of logout calls.
    pub fn logout_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == SiteCall::Logout)
            .count()
    }

    fn record(&self, call: SiteCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RenewalSite for MockSite {
    async fn login(&self, username: &str, _password: &str) -> SiteResult<()> {
        self.record(SiteCall::Login(username.to_string()));
        let accounts = self.accounts.lock().unwrap();
        let account = accounts.get(username);
        if account.is_none_or(|a| a.fail_login) {
            return Err(SiteError::LoginTimeout {
                username: username.to_string(),
                timeout_secs: 30,
            });
        }
        *self.current_user.lock().unwrap() = Some(username.to_string());
        Ok(())
    }

    async fn logout(&self) -> SiteResult<()> {
        self.record(SiteCall::Logout);
        *self.current_user.lock().unwrap() = None;
        Ok(())
    }

    async fn list_domains(&self) -> SiteResult<Vec<Domain>> {
        self.record(SiteCall::ListDomains);
        let user = self
            .current_user
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_default();
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get(&user)
            .ok_or_else(|| SiteError::ListingParse {
                detail: "no account logged in".to_string(),
            })?;
        if account.fail_listing {
            return Err(SiteError::ListingParse {
                detail: "table layout changed".to_string(),
            });
        }
        Ok(account.domains.clone())
    }

    async fn renew(&self, domain: &Domain) -> SiteResult<String> {
        self.record(SiteCall::Renew(domain.domain_name.clone()));
        if self
            .failing_renewals
            .lock()
            .unwrap()
            .contains(&domain.domain_name)
        {
            return Err(SiteError::RenewalTimeout {
                domain_name: domain.domain_name.clone(),
                timeout_secs: 30,
            });
        }
        Ok(format!("order-{}", domain.domain_id))
    }
}
