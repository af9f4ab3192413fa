//! Account and outcome types.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use renewd_site::{Domain, DomainStatus};

/// One portal account from the configuration file.
///
/// Loaded once per run and immutable afterwards; identity is the
/// username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Portal login name.
    pub username: String,
    /// Portal password.
    pub password: String,
    /// Domains that must never be renewed automatically.
    #[serde(default)]
    pub excluded_domains: HashSet<String>,
}

impl Account {
    /// The eligibility filter: renewable, `Active`, and not excluded.
    /// No other filtering is applied.
    pub fn is_eligible(&self, domain: &Domain) -> bool {
        domain.renewable
            && domain.status == DomainStatus::Active
            && !self.excluded_domains.contains(&domain.domain_name)
    }
}

/// Result of one renewal attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DomainOutcome {
    /// The portal confirmed the renewal with an order id.
    Renewed {
        domain_name: String,
        order_id: String,
    },
    /// The attempt failed; the rest of the account's pass continued.
    Failed { domain_name: String, error: String },
}

impl DomainOutcome {
    /// Domain this outcome is about.
    pub fn domain_name(&self) -> &str {
        match self {
            Self::Renewed { domain_name, .. } | Self::Failed { domain_name, .. } => domain_name,
        }
    }
}

/// Result of one account's slice of a pass.
#[derive(Debug, Clone, Serialize)]
pub struct AccountOutcome {
    /// Account username.
    pub username: String,
    /// Per-domain attempt results, in listing order.
    pub outcomes: Vec<DomainOutcome>,
    /// Account-scoped failure (login or listing), if any. When set, no
    /// renewal was attempted for this account.
    pub error: Option<String>,
}

impl AccountOutcome {
    /// Number of successful renewals for this account.
    pub fn renewed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DomainOutcome::Renewed { .. }))
            .count()
    }
}

/// Aggregated result of one full pass over all accounts.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Per-account results, in configuration order.
    pub accounts: Vec<AccountOutcome>,
}

impl RunSummary {
    /// Total successful renewals across all accounts.
    pub fn total_renewed(&self) -> usize {
        self.accounts.iter().map(AccountOutcome::renewed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(name: &str, status: DomainStatus, renewable: bool) -> Domain {
        Domain {
            domain_name: name.to_string(),
            status,
            days_until_expiry: 14,
            renewable,
            domain_id: format!("id-{name}"),
        }
    }

    fn account(excluded: &[&str]) -> Account {
        Account {
            username: "user@example.com".to_string(),
            password: "secret".to_string(),
            excluded_domains: excluded.iter().map(ToString::to_string).collect(),
        }
    }

    // All 8 combinations of renewable / active / excluded.
    #[test]
    fn eligibility_truth_table() {
        let statuses = [
            (DomainStatus::Active, true),
            (DomainStatus::Suspended, false),
        ];
        for renewable in [true, false] {
            for (status, active) in statuses {
                for excluded in [true, false] {
                    let acct = if excluded {
                        account(&["example.tk"])
                    } else {
                        account(&[])
                    };
                    let d = domain("example.tk", status, renewable);
                    let expected = renewable && active && !excluded;
                    assert_eq!(
                        acct.is_eligible(&d),
                        expected,
                        "renewable={renewable} status={status:?} excluded={excluded}"
                    );
                }
            }
        }
    }

    #[test]
    fn cancelled_is_not_eligible() {
        let d = domain("example.tk", DomainStatus::Cancelled, true);
        assert!(!account(&[]).is_eligible(&d));
    }

    #[test]
    fn exclusion_matches_exact_name_only() {
        let acct = account(&["other.tk"]);
        let d = domain("example.tk", DomainStatus::Active, true);
        assert!(acct.is_eligible(&d));
    }

    #[test]
    fn summary_totals_span_accounts() {
        let summary = RunSummary {
            accounts: vec![
                AccountOutcome {
                    username: "a".to_string(),
                    outcomes: vec![
                        DomainOutcome::Renewed {
                            domain_name: "a1.tk".to_string(),
                            order_id: "1".to_string(),
                        },
                        DomainOutcome::Failed {
                            domain_name: "a2.tk".to_string(),
                            error: "timeout".to_string(),
                        },
                    ],
                    error: None,
                },
                AccountOutcome {
                    username: "b".to_string(),
                    outcomes: vec![DomainOutcome::Renewed {
                        domain_name: "b1.tk".to_string(),
                        order_id: "2".to_string(),
                    }],
                    error: None,
                },
            ],
        };
        assert_eq!(summary.total_renewed(), 2);
    }
}
