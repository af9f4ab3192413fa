//! Core renewal logic for renewd.
//!
//! Provides the pieces between the configuration file and the portal
//! adapter: data types, config loading, the cron trigger decision, and
//! the renewal controller that iterates accounts and domains while
//! isolating failures at the narrowest scope.
//!
//! The site itself is abstracted behind [`renewd_site::RenewalSite`], so
//! everything here is testable against a scripted mock.

pub mod config;
pub mod controller;
pub mod error;
pub mod schedule;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use config::{Config, WebDriverConfig};
pub use controller::RenewalController;
pub use error::{ConfigError, ScheduleError};
pub use schedule::{CronExpr, should_trigger};
pub use types::{Account, AccountOutcome, DomainOutcome, RunSummary};
