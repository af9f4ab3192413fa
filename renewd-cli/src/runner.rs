//! Pass execution and the scheduler loop.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tokio::sync::watch;
use tracing::{error, info};

use renewd_core::{Config, CronExpr, RenewalController, RunSummary, should_trigger};
use renewd_site::{DriverProcess, PortalSite, Session};

/// Scheduler wake-up interval.
const POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Pause after a failed pass before trigger evaluation resumes.
const RETRY_DELAY: Duration = Duration::from_secs(60);

/// Provision a browser session, run one controller pass, and tear the
/// session down again.
///
/// The session (and any driver process spawned for it) is owned by this
/// pass alone and is released whether or not the pass renews anything.
pub async fn run_pass(config: &Config) -> Result<RunSummary> {
    // Spawn a driver unless an external endpoint is configured.
    let (endpoint, driver) = match &config.webdriver.endpoint {
        Some(endpoint) => (endpoint.clone(), None),
        None => {
            let driver = DriverProcess::spawn(
                &config.webdriver.chromedriver_path,
                config.webdriver.port,
            )
            .await
            .context("failed to provision browser driver")?;
            (driver.endpoint().to_string(), Some(driver))
        }
    };

    let session = match Session::start(&endpoint, config.webdriver.headless).await {
        Ok(session) => session,
        Err(e) => {
            if let Some(driver) = driver {
                driver.stop().await;
            }
            return Err(anyhow::Error::new(e).context("failed to open browser session"));
        }
    };

    let site = PortalSite::new(session);
    let controller =
        RenewalController::new(Duration::from_secs(config.account_interval_seconds));
    let summary = controller.run(&config.accounts, &site).await;

    site.close().await;
    if let Some(driver) = driver {
        driver.stop().await;
    }
    Ok(summary)
}

/// Trigger bookkeeping for the scheduler loop.
///
/// A completed pass records its finish time, suppressing re-fires until
/// the next scheduled minute. A failed pass instead anchors just before
/// the minute that triggered it, which keeps that slot inside the
/// catch-up scan so the retry tick fires it again.
struct SchedulerState<Tz: chrono::TimeZone> {
    expr: CronExpr,
    last_trigger: Option<DateTime<Tz>>,
}

impl<Tz: chrono::TimeZone> SchedulerState<Tz> {
    fn new(expr: CronExpr) -> Self {
        Self {
            expr,
            last_trigger: None,
        }
    }

    fn due(&self, now: &DateTime<Tz>) -> bool {
        should_trigger(&self.expr, self.last_trigger.as_ref(), now)
    }

    fn pass_succeeded(&mut self, completed_at: DateTime<Tz>) {
        self.last_trigger = Some(completed_at);
    }

    fn pass_failed(&mut self, triggered_at: DateTime<Tz>) {
        self.last_trigger = Some(triggered_at - chrono::Duration::minutes(1));
    }
}

/// Poll the schedule until shutdown, running one pass per trigger.
///
/// A failed pass is logged and its slot stays pending, so after the
/// retry delay the same slot fires again instead of waiting for the
/// next scheduled one. This holds for the first pass after startup too.
pub async fn run_scheduler(config: &Config, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let expr = CronExpr::parse(&config.crontab).context("invalid crontab")?;
    let mut state: SchedulerState<Local> = SchedulerState::new(expr);
    info!("scheduler running with crontab '{}'", config.crontab);

    loop {
        if *shutdown.borrow() {
            break;
        }

        let now = Local::now();
        if state.due(&now) {
            info!("schedule matched at {}", now.format("%Y-%m-%d %H:%M"));
            match run_pass(config).await {
                Ok(summary) => {
                    info!(
                        "pass complete: renewed {} domain(s) in total",
                        summary.total_renewed()
                    );
                    state.pass_succeeded(Local::now());
                }
                Err(e) => {
                    error!("renewal pass failed: {e:#}");
                    state.pass_failed(now);
                    wait(RETRY_DELAY, &mut shutdown).await;
                    continue;
                }
            }
        }
        wait(POLL_INTERVAL, &mut shutdown).await;
    }

    info!("shutdown requested, scheduler stopped");
    Ok(())
}

/// Sleep, waking early when shutdown is requested.
async fn wait(duration: Duration, shutdown: &mut watch::Receiver<bool>) {
    tokio::select! {
        () = tokio::time::sleep(duration) => {}
        _ = shutdown.changed() => {}
    }
}
