//! Chromedriver child-process management.

use std::process::Stdio;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::process::{Child, Command};

use super::WdResult;
use super::error::WebDriverError;

/// How long to wait for a freshly spawned driver to report ready.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
/// Poll interval against `GET /status` during startup.
const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A chromedriver child process owned by the current pass.
///
/// The child is spawned with `kill_on_drop`, so an aborted pass cannot
/// leak a driver; [`stop`](Self::stop) is the orderly path.
pub struct DriverProcess {
    child: Child,
    endpoint: String,
}

impl DriverProcess {
    /// Spawn chromedriver on `port` and wait until its status endpoint
    /// reports ready.
    pub async fn spawn(binary: &str, port: u16) -> WdResult<Self> {
        let endpoint = format!("http://127.0.0.1:{port}");
        log::info!("starting {binary} on port {port}");

        let child = Command::new(binary)
            .arg(format!("--port={port}"))
            .arg("--allowed-ips=127.0.0.1")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| WebDriverError::Startup {
                detail: format!("failed to spawn {binary}: {e}"),
            })?;

        let process = Self { child, endpoint };
        process.wait_until_ready().await?;
        log::debug!("driver ready at {}", process.endpoint);
        Ok(process)
    }

    /// Base URL of the spawned driver.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Kill the driver process.
    pub async fn stop(mut self) {
        if let Err(e) = self.child.kill().await {
            log::warn!("failed to kill driver process: {e}");
        }
    }

    async fn wait_until_ready(&self) -> WdResult<()> {
        let client = Client::new();
        let url = format!("{}/status", self.endpoint);
        let deadline = tokio::time::Instant::now() + STARTUP_TIMEOUT;

        loop {
            if let Ok(response) = client.get(&url).send().await {
                if let Ok(status) = response.json::<Value>().await {
                    let ready = status
                        .pointer("/value/ready")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    if ready {
                        return Ok(());
                    }
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(WebDriverError::Startup {
                    detail: format!(
                        "driver did not become ready within {STARTUP_TIMEOUT:?} at {url}"
                    ),
                });
            }
            tokio::time::sleep(STARTUP_POLL_INTERVAL).await;
        }
    }
}
