//! renewd - automatic domain renewer.
//!
//! Drives the registrar portal through a browser to renew every eligible
//! domain across the configured accounts, either once or on a cron
//! schedule.

mod runner;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use renewd_core::Config;

/// Automatic domain renewer
#[derive(Parser, Debug)]
#[command(name = "renewd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(
        short = 'c',
        long = "config",
        env = "RENEWD_CONFIG",
        default_value = "config.json"
    )]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(long = "verbose")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single renewal pass and exit (default)
    Once,
    /// Run passes on the configured cron schedule until terminated
    Schedule,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(&cli.config).with_context(|| {
        format!(
            "cannot start without a valid config ({})",
            cli.config.display()
        )
    })?;
    info!(
        "loaded {} account(s) from {}",
        config.accounts.len(),
        cli.config.display()
    );

    match cli.command.unwrap_or(Commands::Once) {
        Commands::Once => {
            let summary = runner::run_pass(&config).await?;
            info!(
                "pass complete: renewed {} domain(s) in total",
                summary.total_renewed()
            );
            Ok(())
        }
        Commands::Schedule => runner::run_scheduler(&config, shutdown_channel()).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Watch channel flipped to `true` on SIGINT/SIGTERM.
///
/// The scheduler observes the flag at iteration boundaries only, so an
/// in-flight pass always completes before the process exits.
fn shutdown_channel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for ctrl-c: {e}");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    warn!("failed to listen for SIGTERM: {e}");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {}
            () = terminate => {}
        }
        info!("termination requested, finishing current pass");
        let _ = tx.send(true);
    });

    rx
}
