//! Headless autosender.
//!
//! # Example
//!
//! ```sh
//! AUTOSENDER__WALLET__PRIVATE_KEY=0x... cargo r --bin autosender -- \
//!     --receiver 0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed run
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use testnet_autosender::application::services::{DispatchOutcome, FaucetOutcome};
use testnet_autosender::application::{AutosenderApp, TracingNotifier};
use testnet_autosender::config::Settings;
use testnet_autosender::telemetry::{self, LogFormat};
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about = "Faucet top-ups and paced transfers on an EVM test network", long_about = None)]
struct Args {
    /// Configuration file; `autosender.toml` is read if present otherwise.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Receiver address, overriding the configured one.
    #[arg(long, value_name = "ADDRESS", global = true)]
    receiver: Option<String>,
    /// Emit logs as JSON.
    #[arg(long = "json-logs", global = true)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the automation loop until Ctrl-C.
    Run,
    /// Send a single transfer.
    Send,
    /// Request faucet funds once.
    Faucet,
    /// Check that the RPC endpoint serves the configured network.
    AddNetwork,
    /// Print the account state as JSON.
    Status,
}

impl Args {
    async fn run(self) -> anyhow::Result<()> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(receiver) = self.receiver {
            settings.transfer.receiver = Some(receiver);
            settings.validate()?;
        }

        let app = AutosenderApp::from_settings(&settings, Arc::new(TracingNotifier))?;

        if matches!(self.command, Command::AddNetwork) {
            app.add_network().await?;
            return Ok(());
        }

        app.connect().await.context("connecting wallet")?;

        match self.command {
            Command::Run => {
                app.start()?;
                tokio::signal::ctrl_c()
                    .await
                    .context("waiting for Ctrl-C")?;
                info!("shutting down");
                app.stop();
                app.wait_for_automation().await;
            }
            Command::Send => match app.send_once().await? {
                DispatchOutcome::Sent(tx) => {
                    println!("{}", serde_json::to_string_pretty(&tx)?);
                }
                DispatchOutcome::Deferred { balance } => {
                    println!("insufficient funds: {} {}", balance, settings.network.currency_symbol);
                }
            },
            Command::Faucet => match app.request_faucet().await? {
                FaucetOutcome::Granted(grant) => println!("faucet granted (status {})", grant.status),
                FaucetOutcome::Skipped { balance } => {
                    println!("skipped, balance {} {}", balance, settings.network.currency_symbol);
                }
            },
            Command::Status => {
                let snapshot = app.snapshot();
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            Command::AddNetwork => {}
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(err) = telemetry::init(LogFormat::from_flag(args.json_logs)) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    if let Err(err) = args.run().await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
