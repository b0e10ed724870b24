//! `cadence webhook`: runs the push webhook server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use crate::config::Config;
use crate::detector::DetectionEngine;
use crate::webhook::{DetectionJobProcessor, WebhookServer};

/// Webhook command options.
#[derive(Parser)]
pub struct WebhookCommand {
    /// Configuration file.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl WebhookCommand {
    /// Executes the webhook command; returns after Ctrl-C.
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        if !config.webhook.enabled {
            bail!("webhook server is disabled (set webhook.enabled: true or CADENCE_WEBHOOK_ENABLED=true)");
        }
        if config.webhook.secret.is_empty() {
            eprintln!("warning: no webhook secret configured; signatures will not be verified");
        }

        let processor = Arc::new(DetectionJobProcessor::new(
            DetectionEngine::with_default_strategies(),
        ));
        let server = Arc::new(WebhookServer::new(config.webhook, processor));
        println!("\u{1f680} Webhook server listening on {}", server.address());

        let signal_server = Arc::clone(&server);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
                signal_server.stop_when_running().await;
            }
        });

        server.start().await.context("Webhook server failed")
    }
}
