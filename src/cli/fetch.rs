//! `cadence fetch`: prints the readable content of a web page.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use super::formatting::render_page;
use crate::web::Fetcher;

/// Fetch command options.
#[derive(Parser)]
pub struct FetchCommand {
    /// Page URL; `https://` is assumed when no scheme is given.
    #[arg(value_name = "URL")]
    pub url: String,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout: u64,
}

impl FetchCommand {
    /// Executes the fetch command.
    pub async fn execute(self) -> Result<()> {
        let fetcher = Fetcher::new(Some(Duration::from_secs(self.timeout)))?;
        let page = fetcher
            .fetch(&self.url)
            .await
            .with_context(|| format!("Failed to fetch {}", self.url))?;
        print!("{}", render_page(&page));
        Ok(())
    }
}
