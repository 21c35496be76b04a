mod args;
mod config;
mod contributions;
mod github;
mod logging;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use config::Config;
use github::GithubClient;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(&args.log_level)?;

    // Validate before any network activity
    let config = Config::load(args)?;

    tracing::info!(
        username = %config.username,
        start = config.start_year,
        end = config.end_year,
        "collecting contributions"
    );

    let client = GithubClient::new(config.token.as_str(), config.api_url.as_str());

    let report = contributions::collect(
        &client,
        &config.username,
        config.start_year,
        config.end_year,
    )
    .await?;

    let out = if config.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Failed to encode JSON")?;

    println!("{out}");

    Ok(())
}
