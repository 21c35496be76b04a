//! Command-line argument parsing.

use clap::Parser;

/// Default GitHub GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";

/// List the external public repositories a GitHub user contributed to, per year.
///
/// Pull request and commit contributions are collected for every calendar
/// year in `--start..=--end`. Private repositories and repositories owned by
/// the user are left out. Requires `GITHUB_TOKEN` in the environment.
#[derive(Debug, Parser)]
#[command(name = "yearly-contribs")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// GitHub username
    #[arg(long)]
    pub username: String,

    /// Start year (inclusive)
    #[arg(long, default_value_t = 2020)]
    pub start: i32,

    /// End year (inclusive), defaults to the current year
    #[arg(long)]
    pub end: Option<i32>,

    /// GraphQL endpoint
    #[arg(long, value_name = "URL", env = "GITHUB_GRAPHQL_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Logging level
    ///
    /// Valid values: trace, debug, info, warn, error
    #[arg(long, default_value = "warn", env = "YEARLY_CONTRIBS_LOG")]
    pub log_level: String,
}
