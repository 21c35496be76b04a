//! Run configuration, validated before any network activity.

use std::fmt;

use chrono::{Datelike, Utc};
use thiserror::Error;

use crate::args::Args;

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required flag: --username")]
    MissingUsername,

    #[error("GITHUB_TOKEN environment variable is not set")]
    MissingToken,
}

#[derive(Clone)]
pub struct Config {
    pub username: String,
    pub start_year: i32,
    pub end_year: i32,
    pub token: String,
    pub api_url: String,
    pub pretty: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("start_year", &self.start_year)
            .field("end_year", &self.end_year)
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("pretty", &self.pretty)
            .finish()
    }
}

impl Config {
    /// Build from parsed flags, taking the token from the process environment.
    pub fn load(args: Args) -> Result<Self, ConfigError> {
        let token = std::env::var(TOKEN_ENV).ok();
        Self::from_args(args, token)
    }

    pub fn from_args(args: Args, token: Option<String>) -> Result<Self, ConfigError> {
        let username = args.username.trim().to_string();
        if username.is_empty() {
            return Err(ConfigError::MissingUsername);
        }

        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            username,
            start_year: args.start,
            end_year: args.end.unwrap_or_else(|| Utc::now().year()),
            token,
            api_url: args.api_url,
            pretty: args.pretty,
        })
    }
}
