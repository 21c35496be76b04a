//! contributions.rs
//!
//! Walks a range of calendar years and gathers, for each one, the public
//! repositories owned by someone else that the user opened pull requests
//! against or committed to.
//!
//! Years are processed in ascending order. Inside a year the pull request
//! pages are followed cursor by cursor, then the single commit query runs.
//! The first failing query aborts the whole walk.

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Deserialize;

/// Repository full name (`owner/name`) → URL, for one year.
pub type YearlyContributionSet = BTreeMap<String, String>;

/// Year → repositories contributed to that year. Years with nothing are absent.
pub type ContributionReport = BTreeMap<i32, YearlyContributionSet>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    #[serde(rename = "nameWithOwner")]
    pub name_with_owner: String,
    pub url: String,
    #[serde(rename = "isPrivate")]
    pub is_private: bool,
}

impl Repository {
    /// Public and not owned by `username`.
    pub fn is_external_public(&self, username: &str) -> bool {
        !self.is_private && !self.name_with_owner.starts_with(&format!("{username}/"))
    }
}

/// Half-open window `[Jan 1 year, Jan 1 year+1)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub year: i32,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl YearWindow {
    pub fn new(year: i32) -> Result<Self> {
        let jan_first = |y: i32| {
            Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0)
                .single()
                .ok_or_else(|| anyhow!("year {y} is out of range"))
        };
        let next = year
            .checked_add(1)
            .ok_or_else(|| anyhow!("year {year} is out of range"))?;

        Ok(Self {
            year,
            from: jan_first(year)?,
            to: jan_first(next)?,
        })
    }

    /// `from` as a GraphQL `DateTime`, e.g. `2021-01-01T00:00:00Z`.
    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// One page of pull request contributions.
#[derive(Debug, Clone, Default)]
pub struct PullRequestPage {
    pub repositories: Vec<Repository>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// Where contributions come from. `GithubClient` is the real one.
pub trait ContributionSource {
    /// Up to 100 pull request contributions in `window`, starting after `cursor`.
    async fn pull_request_page(
        &self,
        login: &str,
        window: &YearWindow,
        cursor: Option<&str>,
    ) -> Result<PullRequestPage>;

    /// Commit contributions grouped by repository, capped at 100 repositories.
    async fn commit_repositories(&self, login: &str, window: &YearWindow)
    -> Result<Vec<Repository>>;
}

/// Collect the report for `start..=end`. `start > end` yields an empty report.
pub async fn collect<S: ContributionSource>(
    source: &S,
    username: &str,
    start: i32,
    end: i32,
) -> Result<ContributionReport> {
    let mut report = ContributionReport::new();

    for year in start..=end {
        let window = YearWindow::new(year)?;
        let repos = collect_year(source, username, &window).await?;

        tracing::info!(year, repositories = repos.len(), "year collected");

        if !repos.is_empty() {
            report.insert(year, repos);
        }
    }

    Ok(report)
}

async fn collect_year<S: ContributionSource>(
    source: &S,
    username: &str,
    window: &YearWindow,
) -> Result<YearlyContributionSet> {
    let year = window.year;
    let mut repos = YearlyContributionSet::new();

    let mut cursor: Option<String> = None;
    let mut pages = 0usize;
    loop {
        let page = source
            .pull_request_page(username, window, cursor.as_deref())
            .await
            .with_context(|| format!("pull request query failed for year {year}"))?;
        pages += 1;

        tracing::debug!(
            year,
            page = pages,
            nodes = page.repositories.len(),
            has_next_page = page.has_next_page,
            "pull request page"
        );

        insert_external(&mut repos, username, page.repositories);

        if !page.has_next_page {
            break;
        }
        match page.end_cursor {
            Some(next) => cursor = Some(next),
            None => {
                return Err(anyhow!(
                    "pull request query failed for year {year}: next page reported without a cursor"
                ));
            }
        }
    }

    let commits = source
        .commit_repositories(username, window)
        .await
        .with_context(|| format!("commit query failed for year {year}"))?;

    tracing::debug!(year, repositories = commits.len(), "commit contributions");

    insert_external(&mut repos, username, commits);

    Ok(repos)
}

fn insert_external(set: &mut YearlyContributionSet, username: &str, repos: Vec<Repository>) {
    for repo in repos {
        if repo.is_external_public(username) {
            set.insert(repo.name_with_owner, repo.url);
        }
    }
}
