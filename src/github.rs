use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::contributions::{ContributionSource, PullRequestPage, Repository, YearWindow};

const USER_AGENT: &str = concat!("yearly-contribs/", env!("CARGO_PKG_VERSION"));

const PULL_REQUEST_QUERY: &str = r#"
query($login: String!, $from: DateTime!, $to: DateTime!, $cursor: String) {
    user(login: $login) {
        contributionsCollection(from: $from, to: $to) {
            pullRequestContributions(first: 100, after: $cursor) {
                pageInfo {
                    hasNextPage
                    endCursor
                }
                nodes {
                    pullRequest {
                        repository {
                            nameWithOwner
                            url
                            isPrivate
                        }
                    }
                }
            }
        }
    }
}
"#;

const COMMIT_QUERY: &str = r#"
query($login: String!, $from: DateTime!, $to: DateTime!) {
    user(login: $login) {
        contributionsCollection(from: $from, to: $to) {
            commitContributionsByRepository(maxRepositories: 100) {
                repository {
                    nameWithOwner
                    url
                    isPrivate
                }
            }
        }
    }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<UserData<T>>,
}

#[derive(Debug, Deserialize)]
struct UserData<T> {
    user: Option<T>,
}

#[derive(Debug, Deserialize)]
struct PullRequestUser {
    #[serde(rename = "contributionsCollection")]
    contributions_collection: PullRequestCollection,
}

#[derive(Debug, Deserialize)]
struct PullRequestCollection {
    #[serde(rename = "pullRequestContributions")]
    pull_request_contributions: PullRequestConnection,
}

#[derive(Debug, Deserialize)]
struct PullRequestConnection {
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
    nodes: Option<Vec<Option<PullRequestNode>>>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(rename = "endCursor")]
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullRequestNode {
    #[serde(rename = "pullRequest")]
    pull_request: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
struct RepositoryNode {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct CommitUser {
    #[serde(rename = "contributionsCollection")]
    contributions_collection: CommitCollection,
}

#[derive(Debug, Deserialize)]
struct CommitCollection {
    #[serde(rename = "commitContributionsByRepository")]
    commit_contributions_by_repository: Vec<RepositoryNode>,
}

#[derive(Clone)]
pub struct GithubClient {
    token: Arc<String>,
    endpoint: Arc<String>,
    http: Arc<Client>,
}

impl GithubClient {
    pub fn new(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            token: Arc::new(token.into()),
            endpoint: Arc::new(endpoint.into()),
            http: Arc::new(Client::new()),
        }
    }

    /// Low-level GraphQL request with `errors` checking. No retries: any failure is final.
    async fn graphql(&self, query: &str, variables: Value) -> Result<Value> {
        tracing::debug!(endpoint = %self.endpoint, %variables, "graphql request");

        let resp = self
            .http
            .post(self.endpoint.as_str())
            .bearer_auth(&*self.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| anyhow!("Network error sending GraphQL request: {e}"))?;

        let status = resp.status();

        // Parse JSON (even for non-2xx to capture error payloads)
        let json: Value = resp
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse JSON from GitHub (HTTP {}): {e}", status.as_u16()))?;

        check_errors(&json)?;

        if !status.is_success() {
            return Err(anyhow!(
                "GitHub API returned HTTP {}: {json:#}",
                status.as_u16()
            ));
        }

        Ok(json)
    }

    async fn user_query<T: DeserializeOwned>(
        &self,
        query: &str,
        login: &str,
        variables: Value,
        what: &str,
    ) -> Result<T> {
        let json = self.graphql(query, variables).await?;
        decode_user(json, login).with_context(|| format!("Failed to deserialize {what} response"))
    }
}

impl ContributionSource for GithubClient {
    async fn pull_request_page(
        &self,
        login: &str,
        window: &YearWindow,
        cursor: Option<&str>,
    ) -> Result<PullRequestPage> {
        let variables = json!({
            "login": login,
            "from": window.from_rfc3339(),
            "to": window.to_rfc3339(),
            "cursor": cursor,
        });

        let user: PullRequestUser = self
            .user_query(PULL_REQUEST_QUERY, login, variables, "pullRequestContributions")
            .await?;

        Ok(pull_request_page(user))
    }

    async fn commit_repositories(
        &self,
        login: &str,
        window: &YearWindow,
    ) -> Result<Vec<Repository>> {
        let variables = json!({
            "login": login,
            "from": window.from_rfc3339(),
            "to": window.to_rfc3339(),
        });

        let user: CommitUser = self
            .user_query(COMMIT_QUERY, login, variables, "commitContributionsByRepository")
            .await?;

        Ok(user
            .contributions_collection
            .commit_contributions_by_repository
            .into_iter()
            .filter_map(|n| n.repository)
            .collect())
    }
}

/// A non-empty top-level `errors` array fails the request.
fn check_errors(json: &Value) -> Result<()> {
    match json.get("errors") {
        Some(Value::Array(errors)) if errors.is_empty() => Ok(()),
        Some(Value::Null) | None => Ok(()),
        Some(errors) => Err(anyhow!("GraphQL reported errors: {errors:#}")),
    }
}

fn decode_user<T: DeserializeOwned>(json: Value, login: &str) -> Result<T> {
    let parsed: GraphqlResponse<T> = serde_json::from_value(json)?;
    parsed
        .data
        .ok_or_else(|| anyhow!("response has no data"))?
        .user
        .ok_or_else(|| anyhow!("no user found with login {login:?}"))
}

fn pull_request_page(user: PullRequestUser) -> PullRequestPage {
    let conn = user.contributions_collection.pull_request_contributions;

    let repositories = conn
        .nodes
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|n| n.pull_request)
        .filter_map(|pr| pr.repository)
        .collect();

    PullRequestPage {
        repositories,
        has_next_page: conn.page_info.has_next_page,
        end_cursor: conn.page_info.end_cursor,
    }
}
