//! In-process GraphQL endpoint for driving the binary over real HTTP.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

/// Maps a request body to the status and JSON the endpoint answers with.
pub type Responder = fn(&Value) -> (StatusCode, Value);

/// One request as the endpoint saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct StubState {
    respond: Responder,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct StubApi {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubApi {
    /// Bind an ephemeral port and serve `respond` on `/graphql`.
    pub async fn start(respond: Responder) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            respond,
            requests: Arc::clone(&requests),
        };
        let app = Router::new()
            .route("/graphql", post(graphql))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}/graphql", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn graphql(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let (status, reply) = (state.respond)(&body);

    state.requests.lock().unwrap().push(RecordedRequest {
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    (status, Json(reply))
}

/// True when the body carries the pull request contributions query.
pub fn is_pull_request_query(body: &Value) -> bool {
    body["query"]
        .as_str()
        .is_some_and(|q| q.contains("pullRequestContributions"))
}

pub fn repository(name: &str, private: bool) -> Value {
    serde_json::json!({
        "nameWithOwner": name,
        "url": format!("https://github.com/{name}"),
        "isPrivate": private,
    })
}

pub fn pull_request_page(repos: Vec<Value>, end_cursor: Option<&str>) -> Value {
    let nodes: Vec<Value> = repos
        .into_iter()
        .map(|r| serde_json::json!({ "pullRequest": { "repository": r } }))
        .collect();

    serde_json::json!({ "data": { "user": { "contributionsCollection": {
        "pullRequestContributions": {
            "pageInfo": { "hasNextPage": end_cursor.is_some(), "endCursor": end_cursor },
            "nodes": nodes,
        }
    } } } })
}

pub fn commit_repositories(repos: Vec<Value>) -> Value {
    let entries: Vec<Value> = repos
        .into_iter()
        .map(|r| serde_json::json!({ "repository": r }))
        .collect();

    serde_json::json!({ "data": { "user": { "contributionsCollection": {
        "commitContributionsByRepository": entries,
    } } } })
}
