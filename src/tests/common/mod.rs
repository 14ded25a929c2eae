// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use http::StatusCode;
use reqwest::Client;
use serde_json::Value;

use crate::config::settings::ApiConfig;
use crate::sources::PixaiClient;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn pixai_client(addr: SocketAddr) -> PixaiClient {
    PixaiClient::new(&ApiConfig {
        url: format!("http://{}/graphql", addr),
        token: Some("test-token".into()),
        timeout_seconds: 2,
    })
    .expect("pixai client")
}

/// In-process stand-in for the GraphQL endpoint.
///
/// Answers the quota query with `quota` and the token query with `tokens`;
/// the token query fails with 500 while `fail_tokens_after` calls have
/// already been served.
#[derive(Clone)]
pub struct FakeUpstream {
    pub quota: Arc<AtomicI64>,
    pub tokens: Arc<Value>,
    pub token_calls: Arc<AtomicUsize>,
    pub fail_tokens_after: usize,
}

impl FakeUpstream {
    pub fn new(quota: i64, tokens: Value) -> Self {
        Self {
            quota: Arc::new(AtomicI64::new(quota)),
            tokens: Arc::new(tokens),
            token_calls: Arc::new(AtomicUsize::new(0)),
            fail_tokens_after: usize::MAX,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/graphql", post(graphql))
            .with_state(self.clone())
    }
}

async fn graphql(State(upstream): State<FakeUpstream>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let query = body["query"].as_str().unwrap_or_default();
    if query.contains("quotaAmount") {
        let quota = upstream.quota.load(Ordering::SeqCst);
        return (StatusCode::OK, Json(json!({"data": {"me": {"quotaAmount": quota}}})));
    }

    let served = upstream.token_calls.fetch_add(1, Ordering::SeqCst);
    if served >= upstream.fail_tokens_after {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"errors": [{"message": "transient"}]})));
    }
    (StatusCode::OK, Json(upstream.tokens.as_ref().clone()))
}

/// GraphQL body listing `(name, expireTime)` pairs as token edges.
pub fn tokens_body(tokens: &[(&str, &str)]) -> Value {
    let edges: Vec<Value> = tokens
        .iter()
        .enumerate()
        .map(|(i, (name, expire_time))| {
            json!({
                "node": {
                    "id": i.to_string(),
                    "userId": "user-1",
                    "name": name,
                    "secret": "redacted",
                    "expireTime": expire_time,
                    "lastUsedAt": null,
                    "createdAt": "2023-01-01T00:00:00.000Z"
                },
                "cursor": i.to_string()
            })
        })
        .collect();
    json!({"data": {"me": {"accessTokens": {
        "edges": edges,
        "pageInfo": {"hasNextPage": false, "hasPreviousPage": false, "endCursor": null, "startCursor": null},
        "totalCount": tokens.len()
    }}}})
}

/// Value of the first sample line starting with `series`, if any.
pub fn sample_value(exposition: &str, series: &str) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (name, value) = line.rsplit_once(' ')?;
            (name == series).then(|| value.parse().ok()).flatten()
        })
}
