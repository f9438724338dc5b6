//! Local HTTP stand-in for a provider API.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::config::{EmissionsConfig, ProviderKind};

/// One request as the server received it.
#[derive(Debug, Clone)]
pub struct Received {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: String,
    received: Arc<Mutex<Vec<Received>>>,
}

pub struct FakeApi {
    pub base_url: String,
    received: Arc<Mutex<Vec<Received>>>,
}

impl FakeApi {
    /// Serves `body` with `status` for every POST to `path`.
    pub async fn start(path: &str, status: StatusCode, body: impl Into<String>) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let canned = Canned {
            status,
            body: body.into(),
            received: received.clone(),
        };
        let app = Router::new().route(path, post(reply)).with_state(canned);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            received,
        }
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

async fn reply(
    State(canned): State<Canned>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    canned.received.lock().unwrap().push(Received {
        path: uri.path().to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    (canned.status, canned.body)
}

/// A base URL whose port has nothing listening.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn config(provider: ProviderKind, base_url: &str) -> EmissionsConfig {
    EmissionsConfig {
        provider,
        api_key: "k".into(),
        base_url: base_url.into(),
        data_version: "21.21".into(),
        timeout_secs: 5,
    }
}
