//! Credential-holding proxy.
//!
//! `cluekit serve` runs a small HTTP server that owns the upstream API key.
//! Clients post the plain generation request to `POST /v1/generate`; the
//! proxy appends the key, forwards the body and relays the upstream status
//! and body unchanged. The key never leaves this process.

use crate::config::ProxyConfig;
use crate::hint::GenerateRequest;
use anyhow::{Context, Result, bail};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Environment variable holding the upstream API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Shared handler state.
#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    upstream: Arc<str>,
    api_key: Arc<str>,
}

impl std::fmt::Debug for ProxyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyState")
            .field("upstream", &self.upstream)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ProxyState {
    /// Creates the state for forwarding to `upstream` with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(upstream: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build upstream client")?;
        Ok(Self {
            client,
            upstream: Arc::from(upstream),
            api_key: Arc::from(api_key),
        })
    }
}

/// Validates the key read from [`API_KEY_ENV`].
///
/// # Errors
///
/// Returns an error if the key is unset or blank.
pub fn resolve_api_key(value: Option<String>) -> Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => bail!("{API_KEY_ENV} is not set; the proxy needs the upstream API key"),
    }
}

/// Builds the proxy routes.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/v1/generate", post(generate_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Serves the proxy on an already bound listener until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the server fails.
pub async fn serve(listener: TcpListener, state: ProxyState) -> Result<()> {
    let addr = listener.local_addr().context("listener has no address")?;
    info!(%addr, upstream = %state.upstream, "proxy listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received, stopping proxy");
            }
        })
        .await
        .context("proxy server error")
}

/// Runs the proxy to completion on a fresh runtime.
///
/// # Errors
///
/// Returns an error if the key is missing, the address cannot be bound or
/// the server fails.
pub fn run(config: &ProxyConfig, timeout: Duration) -> Result<()> {
    let api_key = resolve_api_key(std::env::var(API_KEY_ENV).ok())?;
    let state = ProxyState::new(&config.upstream, &api_key, timeout)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        let listener = TcpListener::bind(&config.listen)
            .await
            .with_context(|| format!("failed to bind to {}", config.listen))?;
        serve(listener, state).await
    })
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate_handler(
    State(state): State<ProxyState>,
    Json(body): Json<GenerateRequest>,
) -> Response {
    let result = state
        .client
        .post(state.upstream.as_ref())
        .query(&[("key", state.api_key.as_ref())])
        .json(&body)
        .send()
        .await;

    let upstream = match result {
        Ok(upstream) => upstream,
        Err(e) => return upstream_failure(&e),
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    match upstream.bytes().await {
        Ok(bytes) => {
            info!(status = status.as_u16(), len = bytes.len(), "relayed upstream response");
            (status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response()
        }
        Err(e) => upstream_failure(&e),
    }
}

/// Reports a forwarding failure in the upstream error shape. The URL is
/// stripped because it carries the key.
fn upstream_failure(err: &reqwest::Error) -> Response {
    let status = if err.is_timeout() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::BAD_GATEWAY
    };
    let message = format!("upstream request failed: {}", without_url(err));
    warn!(status = status.as_u16(), %message, "forwarding failed");
    (
        status,
        Json(serde_json::json!({ "error": { "code": status.as_u16(), "message": message } })),
    )
        .into_response()
}

fn without_url(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    if let Some(url) = err.url() {
        text = text.replace(url.as_str(), "<upstream>");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use std::collections::HashMap;

    async fn spawn(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Fake upstream: echoes the key and prompt, or fails for key "bad".
    async fn fake_upstream(
        Query(query): Query<HashMap<String, String>>,
        Json(body): Json<serde_json::Value>,
    ) -> Response {
        let key = query.get("key").cloned().unwrap_or_default();
        if key == "bad" {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": { "code": 400, "message": "API key not valid" } })),
            )
                .into_response();
        }
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
        Json(serde_json::json!({
            "candidates": [ { "content": { "parts": [ { "text": format!("{key}:{prompt}") } ] } } ]
        }))
        .into_response()
    }

    async fn proxy_for(api_key: &str) -> String {
        let upstream = spawn(Router::new().route("/generate", post(fake_upstream))).await;
        let state =
            ProxyState::new(&format!("{upstream}/generate"), api_key, Duration::from_secs(5))
                .unwrap();
        spawn(router(state)).await
    }

    #[test]
    fn test_resolve_api_key() {
        assert_eq!(resolve_api_key(Some(" k ".to_string())).unwrap(), "k");
        assert!(resolve_api_key(Some("  ".to_string())).is_err());
        assert!(resolve_api_key(None).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let state = ProxyState::new("http://upstream", "secret", Duration::from_secs(1)).unwrap();
        assert!(!format!("{state:?}").contains("secret"));
    }

    #[tokio::test]
    async fn test_health() {
        let proxy = proxy_for("k").await;
        let body: serde_json::Value = reqwest::get(format!("{proxy}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_forwards_with_key() {
        let proxy = proxy_for("k123").await;
        let response = reqwest::Client::new()
            .post(format!("{proxy}/v1/generate"))
            .json(&GenerateRequest::user_prompt("hello"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: crate::hint::GenerateResponse = response.json().await.unwrap();
        assert_eq!(body.first_text(), Some("k123:hello"));
    }

    #[tokio::test]
    async fn test_relays_upstream_error() {
        let proxy = proxy_for("bad").await;
        let response = reqwest::Client::new()
            .post(format!("{proxy}/v1/generate"))
            .json(&GenerateRequest::user_prompt("hello"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"]["message"], "API key not valid");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_hides_key() {
        let state = ProxyState::new(
            "http://127.0.0.1:1/generate",
            "topsecret",
            Duration::from_secs(2),
        )
        .unwrap();
        let proxy = spawn(router(state)).await;
        let response = reqwest::Client::new()
            .post(format!("{proxy}/v1/generate"))
            .json(&GenerateRequest::user_prompt("hello"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 502);
        let text = response.text().await.unwrap();
        assert!(!text.contains("topsecret"));
    }
}
