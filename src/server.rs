//! HTTP transport for the conversion handler.

use crate::core::ConvertError;
use crate::handler::{ConversionHandler, ProxyEvent, ProxyResponse};
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<ConversionHandler>,
}

/// Routes:
/// - `GET /convert?usd_amount=..`: the proxy response as a plain HTTP response
/// - `POST /invoke`: a proxy event in, the proxy response JSON out
/// - `GET /health`
pub fn router(handler: Arc<ConversionHandler>) -> Router {
    Router::new()
        .route("/convert", get(convert))
        .route("/invoke", post(invoke))
        .route("/health", get(health))
        .with_state(AppState { handler })
}

pub async fn serve(handler: Arc<ConversionHandler>, listen: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {listen}"))?;
    info!(addr = %listener.local_addr()?, targets = ?handler.targets(), "Listening");

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutting down");
}

async fn convert(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let event = ProxyEvent {
        query_string_parameters: Some(params),
    };
    into_http(state.handler.handle(&event).await)
}

// Decoded by hand so a malformed event still gets a proxy response instead of an axum rejection
async fn invoke(State(state): State<AppState>, body: Bytes) -> Json<ProxyResponse> {
    match serde_json::from_slice::<ProxyEvent>(&body) {
        Ok(event) => Json(state.handler.handle(&event).await),
        Err(e) => {
            let err = ConvertError::Input(format!("malformed event: {e}"));
            warn!(error = %err, "Rejected invocation");
            Json(ProxyResponse::from_error(&err))
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

fn into_http(proxy: ProxyResponse) -> Response {
    let status =
        StatusCode::from_u16(proxy.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, proxy.body).into_response();
    for (name, value) in &proxy.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}
