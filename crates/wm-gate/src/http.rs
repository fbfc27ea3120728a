use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::json;

use crate::config::StartupError;
use crate::error::GateError;
use crate::gate::{FlowRequest, ProxyGate, client_ip};

pub fn router(gate: Arc<ProxyGate>) -> Router {
    let api = Router::new()
        .route("/flow", post(flow))
        .route("/health", get(health));
    Router::new().nest("/api", api).with_state(gate)
}

async fn flow(
    State(gate): State<Arc<ProxyGate>>,
    headers: HeaderMap,
    body: Result<Json<FlowRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GateError> {
    let Json(request) = body.map_err(|rejection| GateError::BadRequest(rejection.body_text()))?;
    let client = client_ip(&headers);
    let data = gate.handle(request, &client).await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

async fn health(State(gate): State<Arc<ProxyGate>>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "version": env!("CARGO_PKG_VERSION"),
        "provider": gate.has_provider(),
        "flows": gate.flows().names().collect::<Vec<_>>(),
    }))
}

/// Serves until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    addr: SocketAddr,
    gate: Arc<ProxyGate>,
    shutdown: F,
) -> Result<(), StartupError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    tracing::info!("proxy listening on http://{}", addr);
    axum::serve(listener, router(gate))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(StartupError::Serve)
}

/// Serves until ctrl-c.
pub async fn serve(addr: SocketAddr, gate: Arc<ProxyGate>) -> Result<(), StartupError> {
    serve_with_shutdown(addr, gate, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {err}");
        }
        tracing::info!("shutting down");
    })
    .await
}
