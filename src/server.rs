//! `POST /analyze` over HTTP.
//!
//! Each request runs on its own task, so a client that hangs up does not
//! cancel the analysis halfway and the render session is still released.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::analyzer::Analyzer;
use crate::errors::BrandprobeError;
use crate::session::SessionFactory;
use crate::summary::TextGenerator;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub client_input: String,
}

/// HTTP status for a failed analysis
pub fn status_for(err: &BrandprobeError) -> StatusCode {
    match err {
        BrandprobeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        BrandprobeError::SessionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        BrandprobeError::Navigation(_) | BrandprobeError::WebDriverFailed(_) => {
            StatusCode::BAD_GATEWAY
        }
        BrandprobeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        BrandprobeError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub fn router<F, G>(analyzer: Arc<Analyzer<F, G>>) -> Router
where
    F: SessionFactory + 'static,
    G: TextGenerator + 'static,
{
    Router::new()
        .route("/analyze", post(analyze::<F, G>))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(analyzer)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn analyze<F, G>(
    State(analyzer): State<Arc<Analyzer<F, G>>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response
where
    F: SessionFactory + 'static,
    G: TextGenerator + 'static,
{
    info!("POST /analyze {:?}", request.client_input);

    let task = tokio::spawn(async move { analyzer.analyze(&request.client_input).await });

    match task.await {
        Ok(Ok(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(Err(e)) => {
            error!("Analysis failed: {}", e);
            error_response(status_for(&e), e.to_string())
        }
        Err(e) => {
            error!("Analysis task panicked: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "analysis task failed".to_string(),
            )
        }
    }
}

/// Serve until ctrl-c
pub async fn serve<F, G>(analyzer: Analyzer<F, G>, addr: SocketAddr) -> Result<()>
where
    F: SessionFactory + 'static,
    G: TextGenerator + 'static,
{
    let app = router(Arc::new(analyzer));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")
}
