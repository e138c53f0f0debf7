//! HTTP facade over the [`Pipeline`].
//!
//! - `POST /predict` - classification only
//! - `POST /support` - classification plus support plan
//! - `GET /health` - liveness and backend info
//!
//! CORS is permissive: any origin may call the service.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::types::{EmotionDistribution, EmotionLabel, SupportPlan};
use crate::{Pipeline, SolaceError};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub text: String,
    pub prediction: EmotionLabel,
    pub probabilities: EmotionDistribution,
}

#[derive(Debug, Deserialize)]
pub struct SupportRequest {
    pub text: String,
    /// Accepted for client compatibility; not used by the pipeline.
    #[serde(default)]
    pub mood: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SupportResponse {
    pub text: String,
    pub prediction: EmotionLabel,
    pub probabilities: EmotionDistribution,
    pub support_plan: SupportPlan,
}

/// Error body returned for rejected requests.
#[derive(Debug)]
pub struct ApiError(SolaceError);

impl From<SolaceError> for ApiError {
    fn from(err: SolaceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            SolaceError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

// ============================================================================
// Server State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

// ============================================================================
// Routes
// ============================================================================

/// Create the router with all endpoints
pub fn create_router(pipeline: Arc<Pipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .route("/support", post(support_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { pipeline })
}

/// Serve until ctrl-c.
pub async fn serve(addr: SocketAddr, pipeline: Arc<Pipeline>) -> std::io::Result<()> {
    let app = create_router(pipeline);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "classifier": state.pipeline.classifier().model_name(),
        "generator": state.pipeline.generator().backend_name(),
    }))
}

async fn predict_handler(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let result = state.pipeline.classify(&req.text).await?;
    Ok(Json(PredictResponse {
        text: req.text,
        prediction: result.predicted,
        probabilities: result.distribution,
    }))
}

async fn support_handler(
    State(state): State<AppState>,
    Json(req): Json<SupportRequest>,
) -> Result<Json<SupportResponse>, ApiError> {
    let result = state.pipeline.run(&req.text).await?;
    Ok(Json(SupportResponse {
        text: result.text,
        prediction: result.predicted_emotion,
        probabilities: result.probabilities,
        support_plan: result.support_plan,
    }))
}
