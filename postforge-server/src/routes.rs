use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use postforge_core::{Runnable, ValidationError};
use postforge_prompt::{compose, GenerationConfig, GenerationResult};

use crate::{error::ApiError, AppState};

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    generator_configured: bool,
    lead_capture_enabled: bool,
    lead_persistence_failures: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        generator_configured: state.generator.is_some(),
        lead_capture_enabled: state.leads.is_enabled(),
        lead_persistence_failures: state.leads.failure_count(),
    })
}

async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let Json(body) =
        payload.map_err(|rejection| ValidationError::MalformedBody(rejection.body_text()))?;
    let config = GenerationConfig::from_value(&body)?;

    state.leads.record(&config);

    let Some(generator) = state.generator.as_ref() else {
        tracing::error!("generation requested but no provider API key is configured");
        return Err(ApiError::Configuration);
    };

    let prompt = compose(&config);
    let result = generator.invoke(prompt).await.map_err(|err| {
        tracing::error!(error = %err, "post generation failed");
        ApiError::from(err)
    })?;

    tracing::info!(
        post_type = config.post_type().as_str(),
        degraded = result.is_degraded(),
        bullets = result.why.len(),
        "post generated"
    );
    Ok(Json(result))
}
