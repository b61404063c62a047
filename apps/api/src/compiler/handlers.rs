//! Axum route handlers for the Compile API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::compiler::facade::{compile_at, CompileResult};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompileRequest {
    pub source: String,
}

/// POST /api/v1/compile
///
/// Compiles resume source to a self-contained HTML fragment. Compile failures
/// are reported in-band (`error` plus an error fragment) with a 200; only a
/// malformed body or an oversized source is rejected.
pub async fn handle_compile(
    State(state): State<AppState>,
    payload: Result<Json<CompileRequest>, JsonRejection>,
) -> Result<Json<CompileResult>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let limit = state.config.max_source_bytes;
    if request.source.len() > limit {
        return Err(AppError::PayloadTooLarge(format!(
            "source is {} bytes, limit is {limit}",
            request.source.len()
        )));
    }

    // CPU-bound pass, kept off the async executor.
    let result = tokio::task::spawn_blocking(move || compile_at(&request.source, Utc::now()))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in compile: {e}")))?;

    Ok(Json(result))
}
