use crate::prelude::*;
use crate::workflow::{self, AppState};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct GenerateDiffRequest {
    #[serde(rename = "repoUrl", alias = "repo_url")]
    pub repo_url: String,
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateDiffResponse {
    pub diff: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn generate_diff(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateDiffRequest>,
) -> AppResult<Json<GenerateDiffResponse>> {
    log::info!("generate-diff requested for {}", request.repo_url);

    let diff = workflow::generate_diff(&state, &request.repo_url, &request.prompt)
        .await
        .inspect_err(|e| log::warn!("generate-diff for {} failed: {e}", request.repo_url))?;

    Ok(Json(GenerateDiffResponse { diff }))
}
