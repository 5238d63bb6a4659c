mod cli;
mod routes;

pub use cli::ServeOptions;

use crate::prelude::*;
use crate::workflow::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the HTTP router around a shared [`AppState`].
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/generate-diff", post(routes::generate_diff))
        .layer(cors)
        .with_state(state)
}

pub async fn run(options: ServeOptions, state: AppState) -> Result<()> {
    let addr = f!("{}:{}", options.host, options.port);

    if state.settings.model_credential().is_none() {
        log::warn!(
            "{} is not set, /generate-diff will answer 503",
            crate::workflow::MODEL_CREDENTIAL_VAR
        );
    }

    let app_router = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    log::info!("anytool listening on http://{}", addr);
    log::info!("Diff endpoint: http://{}/generate-diff", addr);

    axum::serve(listener, app_router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}
