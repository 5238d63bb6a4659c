use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub type AppResult<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("{0} is not configured")]
    ConfigurationMissing(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to fetch repo: {0}")]
    UpstreamFetch(String),

    #[error("Model request failed: {0}")]
    Model(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::ConfigurationMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::UpstreamFetch(_) | Error::Model(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<anytool_core::github::RepoUrlError> for Error {
    fn from(err: anytool_core::github::RepoUrlError) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::UpstreamFetch(err.to_string())
    }
}

#[derive(Debug, serde::Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
