use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Failures while serving a page. Both end up as a generic 500; an invalid
/// language is not an error, it renders the 404 page.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("failed to load texts: {0:#}")]
    Texts(anyhow::Error),
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
