pub mod project_graph;
pub mod root;

use axum::http::StatusCode;

/// Handler failures are reported to the browser as plain text.
pub type RouteError = (StatusCode, String);

pub(crate) fn internal_error<E: std::fmt::Display>(err: E) -> RouteError {
    tracing::error!(error = %err, "Request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
