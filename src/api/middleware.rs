use crate::api::AppState;
use crate::error::{AppError, ErrorKind};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// Rewrites caller-error responses to `200` when legacy status codes are enabled.
///
/// The body keeps the plain-text message; only the status changes.
pub async fn legacy_status_codes(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    if state.config.api.legacy_status_codes
        && response.extensions().get::<ErrorKind>().is_some_and(|kind| kind.answered_ok_in_legacy_mode())
    {
        *response.status_mut() = StatusCode::OK;
    }

    response
}

/// Fallback for unmatched paths and methods.
pub async fn not_found() -> AppError {
    AppError::RouteNotFound
}
