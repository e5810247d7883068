//! Terminal rendering for forwarded failures.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use stockops_core::{ApiError, FallbackBody};

use crate::config::AppMode;
use crate::context::Responder;

/// Render a forwarded failure into the final HTTP response.
///
/// With a contract attached the failure always renders as the 400 envelope,
/// whatever status the error itself declares. Without one (the failure
/// happened before the handler context existed) the fallback shape is
/// synthesized from the error's declared status, with the debug rendering
/// attached only in development mode. The two body shapes stay distinct on
/// purpose; clients tell them apart.
pub fn sink(error: ApiError, contract: Option<Responder>, mode: AppMode) -> Response {
    if let Some(responder) = contract {
        return responder.fail(&error);
    }

    tracing::error!(error = %error, "request failed before a contract was attached");

    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let stack = if mode.is_development() {
        Some(format!("{error:?}"))
    } else {
        None
    };

    (status, Json(FallbackBody::new(error.to_string(), stack))).into_response()
}
