//! Liveness endpoints, mounted outside the context prefix.

use axum::http::StatusCode;

pub async fn health() -> StatusCode {
    StatusCode::OK
}
