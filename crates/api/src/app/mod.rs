//! HTTP application wiring (axum router + service wiring).
//!
//! If you're new to this folder:
//! - `services.rs`: shared wiring handed to handlers (config, jobs, notifier)
//! - `registry.rs` / `boundary.rs`: route-module mounting and failure capture
//! - `routes/`: route modules (one file per mounted module) + system routes
//! - `dto.rs`: typed coercions out of validated parameter mappings
//! - `errors.rs`: terminal failure rendering

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;

pub mod boundary;
pub mod dto;
pub mod errors;
pub mod registry;
pub mod routes;
pub mod services;

pub use registry::StartupError;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
///
/// Mounting runs to completion here, before any listener exists; an `Err`
/// means the process must not start serving.
pub fn build_app(config: AppConfig) -> Result<Router, StartupError> {
    let files_path = config.files_context_path();
    let report_dir = config.report_dir.clone();
    let context_path = config.context_path.clone();
    let services = Arc::new(services::AppServices::new(config));

    let api = registry::load(routes::registry(), &context_path, &services)?;

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .nest_service(&files_path, ServeDir::new(report_dir))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        ))
}
