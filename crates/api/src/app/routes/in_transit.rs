//! In-transit cost endpoints.

use std::sync::Arc;

use axum::response::Response;
use serde_json::json;
use uuid::Uuid;

use stockops_core::{ApiError, ApiResult};

use crate::app::dto;
use crate::app::registry::HandlerCollection;
use crate::context::HandlerContext;

pub fn collection() -> HandlerCollection {
    HandlerCollection::new()
        .post("/export_comprehensive_cost", export_comprehensive_cost)
        .get("/export_jobs", export_job_status)
}

/// Start a comprehensive-cost export and reply before it finishes.
///
/// The job gets its own id and a completion watcher; the caller is told the
/// download URL up front and broadcast to again when the file is ready (or
/// the job fails). The request's response and the job's lifetime are
/// deliberately decoupled.
async fn export_comprehensive_cost(ctx: HandlerContext) -> ApiResult<Response> {
    let params = ctx.include_only(&["file_name", "rows", "user_id"])?.valid;
    let file_name = dto::require_string(&params, "file_name")?;
    let rows = dto::require_rows(&params, "rows")?;
    let user_id = dto::require_i64(&params, "user_id")?;

    // Reject path-like names before any work is queued.
    let report_file = stockops_reports::report_file_name(&file_name)
        .map_err(|err| ApiError::invalid("file_name", err.to_string()))?;

    let services = ctx.services();
    let job_id = Uuid::now_v7();
    let download_url = format!("{}/{}", services.config.files_public_url(), report_file);
    let rows_total = rows.len();

    let handle = stockops_reports::spawn_export(
        services.config.report_dir.clone(),
        file_name,
        rows,
    );
    services.jobs.insert(job_id, handle.clone()).await;

    services.notify_detached(
        "your in-transit cost export has started, watch for the completion notice".to_owned(),
        vec![user_id],
    );

    // Completion watcher: reports the job's outcome on its own channel,
    // independently of this request's response.
    let watcher_services = Arc::clone(services);
    let watcher_url = download_url.clone();
    tokio::spawn(async move {
        match handle.wait_for_completion().await {
            Ok(_) => watcher_services.notify_detached(
                format!("your in-transit cost export is complete, download link -> {watcher_url}"),
                vec![user_id],
            ),
            Err(err) => {
                tracing::error!(job = %job_id, error = %err, "export job failed");
                watcher_services.notify_detached(
                    "your in-transit cost export failed".to_owned(),
                    vec![user_id],
                );
            }
        }
    });

    Ok(ctx.responder().success(
        "export started, watch for the completion notice",
        Some(json!({
            "job_id": job_id,
            "file": report_file,
            "download_url": download_url,
            "rows": rows_total,
        })),
    ))
}

/// Report a single export job's progress.
async fn export_job_status(ctx: HandlerContext) -> ApiResult<Response> {
    let params = ctx.include_only(&["id"])?.valid;
    let id = dto::require_uuid(&params, "id")?;

    let handle = ctx
        .services()
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("export job {id}")))?;

    let progress = handle.progress().await;
    Ok(ctx.responder().success(
        "export job status",
        Some(json!({"id": id, "progress": progress})),
    ))
}
