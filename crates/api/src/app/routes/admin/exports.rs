//! Export-job administration.

use axum::response::Response;
use serde_json::{Value, json};

use stockops_core::{ApiError, ApiResult};
use stockops_reports::ExportPhase;

use crate::app::dto;
use crate::app::registry::HandlerCollection;
use crate::context::HandlerContext;

pub fn collection() -> HandlerCollection {
    HandlerCollection::new()
        .get("/jobs", list_jobs)
        .post("/jobs/cancel", cancel_job)
}

/// List every known export job with its progress.
///
/// Per-job queries belong on the status endpoint; a stray `id` here is
/// rejected rather than silently ignored.
async fn list_jobs(ctx: HandlerContext) -> ApiResult<Response> {
    ctx.exclude_only(&["id"])?;

    let store = &ctx.services().jobs;
    let mut jobs = Vec::new();
    for id in store.list().await {
        if let Some(handle) = store.get(&id).await {
            jobs.push(json!({"id": id, "progress": handle.progress().await}));
        }
    }

    Ok(ctx
        .responder()
        .success("export jobs", Some(Value::Array(jobs))))
}

/// Cancel a job that has not started writing yet.
async fn cancel_job(ctx: HandlerContext) -> ApiResult<Response> {
    let params = ctx.include_only(&["id"])?.valid;
    let id = dto::require_uuid(&params, "id")?;

    let handle = ctx
        .services()
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("export job {id}")))?;

    let was_pending = handle.progress().await.phase == ExportPhase::Pending;
    handle.cancel();

    Ok(ctx.responder().success(
        "cancellation requested",
        Some(json!({"id": id, "was_pending": was_pending})),
    ))
}
