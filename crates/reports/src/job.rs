//! Background export jobs.
//!
//! An export runs detached from the request that started it: the request
//! gets a job id immediately, and the job reports progress through a shared
//! handle so the two lifetimes stay independently observable. Cancellation
//! only lands while a job is still pending; once the write begins it runs
//! to completion.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::report::{self, ReportError};

/// An export job did not produce a report.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("export cancelled before it started")]
    Cancelled,

    #[error("export worker failed: {0}")]
    Worker(String),
}

/// Phase of an export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPhase {
    Pending,
    Writing,
    Complete,
    Failed,
}

/// Progress information for an export job.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExportProgress {
    pub phase: ExportPhase,
    /// Data rows the job was asked to write (header excluded).
    pub rows: u64,
    pub started_at: DateTime<Utc>,
    /// On-disk file name once the write succeeded.
    pub file: Option<String>,
    /// Failure text; `None` on a failed job means it was cancelled.
    pub error: Option<String>,
    pub is_complete: bool,
}

/// Handle for monitoring and controlling an export job.
#[derive(Clone)]
pub struct ExportHandle {
    progress: Arc<RwLock<ExportProgress>>,
    cancellation: Arc<AtomicBool>,
}

impl ExportHandle {
    fn new(rows: u64) -> Self {
        Self {
            progress: Arc::new(RwLock::new(ExportProgress {
                phase: ExportPhase::Pending,
                rows,
                started_at: Utc::now(),
                file: None,
                error: None,
                is_complete: false,
            })),
            cancellation: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get current progress.
    pub async fn progress(&self) -> ExportProgress {
        self.progress.read().await.clone()
    }

    /// Ask the job not to start; has no effect once it is writing.
    pub fn cancel(&self) {
        self.cancellation.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.load(Ordering::Relaxed)
    }

    /// Wait for the job to finish, successfully or not.
    pub async fn wait_for_completion(&self) -> Result<ExportProgress, ExportError> {
        loop {
            let progress = self.progress.read().await.clone();
            if progress.is_complete {
                if progress.phase == ExportPhase::Failed {
                    return match progress.error {
                        Some(error) => Err(ExportError::Worker(error)),
                        None => Err(ExportError::Cancelled),
                    };
                }
                return Ok(progress);
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }
    }

    async fn set_writing(&self) {
        self.progress.write().await.phase = ExportPhase::Writing;
    }

    async fn finish_complete(&self, file: Option<String>) {
        let mut progress = self.progress.write().await;
        progress.phase = ExportPhase::Complete;
        progress.file = file;
        progress.is_complete = true;
    }

    async fn finish_failed(&self, error: Option<String>) {
        let mut progress = self.progress.write().await;
        progress.phase = ExportPhase::Failed;
        progress.error = error;
        progress.is_complete = true;
    }
}

/// In-memory store of export jobs by id.
#[derive(Clone, Default)]
pub struct ExportJobStore {
    jobs: Arc<RwLock<HashMap<Uuid, ExportHandle>>>,
}

impl ExportJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, job_id: Uuid, handle: ExportHandle) {
        self.jobs.write().await.insert(job_id, handle);
    }

    pub async fn get(&self, job_id: &Uuid) -> Option<ExportHandle> {
        self.jobs.read().await.get(job_id).cloned()
    }

    pub async fn list(&self) -> Vec<Uuid> {
        self.jobs.read().await.keys().copied().collect()
    }

    pub async fn remove(&self, job_id: &Uuid) {
        self.jobs.write().await.remove(job_id);
    }
}

/// Start writing `rows` to `<dir>/<file_name>.csv` on the blocking pool.
///
/// Returns immediately with the job's handle.
pub fn spawn_export(dir: PathBuf, file_name: String, rows: Vec<Vec<Value>>) -> ExportHandle {
    let handle = ExportHandle::new(rows.len() as u64);
    let worker = handle.clone();

    tokio::spawn(async move {
        if worker.is_cancelled() {
            worker.finish_failed(None).await;
            return;
        }
        worker.set_writing().await;

        let outcome =
            tokio::task::spawn_blocking(move || report::write_report(&dir, &file_name, &rows))
                .await;

        match outcome {
            Ok(Ok(path)) => {
                let file = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
                tracing::info!(file = file.as_deref().unwrap_or("?"), "report written");
                worker.finish_complete(file).await;
            }
            Ok(Err(err)) => {
                tracing::error!(error = %err, "report write failed");
                worker.finish_failed(Some(err.to_string())).await;
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "export worker aborted");
                worker
                    .finish_failed(Some(format!("export worker aborted: {join_err}")))
                    .await;
            }
        }
    });

    handle
}
