//! `stockops-reports` — cost-report files and the background jobs that
//! write them.
//!
//! The report itself is a flat table (see [`report::COLUMNS`]); writing one
//! is a blocking filesystem operation, so it always runs as a background
//! job with its own identity, decoupled from the request that started it.

pub mod job;
pub mod report;

pub use job::{ExportError, ExportHandle, ExportJobStore, ExportPhase, ExportProgress, spawn_export};
pub use report::{ReportError, report_file_name, write_report};
