//! `stockops-core` — scaffold foundation building blocks.
//!
//! This crate contains the **pure** request/response primitives (no HTTP or
//! I/O concerns): the request error taxonomy, the parameter-partition
//! contract, the two wire-level response body shapes, and mount-path
//! derivation for route modules.

pub mod envelope;
pub mod error;
pub mod mount;
pub mod params;

pub use envelope::{Envelope, FallbackBody};
pub use error::{ApiError, ApiResult};
pub use mount::{MountError, mount_path};
pub use params::{ParamMap, ParamsResult, exclude_only, include_only};
