//! Request-level error model.

use thiserror::Error;

/// Result type used across handler code.
pub type ApiResult<T> = Result<T, ApiError>;

/// A failure raised anywhere on the request path.
///
/// Every handler failure, whether validation or business logic and whether
/// raised before or after an await point, is funnelled through this type;
/// the serving layer decides
/// how it is rendered. [`ApiError::status_code`] is the error's *declared*
/// HTTP status, consulted only when no response contract is attached to the
/// request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required parameter was absent from the request's source mapping.
    #[error("missing required parameter {key}")]
    MissingParameter { key: String },

    /// A forbidden parameter was present with a non-null value.
    #[error("disallowed parameter {key}={value}")]
    DisallowedParameter { key: String, value: String },

    /// A parameter was present but could not be coerced to the expected type.
    #[error("invalid parameter {key}: {reason}")]
    InvalidParameter { key: String, reason: String },

    /// The request body could not be parsed into a parameter mapping.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// The request body exceeded the configured size cap.
    #[error("request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    /// A referenced resource does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The caller is not allowed to perform the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Any other handler failure, including captured panics.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl ApiError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingParameter { key: key.into() }
    }

    pub fn disallowed(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::DisallowedParameter {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    /// Declared HTTP status, used by the fallback rendering path.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingParameter { .. }
            | Self::DisallowedParameter { .. }
            | Self::InvalidParameter { .. }
            | Self::MalformedBody(_) => 400,
            Self::PayloadTooLarge { .. } => 413,
            Self::NotFound(_) => 404,
            Self::Unauthorized(_) => 401,
            Self::Handler(_) => 500,
        }
    }
}
