//! Environment-derived configuration.
//!
//! Everything comes from environment variables with logged defaults, the
//! same posture the rest of the deployment tooling expects. Invalid values
//! are fatal in `main`: misconfiguration is not recoverable at runtime.

use std::path::PathBuf;

use thiserror::Error;

/// Default request-body cap: generous because export rows arrive inline.
const DEFAULT_MAX_BODY_BYTES: usize = 200 * 1024 * 1024;

/// Run mode; controls the log format, whether fallback bodies carry a
/// stack, and the shape of the public download URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Development,
    Production,
}

impl AppMode {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// The configuration could not be read; startup must abort.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT `{0}` is not a valid port number")]
    InvalidPort(String),

    #[error("MAX_BODY_BYTES `{0}` is not a valid byte count")]
    InvalidBodyLimit(String),

    #[error("NOTIFY_URL is set but NOTIFY_SECRET is empty")]
    MissingNotifySecret,
}

/// Where export lifecycle broadcasts go.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub endpoint: String,
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: AppMode,
    pub port: u16,
    /// Prefix every derived mount path is served under.
    pub context_path: String,
    /// Public origin used when building download links.
    pub base_url: String,
    /// Directory generated reports are written to and served from.
    pub report_dir: PathBuf,
    pub max_body_bytes: usize,
    /// `None` disables broadcasts entirely.
    pub notify: Option<NotifyConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = AppMode::from_env();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => 8080,
        };

        let context_path = std::env::var("CONTEXT_PATH").unwrap_or_else(|_| {
            tracing::warn!("CONTEXT_PATH not set; defaulting to /api");
            "/api".to_owned()
        });

        let base_url =
            std::env::var("BASE_URL").unwrap_or_else(|_| "http://127.0.0.1".to_owned());

        let report_dir = std::env::var("REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("reports"));

        let max_body_bytes = match std::env::var("MAX_BODY_BYTES") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidBodyLimit(raw))?,
            Err(_) => DEFAULT_MAX_BODY_BYTES,
        };

        let notify = match std::env::var("NOTIFY_URL") {
            Ok(endpoint) => {
                let secret = std::env::var("NOTIFY_SECRET").unwrap_or_default();
                if secret.is_empty() {
                    return Err(ConfigError::MissingNotifySecret);
                }
                Some(NotifyConfig { endpoint, secret })
            }
            Err(_) => {
                tracing::info!("NOTIFY_URL not set; export broadcasts disabled");
                None
            }
        };

        Ok(Self {
            mode,
            port,
            context_path,
            base_url,
            report_dir,
            max_body_bytes,
            notify,
        })
    }

    /// URL path the generated report files are served under.
    pub fn files_context_path(&self) -> String {
        format!("{}/files", self.context_path)
    }

    /// Public base URL for downloading generated reports.
    ///
    /// Development serves straight off the bound port; production assumes a
    /// fronting proxy on the bare base URL.
    pub fn files_public_url(&self) -> String {
        match self.mode {
            AppMode::Development => {
                format!("{}:{}{}", self.base_url, self.port, self.files_context_path())
            }
            AppMode::Production => format!("{}{}", self.base_url, self.files_context_path()),
        }
    }
}
