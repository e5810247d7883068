//! Shared service wiring handed to every handler.

use stockops_notify::Broadcaster;
use stockops_reports::ExportJobStore;

use crate::config::AppConfig;

/// Everything a handler can reach besides the request itself.
pub struct AppServices {
    pub config: AppConfig,
    pub jobs: ExportJobStore,
    pub notifier: Option<Broadcaster>,
}

impl AppServices {
    pub fn new(config: AppConfig) -> Self {
        let notifier = config
            .notify
            .as_ref()
            .map(|n| Broadcaster::new(n.endpoint.clone(), n.secret.clone()));

        Self {
            config,
            jobs: ExportJobStore::new(),
            notifier,
        }
    }

    /// Send a broadcast without tying it to the calling request.
    ///
    /// Delivery failures are logged and dropped; a notification must never
    /// fail the work it is reporting on.
    pub fn notify_detached(&self, message: String, user_ids: Vec<i64>) {
        let Some(notifier) = self.notifier.clone() else {
            tracing::debug!("broadcast skipped: no notify endpoint configured");
            return;
        };

        tokio::spawn(async move {
            if let Err(err) = notifier.broadcast(&message, &user_ids).await {
                tracing::warn!(error = %err, "broadcast delivery failed");
            }
        });
    }
}
