//! `stockops-notify` — outbound broadcast-message client.
//!
//! Export jobs report their lifecycle to users through a chat-broadcast
//! endpoint. The endpoint and its shared secret come from configuration;
//! this crate only knows the wire shape.

use serde::Serialize;
use thiserror::Error;

/// Name of the shared-secret header the broadcast endpoint expects.
const SECRET_HEADER: &str = "Secret-Key";

/// A broadcast delivery failed.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("broadcast request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Request body for the broadcast endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastRequest<'a> {
    broadcast_user_ids: &'a [i64],
    message: &'a str,
}

/// Client for the user-broadcast endpoint.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    client: reqwest::Client,
    endpoint: String,
    secret: String,
}

impl Broadcaster {
    pub fn new(endpoint: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            secret: secret.into(),
        }
    }

    /// Deliver `message` to every user in `user_ids`.
    ///
    /// Non-2xx responses from the endpoint are reported as errors; retry
    /// policy is left to the caller.
    pub async fn broadcast(&self, message: &str, user_ids: &[i64]) -> Result<(), NotifyError> {
        let body = BroadcastRequest {
            broadcast_user_ids: user_ids,
            message,
        };

        self.client
            .post(&self.endpoint)
            .header(SECRET_HEADER, &self.secret)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!(users = user_ids.len(), "broadcast delivered");
        Ok(())
    }
}
