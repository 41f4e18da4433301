//! HTTP implementation of the notification-service contract.

use super::{NotificationApi, SubscribeRequest, UnsubscribeRequest};
use crate::error::{PushError, Result};
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::debug;

/// Blocking HTTP client for the notification microservice.
///
/// The base URL is derived from the deployment environment name; tests and
/// self-hosted setups can point at an arbitrary base with
/// [`with_base_url`](HttpApi::with_base_url).
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(environment: &str) -> Self {
        Self::with_base_url(format!("https://notification.{environment}.janis.in/api"))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, namespace: &str) -> String {
        format!("{}/{}/push", self.base_url, namespace)
    }

    fn post<T: Serialize>(&self, namespace: &str, body: &T) -> Result<()> {
        let response = self.client.post(self.endpoint(namespace)).json(body).send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Surface the server-provided message when the body carries one.
        let text = response.text().unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| if text.is_empty() { status.to_string() } else { text });

        Err(PushError::Transport {
            status: Some(status.as_u16()),
            message,
        })
    }
}

impl NotificationApi for HttpApi {
    fn subscribe(&self, request: &SubscribeRequest) -> Result<()> {
        debug!(events = request.events.len(), "subscribing device");
        self.post("subscribe", request)
    }

    fn unsubscribe(&self, request: &UnsubscribeRequest) -> Result<()> {
        debug!(events = request.events.len(), "unsubscribing device");
        self.post("unsubscribe", request)
    }
}
