//! Remote notification-service contract.
//!
//! The service exposes two operations, both POSTs under the `push` path
//! segment: `subscribe` registers a device token for a set of events,
//! `unsubscribe` drops events. Request bodies are validated here, before
//! any I/O.

mod http;

pub use http::HttpApi;

use crate::error::{PushError, Result};
use crate::types::{DeviceToken, EventName};
use serde::Serialize;
use serde_json::{Map, Value};

/// Body of the subscribe call.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub token: String,
    pub events: Vec<String>,
    pub platform_application_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<Map<String, Value>>,
}

impl SubscribeRequest {
    pub fn new(
        token: &DeviceToken,
        events: &[EventName],
        app_name: &str,
        additional_info: Option<Map<String, Value>>,
    ) -> Result<Self> {
        if app_name.is_empty() {
            return Err(PushError::MissingAppName);
        }
        if events.is_empty() {
            return Err(PushError::NoValidEvents);
        }

        Ok(Self {
            token: token.as_str().to_string(),
            events: events.iter().map(|e| e.as_str().to_string()).collect(),
            platform_application_name: app_name.to_string(),
            additional_info,
        })
    }
}

/// Body of the unsubscribe call.
#[derive(Clone, Debug, Serialize)]
pub struct UnsubscribeRequest {
    pub events: Vec<String>,
}

impl UnsubscribeRequest {
    pub fn new(events: &[EventName]) -> Result<Self> {
        if events.is_empty() {
            return Err(PushError::NoValidEvents);
        }

        Ok(Self {
            events: events.iter().map(|e| e.as_str().to_string()).collect(),
        })
    }
}

/// The remote subscribe/unsubscribe endpoint pair.
pub trait NotificationApi: Send + Sync {
    fn subscribe(&self, request: &SubscribeRequest) -> Result<()>;
    fn unsubscribe(&self, request: &UnsubscribeRequest) -> Result<()>;
}
