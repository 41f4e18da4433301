//! Core types for the push-notification client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque registration token issued by the messaging SDK.
///
/// An empty string is not a token: `new` maps it to `None`, so a present
/// token is never empty by construction.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceToken(String);

impl DeviceToken {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(DeviceToken(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: String = self.0.chars().take(8).collect();
        write!(f, "DeviceToken({}...)", shown)
    }
}

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a subscription topic. Non-empty, case-sensitive.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventName(String);

impl EventName {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(EventName(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventName({})", self.0)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards");
        Timestamp(duration.as_secs() as i64)
    }

    pub fn plus_secs(self, secs: i64) -> Self {
        Timestamp(self.0 + secs)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// Delivery payload handed over by the messaging SDK.
///
/// The `data` map is application-defined; the `event` entry, when present,
/// names the topic the message belongs to.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NotificationMessage {
    #[serde(rename = "messageId", default)]
    pub message_id: String,

    #[serde(default)]
    pub data: Map<String, Value>,
}

impl NotificationMessage {
    /// The topic this message was delivered for, read from `data.event`.
    pub fn event(&self) -> Option<EventName> {
        self.data
            .get("event")
            .and_then(Value::as_str)
            .and_then(EventName::new)
    }

    /// A message with neither an id nor data carries nothing worth keeping.
    pub fn is_empty(&self) -> bool {
        self.message_id.is_empty() && self.data.is_empty()
    }
}

/// Inbound event from the messaging SDK, carried on a single channel.
///
/// Foreground/background delivery, notification-opened, and token rotation
/// all arrive here instead of through per-hook callback registration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeliveryEvent {
    /// Message received while the app is in the foreground.
    Foreground { message: NotificationMessage },

    /// Message received in the background or with the app closed.
    Background { message: NotificationMessage },

    /// The app was opened by tapping a delivered notification.
    Opened { message: NotificationMessage },

    /// The SDK rotated the registration token.
    TokenRefresh { token: DeviceToken },
}

/// Bucket limits, frozen at the first write for each event type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Max notifications kept per event type before FIFO eviction.
    pub max_storage_quantity: usize,

    /// Seconds a stored notification stays retrievable.
    pub expiration_time: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_storage_quantity: 50,
            expiration_time: 7200,
        }
    }
}

/// A notification held in a bucket.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredNotification {
    pub message_id: String,

    /// The delivery payload as received.
    pub payload: Map<String, Value>,

    pub received_at: Timestamp,

    /// When set, the entry is dropped on the next expiry purge past this time.
    pub expires_at: Option<Timestamp>,
}
