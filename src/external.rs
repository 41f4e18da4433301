//! Trait seams for the external native SDKs.
//!
//! The push-delivery transport, the local key-value store, and the
//! notification-channel registry are collaborators, not part of this crate.
//! Each is consumed through a narrow trait so the client can be composed
//! against the real SDK bindings in an app and against in-memory fakes in
//! tests.

use crate::channels::ChannelConfig;
use crate::error::Result;
use crate::types::{DeviceToken, NotificationMessage};

/// The messaging SDK surface this crate consumes directly.
///
/// Message delivery and token rotation are not part of this trait; they
/// arrive on the inbound [`DeliveryEvent`](crate::DeliveryEvent) channel.
pub trait Messaging: Send + Sync {
    /// Fetch the current registration token.
    fn token(&self) -> Result<DeviceToken>;

    /// The notification that opened the app from a closed state, if any.
    fn initial_notification(&self) -> Result<Option<NotificationMessage>>;
}

/// Local key-value persistence (async-storage analog).
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Notification-channel SDK surface (visual presentation configuration).
pub trait ChannelRegistry: Send + Sync {
    fn create_channel(&self, config: &ChannelConfig) -> Result<()>;
    fn create_channels(&self, configs: &[ChannelConfig]) -> Result<()>;
}
