//! # Push Notify
//!
//! Client-side push-notification integration: wraps an external messaging
//! SDK and a notification-channel SDK behind trait seams, manages the device
//! registration token, and exposes a subscription/event model to application
//! code.
//!
//! ## Core Concepts
//!
//! - **Reconcile**: compare the cached device token against a freshly
//!   fetched one and register with the remote service only when they differ
//! - **Events**: application-defined topics the device subscribes to
//! - **Buckets**: bounded per-type FIFO storage for received notifications
//! - **State slots**: latest foreground/background payload and last
//!   subscribe error, exposed to consuming UI
//!
//! ## Example
//!
//! ```ignore
//! use push_notify::{ClientConfig, DeliveryEvent, PushClient};
//!
//! let mut config = ClientConfig::new("PickingApp", "beta");
//! config.events = vec!["picking:session:created".into()];
//!
//! let client = PushClient::new(config, messaging, store, api, &registry)?;
//!
//! // Feed SDK events through the inbound channel
//! client.run(receiver);
//! ```

pub mod api;
pub mod buffer;
pub mod channels;
pub mod client;
pub mod error;
pub mod events;
pub mod external;
pub mod state;
pub mod subscriptions;
pub mod token;
pub mod types;

// Re-exports
pub use api::{HttpApi, NotificationApi, SubscribeRequest, UnsubscribeRequest};
pub use buffer::NotificationBuffer;
pub use channels::{
    create_notification_channels, default_channel, parse_channel_spec, ChannelConfig,
    ChannelImportance, ChannelOverrides, ChannelSpec, ChannelVisibility, DEFAULT_CHANNEL_ID,
};
pub use client::{ClientConfig, PushClient, StorageSettings};
pub use error::{PushError, Result};
pub use events::{prepare_events, EventSet};
pub use external::{ChannelRegistry, KeyValueStore, Messaging};
pub use state::{NotificationSlot, NotificationStateStore};
pub use subscriptions::{
    SubscriptionErrorCallback, SubscriptionManager, SubscriptionPhase, SubscriptionSnapshot,
};
pub use token::TokenCache;
pub use types::*;
