//! Client composition root tying all components together.

use crate::api::{HttpApi, NotificationApi};
use crate::buffer::NotificationBuffer;
use crate::channels::{create_notification_channels, ChannelSpec};
use crate::error::{PushError, Result};
use crate::events::prepare_events;
use crate::external::{ChannelRegistry, KeyValueStore, Messaging};
use crate::state::{NotificationSlot, NotificationStateStore};
use crate::subscriptions::{SubscriptionErrorCallback, SubscriptionManager, SubscriptionSnapshot};
use crate::token::TokenCache;
use crate::types::{
    DeliveryEvent, EventName, NotificationMessage, StorageConfig, StoredNotification, Timestamp,
};
use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Default bucket limits plus optional per-event overrides.
#[derive(Clone, Debug, Default)]
pub struct StorageSettings {
    pub default: StorageConfig,
    pub per_event: HashMap<String, StorageConfig>,
}

impl StorageSettings {
    /// The config that applies to `event`.
    pub fn config_for(&self, event: &EventName) -> StorageConfig {
        self.per_event
            .get(event.as_str())
            .copied()
            .unwrap_or(self.default)
    }
}

/// Everything the client recognizes at construction time.
pub struct ClientConfig {
    /// Platform application name sent with subscribe requests.
    pub app_name: String,

    /// Deployment environment of the notification service.
    pub environment: String,

    /// Event topics to register at mount. Empty and duplicate names are
    /// dropped at the boundary.
    pub events: Vec<String>,

    /// Extra fields for the subscribe request body.
    pub additional_info: Option<Map<String, Value>>,

    /// Channels to create besides the default one.
    pub channel_configs: Vec<ChannelSpec>,

    /// Sound for the default channel.
    pub background_notification_sound: Option<String>,

    /// Hook for auto-subscribe failures.
    pub on_subscription_error: Option<SubscriptionErrorCallback>,

    /// Bucket limits for stored notifications.
    pub storage: StorageSettings,
}

impl ClientConfig {
    pub fn new(app_name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            environment: environment.into(),
            events: Vec::new(),
            additional_info: None,
            channel_configs: Vec::new(),
            background_notification_sound: None,
            on_subscription_error: None,
            storage: StorageSettings::default(),
        }
    }
}

/// The push-notification client.
///
/// Owns the subscription manager, the notification buffer, and the UI-facing
/// state store; external SDK seams are injected at construction. Inbound SDK
/// events are dispatched through [`handle_event`](PushClient::handle_event)
/// or drained from a channel via [`run`](PushClient::run).
pub struct PushClient {
    manager: SubscriptionManager,
    buffer: RwLock<NotificationBuffer>,
    state: Arc<NotificationStateStore>,
    storage: StorageSettings,
}

impl PushClient {
    /// Wire the seams together and perform the mount-time work: channel
    /// creation, initial-notification pull, and the first reconcile (only
    /// when there are events to register).
    pub fn new(
        config: ClientConfig,
        messaging: Arc<dyn Messaging>,
        store: Arc<dyn KeyValueStore>,
        api: Arc<dyn NotificationApi>,
        registry: &dyn ChannelRegistry,
    ) -> Result<Self> {
        if config.app_name.is_empty() {
            return Err(PushError::MissingAppName);
        }

        create_notification_channels(
            registry,
            &config.channel_configs,
            config.background_notification_sound.as_deref(),
        )?;

        let events = prepare_events(config.events);
        let state = Arc::new(NotificationStateStore::new());

        // Route auto-subscribe failures into the UI-facing state store
        // before the caller's hook runs.
        let on_error: SubscriptionErrorCallback = {
            let state = Arc::clone(&state);
            let user_hook = config.on_subscription_error;
            Box::new(move |error| {
                state.set_last_error(error.detail());
                if let Some(hook) = &user_hook {
                    hook(error);
                }
            })
        };

        let has_events = !events.is_empty();
        let manager = SubscriptionManager::new(
            events,
            TokenCache::new(store),
            Arc::clone(&messaging),
            api,
            config.app_name,
            config.additional_info,
            Some(on_error),
        );

        let client = Self {
            manager,
            buffer: RwLock::new(NotificationBuffer::new()),
            state,
            storage: config.storage,
        };

        // App opened from a closed state by tapping a notification.
        if let Ok(Some(message)) = messaging.initial_notification() {
            if !message.is_empty() {
                client.state.set_background(message);
            }
        }

        if has_events {
            client.manager.reconcile()?;
        }

        Ok(client)
    }

    /// Like [`new`](PushClient::new), with the remote API built from
    /// `config.environment`.
    pub fn with_http_api(
        config: ClientConfig,
        messaging: Arc<dyn Messaging>,
        store: Arc<dyn KeyValueStore>,
        registry: &dyn ChannelRegistry,
    ) -> Result<Self> {
        let api = Arc::new(HttpApi::new(&config.environment));
        Self::new(config, messaging, store, api, registry)
    }

    /// Dispatch one inbound SDK event.
    pub fn handle_event(&self, event: DeliveryEvent) {
        match event {
            DeliveryEvent::Foreground { message } => {
                if message.is_empty() {
                    return;
                }
                self.state.set_foreground(message);
            }
            DeliveryEvent::Background { message } => self.store_background(message),
            DeliveryEvent::Opened { message } => {
                if let Some(event) = message.event() {
                    self.buffer.write().remove_by_id(&event, &message.message_id);
                }
                if message.is_empty() {
                    return;
                }
                self.state.set_background(message);
            }
            DeliveryEvent::TokenRefresh { token } => self.manager.handle_token_refresh(token),
        }
    }

    /// Drain inbound events until the sending side disconnects.
    pub fn run(&self, receiver: Receiver<DeliveryEvent>) {
        for event in receiver {
            self.handle_event(event);
        }
    }

    /// Background delivery: enforce the bucket capacity, then store.
    fn store_background(&self, message: NotificationMessage) {
        let Some(event) = message.event() else {
            debug!("background message without an event, dropping");
            return;
        };

        let config = self.storage.config_for(&event);
        let mut buffer = self.buffer.write();
        // Check-then-evict-then-store; single-threaded under the
        // cooperative model, so the sequence cannot interleave.
        if buffer.len(&event) >= config.max_storage_quantity {
            buffer.evict_oldest(&event);
        }
        buffer.store(&event, &message, Some(&config));
    }

    // --- Subscription surface ---

    pub fn snapshot(&self) -> SubscriptionSnapshot {
        self.manager.snapshot()
    }

    pub fn subscribed_events(&self) -> Vec<EventName> {
        self.manager.events()
    }

    /// Track one more event. Invalid (empty) names are no-ops. No network
    /// call happens until the next reconcile.
    pub fn add_event(&self, name: &str) -> bool {
        match EventName::new(name) {
            Some(name) => self.manager.add_event(name),
            None => false,
        }
    }

    pub fn reconcile(&self) -> Result<()> {
        self.manager.reconcile()
    }

    pub fn cancel(&self, subset: Option<Vec<EventName>>) -> Result<Vec<EventName>> {
        self.manager.cancel(subset)
    }

    // --- Notification surface ---

    pub fn foreground_notification(&self) -> Option<NotificationMessage> {
        self.state.foreground()
    }

    pub fn background_notification(&self) -> Option<NotificationMessage> {
        self.state.background()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.last_error()
    }

    /// Clear exactly one received-notification slot.
    pub fn delete_received_notification(&self, slot: NotificationSlot) {
        self.state.reset(slot);
    }

    pub fn stored_notification(
        &self,
        event: &EventName,
        message_id: &str,
    ) -> Option<StoredNotification> {
        self.buffer.read().get_by_type_and_id(event, message_id)
    }

    pub fn stored_count(&self, event: &EventName) -> usize {
        self.buffer.read().len(event)
    }

    /// Drop expired entries for `event`. Returns how many were dropped.
    pub fn purge_expired(&self, event: &EventName) -> usize {
        self.buffer.write().purge_expired(event, Timestamp::now())
    }
}
