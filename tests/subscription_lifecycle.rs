//! Subscription lifecycle: mount-time reconcile, cancellation, token
//! rotation, and the failure surfaces.

use parking_lot::Mutex;
use push_notify::{
    ChannelConfig, ChannelRegistry, ClientConfig, DeliveryEvent, DeviceToken, EventName,
    KeyValueStore, Messaging, NotificationApi, NotificationMessage, PushClient, PushError, Result,
    SubscribeRequest, SubscriptionPhase, UnsubscribeRequest,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    fn with_token(token: &str) -> Self {
        let store = Self::default();
        store
            .items
            .lock()
            .insert("currentToken".to_string(), token.to_string());
        store
    }

    fn token(&self) -> Option<String> {
        self.items.lock().get("currentToken").cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().remove(key);
        Ok(())
    }
}

struct FakeMessaging {
    token: Option<DeviceToken>,
    initial: Option<NotificationMessage>,
}

impl FakeMessaging {
    fn with_token(token: &str) -> Self {
        Self {
            token: DeviceToken::new(token),
            initial: None,
        }
    }
}

impl Messaging for FakeMessaging {
    fn token(&self) -> Result<DeviceToken> {
        self.token.clone().ok_or(PushError::EmptyDeviceToken)
    }

    fn initial_notification(&self) -> Result<Option<NotificationMessage>> {
        Ok(self.initial.clone())
    }
}

#[derive(Default)]
struct MockApi {
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: AtomicUsize,
    subscribe_bodies: Mutex<Vec<SubscribeRequest>>,
    unsubscribe_bodies: Mutex<Vec<Vec<String>>>,
    fail_subscribe: Mutex<Option<String>>,
    fail_unsubscribe: Mutex<Option<String>>,
}

impl NotificationApi for MockApi {
    fn subscribe(&self, request: &SubscribeRequest) -> Result<()> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_subscribe.lock().clone() {
            return Err(PushError::Transport {
                status: Some(500),
                message,
            });
        }
        self.subscribe_bodies.lock().push(request.clone());
        Ok(())
    }

    fn unsubscribe(&self, request: &UnsubscribeRequest) -> Result<()> {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_unsubscribe.lock().clone() {
            return Err(PushError::Transport {
                status: Some(500),
                message,
            });
        }
        self.unsubscribe_bodies.lock().push(request.events.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingRegistry {
    channels: Mutex<Vec<ChannelConfig>>,
}

impl ChannelRegistry for RecordingRegistry {
    fn create_channel(&self, config: &ChannelConfig) -> Result<()> {
        self.channels.lock().push(config.clone());
        Ok(())
    }

    fn create_channels(&self, configs: &[ChannelConfig]) -> Result<()> {
        self.channels.lock().extend(configs.iter().cloned());
        Ok(())
    }
}

fn name(s: &str) -> EventName {
    EventName::new(s).unwrap()
}

fn build_client(
    config: ClientConfig,
    store: Arc<MemoryStore>,
    messaging: FakeMessaging,
    api: Arc<MockApi>,
) -> PushClient {
    PushClient::new(
        config,
        Arc::new(messaging),
        store,
        api,
        &RecordingRegistry::default(),
    )
    .unwrap()
}

#[test]
fn mount_with_fresh_token_registers_once() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["picking:session:created".into(), "order:ready".into()];

    let client = build_client(
        config,
        Arc::clone(&store),
        FakeMessaging::with_token("fcm-1"),
        Arc::clone(&api),
    );

    assert_eq!(api.subscribe_calls.load(Ordering::SeqCst), 1);
    let body = &api.subscribe_bodies.lock()[0];
    assert_eq!(body.token, "fcm-1");
    assert_eq!(body.events, vec!["picking:session:created", "order:ready"]);
    assert_eq!(body.platform_application_name, "PickingApp");

    assert_eq!(store.token().as_deref(), Some("fcm-1"));
    assert_eq!(client.snapshot().phase, SubscriptionPhase::Subscribed);
}

#[test]
fn mount_with_matching_cached_token_skips_remote_call() {
    let store = Arc::new(MemoryStore::with_token("A"));
    let api = Arc::new(MockApi::default());

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["orders".into()];

    let client = build_client(
        config,
        store,
        FakeMessaging::with_token("A"),
        Arc::clone(&api),
    );

    assert_eq!(api.subscribe_calls.load(Ordering::SeqCst), 0);
    assert_eq!(client.snapshot().phase, SubscriptionPhase::Subscribed);
}

#[test]
fn mount_with_rotated_token_reregisters() {
    let store = Arc::new(MemoryStore::with_token("A"));
    let api = Arc::new(MockApi::default());

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["orders".into()];

    build_client(
        config,
        Arc::clone(&store),
        FakeMessaging::with_token("B"),
        Arc::clone(&api),
    );

    assert_eq!(api.subscribe_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.subscribe_bodies.lock()[0].token, "B");
    assert_eq!(store.token().as_deref(), Some("B"));
}

#[test]
fn mount_without_events_makes_no_remote_call() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());

    let config = ClientConfig::new("PickingApp", "beta");
    let client = build_client(
        config,
        store,
        FakeMessaging::with_token("fcm-1"),
        Arc::clone(&api),
    );

    assert_eq!(api.subscribe_calls.load(Ordering::SeqCst), 0);
    assert_eq!(client.snapshot().phase, SubscriptionPhase::Idle);
}

#[test]
fn mount_sanitizes_raw_event_names() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["orders".into(), "".into(), "orders".into(), "sessions".into()];

    let client = build_client(
        config,
        store,
        FakeMessaging::with_token("fcm-1"),
        Arc::clone(&api),
    );

    assert_eq!(
        client.subscribed_events(),
        vec![name("orders"), name("sessions")]
    );
    assert_eq!(
        api.subscribe_bodies.lock()[0].events,
        vec!["orders", "sessions"]
    );
}

#[test]
fn subscribe_failure_is_contained_and_surfaced() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());
    *api.fail_subscribe.lock() = Some("down".to_string());

    let hook_errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&hook_errors);

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["orders".into()];
    config.on_subscription_error = Some(Box::new(move |error| {
        seen.lock().push(error.detail());
    }));

    // Construction succeeds; the transport failure never escapes.
    let client = build_client(
        config,
        Arc::clone(&store),
        FakeMessaging::with_token("fcm-1"),
        Arc::clone(&api),
    );

    let snapshot = client.snapshot();
    assert_eq!(snapshot.phase, SubscriptionPhase::Failed);
    assert_eq!(snapshot.last_error.as_deref(), Some("down"));
    assert!(snapshot.events.is_empty());

    assert_eq!(client.last_error().as_deref(), Some("down"));
    assert_eq!(hook_errors.lock().as_slice(), ["down".to_string()]);
    assert!(store.token().is_none());
}

#[test]
fn missing_app_name_fails_fast() {
    let result = PushClient::new(
        ClientConfig::new("", "beta"),
        Arc::new(FakeMessaging::with_token("fcm-1")),
        Arc::new(MemoryStore::default()),
        Arc::new(MockApi::default()),
        &RecordingRegistry::default(),
    );

    assert!(matches!(result, Err(PushError::MissingAppName)));
}

#[test]
fn add_event_then_reconcile_short_circuits_on_same_token() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["orders".into()];

    let client = build_client(
        config,
        store,
        FakeMessaging::with_token("fcm-1"),
        Arc::clone(&api),
    );

    assert!(client.add_event("sessions"));
    assert!(!client.add_event(""));
    client.reconcile().unwrap();

    // Token unchanged since mount, so no second subscribe call.
    assert_eq!(api.subscribe_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        client.subscribed_events(),
        vec![name("orders"), name("sessions")]
    );
}

#[test]
fn cancel_subset_unsubscribes_and_keeps_remainder() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["a".into(), "b".into(), "c".into()];

    let client = build_client(
        config,
        store,
        FakeMessaging::with_token("fcm-1"),
        Arc::clone(&api),
    );

    let remaining = client.cancel(Some(vec![name("b"), name("c")])).unwrap();
    assert_eq!(remaining, vec![name("a")]);
    assert_eq!(
        api.unsubscribe_bodies.lock().as_slice(),
        [vec!["b".to_string(), "c".to_string()]]
    );
    assert_eq!(client.snapshot().phase, SubscriptionPhase::Subscribed);
}

#[test]
fn cancel_all_clears_events() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["a".into(), "b".into()];

    let client = build_client(
        config,
        store,
        FakeMessaging::with_token("fcm-1"),
        Arc::clone(&api),
    );

    let remaining = client.cancel(None).unwrap();
    assert!(remaining.is_empty());
    assert!(client.subscribed_events().is_empty());
    assert_eq!(client.snapshot().phase, SubscriptionPhase::Idle);
}

#[test]
fn cancel_failure_reaches_the_caller() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());
    *api.fail_unsubscribe.lock() = Some("unreachable".to_string());

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["a".into()];

    let client = build_client(
        config,
        store,
        FakeMessaging::with_token("fcm-1"),
        Arc::clone(&api),
    );

    let result = client.cancel(None);
    assert!(matches!(result, Err(PushError::Transport { .. })));
    // Tracked events survive the failed cancel.
    assert_eq!(client.subscribed_events(), vec![name("a")]);
}

#[test]
fn token_refresh_event_moves_the_registration() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["orders".into()];

    let client = build_client(
        config,
        Arc::clone(&store),
        FakeMessaging::with_token("old"),
        Arc::clone(&api),
    );
    assert_eq!(store.token().as_deref(), Some("old"));

    client.handle_event(DeliveryEvent::TokenRefresh {
        token: DeviceToken::new("new").unwrap(),
    });

    // Best-effort cleanup of the old registration, then the new subscribe.
    assert_eq!(api.unsubscribe_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.subscribe_calls.load(Ordering::SeqCst), 2);
    assert_eq!(api.subscribe_bodies.lock()[1].token, "new");
    assert_eq!(store.token().as_deref(), Some("new"));
    assert_eq!(client.subscribed_events(), vec![name("orders")]);
}

#[test]
fn token_refresh_survives_failed_cleanup() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["orders".into()];

    let client = build_client(
        config,
        Arc::clone(&store),
        FakeMessaging::with_token("old"),
        Arc::clone(&api),
    );

    *api.fail_unsubscribe.lock() = Some("token already dead".to_string());
    client.handle_event(DeliveryEvent::TokenRefresh {
        token: DeviceToken::new("new").unwrap(),
    });

    assert_eq!(store.token().as_deref(), Some("new"));
    assert_eq!(client.snapshot().phase, SubscriptionPhase::Subscribed);
}

#[test]
fn initial_notification_lands_in_background_slot() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());

    let mut data = serde_json::Map::new();
    data.insert("event".to_string(), serde_json::json!("orders"));
    let messaging = FakeMessaging {
        token: DeviceToken::new("fcm-1"),
        initial: Some(NotificationMessage {
            message_id: "boot-1".to_string(),
            data,
        }),
    };

    let client = build_client(ClientConfig::new("PickingApp", "beta"), store, messaging, api);

    assert_eq!(client.background_notification().unwrap().message_id, "boot-1");
}

#[test]
fn additional_info_travels_in_the_subscribe_body() {
    let store = Arc::new(MemoryStore::default());
    let api = Arc::new(MockApi::default());

    let mut info = serde_json::Map::new();
    info.insert("warehouse".to_string(), serde_json::json!("central"));

    let mut config = ClientConfig::new("PickingApp", "beta");
    config.events = vec!["orders".into()];
    config.additional_info = Some(info);

    build_client(
        config,
        store,
        FakeMessaging::with_token("fcm-1"),
        Arc::clone(&api),
    );

    let body = &api.subscribe_bodies.lock()[0];
    assert_eq!(
        body.additional_info.as_ref().unwrap()["warehouse"],
        serde_json::json!("central")
    );
}
