//! Subscription manager: token reconciliation and remote registration.

use crate::api::{NotificationApi, SubscribeRequest, UnsubscribeRequest};
use crate::error::{PushError, Result};
use crate::events::EventSet;
use crate::external::Messaging;
use crate::token::TokenCache;
use crate::types::{DeviceToken, EventName};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::types::{SubscriptionErrorCallback, SubscriptionPhase, SubscriptionSnapshot};

/// Mutable subscription state, guarded for re-entrancy.
struct Inner {
    phase: SubscriptionPhase,
    token: Option<DeviceToken>,
    events: EventSet,
    last_error: Option<String>,
}

/// Orchestrates token comparison, remote subscribe/unsubscribe calls, and
/// the tracked event set.
///
/// All methods take `&self`; state lives behind a lock so an in-flight
/// `reconcile` interleaved with `add_event` cannot corrupt the event set.
/// The lock is never held across a remote call.
pub struct SubscriptionManager {
    inner: RwLock<Inner>,
    cache: TokenCache,
    messaging: Arc<dyn Messaging>,
    api: Arc<dyn NotificationApi>,
    app_name: String,
    additional_info: Option<Map<String, Value>>,
    on_error: Option<SubscriptionErrorCallback>,
}

impl SubscriptionManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        events: Vec<EventName>,
        cache: TokenCache,
        messaging: Arc<dyn Messaging>,
        api: Arc<dyn NotificationApi>,
        app_name: String,
        additional_info: Option<Map<String, Value>>,
        on_error: Option<SubscriptionErrorCallback>,
    ) -> Self {
        Self {
            inner: RwLock::new(Inner {
                phase: SubscriptionPhase::Idle,
                token: None,
                events: EventSet::from_names(events),
                last_error: None,
            }),
            cache,
            messaging,
            api,
            app_name,
            additional_info,
            on_error,
        }
    }

    /// Current state, cloned out.
    pub fn snapshot(&self) -> SubscriptionSnapshot {
        let inner = self.inner.read();
        SubscriptionSnapshot {
            phase: inner.phase,
            token: inner.token.clone(),
            events: inner.events.list().to_vec(),
            last_error: inner.last_error.clone(),
        }
    }

    /// Tracked event names, in insertion order.
    pub fn events(&self) -> Vec<EventName> {
        self.inner.read().events.list().to_vec()
    }

    /// Track one more event. No I/O; the caller decides when to reconcile.
    pub fn add_event(&self, name: EventName) -> bool {
        self.inner.write().events.add(name)
    }

    /// Compare the cached token against a freshly fetched one and register
    /// with the remote service only when they differ.
    ///
    /// Transport failures never escape this path: they are recorded in
    /// state, the event set is cleared (a failed registration forfeits the
    /// local list so a later reconcile is forced), and the error callback
    /// fires. Validation failures are returned.
    pub fn reconcile(&self) -> Result<()> {
        let stored = self.cache.get();
        let fresh = match self.messaging.token() {
            Ok(token) => token,
            Err(error) => {
                debug!(%error, "no registration token available, skipping reconcile");
                return Ok(());
            }
        };

        if stored.as_ref() == Some(&fresh) {
            // The service already knows this token; skip the remote call.
            let mut inner = self.inner.write();
            inner.phase = SubscriptionPhase::Subscribed;
            inner.token = Some(fresh);
            return Ok(());
        }

        let events = self.events();
        let request =
            SubscribeRequest::new(&fresh, &events, &self.app_name, self.additional_info.clone())?;

        self.inner.write().phase = SubscriptionPhase::Reconciling;

        match self.api.subscribe(&request) {
            Ok(()) => {
                self.cache.set(&fresh);
                let mut inner = self.inner.write();
                inner.phase = SubscriptionPhase::Subscribed;
                inner.token = Some(fresh);
                inner.last_error = None;
                info!(events = events.len(), "device registered for notifications");
                Ok(())
            }
            Err(error) => {
                self.record_failure(&error, true);
                Ok(())
            }
        }
    }

    /// Unsubscribe `subset` (or, with `None`, everything currently tracked)
    /// from the remote service.
    ///
    /// On success the subset is removed from the tracked set and the
    /// remainder returned. On failure the state is left untouched and the
    /// error reaches the caller; cancel is caller-initiated and expects a
    /// result.
    pub fn cancel(&self, subset: Option<Vec<EventName>>) -> Result<Vec<EventName>> {
        let targets = match &subset {
            Some(events) => events.clone(),
            None => self.events(),
        };
        let request = UnsubscribeRequest::new(&targets)?;

        let previous_phase = {
            let mut inner = self.inner.write();
            let previous = inner.phase;
            inner.phase = SubscriptionPhase::Cancelling;
            previous
        };

        match self.api.unsubscribe(&request) {
            Ok(()) => {
                let mut inner = self.inner.write();
                let remaining = inner.events.remove(subset.as_deref());
                inner.phase = if remaining.is_empty() {
                    SubscriptionPhase::Idle
                } else {
                    SubscriptionPhase::Subscribed
                };
                debug!(remaining = remaining.len(), "events unsubscribed");
                Ok(remaining)
            }
            Err(error) => {
                self.inner.write().phase = previous_phase;
                Err(error)
            }
        }
    }

    /// Re-register after the SDK rotated the device token.
    ///
    /// The unsubscribe of the old registration is best-effort cleanup: its
    /// result is discarded at this one call site so a dead token can never
    /// block the new registration.
    pub fn handle_token_refresh(&self, token: DeviceToken) {
        let events = self.events();

        if let Ok(request) = UnsubscribeRequest::new(&events) {
            let _ = self.api.unsubscribe(&request);
        }

        let request = match SubscribeRequest::new(
            &token,
            &events,
            &self.app_name,
            self.additional_info.clone(),
        ) {
            Ok(request) => request,
            Err(error) => {
                self.record_failure(&error, false);
                return;
            }
        };

        match self.api.subscribe(&request) {
            Ok(()) => {
                self.cache.set(&token);
                let mut inner = self.inner.write();
                inner.phase = SubscriptionPhase::Subscribed;
                inner.token = Some(token);
                inner.last_error = None;
                info!("registration moved to refreshed token");
            }
            Err(error) => self.record_failure(&error, false),
        }
    }

    fn record_failure(&self, error: &PushError, forfeit_events: bool) {
        warn!(%error, "device registration failed");
        {
            let mut inner = self.inner.write();
            inner.phase = SubscriptionPhase::Failed;
            inner.last_error = Some(error.detail());
            if forfeit_events {
                inner.events.remove(None);
            }
        }
        if let Some(on_error) = &self.on_error {
            on_error(error);
        }
    }
}
