//! Subscription state types.

use crate::error::PushError;
use crate::types::{DeviceToken, EventName};
use serde::{Deserialize, Serialize};

/// Lifecycle of the device registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPhase {
    /// No registration attempted, or everything was cancelled.
    Idle,

    /// Token comparison / remote subscribe in flight.
    Reconciling,

    /// The remote service knows this token for the current event set.
    Subscribed,

    /// The last subscribe attempt failed.
    Failed,

    /// Remote unsubscribe in flight.
    Cancelling,
}

/// Point-in-time view of the subscription state, cloned out for consumers.
#[derive(Clone, Debug)]
pub struct SubscriptionSnapshot {
    pub phase: SubscriptionPhase,
    pub token: Option<DeviceToken>,
    pub events: Vec<EventName>,
    pub last_error: Option<String>,
}

/// Hook invoked when an automatic subscribe attempt fails. The error is
/// handed over instead of thrown so the hosting UI never crashes on a
/// registration failure.
pub type SubscriptionErrorCallback = Box<dyn Fn(&PushError) + Send + Sync>;
