//! Subscription lifecycle for the device registration.
//!
//! The manager reconciles a locally cached device token against a freshly
//! fetched one, calls the remote subscribe endpoint only on mismatch, tracks
//! the event topics the device is registered for, and owns the retry-free
//! error surface: auto-subscribe failures are contained in state and an
//! optional callback, caller-initiated cancels propagate their errors.
//!
//! # Example
//!
//! ```ignore
//! let manager = SubscriptionManager::new(
//!     events,
//!     TokenCache::new(store),
//!     messaging,
//!     api,
//!     "PickingApp".to_string(),
//!     None,
//!     None,
//! );
//!
//! manager.reconcile()?;
//! assert_eq!(manager.snapshot().phase, SubscriptionPhase::Subscribed);
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{SubscriptionErrorCallback, SubscriptionPhase, SubscriptionSnapshot};
