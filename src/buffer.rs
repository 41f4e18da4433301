//! Bounded per-type FIFO storage for received notifications.

use crate::types::{EventName, NotificationMessage, StorageConfig, StoredNotification, Timestamp};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// FIFO bucket for a single event type.
#[derive(Clone, Debug)]
struct Bucket {
    entries: VecDeque<StoredNotification>,
    /// Frozen at the first write for this type.
    config: StorageConfig,
}

/// Keyed collection of independent FIFO queues, one per event type, created
/// lazily on first write.
///
/// Capacity enforcement is the caller's job: the background-delivery handler
/// checks the current length against the configured quantity and calls
/// [`evict_oldest`](NotificationBuffer::evict_oldest) before storing. The
/// buffer itself only appends.
#[derive(Clone, Debug, Default)]
pub struct NotificationBuffer {
    buckets: HashMap<EventName, Bucket>,
}

impl NotificationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` under `event`. The bucket is initialized with
    /// `config` on the first write for the type; later writes append with
    /// the frozen config. Messages carrying nothing are rejected.
    ///
    /// Returns whether the message was stored.
    pub fn store(
        &mut self,
        event: &EventName,
        message: &NotificationMessage,
        config: Option<&StorageConfig>,
    ) -> bool {
        self.store_at(event, message, config, Timestamp::now())
    }

    /// [`store`](NotificationBuffer::store) with an explicit clock.
    pub fn store_at(
        &mut self,
        event: &EventName,
        message: &NotificationMessage,
        config: Option<&StorageConfig>,
        now: Timestamp,
    ) -> bool {
        if message.is_empty() {
            debug!(%event, "empty notification, not storing");
            return false;
        }

        let bucket = self.buckets.entry(event.clone()).or_insert_with(|| Bucket {
            entries: VecDeque::new(),
            config: config.copied().unwrap_or_default(),
        });

        let expires_at = (bucket.config.expiration_time > 0)
            .then(|| now.plus_secs(bucket.config.expiration_time));

        bucket.entries.push_back(StoredNotification {
            message_id: message.message_id.clone(),
            payload: message.data.clone(),
            received_at: now,
            expires_at,
        });
        true
    }

    /// Remove the oldest entry for `event`. No-op on a missing or empty
    /// bucket.
    pub fn evict_oldest(&mut self, event: &EventName) -> Option<StoredNotification> {
        self.buckets
            .get_mut(event)
            .and_then(|bucket| bucket.entries.pop_front())
    }

    /// Remove the first entry matching `message_id`. Returns whether
    /// anything was removed.
    pub fn remove_by_id(&mut self, event: &EventName, message_id: &str) -> bool {
        if message_id.is_empty() {
            return false;
        }

        let Some(bucket) = self.buckets.get_mut(event) else {
            return false;
        };

        match bucket
            .entries
            .iter()
            .position(|entry| entry.message_id == message_id)
        {
            Some(index) => {
                bucket.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Look up a stored notification by type and id.
    pub fn get_by_type_and_id(
        &self,
        event: &EventName,
        message_id: &str,
    ) -> Option<StoredNotification> {
        self.buckets.get(event).and_then(|bucket| {
            bucket
                .entries
                .iter()
                .find(|entry| entry.message_id == message_id)
                .cloned()
        })
    }

    /// Drop entries for `event` whose expiry has passed. Returns how many
    /// were dropped.
    pub fn purge_expired(&mut self, event: &EventName, now: Timestamp) -> usize {
        let Some(bucket) = self.buckets.get_mut(event) else {
            return 0;
        };

        let before = bucket.entries.len();
        bucket
            .entries
            .retain(|entry| entry.expires_at.map_or(true, |at| at > now));
        before - bucket.entries.len()
    }

    /// Stored count for `event` (0 for a missing bucket).
    pub fn len(&self, event: &EventName) -> usize {
        self.buckets.get(event).map_or(0, |bucket| bucket.entries.len())
    }

    pub fn has_bucket(&self, event: &EventName) -> bool {
        self.buckets.contains_key(event)
    }

    /// The frozen config for `event`, once a bucket exists.
    pub fn config(&self, event: &EventName) -> Option<StorageConfig> {
        self.buckets.get(event).map(|bucket| bucket.config)
    }
}
