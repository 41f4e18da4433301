//! Latest-value-wins notification state exposed to consuming UI.

use crate::types::NotificationMessage;
use parking_lot::RwLock;

/// Which notification slot to reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationSlot {
    Foreground,
    Background,
}

#[derive(Default)]
struct Slots {
    foreground: Option<NotificationMessage>,
    background: Option<NotificationMessage>,
    last_error: Option<String>,
}

/// Holds the latest foreground/background payload and the last subscribe
/// error. These are projections, not queues: each write replaces the slot.
#[derive(Default)]
pub struct NotificationStateStore {
    slots: RwLock<Slots>,
}

impl NotificationStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_foreground(&self, message: NotificationMessage) {
        self.slots.write().foreground = Some(message);
    }

    pub fn set_background(&self, message: NotificationMessage) {
        self.slots.write().background = Some(message);
    }

    pub fn set_last_error(&self, error: String) {
        self.slots.write().last_error = Some(error);
    }

    pub fn foreground(&self) -> Option<NotificationMessage> {
        self.slots.read().foreground.clone()
    }

    pub fn background(&self) -> Option<NotificationMessage> {
        self.slots.read().background.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.slots.read().last_error.clone()
    }

    /// Clear exactly one notification slot.
    pub fn reset(&self, slot: NotificationSlot) {
        let mut slots = self.slots.write();
        match slot {
            NotificationSlot::Foreground => slots.foreground = None,
            NotificationSlot::Background => slots.background = None,
        }
    }
}
