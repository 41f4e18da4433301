//! Subscribed-event tracking.

use crate::types::EventName;

/// The set of topics the device is (or wants to be) subscribed to.
///
/// Membership is set-like, but insertion order is preserved for display.
#[derive(Clone, Debug, Default)]
pub struct EventSet {
    names: Vec<EventName>,
}

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names(names: Vec<EventName>) -> Self {
        let mut set = Self::new();
        for name in names {
            set.add(name);
        }
        set
    }

    /// Append `name`. Duplicates are idempotent no-ops; returns whether the
    /// set changed.
    pub fn add(&mut self, name: EventName) -> bool {
        if self.names.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Remove the given names (intersection) or, with `None`, clear all.
    /// Returns the remainder.
    pub fn remove(&mut self, names: Option<&[EventName]>) -> Vec<EventName> {
        match names {
            Some(subset) => self.names.retain(|name| !subset.contains(name)),
            None => self.names.clear(),
        }
        self.names.clone()
    }

    /// Subscribed names, in insertion order.
    pub fn list(&self) -> &[EventName] {
        &self.names
    }

    pub fn contains(&self, name: &EventName) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Sanitize raw event names at the boundary: empty names and duplicates are
/// dropped, order of first appearance is kept.
pub fn prepare_events<I, S>(raw: I) -> Vec<EventName>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut set = EventSet::new();
    for name in raw {
        if let Some(name) = EventName::new(name) {
            set.add(name);
        }
    }
    set.names
}
