//! Device-token persistence facade.

use crate::external::KeyValueStore;
use crate::types::DeviceToken;
use std::sync::Arc;
use tracing::warn;

/// Storage key for the last known registration token.
const TOKEN_KEY: &str = "currentToken";

/// Thin facade over the external key-value store holding the last token the
/// remote service was registered with.
///
/// The cached token is an optimization, not a correctness requirement, so
/// store failures never propagate: reads degrade to absent and writes to
/// no-ops.
pub struct TokenCache {
    store: Arc<dyn KeyValueStore>,
}

impl TokenCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The cached token, or `None` when missing, empty, or unreadable.
    pub fn get(&self) -> Option<DeviceToken> {
        match self.store.get_item(TOKEN_KEY) {
            Ok(value) => value.and_then(DeviceToken::new),
            Err(error) => {
                warn!(%error, "token read failed, treating as absent");
                None
            }
        }
    }

    /// Persist `token`. Returns the token back on success, `None` otherwise.
    pub fn set(&self, token: &DeviceToken) -> Option<DeviceToken> {
        match self.store.set_item(TOKEN_KEY, token.as_str()) {
            Ok(()) => Some(token.clone()),
            Err(error) => {
                warn!(%error, "token write failed");
                None
            }
        }
    }

    /// Drop the cached token.
    pub fn clear(&self) {
        if let Err(error) = self.store.remove_item(TOKEN_KEY) {
            warn!(%error, "token removal failed");
        }
    }
}
