//! Configuration snapshot, change patches, and the config-store collaborator.
//!
//! The widget never talks to persistent storage itself. It does one full
//! fetch at construction, then merges incremental patches in arrival order,
//! one atomic shallow merge per notification.

use crate::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Config store errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config fetch failed: {0}")]
    Fetch(String),
    #[error("config store error: {0}")]
    Other(String),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Theme requested for the widget chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Light,
    Dark,
}

/// Last-known merged configuration: the union of the initial full fetch and
/// every patch applied since, in notification order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Theme for both render modes.
    pub theme_mode: ThemeMode,
    /// Keys of the tools to show in the toolbar, in the order the user saved
    /// them. Render order still follows the registry, not this list.
    pub active_selection_tools: Vec<String>,
}

/// A partial configuration update. `None` keys are left untouched by the
/// merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_mode: Option<ThemeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_selection_tools: Option<Vec<String>>,
}

impl ConfigSnapshot {
    /// Shallow-merge one change notification, key by key.
    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(theme_mode) = patch.theme_mode {
            self.theme_mode = theme_mode;
        }
        if let Some(tools) = patch.active_selection_tools {
            self.active_selection_tools = tools;
        }
    }
}

/// The configuration collaborator: one async full fetch plus a stream of
/// incremental patches.
///
/// `fetch_all` returns an owned future so the widget shell can hold it across
/// update turns while the fetch is in flight.
pub trait ConfigStore {
    /// Fetch the complete current configuration.
    fn fetch_all(&self) -> BoxFuture<'static, ConfigResult<ConfigSnapshot>>;

    /// Subscribe to change notifications. Dropping the returned watch
    /// unsubscribes.
    fn subscribe(&self) -> ConfigWatch;
}

/// Receiving end of a config subscription.
///
/// Tied to the widget's lifetime: dropping it removes the listener from the
/// store, so no exit path can leak a subscription.
pub struct ConfigWatch {
    id: u64,
    rx: Receiver<ConfigPatch>,
    subscribers: Arc<Mutex<HashMap<u64, Sender<ConfigPatch>>>>,
}

impl ConfigWatch {
    /// Next pending patch, if any. Non-blocking; patches come out in the
    /// order the store sent them.
    pub fn try_next(&self) -> Option<ConfigPatch> {
        self.rx.try_recv().ok()
    }
}

impl Drop for ConfigWatch {
    fn drop(&mut self) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.remove(&self.id);
        }
    }
}

/// In-memory config store for tests and ephemeral hosts.
#[derive(Default)]
pub struct MemoryConfigStore {
    snapshot: Arc<Mutex<ConfigSnapshot>>,
    subscribers: Arc<Mutex<HashMap<u64, Sender<ConfigPatch>>>>,
    next_id: AtomicU64,
}

impl MemoryConfigStore {
    /// Create a store seeded with the given snapshot.
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
            subscribers: Arc::default(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Merge a patch into the stored snapshot and notify every subscriber.
    pub fn push(&self, patch: ConfigPatch) {
        if let Ok(mut snapshot) = self.snapshot.lock() {
            snapshot.apply(patch.clone());
        }
        if let Ok(subscribers) = self.subscribers.lock() {
            for tx in subscribers.values() {
                let _ = tx.send(patch.clone());
            }
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn fetch_all(&self) -> BoxFuture<'static, ConfigResult<ConfigSnapshot>> {
        let snapshot = Arc::clone(&self.snapshot);
        Box::pin(async move {
            let snapshot = snapshot
                .lock()
                .map_err(|e| ConfigError::Other(format!("lock error: {e}")))?;
            Ok(snapshot.clone())
        })
    }

    fn subscribe(&self) -> ConfigWatch {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.insert(id, tx);
        }
        ConfigWatch {
            id,
            rx,
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}
