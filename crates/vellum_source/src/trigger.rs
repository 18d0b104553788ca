//! One-shot change signals and the registry that fires them.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

/// A one-shot, monotonic "this resource changed" signal.
///
/// Once `is_expired` returns `true` it returns `true` forever. Caches never
/// reset a trigger; they replace the entry holding it and ask the provider for
/// a fresh one.
pub trait ChangeTrigger: Send + Sync {
    /// Returns `true` once the watched resource has changed.
    fn is_expired(&self) -> bool;
}

/// A trigger expired explicitly by its owner.
#[derive(Default)]
pub struct ManualTrigger {
    expired: AtomicBool,
}

impl ManualTrigger {
    /// Creates a trigger that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the trigger. Firing an expired trigger has no effect.
    pub fn expire(&self) {
        self.expired.store(true, Ordering::Release);
    }
}

impl ChangeTrigger for ManualTrigger {
    fn is_expired(&self) -> bool {
        self.expired.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ManualTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTrigger")
            .field("expired", &self.is_expired())
            .finish()
    }
}

/// A trigger that never fires, for providers with change detection disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverExpires;

impl ChangeTrigger for NeverExpires {
    fn is_expired(&self) -> bool {
        false
    }
}

/// Live triggers grouped by a provider-defined canonical name.
///
/// `register` hands out a new trigger for a name, whether or not anything
/// exists under that name yet. `expire` fires every trigger handed out for the
/// name and forgets them, so later registrations start unexpired.
#[derive(Default)]
pub struct TriggerRegistry {
    live: DashMap<String, Vec<Arc<ManualTrigger>>>,
}

impl TriggerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and records a new trigger for `name`.
    ///
    /// Triggers for `name` that nobody else holds any more are dropped first,
    /// so a key whose cache entries keep being replaced without a change does
    /// not accumulate triggers.
    pub fn register(&self, name: &str) -> Arc<ManualTrigger> {
        let trigger = Arc::new(ManualTrigger::new());
        let mut live = self.live.entry(name.to_string()).or_default();
        // Only the registry hands out clones, and only under this guard.
        live.retain(|held| Arc::strong_count(held) > 1);
        live.push(Arc::clone(&trigger));
        trigger
    }

    /// Fires all triggers registered for `name`. Returns how many fired.
    pub fn expire(&self, name: &str) -> usize {
        let Some((_, triggers)) = self.live.remove(name) else {
            return 0;
        };
        for trigger in &triggers {
            trigger.expire();
        }
        trace!(key = name, fired = triggers.len(), "expired change triggers");
        triggers.len()
    }

    /// Fires the triggers for `name` and for every name nested under it
    /// (`name/...`). Used when a whole directory is renamed or removed.
    pub fn expire_tree(&self, name: &str) -> usize {
        let prefix = format!("{name}/");
        let nested: Vec<String> = self
            .live
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| entry.key().clone())
            .collect();
        let mut fired = self.expire(name);
        for child in nested {
            fired += self.expire(&child);
        }
        fired
    }

    /// Returns the number of names with at least one live trigger.
    pub fn watched_names(&self) -> usize {
        self.live.len()
    }
}
