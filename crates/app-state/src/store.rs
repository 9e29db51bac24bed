//! Versioned observable store
//!
//! This module provides a small reactive store that holds one immutable value
//! at a time. Every publish replaces the value wholesale, bumps a version
//! counter and notifies two kinds of subscribers:
//!
//! - latest-value readers via a [`watch`] channel, which only ever see the
//!   newest value
//! - event listeners via a [`broadcast`] channel, which receive every version
//!   in publish order
//!
//! Publishing is synchronous and never blocks, so the store can be driven
//! from a single-threaded UI event loop without an async runtime.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, watch};

/// Default capacity of the event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Store errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Nothing has been published yet, or the store was cleared
    #[error("Store has no published value")]
    Uninitialized,
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// A published value tagged with its version
pub struct Versioned<T> {
    /// Monotonically increasing version, starting at 1
    pub version: u64,
    /// The published value
    pub value: Arc<T>,
}

impl<T> Clone for Versioned<T> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Versioned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Versioned")
            .field("version", &self.version)
            .field("value", &self.value)
            .finish()
    }
}

#[derive(Debug)]
struct Inner<T> {
    current: Option<Versioned<T>>,
    next_version: u64,
}

/// Observable store holding a single immutable value
///
/// # Example
///
/// ```rust
/// use app_state::store::StateStore;
///
/// let store = StateStore::new(8);
/// let mut events = store.subscribe();
///
/// let version = store.publish(vec!["root"]);
/// assert_eq!(version, 1);
///
/// let event = events.try_recv().unwrap();
/// assert_eq!(event.version, 1);
/// assert_eq!(*event.value, vec!["root"]);
/// ```
pub struct StateStore<T> {
    inner: RwLock<Inner<T>>,
    latest_tx: watch::Sender<Option<Versioned<T>>>,
    events_tx: broadcast::Sender<Versioned<T>>,
}

impl<T: fmt::Debug> fmt::Debug for StateStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("inner", &*self.inner.read())
            .finish_non_exhaustive()
    }
}

impl<T> Default for StateStore<T> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl<T> StateStore<T> {
    /// Create an empty store whose event channel buffers `capacity` versions
    ///
    /// A zero capacity is bumped to one since broadcast channels cannot be
    /// empty.
    pub fn new(capacity: usize) -> Self {
        let (latest_tx, _) = watch::channel(None);
        let (events_tx, _) = broadcast::channel(capacity.max(1));

        Self {
            inner: RwLock::new(Inner {
                current: None,
                next_version: 1,
            }),
            latest_tx,
            events_tx,
        }
    }

    /// Replace the stored value and notify subscribers
    ///
    /// Returns the version assigned to the new value.
    pub fn publish(&self, value: T) -> u64 {
        let mut inner = self.inner.write();
        let versioned = Versioned {
            version: inner.next_version,
            value: Arc::new(value),
        };
        inner.next_version += 1;
        inner.current = Some(versioned.clone());

        // Notify while still holding the write lock so that two publishers
        // can never interleave their notifications.
        self.latest_tx.send_replace(Some(versioned.clone()));
        let _ = self.events_tx.send(versioned.clone());

        tracing::trace!(version = versioned.version, "state published");
        versioned.version
    }

    /// Drop the stored value
    ///
    /// Versions keep counting from where they were, so a value published after
    /// a clear is never confused with one published before it.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.current = None;
        self.latest_tx.send_replace(None);
    }

    /// Get the current value and its version
    pub fn current(&self) -> Result<Versioned<T>> {
        self.inner
            .read()
            .current
            .clone()
            .ok_or(StoreError::Uninitialized)
    }

    /// Version of the current value (0 when nothing was ever published)
    pub fn version(&self) -> u64 {
        self.inner.read().next_version - 1
    }

    /// Whether a value is currently held
    pub fn is_initialized(&self) -> bool {
        self.inner.read().current.is_some()
    }

    /// Subscribe to every published version, in order
    pub fn subscribe(&self) -> broadcast::Receiver<Versioned<T>> {
        self.events_tx.subscribe()
    }

    /// Subscribe to the latest value only
    pub fn watch(&self) -> watch::Receiver<Option<Versioned<T>>> {
        self.latest_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store: StateStore<u32> = StateStore::default();
        assert!(!store.is_initialized());
        assert_eq!(store.version(), 0);
        assert_eq!(store.current().unwrap_err(), StoreError::Uninitialized);
    }

    #[test]
    fn test_publish_bumps_version() {
        let store = StateStore::new(4);
        assert_eq!(store.publish("a"), 1);
        assert_eq!(store.publish("b"), 2);

        let current = store.current().unwrap();
        assert_eq!(current.version, 2);
        assert_eq!(*current.value, "b");
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn test_events_arrive_in_order() {
        let store = StateStore::new(8);
        let mut rx = store.subscribe();

        for value in 0..5u32 {
            store.publish(value);
        }

        for expected in 0..5u32 {
            let event = rx.try_recv().unwrap();
            assert_eq!(event.version, u64::from(expected) + 1);
            assert_eq!(*event.value, expected);
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_watch_sees_latest_only() {
        let store = StateStore::new(8);
        let rx = store.watch();
        assert!(rx.borrow().is_none());

        store.publish(1u8);
        store.publish(2u8);

        let latest = rx.borrow().clone().unwrap();
        assert_eq!(latest.version, 2);
        assert_eq!(*latest.value, 2);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let store = StateStore::new(1);
        store.publish("lonely");
        assert_eq!(*store.current().unwrap().value, "lonely");

        // A late watcher still observes the value
        let rx = store.watch();
        assert_eq!(*rx.borrow().as_ref().unwrap().value, "lonely");
    }

    #[test]
    fn test_clear_keeps_version_counter() {
        let store = StateStore::new(4);
        store.publish(10);
        store.clear();
        assert!(!store.is_initialized());
        assert!(store.watch().borrow().is_none());

        assert_eq!(store.publish(11), 2);
    }

    #[test]
    fn test_zero_capacity_is_usable() {
        let store = StateStore::new(0);
        let mut rx = store.subscribe();
        store.publish(());
        assert!(rx.try_recv().is_ok());
    }
}
