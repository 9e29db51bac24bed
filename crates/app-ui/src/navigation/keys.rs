//! Route key generation

use crate::config::KeyStrategy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of route entry keys
///
/// Keys only need to be unique within the process lifetime. The router checks
/// every generated key against the live state and treats a repeat as a
/// programming error.
#[cfg_attr(test, mockall::automock)]
pub trait KeyGenerator: Send + Sync {
    /// Produce a key for a new entry of the given route
    fn generate(&self, route_name: &str) -> String;
}

/// Random `name-<uuid>` keys
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeys;

impl KeyGenerator for UuidKeys {
    fn generate(&self, route_name: &str) -> String {
        format!("{}-{}", route_name, uuid::Uuid::new_v4())
    }
}

/// Monotonic `name-<n>` keys
#[derive(Debug, Default)]
pub struct SequentialKeys {
    next: AtomicU64,
}

impl SequentialKeys {
    /// Create a counter starting at zero
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyGenerator for SequentialKeys {
    fn generate(&self, route_name: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", route_name, n)
    }
}

/// Build the generator selected by a key strategy
pub fn for_strategy(strategy: KeyStrategy) -> Arc<dyn KeyGenerator> {
    match strategy {
        KeyStrategy::Uuid => Arc::new(UuidKeys),
        KeyStrategy::Sequential => Arc::new(SequentialKeys::new()),
    }
}
