//! Shared registry wrapper.
//!
//! The front end registers types while the runtime reads them; both hold
//! the same registry through `Arc<RwLock>`.

// Arc is the implementation - all usage goes through the newtype
#![expect(
    clippy::disallowed_types,
    reason = "Arc is the implementation of SharedMutableRegistry"
)]

use std::fmt;
use std::sync::Arc;

/// Thread-safe mutable shared registry wrapper.
///
/// Needed because contracts and types may be registered after a
/// dispatcher already holds the registry.
pub struct SharedMutableRegistry<T>(Arc<parking_lot::RwLock<T>>);

impl<T> SharedMutableRegistry<T> {
    pub fn new(registry: T) -> Self {
        SharedMutableRegistry(Arc::new(parking_lot::RwLock::new(registry)))
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, T> {
        self.0.read()
    }

    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, T> {
        self.0.write()
    }
}

impl<T> Clone for SharedMutableRegistry<T> {
    fn clone(&self) -> Self {
        SharedMutableRegistry(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedMutableRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedMutableRegistry({:?})", &*self.0.read())
    }
}
