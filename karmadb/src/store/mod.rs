//! Storage backend abstractions and the default in-memory engine.
//!
//! The data layer talks to its datastore exclusively through
//! [`DatastoreProvider`]: resolve a named collection, then issue one of the
//! collection primitives. The provider is process-wide shared state,
//! established once at startup and shared as a handle by every caller; it is
//! also the seam where tests inject instrumented or mock backends.

pub mod memory;

use crate::collection::CollectionHandle;
use crate::errors::StoreResult;
use std::collections::HashSet;
use std::sync::Arc;

/// Trait implemented by storage backends.
pub trait DatastoreProvider: Send + Sync {
    /// Opens the backend, performing any initialization it needs.
    fn open_or_create(&self) -> StoreResult<()>;

    /// Checks whether the backend has been closed.
    fn is_closed(&self) -> bool;

    /// Resolves a logical collection name to a live handle, creating the
    /// collection on first access.
    fn collection(&self, name: &str) -> StoreResult<CollectionHandle>;

    /// Checks whether a collection with the given name exists.
    fn has_collection(&self, name: &str) -> StoreResult<bool>;

    /// Lists the names of all existing collections.
    fn collection_names(&self) -> StoreResult<HashSet<String>>;

    /// Declares a unique index on a collection field, building it over the
    /// existing documents. Fails with a conflict if the existing documents
    /// already violate uniqueness.
    fn ensure_unique_index(&self, collection: &str, field: &str) -> StoreResult<()>;

    /// Closes the backend. Subsequent operations fail.
    fn close(&self) -> StoreResult<()>;
}

/// A shared handle to a storage backend.
///
/// Cloning is cheap; all clones address the same backend. Nothing mutates
/// the handle after initialization.
#[derive(Clone)]
pub struct Datastore {
    inner: Arc<dyn DatastoreProvider>,
}

impl Datastore {
    pub fn new<T: DatastoreProvider + 'static>(provider: T) -> Self {
        Datastore {
            inner: Arc::new(provider),
        }
    }

    pub fn from_arc(inner: Arc<dyn DatastoreProvider>) -> Self {
        Datastore { inner }
    }

    pub fn open_or_create(&self) -> StoreResult<()> {
        self.inner.open_or_create()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn collection(&self, name: &str) -> StoreResult<CollectionHandle> {
        self.inner.collection(name)
    }

    pub fn has_collection(&self, name: &str) -> StoreResult<bool> {
        self.inner.has_collection(name)
    }

    pub fn collection_names(&self) -> StoreResult<HashSet<String>> {
        self.inner.collection_names()
    }

    pub fn ensure_unique_index(&self, collection: &str, field: &str) -> StoreResult<()> {
        self.inner.ensure_unique_index(collection, field)
    }

    pub fn close(&self) -> StoreResult<()> {
        self.inner.close()
    }
}
