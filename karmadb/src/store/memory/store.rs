use crate::collection::CollectionHandle;
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::store::memory::MemoryCollection;
use crate::store::DatastoreProvider;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory implementation of a karmadb storage backend.
///
/// `InMemoryStore` keeps every collection in concurrent in-process data
/// structures: a [`DashMap`] registry of collections, each guarding its
/// documents behind a read-write lock. Single-document writes are serialized
/// per collection, which is what makes concurrent increments on the same
/// document safe without any coordination in the layers above.
///
/// All data is lost when the store is dropped; the engine suits tests,
/// development, and embedded deployments that persist elsewhere.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    /// Creates a new, open in-memory store with no collections.
    pub fn new() -> InMemoryStore {
        InMemoryStore::default()
    }

    fn ensure_open(&self) -> StoreResult<()> {
        self.inner.ensure_open()
    }
}

#[derive(Default)]
pub(crate) struct InMemoryStoreInner {
    collections: DashMap<String, Arc<MemoryCollection>>,
    closed: AtomicBool,
}

impl InMemoryStoreInner {
    pub(crate) fn get_collection(&self, name: &str) -> Option<Arc<MemoryCollection>> {
        self.collections.get(name).map(|entry| entry.value().clone())
    }

    pub(crate) fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            log::error!("Operation on a closed store");
            return Err(StoreError::new("Store is closed", ErrorKind::Datastore));
        }
        Ok(())
    }
}

impl DatastoreProvider for InMemoryStore {
    fn open_or_create(&self) -> StoreResult<()> {
        self.inner.closed.store(false, Ordering::Release);
        log::debug!("Opened in-memory store");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    fn collection(&self, name: &str) -> StoreResult<CollectionHandle> {
        self.ensure_open()?;
        if name.is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(StoreError::new(
                "Collection name cannot be empty",
                ErrorKind::Validation,
            ));
        }

        let collection = self
            .inner
            .collections
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("Creating collection '{}'", name);
                Arc::new(MemoryCollection::new(name, Arc::downgrade(&self.inner)))
            })
            .value()
            .clone();

        Ok(CollectionHandle::from_arc(collection))
    }

    fn has_collection(&self, name: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        Ok(self.inner.collections.contains_key(name))
    }

    fn collection_names(&self) -> StoreResult<HashSet<String>> {
        self.ensure_open()?;
        Ok(self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect())
    }

    fn ensure_unique_index(&self, collection: &str, field: &str) -> StoreResult<()> {
        self.ensure_open()?;
        let handle = self.collection(collection)?;
        // the freshly resolved handle is backed by a MemoryCollection
        let backing = self
            .inner
            .get_collection(&handle.name())
            .ok_or_else(|| StoreError::new("Collection disappeared", ErrorKind::Datastore))?;
        backing.ensure_unique_index(field)
    }

    fn close(&self) -> StoreResult<()> {
        self.inner.closed.store(true, Ordering::Release);
        log::debug!("Closed in-memory store");
        Ok(())
    }
}
