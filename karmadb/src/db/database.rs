use crate::collection::CollectionHandle;
use crate::db::{DatabaseBuilder, DbConfig};
use crate::errors::StoreResult;
use crate::store::Datastore;
use std::collections::HashSet;
use std::sync::Arc;

/// The database handle: the single entry point to the persistence core.
///
/// A `Database` wraps the process-wide datastore connection established once
/// at startup. It resolves logical collection names to live
/// [`CollectionHandle`]s and nothing more: it caches no entity data and
/// validates no entity content. Cloning is cheap; all clones share the same
/// underlying store.
///
/// Domain managers receive a `Database` at construction time, which is also
/// how tests substitute an instrumented or mock backend (see
/// [`Database::with_store`]).
///
/// # Examples
///
/// ```rust,ignore
/// let db = Database::builder().open_or_create()?;
/// let users = db.collection("users")?;
/// ```
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

struct DatabaseInner {
    store: Datastore,
    config: DbConfig,
}

impl Database {
    /// Returns a builder for creating a database.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    pub(crate) fn new(store: Datastore, config: DbConfig) -> Self {
        Database {
            inner: Arc::new(DatabaseInner { store, config }),
        }
    }

    /// Wraps an already-open datastore without any bootstrap.
    ///
    /// This is the dependency-injection seam: production code goes through
    /// [`Database::builder`], tests construct a `Database` over whatever
    /// backend they want to observe.
    pub fn with_store(store: Datastore) -> Self {
        Database::new(store, DbConfig::empty())
    }

    /// Resolves a logical collection name to a live handle.
    pub fn collection(&self, name: &str) -> StoreResult<CollectionHandle> {
        self.inner.store.collection(name)
    }

    /// Checks whether a collection with the given name exists.
    pub fn has_collection(&self, name: &str) -> StoreResult<bool> {
        self.inner.store.has_collection(name)
    }

    /// Lists the names of all existing collections.
    pub fn list_collection_names(&self) -> StoreResult<HashSet<String>> {
        self.inner.store.collection_names()
    }

    /// Checks whether the underlying store has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.store.is_closed()
    }

    /// Closes the underlying store. Subsequent operations fail.
    pub fn close(&self) -> StoreResult<()> {
        log::debug!("Closing database");
        self.inner.store.close()
    }

    /// The configuration this database was opened with.
    pub fn config(&self) -> &DbConfig {
        &self.inner.config
    }
}
