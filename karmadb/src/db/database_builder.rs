use crate::db::{Database, DbConfig};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::store::memory::InMemoryStore;
use crate::store::{Datastore, DatastoreProvider};

/// Builder for creating and configuring a [`Database`].
///
/// `DatabaseBuilder` provides a fluent API for configuring the storage
/// backend and the bootstrap schema before opening the database. It follows
/// the builder pattern and captures configuration errors so they are
/// reported when [`open_or_create`](DatabaseBuilder::open_or_create) runs.
///
/// # Examples
///
/// ```rust,ignore
/// // Open a database over the default in-memory engine, with the default
/// // link-sharing schema (users/stories/comments, unique usernames).
/// let db = Database::builder().open_or_create()?;
///
/// // Add an extra unique constraint.
/// let db = Database::builder()
///     .unique_index("stories", "url")
///     .open_or_create()?;
/// ```
#[derive(Default)]
pub struct DatabaseBuilder {
    error: Option<StoreError>,
    config: DbConfig,
    store: Option<Datastore>,
}

impl DatabaseBuilder {
    /// Creates a new builder with the default configuration and the
    /// in-memory storage backend.
    pub fn new() -> Self {
        DatabaseBuilder {
            error: None,
            config: DbConfig::new(),
            store: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: DbConfig) -> Self {
        self.config = config;
        self
    }

    /// Pre-creates a collection during bootstrap.
    pub fn collection(mut self, name: &str) -> Self {
        if self.error.is_none() {
            if name.is_empty() {
                self.error = Some(StoreError::new(
                    "Collection name cannot be empty",
                    ErrorKind::Validation,
                ));
            } else {
                self.config.add_collection(name);
            }
        }
        self
    }

    /// Declares a unique index built during bootstrap.
    pub fn unique_index(mut self, collection: &str, field: &str) -> Self {
        if self.error.is_none() {
            if collection.is_empty() || field.is_empty() {
                self.error = Some(StoreError::new(
                    "Unique index requires a collection and a field name",
                    ErrorKind::Validation,
                ));
            } else {
                self.config.add_collection(collection);
                self.config.add_unique_index(collection, field);
            }
        }
        self
    }

    /// Uses the given storage backend instead of the in-memory default.
    pub fn store_provider<T: DatastoreProvider + 'static>(mut self, provider: T) -> Self {
        self.store = Some(Datastore::new(provider));
        self
    }

    /// Opens the backend and bootstraps the configured schema: every
    /// declared collection is created and every declared unique index is
    /// built. Returns the ready-to-use database handle.
    pub fn open_or_create(self) -> StoreResult<Database> {
        if let Some(error) = self.error {
            log::error!("Database configuration error: {}", error);
            return Err(error);
        }

        let store = self
            .store
            .unwrap_or_else(|| Datastore::new(InMemoryStore::new()));
        store.open_or_create()?;

        for name in self.config.bootstrap_collections() {
            store.collection(name)?;
        }
        for index in self.config.unique_indexes() {
            store.ensure_unique_index(&index.collection, &index.field)?;
        }

        log::debug!(
            "Database ready with collections {:?}",
            self.config.bootstrap_collections()
        );
        Ok(Database::new(store, self.config))
    }
}
