use crate::common::{
    COMMENTS_COLLECTION, FIELD_USERNAME, STORIES_COLLECTION, USERS_COLLECTION,
};

/// A unique-index declaration applied during bootstrap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniqueIndexSpec {
    pub collection: String,
    pub field: String,
}

impl UniqueIndexSpec {
    pub fn new(collection: &str, field: &str) -> Self {
        UniqueIndexSpec {
            collection: collection.to_string(),
            field: field.to_string(),
        }
    }
}

/// Configuration for a [`Database`](crate::db::Database).
///
/// The default configuration describes the link-sharing schema: the three
/// entity collections are pre-created at startup and `users.username` is
/// declared unique, so duplicate registrations are rejected by the store
/// rather than by any code above it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbConfig {
    bootstrap_collections: Vec<String>,
    unique_indexes: Vec<UniqueIndexSpec>,
}

impl DbConfig {
    pub fn new() -> Self {
        DbConfig::default()
    }

    /// A configuration with no pre-created collections and no indexes.
    pub fn empty() -> Self {
        DbConfig {
            bootstrap_collections: Vec::new(),
            unique_indexes: Vec::new(),
        }
    }

    /// Adds a collection to pre-create during bootstrap.
    pub fn add_collection(&mut self, name: &str) {
        let name = name.to_string();
        if !self.bootstrap_collections.contains(&name) {
            self.bootstrap_collections.push(name);
        }
    }

    /// Declares a unique index built during bootstrap.
    pub fn add_unique_index(&mut self, collection: &str, field: &str) {
        let spec = UniqueIndexSpec::new(collection, field);
        if !self.unique_indexes.contains(&spec) {
            self.unique_indexes.push(spec);
        }
    }

    pub fn bootstrap_collections(&self) -> &[String] {
        &self.bootstrap_collections
    }

    pub fn unique_indexes(&self) -> &[UniqueIndexSpec] {
        &self.unique_indexes
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            bootstrap_collections: vec![
                USERS_COLLECTION.to_string(),
                STORIES_COLLECTION.to_string(),
                COMMENTS_COLLECTION.to_string(),
            ],
            unique_indexes: vec![UniqueIndexSpec::new(USERS_COLLECTION, FIELD_USERNAME)],
        }
    }
}
