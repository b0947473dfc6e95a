use crate::collection::{
    Document, FindOptions, InsertResult, Pipeline, UpdateDocument, UpdateResult,
};
use crate::errors::StoreResult;
use std::sync::Arc;

/// Trait defining the primitive operations available on a document
/// collection.
///
/// A collection is a container for the documents of one entity. The data
/// layer issues exactly one of these primitives per public operation;
/// implementations own persistence, filter evaluation, constraint
/// enforcement, and pipeline execution.
pub trait CollectionProvider: Send + Sync {
    /// Returns the logical name of this collection.
    fn name(&self) -> String;

    /// Finds the first document matching the filter, shaped by the options'
    /// projection. An empty result is reported as `None`, not as an error.
    fn find_one(&self, filter: &Document, options: &FindOptions)
        -> StoreResult<Option<Document>>;

    /// Inserts a single document, assigning an identifier if the document
    /// carries none. Uniqueness constraints are enforced here.
    fn insert_one(&self, document: Document) -> StoreResult<InsertResult>;

    /// Applies an update to the first document matching the filter, as one
    /// atomic operation.
    fn update_one(&self, filter: &Document, update: &UpdateDocument)
        -> StoreResult<UpdateResult>;

    /// Executes an aggregation pipeline rooted at this collection.
    fn aggregate(&self, pipeline: &Pipeline) -> StoreResult<Vec<Document>>;
}

/// A live handle to a named collection.
///
/// The handle is a thin routing gateway bound to the current store; it holds
/// no per-call state, caches no entity data, and validates no entity
/// content. Cloning is cheap and all clones address the same collection.
#[derive(Clone)]
pub struct CollectionHandle {
    inner: Arc<dyn CollectionProvider>,
}

impl std::fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("name", &self.inner.name())
            .finish()
    }
}

impl CollectionHandle {
    pub fn new<T: CollectionProvider + 'static>(inner: T) -> Self {
        CollectionHandle {
            inner: Arc::new(inner),
        }
    }

    pub fn from_arc(inner: Arc<dyn CollectionProvider>) -> Self {
        CollectionHandle { inner }
    }

    pub fn name(&self) -> String {
        self.inner.name()
    }

    pub fn find_one(
        &self,
        filter: &Document,
        options: &FindOptions,
    ) -> StoreResult<Option<Document>> {
        self.inner.find_one(filter, options)
    }

    pub fn insert_one(&self, document: Document) -> StoreResult<InsertResult> {
        self.inner.insert_one(document)
    }

    pub fn update_one(
        &self,
        filter: &Document,
        update: &UpdateDocument,
    ) -> StoreResult<UpdateResult> {
        self.inner.update_one(filter, update)
    }

    pub fn aggregate(&self, pipeline: &Pipeline) -> StoreResult<Vec<Document>> {
        self.inner.aggregate(pipeline)
    }
}
