use crate::collection::{
    CollectionProvider, Document, FindOptions, InsertResult, Lookup, ObjectId, Pipeline, Stage,
    UpdateDocument, UpdateResult,
};
use crate::common::{SortOrder, Value, DOC_ID};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::store::memory::store::InMemoryStoreInner;
use im::OrdMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Weak;

/// A single named collection of the in-memory engine.
///
/// Documents live in a persistent ordered map keyed by [ObjectId], guarded
/// by one read-write lock together with the collection's unique indexes.
/// Every write takes the lock for its whole find-and-apply span, so
/// single-document updates are serialized and index maintenance stays
/// consistent with the data.
pub(crate) struct MemoryCollection {
    name: String,
    store: Weak<InMemoryStoreInner>,
    state: RwLock<CollectionState>,
}

#[derive(Default)]
struct CollectionState {
    docs: OrdMap<ObjectId, Document>,
    unique_indexes: BTreeMap<String, BTreeMap<Value, ObjectId>>,
}

impl MemoryCollection {
    pub(crate) fn new(name: &str, store: Weak<InMemoryStoreInner>) -> Self {
        MemoryCollection {
            name: name.to_string(),
            store,
            state: RwLock::new(CollectionState::default()),
        }
    }

    /// Declares a unique index on a field and builds it over the existing
    /// documents.
    pub(crate) fn ensure_unique_index(&self, field: &str) -> StoreResult<()> {
        let mut state = self.state.write();
        if state.unique_indexes.contains_key(field) {
            return Ok(());
        }

        let mut index = BTreeMap::new();
        for (id, doc) in state.docs.iter() {
            let value = doc.get(field);
            if value.is_null() {
                continue;
            }
            if index.insert(value, *id).is_some() {
                log::error!(
                    "Cannot build unique index on '{}.{}': existing duplicates",
                    self.name,
                    field
                );
                return Err(StoreError::new(
                    &format!(
                        "Unique constraint violation on field '{}' in collection '{}'",
                        field, self.name
                    ),
                    ErrorKind::Conflict,
                ));
            }
        }

        state.unique_indexes.insert(field.to_string(), index);
        log::debug!("Built unique index on '{}.{}'", self.name, field);
        Ok(())
    }

    pub(crate) fn snapshot(&self) -> Vec<Document> {
        self.state.read().docs.values().cloned().collect()
    }

    fn ensure_open(&self) -> StoreResult<()> {
        match self.store.upgrade() {
            Some(store) => store.ensure_open(),
            None => {
                log::error!("Operation on a collection of a dropped store");
                Err(StoreError::new("Store is closed", ErrorKind::Datastore))
            }
        }
    }

    fn conflict(&self, field: &str) -> StoreError {
        StoreError::new(
            &format!(
                "Unique constraint violation on field '{}' in collection '{}'",
                field, self.name
            ),
            ErrorKind::Conflict,
        )
    }

    /// Applies an update patch to a copy of the document. The `_id` field is
    /// immutable.
    fn apply_update(&self, document: &Document, update: &UpdateDocument) -> StoreResult<Document> {
        if update.set_fields().contains_key(DOC_ID)
            || update.unset_fields().contains(DOC_ID)
            || update.inc_fields().contains_key(DOC_ID)
        {
            log::error!("Update attempted to modify the immutable id field");
            return Err(StoreError::new(
                "The _id field is immutable",
                ErrorKind::Validation,
            ));
        }

        let mut updated = document.clone();

        for (field, value) in update.set_fields() {
            updated.put(field, value.clone())?;
        }

        for field in update.unset_fields() {
            updated.remove(field);
        }

        for (field, delta) in update.inc_fields() {
            let current = updated.get(field);
            let next = match current {
                Value::Null => Value::I64(*delta),
                ref value if value.as_i64().is_some() => {
                    Value::I64(value.as_i64().unwrap() + delta)
                }
                Value::F64(value) => Value::F64(value + *delta as f64),
                _ => {
                    log::error!("Cannot increment non-numeric field '{}'", field);
                    return Err(StoreError::new(
                        &format!("Cannot increment non-numeric field '{}'", field),
                        ErrorKind::Datastore,
                    ));
                }
            };
            updated.put(field, next)?;
        }

        Ok(updated)
    }

    fn find_first_match(state: &CollectionState, filter: &Document) -> Option<ObjectId> {
        // direct lookup when the filter addresses a single id
        if filter.size() == 1 {
            if let Some(id) = filter.id() {
                return state.docs.get(&id).map(|_| id);
            }
        }

        state
            .docs
            .iter()
            .find(|(_, doc)| matches(doc, filter))
            .map(|(id, _)| *id)
    }

    fn execute_lookup(&self, working: &mut [Document], lookup: &Lookup) -> StoreResult<()> {
        let store = self.store.upgrade().ok_or_else(|| {
            log::error!("Lookup against a dropped store");
            StoreError::new("Store is closed", ErrorKind::Datastore)
        })?;

        let foreign: Vec<Document> = match store.get_collection(&lookup.from) {
            Some(collection) => collection.snapshot(),
            None => Vec::new(),
        };

        for doc in working.iter_mut() {
            let local = doc.get(&lookup.local_field);
            if local.is_null() {
                continue;
            }

            let mut target = Vec::new();
            for foreign_doc in &foreign {
                if foreign_doc.get(&lookup.foreign_field) == local {
                    let joined = match &lookup.projection {
                        Some(projection) => projection.apply(foreign_doc),
                        None => foreign_doc.clone(),
                    };
                    target.push(Value::Document(joined));
                }
            }

            if !target.is_empty() {
                doc.put(&lookup.target_field, Value::Array(target))?;
            }
        }

        Ok(())
    }
}

impl CollectionProvider for MemoryCollection {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn find_one(
        &self,
        filter: &Document,
        options: &FindOptions,
    ) -> StoreResult<Option<Document>> {
        self.ensure_open()?;
        let state = self.state.read();

        let found = match Self::find_first_match(&state, filter) {
            Some(id) => state.docs.get(&id).cloned(),
            None => None,
        };

        Ok(found.map(|doc| match options.projection_ref() {
            Some(projection) => projection.apply(&doc),
            None => doc,
        }))
    }

    fn insert_one(&self, document: Document) -> StoreResult<InsertResult> {
        self.ensure_open()?;
        let mut state = self.state.write();

        let mut document = document;
        let id = match document.id() {
            Some(id) => {
                if state.docs.contains_key(&id) {
                    log::error!("Duplicate id {} in collection '{}'", id, self.name);
                    return Err(self.conflict(DOC_ID));
                }
                id
            }
            None => {
                let id = ObjectId::new();
                document.put(DOC_ID, id)?;
                id
            }
        };

        for (field, index) in &state.unique_indexes {
            let value = document.get(field);
            if !value.is_null() && index.contains_key(&value) {
                log::error!(
                    "Rejected insert into '{}': duplicate value for unique field '{}'",
                    self.name,
                    field
                );
                return Err(self.conflict(field));
            }
        }

        for (field, index) in state.unique_indexes.iter_mut() {
            let value = document.get(field);
            if !value.is_null() {
                index.insert(value, id);
            }
        }

        state.docs = state.docs.update(id, document);
        log::debug!("Inserted document {} into '{}'", id, self.name);
        Ok(InsertResult::new(id))
    }

    fn update_one(
        &self,
        filter: &Document,
        update: &UpdateDocument,
    ) -> StoreResult<UpdateResult> {
        self.ensure_open()?;
        let mut state = self.state.write();

        let id = match Self::find_first_match(&state, filter) {
            Some(id) => id,
            None => return Ok(UpdateResult::new(0, 0)),
        };

        // id came out of the map under the same write lock
        let current = state.docs.get(&id).cloned().ok_or_else(|| {
            StoreError::new("Document disappeared during update", ErrorKind::Datastore)
        })?;

        let updated = self.apply_update(&current, update)?;
        let modified = updated != current;

        for (field, index) in state.unique_indexes.iter_mut() {
            let old_value = current.get(field);
            let new_value = updated.get(field);
            if old_value == new_value {
                continue;
            }
            if !new_value.is_null() {
                if let Some(existing) = index.get(&new_value) {
                    if *existing != id {
                        log::error!(
                            "Rejected update in '{}': duplicate value for unique field '{}'",
                            self.name,
                            field
                        );
                        return Err(self.conflict(field));
                    }
                }
            }
            if !old_value.is_null() {
                index.remove(&old_value);
            }
            if !new_value.is_null() {
                index.insert(new_value, id);
            }
        }

        state.docs = state.docs.update(id, updated);
        log::debug!("Updated document {} in '{}'", id, self.name);
        Ok(UpdateResult::new(1, modified as u64))
    }

    fn aggregate(&self, pipeline: &Pipeline) -> StoreResult<Vec<Document>> {
        self.ensure_open()?;
        let mut working = self.snapshot();

        for stage in pipeline.stages() {
            match stage {
                Stage::Match(filter) => {
                    working.retain(|doc| matches(doc, filter));
                }
                Stage::Lookup(lookup) => {
                    self.execute_lookup(&mut working, lookup)?;
                }
                Stage::Flatten(field) => {
                    for doc in working.iter_mut() {
                        match doc.get(field) {
                            Value::Array(values) => match values.into_iter().next() {
                                Some(first) => doc.put(field, first)?,
                                None => doc.remove(field),
                            },
                            _ => {}
                        }
                    }
                }
                Stage::Sort { field, order } => {
                    working.sort_by(|a, b| {
                        let ord = a.get(field).cmp(&b.get(field));
                        match order {
                            SortOrder::Ascending => ord,
                            SortOrder::Descending => ord.reverse(),
                        }
                    });
                }
                Stage::Skip(n) => {
                    working.drain(0..(*n).min(working.len()));
                }
                Stage::Limit(n) => {
                    working.truncate(*n);
                }
                Stage::Project(projection) => {
                    for doc in working.iter_mut() {
                        *doc = projection.apply(doc);
                    }
                }
            }
        }

        Ok(working)
    }
}

/// Checks a document against an equality filter: every filter field must
/// compare equal to the corresponding document field. An empty filter
/// matches every document.
fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(field, expected)| &document.get(field) == expected)
}
