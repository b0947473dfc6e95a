//! Observes the exact store calls each manager operation issues, using a
//! recording backend injected through the database handle.

use karmadb::collection::{
    CollectionHandle, CollectionProvider, Document, FindOptions, InsertResult, ObjectId,
    Pipeline, Stage, UpdateDocument, UpdateResult,
};
use karmadb::common::Value;
use karmadb::db::Database;
use karmadb::doc;
use karmadb::errors::StoreResult;
use karmadb::repository::{StoryRepository, UserRepository};
use karmadb::store::{Datastore, DatastoreProvider};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[derive(Clone, Debug)]
enum RecordedCall {
    FindOne(Document),
    InsertOne(Document),
    UpdateOne(Document, UpdateDocument),
    Aggregate(Pipeline),
}

#[derive(Clone, Default)]
struct RecordingState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    aggregate_result: Arc<Mutex<Vec<Document>>>,
}

struct RecordingCollection {
    name: String,
    state: RecordingState,
}

impl CollectionProvider for RecordingCollection {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn find_one(
        &self,
        filter: &Document,
        _options: &FindOptions,
    ) -> StoreResult<Option<Document>> {
        self.state
            .calls
            .lock()
            .push(RecordedCall::FindOne(filter.clone()));
        Ok(None)
    }

    fn insert_one(&self, document: Document) -> StoreResult<InsertResult> {
        self.state
            .calls
            .lock()
            .push(RecordedCall::InsertOne(document));
        Ok(InsertResult::new(ObjectId::new()))
    }

    fn update_one(
        &self,
        filter: &Document,
        update: &UpdateDocument,
    ) -> StoreResult<UpdateResult> {
        self.state
            .calls
            .lock()
            .push(RecordedCall::UpdateOne(filter.clone(), update.clone()));
        Ok(UpdateResult::new(1, 1))
    }

    fn aggregate(&self, pipeline: &Pipeline) -> StoreResult<Vec<Document>> {
        self.state
            .calls
            .lock()
            .push(RecordedCall::Aggregate(pipeline.clone()));
        Ok(self.state.aggregate_result.lock().clone())
    }
}

#[derive(Clone, Default)]
struct RecordingStore {
    state: RecordingState,
}

impl DatastoreProvider for RecordingStore {
    fn open_or_create(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn collection(&self, name: &str) -> StoreResult<CollectionHandle> {
        Ok(CollectionHandle::new(RecordingCollection {
            name: name.to_string(),
            state: self.state.clone(),
        }))
    }

    fn has_collection(&self, _name: &str) -> StoreResult<bool> {
        Ok(true)
    }

    fn collection_names(&self) -> StoreResult<HashSet<String>> {
        Ok(HashSet::new())
    }

    fn ensure_unique_index(&self, _collection: &str, _field: &str) -> StoreResult<()> {
        Ok(())
    }

    fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}

fn recording_database() -> (Database, RecordingState) {
    let store = RecordingStore::default();
    let state = store.state.clone();
    (Database::with_store(Datastore::new(store)), state)
}

const STORY_ID: &str = "507f1f77bcf86cd799439011";

#[test]
fn test_story_read_issues_one_pipeline_starting_with_match_id() {
    let (db, state) = recording_database();
    let canned = doc! { title: "canned story" };
    *state.aggregate_result.lock() = vec![canned.clone()];

    let stories = StoryRepository::new(&db);
    let result = stories.find_one(STORY_ID).unwrap();
    assert_eq!(result, Some(canned));

    let calls = state.calls.lock();
    assert_eq!(calls.len(), 1);
    let pipeline = match &calls[0] {
        RecordedCall::Aggregate(pipeline) => pipeline,
        other => panic!("expected a single aggregate call, got {:?}", other),
    };

    let decoded = ObjectId::decode(STORY_ID).unwrap();
    match &pipeline.stages()[0] {
        Stage::Match(filter) => {
            assert_eq!(filter.get("_id"), Value::ObjectId(decoded));
            assert_eq!(filter.size(), 1);
        }
        other => panic!("expected the first stage to match on _id, got {:?}", other),
    }
    assert!(matches!(pipeline.stages()[1], Stage::Lookup(_)));
    assert!(matches!(pipeline.stages()[2], Stage::Flatten(_)));
}

#[test]
fn test_story_create_inserts_exactly_one_document() {
    let (db, state) = recording_database();
    let stories = StoryRepository::new(&db);

    stories
        .create(STORY_ID, "title", Some("content text"), Some("http://example.com"))
        .unwrap();

    let calls = state.calls.lock();
    assert_eq!(calls.len(), 1);
    let inserted = match &calls[0] {
        RecordedCall::InsertOne(document) => document,
        other => panic!("expected a single insert call, got {:?}", other),
    };

    let decoded = ObjectId::decode(STORY_ID).unwrap();
    assert_eq!(inserted.get("user_id"), Value::ObjectId(decoded));
    assert_eq!(inserted.get("title"), Value::from("title"));
    assert_eq!(inserted.get("text"), Value::from("content text"));
    assert_eq!(inserted.get("url"), Value::from("http://example.com"));
    assert_eq!(inserted.get("karma"), Value::I64(1));
    assert!(inserted.get("created_on").is_date_time());
}

#[test]
fn test_user_update_builds_the_conditional_patch() {
    let (db, state) = recording_database();
    let users = UserRepository::new(&db);

    users.update(STORY_ID, Some("a@example.com"), None).unwrap();

    let calls = state.calls.lock();
    assert_eq!(calls.len(), 1);
    let (filter, update) = match &calls[0] {
        RecordedCall::UpdateOne(filter, update) => (filter, update),
        other => panic!("expected a single update call, got {:?}", other),
    };

    assert_eq!(
        filter.get("_id"),
        Value::ObjectId(ObjectId::decode(STORY_ID).unwrap())
    );
    assert!(update.set_fields().contains_key("email"));
    assert!(update.set_fields().contains_key("updated_on"));
    assert!(!update.set_fields().contains_key("about"));
    assert!(update.unset_fields().contains("about"));
    assert!(update.inc_fields().is_empty());
}

#[test]
fn test_increment_vote_is_a_single_pure_increment() {
    let (db, state) = recording_database();
    let users = UserRepository::new(&db);

    users.increment_vote(STORY_ID, -7).unwrap();

    let calls = state.calls.lock();
    // exactly one store call, and it is the increment: no read anywhere
    assert_eq!(calls.len(), 1);
    let update = match &calls[0] {
        RecordedCall::UpdateOne(_, update) => update,
        other => panic!("expected a single update call, got {:?}", other),
    };

    assert!(update.set_fields().is_empty());
    assert!(update.unset_fields().is_empty());
    assert_eq!(update.inc_fields().get("karma"), Some(&-7i64));
}
