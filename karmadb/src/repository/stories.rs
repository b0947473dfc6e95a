use crate::collection::{
    Document, InsertResult, ObjectId, Pipeline, UpdateDocument, UpdateResult,
};
use crate::common::{
    FIELD_AUTHOR, FIELD_CREATED_ON, FIELD_KARMA, FIELD_TEXT, FIELD_TITLE, FIELD_URL,
    FIELD_USER_ID, INITIAL_KARMA, SortOrder, STORIES_COLLECTION,
};
use crate::db::Database;
use crate::errors::StoreResult;
use crate::repository::{author_lookup, id_filter};
use chrono::Utc;

/// Data access for submitted stories.
///
/// Stories may be link-only or text-only; `text` and `url` are stored only
/// when supplied. Reads return denormalized documents with the author
/// summary embedded, produced by one aggregation round trip.
pub struct StoryRepository {
    db: Database,
}

impl StoryRepository {
    pub fn new(db: &Database) -> Self {
        StoryRepository { db: db.clone() }
    }

    /// Looks up a story by identifier with its author summary embedded.
    pub fn find_one(&self, id: &str) -> StoreResult<Option<Document>> {
        let id = ObjectId::decode(id)?;
        let collection = self.db.collection(STORIES_COLLECTION)?;
        let pipeline = Pipeline::new()
            .match_id(id)
            .lookup(author_lookup())
            .flatten(FIELD_AUTHOR);
        let results = collection.aggregate(&pipeline)?;
        Ok(results.into_iter().next())
    }

    /// Submits a story owned by the given user.
    pub fn create(
        &self,
        user_id: &str,
        title: &str,
        text: Option<&str>,
        url: Option<&str>,
    ) -> StoreResult<InsertResult> {
        let user_id = ObjectId::decode(user_id)?;
        let collection = self.db.collection(STORIES_COLLECTION)?;

        let mut story = Document::new();
        story.put(FIELD_USER_ID, user_id)?;
        story.put(FIELD_TITLE, title)?;
        if let Some(text) = text {
            story.put(FIELD_TEXT, text)?;
        }
        if let Some(url) = url {
            story.put(FIELD_URL, url)?;
        }
        story.put(FIELD_KARMA, INITIAL_KARMA)?;
        story.put(FIELD_CREATED_ON, Utc::now())?;
        collection.insert_one(story)
    }

    /// Lists stories newest first with author summaries embedded.
    pub fn find_all(&self, skip: usize, limit: usize) -> StoreResult<Vec<Document>> {
        let collection = self.db.collection(STORIES_COLLECTION)?;
        let pipeline = Pipeline::new()
            .match_all()
            .sort(FIELD_CREATED_ON, SortOrder::Descending)
            .skip(skip)
            .limit(limit)
            .lookup(author_lookup())
            .flatten(FIELD_AUTHOR);
        collection.aggregate(&pipeline)
    }

    /// Adjusts the story's karma by a signed delta in one atomic increment.
    pub fn increment_vote(&self, id: &str, delta: i64) -> StoreResult<UpdateResult> {
        let id = ObjectId::decode(id)?;
        let update = UpdateDocument::new().inc(FIELD_KARMA, delta);
        let collection = self.db.collection(STORIES_COLLECTION)?;
        collection.update_one(&id_filter(id)?, &update)
    }
}
