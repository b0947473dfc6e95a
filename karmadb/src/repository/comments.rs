use crate::collection::{
    Document, InsertResult, ObjectId, Pipeline, UpdateDocument, UpdateResult,
};
use crate::common::{
    COMMENTS_COLLECTION, FIELD_AUTHOR, FIELD_CREATED_ON, FIELD_KARMA, FIELD_PARENT_ID,
    FIELD_STORY_ID, FIELD_TEXT, FIELD_USER_ID, INITIAL_KARMA, SortOrder,
};
use crate::db::Database;
use crate::errors::StoreResult;
use crate::repository::{author_lookup, id_filter};
use chrono::Utc;

/// Data access for threaded comments.
///
/// A comment always references its story and its author; a reply
/// additionally references its parent comment through `parent_id`, which is
/// how threads nest. Reads embed the author summary the same way story
/// reads do.
pub struct CommentRepository {
    db: Database,
}

impl CommentRepository {
    pub fn new(db: &Database) -> Self {
        CommentRepository { db: db.clone() }
    }

    /// Looks up a comment by identifier with its author summary embedded.
    pub fn find_one(&self, id: &str) -> StoreResult<Option<Document>> {
        let id = ObjectId::decode(id)?;
        let collection = self.db.collection(COMMENTS_COLLECTION)?;
        let pipeline = Pipeline::new()
            .match_id(id)
            .lookup(author_lookup())
            .flatten(FIELD_AUTHOR);
        let results = collection.aggregate(&pipeline)?;
        Ok(results.into_iter().next())
    }

    /// Posts a comment on a story. A reply supplies the parent comment's
    /// identifier; a top-level comment supplies none.
    pub fn create(
        &self,
        story_id: &str,
        user_id: &str,
        text: &str,
        parent_id: Option<&str>,
    ) -> StoreResult<InsertResult> {
        let story_id = ObjectId::decode(story_id)?;
        let user_id = ObjectId::decode(user_id)?;
        let parent_id = match parent_id {
            Some(raw) => Some(ObjectId::decode(raw)?),
            None => None,
        };

        let collection = self.db.collection(COMMENTS_COLLECTION)?;
        let mut comment = Document::new();
        comment.put(FIELD_STORY_ID, story_id)?;
        comment.put(FIELD_USER_ID, user_id)?;
        if let Some(parent_id) = parent_id {
            comment.put(FIELD_PARENT_ID, parent_id)?;
        }
        comment.put(FIELD_TEXT, text)?;
        comment.put(FIELD_KARMA, INITIAL_KARMA)?;
        comment.put(FIELD_CREATED_ON, Utc::now())?;
        collection.insert_one(comment)
    }

    /// Lists a story's comments oldest first with author summaries
    /// embedded, ready for thread assembly.
    pub fn find_all_by_story(&self, story_id: &str) -> StoreResult<Vec<Document>> {
        let story_id = ObjectId::decode(story_id)?;
        let collection = self.db.collection(COMMENTS_COLLECTION)?;

        let mut filter = Document::new();
        filter.put(FIELD_STORY_ID, story_id)?;
        let pipeline = Pipeline::new()
            .match_doc(filter)
            .sort(FIELD_CREATED_ON, SortOrder::Ascending)
            .lookup(author_lookup())
            .flatten(FIELD_AUTHOR);
        collection.aggregate(&pipeline)
    }

    /// Adjusts the comment's karma by a signed delta in one atomic
    /// increment.
    pub fn increment_vote(&self, id: &str, delta: i64) -> StoreResult<UpdateResult> {
        let id = ObjectId::decode(id)?;
        let update = UpdateDocument::new().inc(FIELD_KARMA, delta);
        let collection = self.db.collection(COMMENTS_COLLECTION)?;
        collection.update_one(&id_filter(id)?, &update)
    }
}
