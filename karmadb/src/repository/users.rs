use crate::collection::{
    Document, FindOptions, InsertResult, ObjectId, Projection, UpdateDocument, UpdateResult,
};
use crate::common::{
    FIELD_ABOUT, FIELD_CREATED_ON, FIELD_EMAIL, FIELD_KARMA, FIELD_PASSWORD, FIELD_UPDATED_ON,
    FIELD_USERNAME, INITIAL_KARMA, USERS_COLLECTION,
};
use crate::db::Database;
use crate::errors::StoreResult;
use crate::repository::id_filter;
use chrono::Utc;

/// Data access for registered users.
///
/// Read operations report a missing user as `Ok(None)`; the caller checks
/// for absence explicitly. Uniqueness of `username` is enforced by the
/// store's index, not here; a duplicate registration surfaces the store's
/// conflict error unmodified.
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        UserRepository { db: db.clone() }
    }

    /// Exact-match lookup on `username`.
    ///
    /// The returned document is the raw stored form *including* the
    /// credential hash; this read exists for the authentication collaborator
    /// and must not be exposed outward.
    pub fn find_one_by_username(&self, username: &str) -> StoreResult<Option<Document>> {
        let collection = self.db.collection(USERS_COLLECTION)?;
        let mut filter = Document::new();
        filter.put(FIELD_USERNAME, username)?;
        collection.find_one(&filter, &FindOptions::new())
    }

    /// Looks up a user by identifier. The credential hash is excluded from
    /// the returned projection.
    pub fn find_one(&self, id: &str) -> StoreResult<Option<Document>> {
        let id = ObjectId::decode(id)?;
        let collection = self.db.collection(USERS_COLLECTION)?;
        let options = FindOptions::new().projection(Projection::exclude(&[FIELD_PASSWORD]));
        collection.find_one(&id_filter(id)?, &options)
    }

    /// Registers a user with the given username and opaque credential hash.
    pub fn create(&self, username: &str, password: &str) -> StoreResult<InsertResult> {
        let collection = self.db.collection(USERS_COLLECTION)?;
        let mut user = Document::new();
        user.put(FIELD_USERNAME, username)?;
        user.put(FIELD_PASSWORD, password)?;
        user.put(FIELD_KARMA, INITIAL_KARMA)?;
        user.put(FIELD_CREATED_ON, Utc::now())?;
        collection.insert_one(user)
    }

    /// Updates the user's profile in one conditional patch: a present value
    /// assigns the field, an absent value removes it, and `updated_on` is
    /// always refreshed.
    pub fn update(
        &self,
        id: &str,
        email: Option<&str>,
        about: Option<&str>,
    ) -> StoreResult<UpdateResult> {
        let id = ObjectId::decode(id)?;
        let update = UpdateDocument::new()
            .set_or_unset(FIELD_EMAIL, email)
            .set_or_unset(FIELD_ABOUT, about)
            .set(FIELD_UPDATED_ON, Utc::now());
        let collection = self.db.collection(USERS_COLLECTION)?;
        collection.update_one(&id_filter(id)?, &update)
    }

    /// Adjusts the user's karma by a signed delta in one atomic increment.
    /// No read precedes the write, so concurrent votes all land.
    pub fn increment_vote(&self, id: &str, delta: i64) -> StoreResult<UpdateResult> {
        let id = ObjectId::decode(id)?;
        let update = UpdateDocument::new().inc(FIELD_KARMA, delta);
        let collection = self.db.collection(USERS_COLLECTION)?;
        collection.update_one(&id_filter(id)?, &update)
    }
}
