use karmadb::db::Database;
use karmadb::errors::StoreResult;
use karmadb::repository::{CommentRepository, StoryRepository, UserRepository};

/// Shared context for end-to-end tests: one open database plus the three
/// repositories constructed over it.
#[derive(Clone)]
pub struct TestContext {
    db: Database,
}

impl TestContext {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn db(&self) -> Database {
        self.db.clone()
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(&self.db)
    }

    pub fn stories(&self) -> StoryRepository {
        StoryRepository::new(&self.db)
    }

    pub fn comments(&self) -> CommentRepository {
        CommentRepository::new(&self.db)
    }
}

/// Opens a fresh database over the in-memory engine with the default
/// link-sharing schema.
pub fn create_test_context() -> StoreResult<TestContext> {
    let db = Database::builder().open_or_create()?;
    Ok(TestContext::new(db))
}

pub fn cleanup(ctx: TestContext) -> StoreResult<()> {
    ctx.db().close()
}

/// Registers a user and returns its id in hex form.
pub fn register_user(ctx: &TestContext, username: &str) -> StoreResult<String> {
    Ok(ctx
        .users()
        .create(username, "<credential hash>")?
        .inserted_id()
        .to_hex())
}

/// Submits a text story for the given user and returns its id in hex form.
pub fn submit_story(ctx: &TestContext, user_id: &str, title: &str) -> StoreResult<String> {
    Ok(ctx
        .stories()
        .create(user_id, title, Some("story text"), None)?
        .inserted_id()
        .to_hex())
}
