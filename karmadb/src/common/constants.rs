// doc constants
pub const DOC_ID: &str = "_id";
pub const FIELD_SEPARATOR: &str = ".";
pub const RESERVED_FIELDS: [&str; 1] = [DOC_ID];

// collection names
pub const USERS_COLLECTION: &str = "users";
pub const STORIES_COLLECTION: &str = "stories";
pub const COMMENTS_COLLECTION: &str = "comments";

// entity field names
pub const FIELD_USERNAME: &str = "username";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_ABOUT: &str = "about";
pub const FIELD_TITLE: &str = "title";
pub const FIELD_TEXT: &str = "text";
pub const FIELD_URL: &str = "url";
pub const FIELD_USER_ID: &str = "user_id";
pub const FIELD_STORY_ID: &str = "story_id";
pub const FIELD_PARENT_ID: &str = "parent_id";
pub const FIELD_KARMA: &str = "karma";
pub const FIELD_CREATED_ON: &str = "created_on";
pub const FIELD_UPDATED_ON: &str = "updated_on";

// target field for joined author summaries
pub const FIELD_AUTHOR: &str = "author";

// every entity starts with one point of karma, its creator's implicit upvote
pub const INITIAL_KARMA: i64 = 1;

// update operators
pub const OP_SET: &str = "$set";
pub const OP_UNSET: &str = "$unset";
pub const OP_INC: &str = "$inc";

pub const KARMADB_VERSION: &str = env!("CARGO_PKG_VERSION");
