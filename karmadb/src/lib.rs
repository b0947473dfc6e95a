//! # karmadb - Embedded Document Data Layer
//!
//! karmadb is the persistence core of a social link-sharing site: registered
//! users, submitted stories, and threaded comments, stored as schemaless
//! documents in named collections.
//!
//! ## Key Features
//!
//! - **Embedded**: no separate server process required
//! - **Validated identifiers**: 24-hex-character ids are decoded before any
//!   store operation runs
//! - **Conditional patches**: one update assigns some fields, removes
//!   others, and increments counters atomically
//! - **Denormalized reads**: aggregation pipelines join a story or comment
//!   to its author summary in one round trip
//! - **Atomic karma**: votes are relative increments serialized by the
//!   store, correct under concurrency without read-modify-write
//! - **Unique constraints**: duplicate usernames are rejected by the store's
//!   index, surfaced as conflict errors
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use karmadb::db::Database;
//! use karmadb::repository::{StoryRepository, UserRepository};
//!
//! # fn main() -> karmadb::errors::StoreResult<()> {
//! // Open a database with the default schema (users/stories/comments,
//! // unique usernames) over the in-memory engine.
//! let db = Database::builder().open_or_create()?;
//!
//! let users = UserRepository::new(&db);
//! let stories = StoryRepository::new(&db);
//!
//! let alice = users.create("alice", "<credential hash>")?.inserted_id();
//! let story = stories
//!     .create(&alice.to_hex(), "A story", None, Some("http://example.com"))?
//!     .inserted_id();
//!
//! // One round trip, author summary embedded.
//! let read = stories.find_one(&story.to_hex())?.expect("just created");
//! assert_eq!(read.get("author.username").as_str(), Some("alice"));
//!
//! stories.increment_vote(&story.to_hex(), 1)?;
//! db.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, identifiers, update patches, pipelines,
//!   and collection handles
//! - [`common`] - Shared value types and constants
//! - [`db`] - The database handle, builder, and configuration
//! - [`errors`] - Error types and result definitions
//! - [`repository`] - Domain managers for users, stories, and comments
//! - [`store`] - Storage backend abstraction and the in-memory engine

pub mod collection;
pub mod common;
pub mod db;
pub mod errors;
pub mod repository;
pub mod store;
