//! Documents, identifiers, and the building blocks of collection operations.
//!
//! A [`Document`] is a schemaless key-value map with embedded-field support.
//! Every stored document is identified by an [`ObjectId`] in its `_id`
//! field, round-trippable to a 24-character hex string.
//!
//! Writes are expressed as [`UpdateDocument`] patches (assign, remove, and
//! increment field sets applied atomically); denormalized reads are
//! expressed as [`Pipeline`] stage sequences (match, lookup, flatten, sort).
//! Collections are addressed through [`CollectionHandle`]s obtained from the
//! database, and implemented behind the [`CollectionProvider`] trait.

mod collection_handle;
mod document;
mod find_options;
mod object_id;
mod pipeline;
mod update_document;
mod write_result;

pub use collection_handle::*;
pub use document::*;
pub use find_options::*;
pub use object_id::{ObjectId, OBJECT_ID_LENGTH};
pub use pipeline::*;
pub use update_document::*;
pub use write_result::*;
