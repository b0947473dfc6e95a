//! Domain managers for the site's entities.
//!
//! Each repository implements one cohesive contract per entity type over
//! the collection primitives: read by id, read by unique key, create,
//! conditional update, and atomic karma mutation. A repository is
//! constructed over a [`Database`](crate::db::Database) handle and holds no
//! other state.
//!
//! Every operation taking an external identifier decodes it through
//! [`ObjectId::decode`](crate::collection::ObjectId::decode) *before*
//! resolving any collection handle, then issues exactly one store
//! operation. Failures from the store are propagated verbatim.

mod comments;
mod stories;
mod users;

pub use comments::*;
pub use stories::*;
pub use users::*;

use crate::collection::{Document, Lookup, ObjectId, Projection};
use crate::common::{DOC_ID, FIELD_AUTHOR, FIELD_KARMA, FIELD_USERNAME, FIELD_USER_ID, USERS_COLLECTION};
use crate::errors::StoreResult;

/// Builds the `{_id: id}` filter shared by the by-id operations.
pub(crate) fn id_filter(id: ObjectId) -> StoreResult<Document> {
    let mut filter = Document::new();
    filter.put(DOC_ID, id)?;
    Ok(filter)
}

/// The author join: attach a summary of the owning user (`_id`, `username`,
/// `karma`) under `author`. The projection keeps the credential hash from
/// ever crossing the join.
pub(crate) fn author_lookup() -> Lookup {
    Lookup::new(USERS_COLLECTION, FIELD_USER_ID, DOC_ID, FIELD_AUTHOR).with_projection(
        Projection::include(&[DOC_ID, FIELD_USERNAME, FIELD_KARMA]),
    )
}
