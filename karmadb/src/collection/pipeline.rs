use crate::collection::{Document, ObjectId, Projection};
use crate::common::{SortOrder, Value, DOC_ID};

/// An equality join against another collection.
///
/// For every input document, the documents of the `from` collection whose
/// `foreign_field` equals the input's `local_field` are collected into an
/// array under `target_field`. An optional projection shapes each joined
/// document, so only a summary of the foreign entity crosses the join.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lookup {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    pub target_field: String,
    pub projection: Option<Projection>,
}

impl Lookup {
    pub fn new(from: &str, local_field: &str, foreign_field: &str, target_field: &str) -> Self {
        Lookup {
            from: from.to_string(),
            local_field: local_field.to_string(),
            foreign_field: foreign_field.to_string(),
            target_field: target_field.to_string(),
            projection: None,
        }
    }

    /// Shapes each joined document with the given projection.
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }
}

/// A single server-side transformation stage.
#[derive(Clone, Debug, PartialEq)]
pub enum Stage {
    /// Narrows the working set to documents matching the filter. An empty
    /// filter matches everything.
    Match(Document),
    /// Joins related documents from another collection.
    Lookup(Lookup),
    /// Replaces a joined array with its first element, or removes the field
    /// when the join matched nothing.
    Flatten(String),
    /// Orders the working set by a field.
    Sort { field: String, order: SortOrder },
    /// Drops the first `n` documents.
    Skip(usize),
    /// Keeps at most `n` documents.
    Limit(usize),
    /// Shapes every document in the working set.
    Project(Projection),
}

/// An ordered sequence of transformation stages executed by the store in one
/// round trip.
///
/// The builder appends stages in call order; executing a pipeline whose
/// match admits no documents yields an empty result set, not an error.
///
/// ```rust,ignore
/// let pipeline = Pipeline::new()
///     .match_id(story_id)
///     .lookup(Lookup::new("users", "user_id", "_id", "author"))
///     .flatten("author");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::default()
    }

    /// Appends a match stage that admits every document.
    pub fn match_all(self) -> Self {
        self.match_doc(Document::new())
    }

    /// Appends a match stage with the given filter document.
    pub fn match_doc(mut self, filter: Document) -> Self {
        self.stages.push(Stage::Match(filter));
        self
    }

    /// Appends a match stage narrowing to the document with the given id.
    pub fn match_id(self, id: ObjectId) -> Self {
        let mut filter = Document::new();
        // `_id` always accepts an ObjectId value
        let _ = filter.put(DOC_ID, Value::ObjectId(id));
        self.match_doc(filter)
    }

    /// Appends a join stage.
    pub fn lookup(mut self, lookup: Lookup) -> Self {
        self.stages.push(Stage::Lookup(lookup));
        self
    }

    /// Appends a flatten stage for a previously joined array field.
    pub fn flatten(mut self, field: &str) -> Self {
        self.stages.push(Stage::Flatten(field.to_string()));
        self
    }

    /// Appends a sort stage.
    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.stages.push(Stage::Sort {
            field: field.to_string(),
            order,
        });
        self
    }

    /// Appends a skip stage.
    pub fn skip(mut self, n: usize) -> Self {
        self.stages.push(Stage::Skip(n));
        self
    }

    /// Appends a limit stage.
    pub fn limit(mut self, n: usize) -> Self {
        self.stages.push(Stage::Limit(n));
        self
    }

    /// Appends a projection stage.
    pub fn project(mut self, projection: Projection) -> Self {
        self.stages.push(Stage::Project(projection));
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_preserve_call_order() {
        let id = ObjectId::new();
        let pipeline = Pipeline::new()
            .match_id(id)
            .lookup(Lookup::new("users", "user_id", "_id", "author"))
            .flatten("author");

        assert_eq!(pipeline.len(), 3);
        match &pipeline.stages()[0] {
            Stage::Match(filter) => {
                assert_eq!(filter.get(DOC_ID), Value::ObjectId(id));
                assert_eq!(filter.size(), 1);
            }
            other => panic!("expected match stage, got {:?}", other),
        }
        assert!(matches!(pipeline.stages()[1], Stage::Lookup(_)));
        assert!(matches!(pipeline.stages()[2], Stage::Flatten(_)));
    }

    #[test]
    fn test_match_all_is_empty_filter() {
        let pipeline = Pipeline::new().match_all();
        match &pipeline.stages()[0] {
            Stage::Match(filter) => assert!(filter.is_empty()),
            other => panic!("expected match stage, got {:?}", other),
        }
    }

    #[test]
    fn test_listing_pipeline_shape() {
        let pipeline = Pipeline::new()
            .match_all()
            .sort("created_on", SortOrder::Descending)
            .skip(10)
            .limit(5);

        assert!(matches!(
            pipeline.stages()[1],
            Stage::Sort {
                order: SortOrder::Descending,
                ..
            }
        ));
        assert!(matches!(pipeline.stages()[2], Stage::Skip(10)));
        assert!(matches!(pipeline.stages()[3], Stage::Limit(5)));
    }

    #[test]
    fn test_lookup_projection_attaches() {
        let lookup = Lookup::new("users", "user_id", "_id", "author")
            .with_projection(Projection::include(&["_id", "username", "karma"]));
        assert!(lookup.projection.is_some());
    }
}
