use crate::collection::Document;
use std::collections::BTreeSet;

/// Shapes the documents returned by a read operation.
///
/// A projection either *includes* exactly the listed field paths or
/// *excludes* the listed field paths and keeps everything else. Paths may be
/// embedded (`"author.password"`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Projection {
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl Projection {
    /// Keeps only the listed field paths.
    pub fn include(fields: &[&str]) -> Self {
        Projection {
            include: fields.iter().map(|f| f.to_string()).collect(),
            exclude: BTreeSet::new(),
        }
    }

    /// Removes the listed field paths and keeps everything else.
    pub fn exclude(fields: &[&str]) -> Self {
        Projection {
            include: BTreeSet::new(),
            exclude: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Applies this projection to a document, returning the shaped copy.
    pub fn apply(&self, document: &Document) -> Document {
        if !self.include.is_empty() {
            let mut shaped = Document::new();
            for field in &self.include {
                let value = document.get(field);
                if !value.is_null() {
                    // included paths are non-empty by construction
                    let _ = shaped.put(field, value);
                }
            }
            shaped
        } else {
            let mut shaped = document.clone();
            for field in &self.exclude {
                shaped.remove(field);
            }
            shaped
        }
    }
}

/// Options for single-document read operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FindOptions {
    projection: Option<Projection>,
}

impl FindOptions {
    pub fn new() -> Self {
        FindOptions::default()
    }

    /// Sets the projection applied to the returned document.
    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn projection_ref(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }
}
