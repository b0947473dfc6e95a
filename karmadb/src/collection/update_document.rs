use crate::collection::Document;
use crate::common::{Value, OP_INC, OP_SET, OP_UNSET};
use std::collections::{BTreeMap, BTreeSet};

/// A conditional-patch specification for a single document.
///
/// `UpdateDocument` is a pure value describing three field sets applied in
/// one atomic store operation:
///
/// - *set*: fields assigned a new value;
/// - *unset*: fields removed from the stored document;
/// - *inc*: fields incremented by a signed relative amount.
///
/// The builder is stateless and order-independent: the same field sets
/// produce the same update regardless of call order. [`set_or_unset`]
/// captures the conditional-mutation pattern: a present value assigns the
/// field, an explicitly absent value removes it. A field the caller does not
/// mention is left untouched.
///
/// ```rust,ignore
/// let update = UpdateDocument::new()
///     .set_or_unset("email", Some("a@example.com"))
///     .set_or_unset("about", Option::<&str>::None)
///     .set("updated_on", Utc::now());
/// ```
///
/// [`set_or_unset`]: UpdateDocument::set_or_unset
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct UpdateDocument {
    set: BTreeMap<String, Value>,
    unset: BTreeSet<String>,
    inc: BTreeMap<String, i64>,
}

impl UpdateDocument {
    /// Creates an empty update.
    pub fn new() -> Self {
        UpdateDocument::default()
    }

    /// Assigns a value to a field.
    pub fn set<T: Into<Value>>(mut self, field: &str, value: T) -> Self {
        self.set.insert(field.to_string(), value.into());
        self
    }

    /// Marks a field for removal from the stored document.
    pub fn unset(mut self, field: &str) -> Self {
        self.unset.insert(field.to_string());
        self
    }

    /// Assigns the field when a value is present, removes it when the value
    /// is explicitly absent.
    pub fn set_or_unset<T: Into<Value>>(self, field: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(field, value),
            None => self.unset(field),
        }
    }

    /// Increments a numeric field by a signed relative amount.
    pub fn inc(mut self, field: &str, delta: i64) -> Self {
        self.inc.insert(field.to_string(), delta);
        self
    }

    /// The fields assigned by this update.
    pub fn set_fields(&self) -> &BTreeMap<String, Value> {
        &self.set
    }

    /// The fields removed by this update.
    pub fn unset_fields(&self) -> &BTreeSet<String> {
        &self.unset
    }

    /// The fields incremented by this update.
    pub fn inc_fields(&self) -> &BTreeMap<String, i64> {
        &self.inc
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty() && self.inc.is_empty()
    }

    /// Renders the update in operator form (`$set` / `$unset` / `$inc`).
    /// Sub-documents with no fields are omitted entirely, so an update with
    /// nothing to remove carries no `$unset` at all.
    pub fn into_document(&self) -> Document {
        let mut update = Document::new();

        if !self.set.is_empty() {
            let mut set_doc = Document::new();
            for (field, value) in &self.set {
                // fields sets never contain empty keys, put cannot fail here
                let _ = set_doc.put(field, value.clone());
            }
            let _ = update.put(OP_SET, set_doc);
        }

        if !self.unset.is_empty() {
            let mut unset_doc = Document::new();
            for field in &self.unset {
                let _ = unset_doc.put(field, 1i64);
            }
            let _ = update.put(OP_UNSET, unset_doc);
        }

        if !self.inc.is_empty() {
            let mut inc_doc = Document::new();
            for (field, delta) in &self.inc {
                let _ = inc_doc.put(field, *delta);
            }
            let _ = update.put(OP_INC, inc_doc);
        }

        update
    }
}
