use im::OrdMap;
use itertools::Itertools;
use smallvec::SmallVec;

use crate::collection::object_id::ObjectId;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR, RESERVED_FIELDS};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use std::fmt::{Debug, Display};

type FieldVec = SmallVec<[String; 8]>;

/// Represents a schemaless document in karmadb.
///
/// Documents are composed of key-value pairs. The key is always a [String]
/// and the value is a [Value]. Nested documents are supported; the key of an
/// embedded field is a path separated by `.`, so `document.get("author.username")`
/// reads the `username` field of the nested `author` document.
///
/// The `_id` field is reserved for the document identifier and only accepts
/// an [ObjectId] value.
///
/// Internally the document uses a persistent ordered map, so cloning is O(1)
/// and mutations share structure with the original.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    /// Checks if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of top-level entries in the document.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified [Value] with the specified key in this
    /// document, replacing any previous value. The key may be an embedded
    /// path (`"author.username"`), in which case intermediate documents are
    /// created as needed.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Validation`] if the key (or any path segment)
    /// is empty, if `_id` is given a non-[ObjectId] value, or if an embedded
    /// path traverses a non-document value.
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> StoreResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(StoreError::new(
                "Document does not support empty key",
                ErrorKind::Validation,
            ));
        }

        let value = value.into();

        if key == DOC_ID && !value.is_object_id() {
            log::error!("Document id field only accepts an ObjectId value");
            return Err(StoreError::new(
                "Document id field only accepts an ObjectId value",
                ErrorKind::Validation,
            ));
        }

        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&splits, value)
        } else {
            self.data = self.data.update(key.to_string(), value);
            Ok(())
        }
    }

    /// Returns the [Value] associated with the specified key, or
    /// [Value::Null] if this document contains no mapping for the key.
    /// Embedded paths are supported, including numeric array indices
    /// (`"tags.0"`).
    pub fn get(&self, key: &str) -> Value {
        match self.data.get(key) {
            Some(value) => value.clone(),
            None => {
                // only walk the path if the key is not found at top level
                if key.contains(FIELD_SEPARATOR) {
                    let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
                    self.deep_get(&splits)
                } else {
                    Value::Null
                }
            }
        }
    }

    /// Returns the [ObjectId] stored in the `_id` field, if any.
    ///
    /// Identifiers are assigned by the store at insertion time; a document
    /// that has not been inserted yet has no id.
    pub fn id(&self) -> Option<ObjectId> {
        match self.data.get(DOC_ID) {
            Some(Value::ObjectId(id)) => Some(*id),
            _ => None,
        }
    }

    /// Checks if this document carries an identifier.
    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }

    /// Checks if the document contains the given top-level key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes the key and its value from the document. Removing a missing
    /// key is not an error. Embedded paths are supported.
    pub fn remove(&mut self, key: &str) {
        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_remove(&splits);
        } else {
            self.data = self.data.without(key);
        }
    }

    /// Retrieves all field paths (top level and embedded) in this document,
    /// excluding the reserved fields.
    pub fn fields(&self) -> FieldVec {
        self.get_fields_internal("")
    }

    /// Iterates over the top-level entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    fn get_fields_internal(&self, prefix: &str) -> FieldVec {
        let mut fields = FieldVec::new();
        for (key, value) in self.data.iter() {
            if prefix.is_empty() && RESERVED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, FIELD_SEPARATOR, key)
            };
            match value {
                Value::Document(doc) => fields.extend(doc.get_fields_internal(&path)),
                _ => fields.push(path),
            }
        }
        fields
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> StoreResult<()> {
        let key = splits[0];
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(StoreError::new(
                "Document does not support empty key",
                ErrorKind::Validation,
            ));
        }

        if splits.len() == 1 {
            self.data = self.data.update(key.to_string(), value);
            return Ok(());
        }

        let mut child = match self.data.get(key) {
            Some(Value::Document(doc)) => doc.clone(),
            Some(_) => {
                log::error!("Cannot set embedded field below non-document value: {}", key);
                return Err(StoreError::new(
                    "Cannot set an embedded field below a non-document value",
                    ErrorKind::Validation,
                ));
            }
            None => Document::new(),
        };
        child.deep_put(&splits[1..], value)?;
        self.data = self
            .data
            .update(key.to_string(), Value::Document(child));
        Ok(())
    }

    fn deep_get(&self, splits: &[&str]) -> Value {
        let value = match self.data.get(splits[0]) {
            Some(value) => value.clone(),
            None => return Value::Null,
        };

        if splits.len() == 1 {
            return value;
        }

        match value {
            Value::Document(doc) => doc.deep_get(&splits[1..]),
            Value::Array(values) => match splits[1].parse::<usize>() {
                Ok(index) => {
                    let element = values.get(index).cloned().unwrap_or(Value::Null);
                    if splits.len() == 2 {
                        element
                    } else if let Value::Document(doc) = element {
                        doc.deep_get(&splits[2..])
                    } else {
                        Value::Null
                    }
                }
                Err(_) => Value::Null,
            },
            _ => Value::Null,
        }
    }

    fn deep_remove(&mut self, splits: &[&str]) {
        let key = splits[0];
        if splits.len() == 1 {
            self.data = self.data.without(key);
            return;
        }

        if let Some(Value::Document(doc)) = self.data.get(key) {
            let mut child = doc.clone();
            child.deep_remove(&splits[1..]);
            self.data = self.data.update(key.to_string(), Value::Document(child));
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.data
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value))
                .join(", ")
        )
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Strips the quotes `stringify!` leaves around string-literal keys in the
/// [`doc!`](crate::doc) macro.
pub fn normalize(key: &str) -> String {
    key.trim_matches('"').to_string()
}

/// Creates a [Document] from key-value pairs.
///
/// Keys may be bare identifiers or string literals; values may be literals,
/// expressions in parentheses, nested `{ ... }` documents, or `[ ... ]`
/// arrays.
///
/// ```rust,ignore
/// let story = doc! {
///     title: "A story",
///     karma: 1i64,
///     author: { username: "alice" },
///     tags: ["rust", "databases"]
/// };
/// ```
#[macro_export]
macro_rules! doc {
    // match an empty document
    () => {
        $crate::collection::Document::new()
    };

    // match a document with key value pairs
    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put(&$crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                    .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the [`doc!`](crate::doc) macro.
/// Handles nested documents, arrays, and expressions.
#[macro_export]
macro_rules! doc_value {
    // match a nested document
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    // match an array of values
    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    // match an expression (variable, literal, parenthesized arithmetic, ...)
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
