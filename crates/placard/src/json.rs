//! Providers over serialized data.
//!
//! [`JsonProvider`] exposes a `serde_json::Value` (or anything
//! `Serialize`) as bindings without copying: every nested provider shares
//! the same root and only remembers its path into it.
//!
//! | value at the provider's path | `map(name)` | collection? |
//! |---|---|---|
//! | string, number, bool | the scalar, whatever the name | no |
//! | null | `""` | no |
//! | object | field at the dotted path `name` | no |
//! | array | `""` | yes |

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::provider::{first_segment, Bindings, CollectionProvider, SharedProvider, ValueProvider};

static NULL: Value = Value::Null;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Key(String),
    Index(usize),
}

/// A provider rooted somewhere inside a shared JSON document.
#[derive(Debug, Clone)]
pub struct JsonProvider {
    root: Arc<Value>,
    path: Vec<Step>,
}

impl JsonProvider {
    pub fn new(value: Value) -> Self {
        Self {
            root: Arc::new(value),
            path: Vec::new(),
        }
    }

    /// Serializes `data` and wraps the result.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::to_value(data)?))
    }

    /// The value this provider points at.
    pub fn value(&self) -> &Value {
        let mut current: &Value = &self.root;
        for step in &self.path {
            current = match (step, current) {
                (Step::Key(key), Value::Object(map)) => map.get(key).unwrap_or(&NULL),
                (Step::Index(i), Value::Array(items)) => items.get(*i).unwrap_or(&NULL),
                _ => &NULL,
            };
        }
        current
    }

    fn descend(&self, step: Step) -> Self {
        let mut path = self.path.clone();
        path.push(step);
        Self {
            root: Arc::clone(&self.root),
            path,
        }
    }
}

/// String form of a scalar. Objects, arrays and null have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl ValueProvider for JsonProvider {
    fn map(&self, name: &str) -> String {
        let value = self.value();
        if let Some(text) = scalar_text(value) {
            return text;
        }
        if !value.is_object() || name.is_empty() {
            return String::new();
        }

        let mut current = value;
        for segment in name.split('.') {
            match current.get(segment) {
                Some(next) => current = next,
                None => return String::new(),
            }
        }
        scalar_text(current).unwrap_or_default()
    }

    fn as_collection(&self) -> Option<&dyn CollectionProvider> {
        if self.value().is_array() {
            Some(self)
        } else {
            None
        }
    }

    fn child(&self, name: &str) -> Option<SharedProvider> {
        self.value()
            .get(name)
            .filter(|value| !value.is_null())
            .map(|_| Arc::new(self.descend(Step::Key(name.to_string()))) as SharedProvider)
    }
}

impl CollectionProvider for JsonProvider {
    fn len(&self) -> usize {
        self.value().as_array().map_or(0, Vec::len)
    }

    fn get(&self, index: usize, sub_path: &str) -> Option<SharedProvider> {
        if index >= self.len() {
            return None;
        }
        let element = self.descend(Step::Index(index));
        if sub_path.is_empty() {
            return Some(Arc::new(element));
        }
        let (head, _) = first_segment(sub_path);
        element.child(head)
    }
}

/// Turns the top-level fields of a JSON object into bindings.
///
/// Non-object values produce no bindings.
pub fn bindings_from_json(value: Value) -> Bindings {
    let root = JsonProvider::new(value);
    let Some(object) = root.value().as_object() else {
        return Bindings::new();
    };
    object
        .keys()
        .map(|key| {
            let provider: SharedProvider = Arc::new(root.descend(Step::Key(key.clone())));
            (key.clone(), provider)
        })
        .collect()
}

/// Serializes `data` and turns its top-level fields into bindings.
pub fn bindings_from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Bindings, serde_json::Error> {
    Ok(bindings_from_json(serde_json::to_value(data)?))
}
