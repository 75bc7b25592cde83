//! Built-in providers.
//!
//! Small building blocks for bindings: constants, closures, records and
//! lists. [`JsonProvider`](crate::JsonProvider) covers data that arrives as
//! serialized structures.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::escape;
use crate::provider::{first_segment, CollectionProvider, SharedProvider, ValueProvider};

/// Always maps to the empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Empty;

impl ValueProvider for Empty {
    fn map(&self, _name: &str) -> String {
        String::new()
    }
}

/// Returns a shared [`Empty`] provider.
pub fn empty() -> SharedProvider {
    Arc::new(Empty)
}

/// Always maps to its own text, whatever the name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text(pub String);

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl ValueProvider for Text {
    fn map(&self, _name: &str) -> String {
        self.0.clone()
    }
}

/// Maps a name to itself, prefixed by a fixed string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefixed(pub String);

impl Prefixed {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }
}

impl ValueProvider for Prefixed {
    fn map(&self, name: &str) -> String {
        format!("{}{}", self.0, name)
    }
}

/// Adapts a function into a provider.
pub struct MapFn<F>(pub F);

impl<F> ValueProvider for MapFn<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn map(&self, name: &str) -> String {
        (self.0)(name)
    }
}

impl<F> std::fmt::Debug for MapFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MapFn(..)")
    }
}

/// A provider that HTML-escapes the name it is asked for.
pub fn html_escape() -> MapFn<fn(&str) -> String> {
    MapFn(escape::html as fn(&str) -> String)
}

/// A provider that percent-encodes the name it is asked for.
pub fn url_escape() -> MapFn<fn(&str) -> String> {
    MapFn(escape::url as fn(&str) -> String)
}

impl<S: std::hash::BuildHasher + Send + Sync> ValueProvider for HashMap<String, String, S> {
    fn map(&self, name: &str) -> String {
        self.get(name).cloned().unwrap_or_default()
    }
}

impl ValueProvider for BTreeMap<String, String> {
    fn map(&self, name: &str) -> String {
        self.get(name).cloned().unwrap_or_default()
    }
}

/// A flat record of named fields with optional nested children.
///
/// Children are what a [`List`] hands out when an `each` path addresses
/// a level below the record.
///
/// ```rust
/// use placard::{List, Record, ValueProvider};
/// use std::sync::Arc;
///
/// let companies = List::new(vec![Arc::new(Record::new().with_field("name", "Walt Disney"))]);
/// let user = Record::new()
///     .with_field("firstname", "Donald")
///     .with_child("companies", Arc::new(companies));
///
/// assert_eq!(user.map("firstname"), "Donald");
/// assert!(user.child("companies").is_some());
/// ```
#[derive(Default, Clone)]
pub struct Record {
    fields: BTreeMap<String, String>,
    children: BTreeMap<String, SharedProvider>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any previous value.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Adds a nested provider reachable through [`ValueProvider::child`].
    pub fn with_child(mut self, name: impl Into<String>, child: SharedProvider) -> Self {
        self.children.insert(name.into(), child);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("fields", &self.fields)
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl ValueProvider for Record {
    fn map(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn child(&self, name: &str) -> Option<SharedProvider> {
        self.children.get(name).cloned()
    }
}

/// An ordered collection of providers.
///
/// `element_at(i, "")` returns element `i` itself. With a non-empty
/// sub-path, it returns the element's child named by the first segment, so
/// `each users.companies row` walks into every user's companies.
#[derive(Default, Clone)]
pub struct List {
    items: Vec<SharedProvider>,
}

impl List {
    pub fn new(items: Vec<SharedProvider>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: SharedProvider) {
        self.items.push(item);
    }
}

impl std::fmt::Debug for List {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("List")
            .field("len", &self.items.len())
            .finish()
    }
}

impl FromIterator<SharedProvider> for List {
    fn from_iter<I: IntoIterator<Item = SharedProvider>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ValueProvider for List {
    fn map(&self, _name: &str) -> String {
        String::new()
    }

    fn as_collection(&self) -> Option<&dyn CollectionProvider> {
        Some(self)
    }
}

impl CollectionProvider for List {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize, sub_path: &str) -> Option<SharedProvider> {
        let item = self.items.get(index)?;
        if sub_path.is_empty() {
            return Some(Arc::clone(item));
        }
        let (head, _) = first_segment(sub_path);
        item.child(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants() {
        assert_eq!(Empty.map("anything"), "");
        assert_eq!(Text::new("soso").map("header.title"), "soso");
        assert_eq!(Prefixed::new("/static/").map("app.css"), "/static/app.css");
    }

    #[test]
    fn map_fn_calls_closure() {
        let provider = MapFn(|name: &str| name.len().to_string());
        assert_eq!(provider.map("four"), "4");
    }

    #[test]
    fn escape_providers() {
        assert_eq!(html_escape().map("<b>"), "&lt;b&gt;");
        assert_eq!(url_escape().map("a b"), "a%20b");
    }

    #[test]
    fn hash_and_btree_maps() {
        let mut hash = HashMap::new();
        hash.insert("name".to_string(), "Donald".to_string());
        assert_eq!(hash.map("name"), "Donald");
        assert_eq!(hash.map("missing"), "");

        let tree: BTreeMap<String, String> = [("id".to_string(), "1".to_string())].into();
        assert_eq!(tree.map("id"), "1");
    }

    #[test]
    fn record_from_iterator() {
        let record: Record = [("firstname", "Donald"), ("lastname", "Duck")]
            .into_iter()
            .collect();
        assert_eq!(record.map("lastname"), "Duck");
        assert_eq!(record.map("id"), "");
    }

    #[test]
    fn list_out_of_range_is_empty() {
        let list = List::new(vec![Arc::new(Text::new("only"))]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.element_at(0, "").map("x"), "only");
        assert_eq!(list.element_at(5, "").map("x"), "");
    }

    #[test]
    fn list_follows_sub_path_into_children() {
        let inner = Arc::new(List::new(vec![Arc::new(Text::new("Walt Disney"))]));
        let user = Record::new().with_child("companies", inner);
        let users = List::new(vec![Arc::new(user)]);

        let companies = users.element_at(0, "companies");
        let collection = companies.as_collection().expect("child is a list");
        assert_eq!(collection.len(), 1);

        let missing = users.element_at(0, "pets");
        assert!(missing.as_collection().is_none());
        assert_eq!(missing.map("x"), "");
        assert!(users.get(0, "pets").is_none());
        assert!(users.get(1, "").is_none());
    }

    #[test]
    fn list_is_a_collection_and_maps_empty() {
        let list = List::default();
        assert!(list.as_collection().is_some());
        assert!(list.is_empty());
        assert_eq!(list.map("anything"), "");
    }
}
