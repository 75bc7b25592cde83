//! Value and collection provider traits.
//!
//! Every placeholder ends up being answered by a [`ValueProvider`]: something
//! that maps a name to a string. Repeated data is modelled by the
//! [`CollectionProvider`] capability, which adds ordered, indexed access to
//! child providers.
//!
//! Resolution code never inspects concrete types. It asks a provider whether
//! it is a collection through [`ValueProvider::as_collection`] and branches on
//! the answer:
//!
//! ```rust
//! use placard::{List, Record, ValueProvider};
//! use std::sync::Arc;
//!
//! let users = List::new(vec![
//!     Arc::new(Record::new().with_field("firstname", "Donald")),
//!     Arc::new(Record::new().with_field("firstname", "Mickey")),
//! ]);
//!
//! let collection = users.as_collection().expect("lists are collections");
//! assert_eq!(collection.len(), 2);
//! assert_eq!(collection.element_at(1, "").map("firstname"), "Mickey");
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::providers::empty;

/// Shared handle to any provider.
pub type SharedProvider = Arc<dyn ValueProvider>;

/// The per-render mapping from binding name to provider.
pub type Bindings = HashMap<String, SharedProvider>;

/// Maps a placeholder name to its string value.
///
/// Implementations must not fail: unknown names map to the empty string.
/// Providers are shared between concurrent renders, so they must be
/// `Send + Sync` and free of observable side effects (internal caching is
/// fine).
pub trait ValueProvider: Send + Sync {
    /// Returns the value for `name`, or `""` if there is none.
    fn map(&self, name: &str) -> String;

    /// Returns this provider as a collection, if it is one.
    fn as_collection(&self) -> Option<&dyn CollectionProvider> {
        None
    }

    /// Returns a named nested provider, if there is one.
    ///
    /// Collections use this to follow the first segment of a sub-path into
    /// their elements.
    fn child(&self, _name: &str) -> Option<SharedProvider> {
        None
    }
}

/// Ordered, indexable repeated data.
///
/// `get` and `element_at` receive the part of a dotted path below this
/// collection's own nesting level. Returning a provider whose
/// [`as_collection`](ValueProvider::as_collection) is `Some` signals another
/// nesting level.
pub trait CollectionProvider: ValueProvider {
    /// Number of elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns element `index`, addressed by `sub_path` (which may be empty),
    /// or `None` if there is no such element or it has no child named by
    /// the first segment of `sub_path`.
    fn get(&self, index: usize, sub_path: &str) -> Option<SharedProvider>;

    /// Like [`get`](Self::get), with anything absent as the empty provider.
    ///
    /// An `index >= len()` returns an empty provider rather than panic.
    fn element_at(&self, index: usize, sub_path: &str) -> SharedProvider {
        self.get(index, sub_path).unwrap_or_else(empty)
    }
}

impl<T: ValueProvider + ?Sized> ValueProvider for Arc<T> {
    fn map(&self, name: &str) -> String {
        (**self).map(name)
    }

    fn as_collection(&self) -> Option<&dyn CollectionProvider> {
        (**self).as_collection()
    }

    fn child(&self, name: &str) -> Option<SharedProvider> {
        (**self).child(name)
    }
}

impl<T: ValueProvider + ?Sized> ValueProvider for Box<T> {
    fn map(&self, name: &str) -> String {
        (**self).map(name)
    }

    fn as_collection(&self) -> Option<&dyn CollectionProvider> {
        (**self).as_collection()
    }

    fn child(&self, name: &str) -> Option<SharedProvider> {
        (**self).child(name)
    }
}

/// Splits a dotted path into its first segment and the rest.
///
/// `"a.b.c"` becomes `("a", "b.c")`; `"a"` becomes `("a", "")`.
pub fn first_segment(path: &str) -> (&str, &str) {
    match path.split_once('.') {
        Some((head, rest)) => (head, rest),
        None => (path, ""),
    }
}

/// Counts the segments of a dotted path. The empty path has none.
pub fn segment_count(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.split('.').count()
    }
}
