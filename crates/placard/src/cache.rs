//! Cache of pre-parsed templates.
//!
//! Every loaded source is parsed exactly once, when the cache is built.
//! Renders only ever take the read lock, and only long enough to clone the
//! template handle out of the map, so a `require` that recurses into another
//! lookup never holds the lock across a nested render.
//!
//! ```rust
//! use placard::TemplateCache;
//!
//! let cache = TemplateCache::build([
//!     ("row.html", b"<li><@ firstname @></li>".to_vec()),
//! ]);
//!
//! let row = cache.lookup("row.html").expect("row is cached");
//! assert_eq!(row.placeholders().collect::<Vec<_>>(), vec!["firstname"]);
//! assert!(cache.lookup("missing.html").is_none());
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use placard_scan::{Delimiters, Template};

use crate::loader::SourceMap;

/// Name-keyed store of parsed templates.
#[derive(Debug, Default)]
pub struct TemplateCache {
    templates: RwLock<HashMap<String, Arc<Template>>>,
    delimiters: Delimiters,
}

impl TemplateCache {
    /// Creates an empty cache that parses with the default delimiters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache that parses with custom delimiters.
    pub fn with_delimiters(delimiters: Delimiters) -> Self {
        Self {
            templates: RwLock::default(),
            delimiters,
        }
    }

    /// Builds a cache from `(name, bytes)` sources.
    ///
    /// Sources that are not valid UTF-8 are skipped; requiring them later
    /// renders as the empty string.
    pub fn build<I, N, B>(sources: I) -> Self
    where
        I: IntoIterator<Item = (N, B)>,
        N: Into<String>,
        B: AsRef<[u8]>,
    {
        let cache = Self::new();
        cache.populate(sources);
        cache
    }

    /// Builds a cache from everything a loader collected.
    pub fn from_sources(sources: &SourceMap) -> Self {
        Self::build(sources.snapshot())
    }

    /// Parses all `sources` into the cache under a single write lock.
    ///
    /// Readers never observe a partially populated cache. Names that are
    /// already present are replaced.
    pub fn populate<I, N, B>(&self, sources: I)
    where
        I: IntoIterator<Item = (N, B)>,
        N: Into<String>,
        B: AsRef<[u8]>,
    {
        let mut templates = self
            .templates
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        for (name, bytes) in sources {
            let name = name.into();
            match std::str::from_utf8(bytes.as_ref()) {
                Ok(text) => {
                    let template = Template::parse_with(text, &self.delimiters);
                    templates.insert(name, Arc::new(template));
                }
                Err(err) => {
                    tracing::warn!(name = %name, error = %err, "skipping template source that is not UTF-8");
                }
            }
        }

        tracing::debug!(count = templates.len(), "template cache populated");
    }

    /// Parses and stores a single template, replacing any previous one.
    pub fn insert(&self, name: impl Into<String>, source: &str) {
        let template = Template::parse_with(source, &self.delimiters);
        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), Arc::new(template));
    }

    /// Returns the template registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<Arc<Template>> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached template names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
