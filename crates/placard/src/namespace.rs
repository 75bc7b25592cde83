//! Prefix-keyed registry of value providers.
//!
//! A registry routes `-<prefix> <name>` expressions to the provider
//! registered for `<prefix>`, and bare names to the default provider
//! (registered under the empty prefix). The registry is a provider itself,
//! so registries nest.
//!
//! ```rust
//! use placard::{NamespaceRegistry, Text, ValueProvider};
//! use std::sync::Arc;
//!
//! let mut registry = NamespaceRegistry::new();
//! registry.add("site", Arc::new(Text::new("Duckburg"))).unwrap();
//!
//! assert_eq!(registry.map("-site title"), "Duckburg");
//! assert_eq!(registry.map("-other title"), "");
//! ```
//!
//! Two flavours exist: [`NamespaceRegistry`] needs `&mut self` to register
//! and is meant for single-threaded setup, [`SharedNamespaceRegistry`] takes
//! a reader/writer lock per call and can be registered into while renders
//! are reading from it.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RegistryError;
use crate::expression::split;
use crate::provider::{SharedProvider, ValueProvider};

static PREFIX_RULE: Lazy<Regex> = Lazy::new(|| Regex::new("^[a-z]+$").unwrap());

/// Returns true if `prefix` may be registered.
pub fn is_valid_prefix(prefix: &str) -> bool {
    prefix.is_empty() || PREFIX_RULE.is_match(prefix)
}

/// A registry for single-threaded setup.
#[derive(Default, Clone)]
pub struct NamespaceRegistry {
    providers: HashMap<String, SharedProvider>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` for `prefix`.
    ///
    /// The empty prefix sets the default provider.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidPrefix`] if `prefix` is not empty and does
    ///   not match `^[a-z]+$`
    /// - [`RegistryError::AlreadyExists`] if `prefix` is taken; the first
    ///   registration stays in place
    pub fn add(
        &mut self,
        prefix: impl Into<String>,
        provider: SharedProvider,
    ) -> Result<(), RegistryError> {
        let prefix = prefix.into();
        if !is_valid_prefix(&prefix) {
            return Err(RegistryError::InvalidPrefix(prefix));
        }
        if self.providers.contains_key(&prefix) {
            return Err(RegistryError::AlreadyExists(prefix));
        }
        self.providers.insert(prefix, provider);
        Ok(())
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.providers.contains_key(prefix)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered prefixes, in no particular order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(|s| s.as_str())
    }
}

impl ValueProvider for NamespaceRegistry {
    fn map(&self, input: &str) -> String {
        let (prefix, rest) = split(input);
        if prefix.is_empty() && rest.is_empty() {
            return String::new();
        }

        // Invalid prefixes can never have been registered, so a miss covers them.
        match self.providers.get(prefix) {
            Some(provider) => provider.map(rest),
            None => {
                tracing::debug!(prefix, "no provider registered for prefix");
                String::new()
            }
        }
    }
}

impl std::fmt::Debug for NamespaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceRegistry")
            .field("prefixes", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A registry safe for concurrent registration and lookup.
#[derive(Debug, Default)]
pub struct SharedNamespaceRegistry {
    inner: RwLock<NamespaceRegistry>,
}

impl SharedNamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` for `prefix` under the write lock.
    ///
    /// See [`NamespaceRegistry::add`] for the rules.
    pub fn add(
        &self,
        prefix: impl Into<String>,
        provider: SharedProvider,
    ) -> Result<(), RegistryError> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(prefix, provider)
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(prefix)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<NamespaceRegistry> for SharedNamespaceRegistry {
    fn from(registry: NamespaceRegistry) -> Self {
        Self {
            inner: RwLock::new(registry),
        }
    }
}

impl ValueProvider for SharedNamespaceRegistry {
    fn map(&self, input: &str) -> String {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{Prefixed, Text};
    use std::sync::Arc;

    #[test]
    fn add_then_map_delegates_remainder() {
        let mut registry = NamespaceRegistry::new();
        registry.add("img", Arc::new(Prefixed::new("/img/"))).unwrap();
        assert_eq!(registry.map("-img logo.png"), "/img/logo.png");
    }

    #[test]
    fn default_provider_gets_bare_names() {
        let mut registry = NamespaceRegistry::new();
        registry.add("", Arc::new(Prefixed::new("default:"))).unwrap();
        assert_eq!(registry.map("title"), "default:title");
    }

    #[test]
    fn blank_inputs_are_empty() {
        let mut registry = NamespaceRegistry::new();
        registry.add("", Arc::new(Text::new("x"))).unwrap();
        assert_eq!(registry.map(""), "");
        assert_eq!(registry.map("-"), "");
    }

    #[test]
    fn unregistered_prefix_is_empty() {
        let registry = NamespaceRegistry::new();
        assert_eq!(registry.map("-nope name"), "");
        assert_eq!(registry.map("bare"), "");
    }

    #[test]
    fn invalid_prefixes_rejected_without_mutation() {
        let mut registry = NamespaceRegistry::new();
        for prefix in ["Upper", "with space", "digits1", "dash-ed", "ümlaut"] {
            let err = registry.add(prefix, Arc::new(Text::new("x"))).unwrap_err();
            assert_eq!(err, RegistryError::InvalidPrefix(prefix.to_string()));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_keeps_first() {
        let mut registry = NamespaceRegistry::new();
        registry.add("a", Arc::new(Text::new("first"))).unwrap();
        let err = registry.add("a", Arc::new(Text::new("second"))).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyExists("a".to_string()));
        assert_eq!(registry.map("-a x"), "first");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registries_nest() {
        let mut inner = NamespaceRegistry::new();
        inner.add("", Arc::new(Prefixed::new("inner:"))).unwrap();
        let mut outer = NamespaceRegistry::new();
        outer.add("ns", Arc::new(inner)).unwrap();
        assert_eq!(outer.map("-ns name"), "inner:name");
    }

    #[test]
    fn shared_registry_across_threads() {
        let registry = Arc::new(SharedNamespaceRegistry::new());
        let handles: Vec<_> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|prefix| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .add(prefix, Arc::new(Prefixed::new(format!("{}:", prefix))))
                        .unwrap();
                    registry.map(&format!("-{} x", prefix))
                })
            })
            .collect();

        let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec!["a:x", "b:x", "c:x", "d:x"]);
        assert_eq!(registry.len(), 4);
        assert!(registry.contains("c"));
        assert!(matches!(
            registry.add("a", Arc::new(Text::new("again"))),
            Err(RegistryError::AlreadyExists(_))
        ));
    }
}
