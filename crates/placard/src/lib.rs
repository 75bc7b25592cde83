//! # Placard - Placeholder Resolution and Template Composition
//!
//! `placard` fills `<@ ... @>` placeholders in text templates from pluggable
//! value providers, and composes templates out of other templates. It is the
//! resolution layer on top of the byte-level engine in `placard-scan`.
//!
//! ## Core Concepts
//!
//! - [`ValueProvider`]: anything that turns a name into a string
//! - [`CollectionProvider`]: a provider with indexable elements, iterated by `-each`
//! - [`NamespaceRegistry`]: routes `-<prefix> name` to the provider registered for the prefix
//! - [`TemplateLoader`]: collects template sources from a directory tree
//! - [`TemplateCache`]: parses every source once and serves it by name
//! - [`Environment`] / [`Resolver`]: the shared and per-render halves of the engine
//!
//! ## Placeholder Syntax
//!
//! ```text
//! <@ title @>                       HTML-escaped binding
//! <@-raw body @>                    unescaped binding
//! <@-url query @>                   percent-encoded binding
//! <@-js name @>                     binding as a quoted script string
//! <@-require header.html @>         another cached template
//! <@-include sidebar @>             the cached template named by a binding
//! <@-each users row.html @>         a template per collection element
//! <@-each users.companies row @>    ... per element of a nested collection
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use placard::{bindings_from_json, Environment, TemplateCache};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let cache = TemplateCache::build([
//!     ("page.html", "<p><@ company @></p><@-each users row.html@>"),
//!     ("row.html", "<i><@ name @></i>"),
//! ]);
//! let env = Environment::new(Arc::new(cache));
//!
//! let bindings = bindings_from_json(json!({
//!     "company": "Donald & Sons",
//!     "users": [{"name": "Donald"}, {"name": "Mickey"}],
//! }));
//!
//! assert_eq!(
//!     env.render_named("page.html", bindings).unwrap(),
//!     "<p>Donald &amp; Sons</p><i>Donald</i><i>Mickey</i>"
//! );
//! ```
//!
//! ## Loading From Disk
//!
//! ```rust,ignore
//! use placard::{Environment, LoaderConfig, TemplateCache, TemplateLoader};
//!
//! let config = LoaderConfig::new("templates", "html").ignore_dirs(r"^\.git$")?;
//! let sources = TemplateLoader::new(config).load()?;
//! let env = Environment::new(Arc::new(TemplateCache::from_sources(&sources)));
//! ```

pub mod cache;
pub mod engine;
mod error;
pub mod escape;
pub mod expression;
pub mod json;
pub mod loader;
pub mod namespace;
pub mod provider;
pub mod providers;

pub use cache::TemplateCache;
pub use engine::{Diagnostic, Environment, Resolver, DEFAULT_MAX_NESTING};
pub use error::{LoadError, RegistryError};
pub use expression::{split, Directive, Expression, PREFIX_MARKER};
pub use json::{bindings_from_json, bindings_from_serialize, JsonProvider};
pub use loader::{LoaderConfig, SourceMap, TemplateLoader};
pub use namespace::{is_valid_prefix, NamespaceRegistry, SharedNamespaceRegistry};
pub use provider::{Bindings, CollectionProvider, SharedProvider, ValueProvider};
pub use providers::{
    empty, html_escape, url_escape, Empty, List, MapFn, Prefixed, Record, Text,
};

// Re-export the byte-level engine types
pub use placard_scan::{Delimiters, Resolve, Template, DEFAULT_CLOSE, DEFAULT_OPEN};
