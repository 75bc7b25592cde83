//! Placeholder resolution.
//!
//! The engine is split in two:
//!
//! - [`Environment`]: the shared, read-only part (template cache, optional
//!   namespace provider, recursion limit). Build one per process and share it
//!   by reference across concurrent renders.
//! - [`Resolver`]: the state of one render (bindings, the preferred provider
//!   of the element being iterated, the stack of open collections). Created
//!   per render and owned by it, never shared.
//!
//! # Directives
//!
//! | expression | result |
//! |---|---|
//! | `name` | binding `name`, HTML-escaped |
//! | `-html name` / `-raw name` | binding `name`, unescaped |
//! | `-url name` | binding `name`, percent-encoded |
//! | `-js name` | binding `name` as a quoted script string |
//! | `-include name` | the cached template named by binding `name` |
//! | `-require tmpl` | the cached template `tmpl` |
//! | `-each list[.path] tmpl` | `tmpl` rendered once per element of `list` |
//! | `-<prefix> rest` | the environment's namespace provider, HTML-escaped |
//!
//! # Failure Policy
//!
//! A render always completes. Unbound names, missing templates and
//! out-of-range elements resolve to the empty string. Structural problems
//! (an `each` over something that is not a collection, a path that does not
//! match how deep the data nests, runaway template recursion) are rendered
//! in place as `[error] ...` so template authors see them where they occur.
//!
//! # Example
//!
//! ```rust
//! use placard::{Bindings, Environment, List, Record, SharedProvider, TemplateCache, Text};
//! use std::sync::Arc;
//!
//! let cache = TemplateCache::build([
//!     ("page.html", "<h1><@ title @></h1><ul><@-each users row.html@></ul>"),
//!     ("row.html", "<li><@ firstname @></li>"),
//! ]);
//! let env = Environment::new(Arc::new(cache));
//!
//! let users: List = ["Donald", "Mickey"]
//!     .into_iter()
//!     .map(|name| Arc::new(Record::new().with_field("firstname", name)) as SharedProvider)
//!     .collect();
//! let mut bindings = Bindings::new();
//! bindings.insert("title".into(), Arc::new(Text::new("Ducks & Mice")));
//! bindings.insert("users".into(), Arc::new(users));
//!
//! let html = env.render_named("page.html", bindings).unwrap();
//! assert_eq!(
//!     html,
//!     "<h1>Ducks &amp; Mice</h1><ul><li>Donald</li><li>Mickey</li></ul>"
//! );
//! ```

use std::sync::Arc;

use placard_scan::{Resolve, Template};

use crate::cache::TemplateCache;
use crate::escape;
use crate::expression::{Directive, Expression};
use crate::provider::{first_segment, segment_count, Bindings, CollectionProvider, SharedProvider};

/// Default limit for templates rendered inside templates.
pub const DEFAULT_MAX_NESTING: usize = 32;

/// A structural problem rendered inline instead of a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    /// `each` over a binding that is not a collection.
    #[error("each {binding}: binding is not a collection")]
    NotACollection { binding: String },

    /// An `each` path whose segment count disagrees with the data.
    ///
    /// `level` counts the collections descended below the bound one when the
    /// mismatch was found; `nesting` is how deep the data was seen to go.
    #[error(
        "each {target}: path has {segments} segment(s) but element {index} at level {level} nests {nesting} level(s) deep"
    )]
    PathMismatch {
        target: String,
        segments: usize,
        level: usize,
        index: usize,
        nesting: usize,
    },

    /// Template recursion beyond the environment's limit.
    #[error("{directive} {target}: templates nested deeper than {limit} levels")]
    TooDeep {
        directive: &'static str,
        target: String,
        limit: usize,
    },
}

impl Diagnostic {
    /// The text substituted for the offending placeholder.
    pub fn render(&self) -> String {
        tracing::warn!(diagnostic = %self, "placeholder rendered as diagnostic");
        escape::html(&format!("[error] {}", self))
    }
}

/// Shared, read-only resolution environment.
#[derive(Clone)]
pub struct Environment {
    cache: Arc<TemplateCache>,
    namespaces: Option<SharedProvider>,
    max_nesting: usize,
}

impl Environment {
    pub fn new(cache: Arc<TemplateCache>) -> Self {
        Self {
            cache,
            namespaces: None,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    /// Routes unknown directives (`-user name`) to `namespaces`.
    ///
    /// Usually a [`NamespaceRegistry`](crate::NamespaceRegistry) or
    /// [`SharedNamespaceRegistry`](crate::SharedNamespaceRegistry).
    pub fn with_namespaces(mut self, namespaces: SharedProvider) -> Self {
        self.namespaces = Some(namespaces);
        self
    }

    /// Limits how deeply templates may render other templates.
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    pub fn max_nesting(&self) -> usize {
        self.max_nesting
    }

    /// Starts a render with its own state.
    pub fn resolver(&self, bindings: Bindings) -> Resolver<'_> {
        Resolver {
            env: self,
            bindings,
            preferred: None,
            depth: Vec::new(),
            nesting: 0,
        }
    }

    /// Renders `template` against `bindings`.
    pub fn render(&self, template: &Template, bindings: Bindings) -> String {
        self.resolver(bindings).render(template)
    }

    /// Renders the cached template `name`, or `None` if it is not cached.
    pub fn render_named(&self, name: &str, bindings: Bindings) -> Option<String> {
        let template = self.cache.lookup(name)?;
        Some(self.render(&template, bindings))
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("templates", &self.cache.len())
            .field("namespaces", &self.namespaces.is_some())
            .field("max_nesting", &self.max_nesting)
            .finish()
    }
}

/// The state of a single render.
pub struct Resolver<'env> {
    env: &'env Environment,
    bindings: Bindings,
    /// The element currently being rendered by an `each`.
    preferred: Option<SharedProvider>,
    /// Collections opened by the `each` expansions in progress, outermost first.
    depth: Vec<SharedProvider>,
    /// Templates currently being rendered inside the top-level one.
    nesting: usize,
}

impl<'env> Resolver<'env> {
    /// Resolves one placeholder expression.
    ///
    /// While an `each` renders an element, that element is asked first with
    /// the full expression; only an empty answer falls through to the
    /// directives and the outer bindings.
    pub fn map(&mut self, expression: &str) -> String {
        if let Some(preferred) = &self.preferred {
            let value = preferred.map(expression);
            if !value.is_empty() {
                return value;
            }
        }
        self.dispatch(expression)
    }

    /// Renders `template` with this resolver's state.
    pub fn render(&mut self, template: &Template) -> String {
        template.render(self)
    }

    /// Number of collections currently open.
    pub fn depth(&self) -> usize {
        self.depth.len()
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Adds or replaces a binding.
    pub fn bind(&mut self, name: impl Into<String>, provider: SharedProvider) {
        self.bindings.insert(name.into(), provider);
    }

    fn dispatch(&mut self, expression: &str) -> String {
        let expr = Expression::parse(expression);
        if expr.is_blank() {
            return String::new();
        }
        let name = expr.remainder;

        match expr.directive() {
            Directive::Require => self.require(name),
            Directive::Each => self.each(name),
            Directive::Include => match self.lookup(name) {
                Some(template) if !template.is_empty() => self.require(&template),
                _ => String::new(),
            },
            Directive::Js => self.lookup(name).map(|v| escape::js(&v)).unwrap_or_default(),
            Directive::Url => self.lookup(name).map(|v| escape::url(&v)).unwrap_or_default(),
            Directive::Raw | Directive::Html => self.lookup(name).unwrap_or_default(),
            Directive::Default => self.lookup(name).map(|v| escape::html(&v)).unwrap_or_default(),
            Directive::Other(prefix) => match self.namespaced(prefix, expression) {
                Some(value) => escape::html(&value),
                None => self.lookup(name).map(|v| escape::html(&v)).unwrap_or_default(),
            },
        }
    }

    /// The value of binding `name`, or `None` if it is unbound.
    fn lookup(&self, name: &str) -> Option<String> {
        match self.bindings.get(name) {
            Some(provider) => Some(provider.map(name)),
            None => {
                tracing::debug!(name, "unbound placeholder");
                None
            }
        }
    }

    fn namespaced(&self, prefix: &str, expression: &str) -> Option<String> {
        let namespaces = self.env.namespaces.as_ref()?;
        let value = namespaces.map(expression);
        if value.is_empty() {
            tracing::debug!(prefix, "namespace gave no value");
            None
        } else {
            Some(value)
        }
    }

    fn enter(&self, directive: &'static str, target: &str) -> Result<(), Diagnostic> {
        if self.nesting >= self.env.max_nesting {
            return Err(Diagnostic::TooDeep {
                directive,
                target: target.to_string(),
                limit: self.env.max_nesting,
            });
        }
        Ok(())
    }

    /// Renders `template` one nesting level down, appending to `output`.
    fn render_nested(&mut self, template: &Template, output: &mut String) {
        self.nesting += 1;
        template.render_into(output, self);
        self.nesting -= 1;
    }

    fn require(&mut self, name: &str) -> String {
        let Some(template) = self.env.cache.lookup(name) else {
            tracing::debug!(template = name, "required template is not cached");
            return String::new();
        };
        if let Err(diagnostic) = self.enter("require", name) {
            return diagnostic.render();
        }
        let mut output = String::new();
        self.render_nested(&template, &mut output);
        output
    }

    fn each(&mut self, remainder: &str) -> String {
        let (target, template_name) = match remainder.split_once(char::is_whitespace) {
            Some((target, template_name)) => (target, template_name.trim()),
            None => (remainder, ""),
        };
        let (binding, path) = match target.split_once('.') {
            Some((binding, path)) => (binding, path),
            None => (target, ""),
        };

        let Some(provider) = self.bindings.get(binding).cloned() else {
            tracing::debug!(binding, "each over unbound name");
            return String::new();
        };
        if provider.as_collection().is_none() {
            return Diagnostic::NotACollection {
                binding: binding.to_string(),
            }
            .render();
        }
        let Some(template) = self.env.cache.lookup(template_name) else {
            tracing::debug!(template = template_name, "each template is not cached");
            return String::new();
        };
        if let Err(diagnostic) = self.enter("each", target) {
            return diagnostic.render();
        }

        let base = self.depth.len();
        let preferred = self.preferred.clone();
        let mut output = String::new();
        let walk = Walk {
            target,
            segments: segment_count(path),
            base,
            template: &template,
        };
        self.depth.push(provider);
        let result = self.expand(&walk, path, &mut output);

        // An aborted walk leaves its collections open.
        self.depth.truncate(base);
        self.preferred = preferred;

        match result {
            Ok(()) => output,
            Err(diagnostic) => diagnostic.render(),
        }
    }

    /// Renders the template for every leaf below the innermost open
    /// collection, depth first.
    ///
    /// Each nested collection is pushed onto the depth stack and consumes
    /// the first segment of `path`. Elements with nothing at `path` are
    /// skipped.
    fn expand(&mut self, walk: &Walk<'_>, path: &str, output: &mut String) -> Result<(), Diagnostic> {
        let Some(collection) = self.depth.last().cloned() else {
            return Ok(());
        };
        let Some(items) = collection.as_collection() else {
            return Ok(());
        };
        let level = walk.level(self.depth.len());

        for index in 0..items.len() {
            let Some(element) = items.get(index, path) else {
                tracing::debug!(each = walk.target, index, level, "element has nothing at path");
                continue;
            };

            if element.as_collection().is_some() {
                if path.is_empty() {
                    return Err(walk.mismatch(level, index, level + 1));
                }
                let (_, rest) = first_segment(path);
                self.depth.push(element);
                self.expand(walk, rest, output)?;
                self.depth.pop();
            } else {
                if !path.is_empty() {
                    return Err(walk.mismatch(level, index, level));
                }
                let previous = self.preferred.replace(element);
                self.render_nested(walk.template, output);
                self.preferred = previous;
            }
        }
        Ok(())
    }
}

impl Resolve for Resolver<'_> {
    fn resolve(&mut self, expression: &str) -> String {
        self.map(expression)
    }
}

/// What stays fixed while one `each` expands.
struct Walk<'a> {
    target: &'a str,
    segments: usize,
    /// Depth stack length before the bound collection was pushed.
    base: usize,
    template: &'a Template,
}

impl Walk<'_> {
    /// Collections open below the bound one, given the stack length.
    fn level(&self, depth: usize) -> usize {
        depth - self.base - 1
    }

    fn mismatch(&self, level: usize, index: usize, nesting: usize) -> Diagnostic {
        Diagnostic::PathMismatch {
            target: self.target.to_string(),
            segments: self.segments,
            level,
            index,
            nesting,
        }
    }
}
