//! Template source loading.
//!
//! [`TemplateLoader`] walks a root directory and collects every file with
//! the configured extension into a [`SourceMap`], keyed by its path relative
//! to the root (always with `/` separators, extension kept):
//!
//! ```text
//! templates/
//! ├── layout.html          -> "layout.html"
//! ├── partials/
//! │   └── user-row.html    -> "partials/user-row.html"
//! └── .git/                -> skipped with an ignore pattern of ^\.git$
//! ```
//!
//! Problems with the root itself are fatal. A file or subdirectory that
//! cannot be read is logged and left out, so a missing partial degrades to
//! an empty substitution at render time instead of refusing to start.
//! Symlinked files are read; symlinked directories are not walked.
//!
//! ```rust,ignore
//! let config = LoaderConfig::new("./templates", "html").ignore_dirs(r"^\.git$")?;
//! let sources = TemplateLoader::new(config).load()?;
//! let cache = TemplateCache::from_sources(&sources);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use regex::Regex;

use crate::error::LoadError;
use crate::provider::ValueProvider;

/// Concurrency-safe map from source name to raw bytes.
///
/// It is a [`ValueProvider`] too: mapping a name returns that source's text.
#[derive(Debug, Default)]
pub struct SourceMap {
    sources: RwLock<HashMap<String, Vec<u8>>>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DuplicateSource`] if `name` is taken; the first
    /// source stays in place.
    pub fn add(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Result<(), LoadError> {
        let name = name.into();
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        if sources.contains_key(&name) {
            return Err(LoadError::DuplicateSource(name));
        }
        sources.insert(name, bytes.into());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Copies all sources out from under the read lock.
    pub fn snapshot(&self) -> Vec<(String, Vec<u8>)> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, bytes)| (name.clone(), bytes.clone()))
            .collect()
    }
}

impl ValueProvider for SourceMap {
    fn map(&self, name: &str) -> String {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }
}

/// Where and what to load.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    root: PathBuf,
    extension: String,
    ignore_dirs: Option<Regex>,
}

impl LoaderConfig {
    /// Loads files ending in `extension` (with or without the leading dot)
    /// below `root`.
    pub fn new(root: impl Into<PathBuf>, extension: impl AsRef<str>) -> Self {
        let extension = extension.as_ref().trim_start_matches('.').to_string();
        Self {
            root: root.into(),
            extension,
            ignore_dirs: None,
        }
    }

    /// Skips directories whose name matches `pattern`, including everything below them.
    ///
    /// # Errors
    ///
    /// Returns the regex error if `pattern` does not compile.
    pub fn ignore_dirs(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.ignore_dirs = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Like [`ignore_dirs`](Self::ignore_dirs) with a compiled pattern.
    pub fn ignore_dirs_regex(mut self, pattern: Regex) -> Self {
        self.ignore_dirs = Some(pattern);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The extension without its leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn is_ignored(&self, dir_name: &str) -> bool {
        self.ignore_dirs
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(dir_name))
    }

    fn wants(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

/// Recursive directory loader.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    config: LoaderConfig,
}

impl TemplateLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Walks the root directory and returns every matching source.
    ///
    /// # Errors
    ///
    /// - [`LoadError::RootNotFound`] if the root does not exist
    /// - [`LoadError::RootNotDirectory`] if it is not a directory
    /// - [`LoadError::Io`] if it cannot be inspected or listed
    pub fn load(&self) -> Result<SourceMap, LoadError> {
        let root = self.config.root();
        let metadata = std::fs::metadata(root).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::RootNotFound(root.to_path_buf())
            } else {
                LoadError::Io {
                    path: root.to_path_buf(),
                    source,
                }
            }
        })?;

        if !metadata.is_dir() {
            return Err(LoadError::RootNotDirectory(root.to_path_buf()));
        }

        let entries = std::fs::read_dir(root).map_err(|source| LoadError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let sources = SourceMap::new();
        self.walk_entries(entries, &sources);
        tracing::debug!(root = %root.display(), count = sources.len(), "loaded template sources");
        Ok(sources)
    }

    fn walk_dir(&self, dir: &Path, sources: &SourceMap) {
        match std::fs::read_dir(dir) {
            Ok(entries) => self.walk_entries(entries, sources),
            Err(err) => {
                tracing::warn!(path = %dir.display(), error = %err, "skipping unreadable directory");
            }
        }
    }

    fn walk_entries(&self, entries: std::fs::ReadDir, sources: &SourceMap) {
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            // Does not follow symlinks.
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping entry of unknown type");
                    continue;
                }
            };

            if file_type.is_dir() {
                let name = entry.file_name();
                if self.config.is_ignored(&name.to_string_lossy()) {
                    tracing::debug!(path = %path.display(), "ignoring directory");
                    continue;
                }
                self.walk_dir(&path, sources);
            } else if file_type.is_symlink() {
                // Linked files are read, linked directories are never walked.
                if path.is_file() && self.config.wants(&path) {
                    self.read_file(&path, sources);
                } else if path.is_dir() {
                    tracing::debug!(path = %path.display(), "not following directory symlink");
                }
            } else if file_type.is_file() && self.config.wants(&path) {
                self.read_file(&path, sources);
            }
        }
    }

    fn read_file(&self, path: &Path, sources: &SourceMap) {
        let Some(name) = relative_name(path, self.config.root()) else {
            tracing::warn!(path = %path.display(), "skipping template source whose path is not UTF-8");
            return;
        };
        match std::fs::read(path) {
            Ok(bytes) => {
                if let Err(err) = sources.add(name, bytes) {
                    tracing::warn!(error = %err, "skipping duplicate template source");
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable template source");
            }
        }
    }
}

/// Path of `path` relative to `root`, with `/` separators.
///
/// `None` if `path` is not below `root` or any component is not UTF-8.
fn relative_name(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
