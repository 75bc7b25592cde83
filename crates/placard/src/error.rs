//! Error types.
//!
//! Only setup can fail: registering namespaces and loading template sources.
//! Rendering never returns an error; see [`crate::engine`] for how problems
//! inside a render are reported.

use std::path::PathBuf;

/// Errors from [`NamespaceRegistry::add`](crate::NamespaceRegistry::add).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The prefix is neither empty nor matches `^[a-z]+$`.
    #[error("prefix {0:?} does not match the regular expression ^[a-z]+$")]
    InvalidPrefix(String),

    /// A provider is already registered for the prefix.
    #[error("provider for prefix {0:?} already exists")]
    AlreadyExists(String),
}

/// Errors from loading template sources.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The root directory does not exist.
    #[error("root {} does not exist", .0.display())]
    RootNotFound(PathBuf),

    /// The root exists but is not a directory.
    #[error("root {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    /// The root directory could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source with the same name was already added.
    #[error("source for name {0:?} already exists")]
    DuplicateSource(String),
}
