//! Namespace errors.

use crate::index::IndexError;
use crate::namespace::{EntryKind, NsPath};

/// Errors returned by namespace operations.
///
/// Every error is reported before any index is mutated, so a failed operation
/// leaves the namespace unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// The named entry is absent from the folder, or has the wrong kind.
    NotFound {
        kind: Option<EntryKind>,
        name: String,
        path: NsPath,
    },
    /// A sibling with the same name already exists.
    AlreadyExists { name: String, path: NsPath },
    /// A path segment resolves to a file.
    NotAFolder { path: NsPath },
    /// A path segment is missing.
    PathNotFound { path: NsPath },
    /// The name is empty or contains a reserved character.
    InvalidName { name: String },
    /// A folder would be moved into its own subtree.
    MoveIntoSelf {
        name: String,
        source: NsPath,
        dest: NsPath,
    },
    /// The underlying index rejected the operation.
    Index(IndexError),
}

impl std::fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound {
                kind: Some(kind),
                name,
                path,
            } => write!(f, "{kind} '{name}' not found in {path}"),
            Self::NotFound {
                kind: None,
                name,
                path,
            } => write!(f, "'{name}' not found in {path}"),
            Self::AlreadyExists { name, path } => {
                write!(f, "'{name}' already exists in {path}")
            }
            Self::NotAFolder { path } => write!(f, "path '{path}' is not a folder"),
            Self::PathNotFound { path } => write!(f, "path '{path}' does not exist"),
            Self::InvalidName { name } => write!(f, "invalid name '{name}'"),
            Self::MoveIntoSelf { name, source, dest } => write!(
                f,
                "cannot move folder '{name}' from {source} into its own subtree {dest}"
            ),
            Self::Index(e) => write!(f, "index error: {e}"),
        }
    }
}

impl std::error::Error for NamespaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Index(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IndexError> for NamespaceError {
    fn from(e: IndexError) -> Self {
        Self::Index(e)
    }
}
