//! Hierarchical namespace built from one ordered index per folder.
//!
//! # Structure
//!
//! - The namespace owns a top-level index with a single entry, `root`.
//! - Every folder entry owns an [`Index`](crate::index::Index) of its direct
//!   children, keyed by name. Files own nothing.
//! - Ownership is strictly hierarchical: moving or renaming an entry moves the
//!   entry value between indexes and never touches its subtree.
//!
//! # Usage
//!
//! ```
//! use btfs::index::MinDegree;
//! use btfs::namespace::{EntryKind, Namespace, NsPath};
//!
//! let mut ns = Namespace::new(MinDegree::DEFAULT);
//! ns.create_folder("docs", &NsPath::root())?;
//! ns.create_file("readme", &NsPath::parse("docs"))?;
//!
//! let readme = ns.resolve(&NsPath::parse("docs/readme"))?;
//! assert_eq!(readme.kind(), EntryKind::File);
//!
//! let hits: Vec<String> = ns.search("readme", EntryKind::File).map(|hit| hit.path().to_string()).collect();
//! assert_eq!(hits, ["root/docs/readme"]);
//! # Ok::<(), btfs::namespace::NamespaceError>(())
//! ```

mod entry;
mod error;
mod fs;
mod path;
mod walk;

pub use entry::{Entry, EntryKind};
pub use error::NamespaceError;
pub use fs::Namespace;
pub use path::NsPath;
pub use walk::{Record, RestoreSummary, TreeView, Visit, Walk};

/// Name of the root folder in the top-level index.
pub const ROOT_NAME: &str = "root";
