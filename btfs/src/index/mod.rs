//! Ordered index engine.
//!
//! This module provides an in-memory B-tree mapping unique ordered keys to
//! values. It knows nothing about files or folders; the namespace layer owns
//! one index per folder.
//!
//! # Structure
//!
//! The B-tree consists of:
//! - Internal nodes: store entries and child handles
//! - Leaf nodes: store entries only, all at the same depth
//!
//! With minimum degree `t`, every node except the root holds between `t-1`
//! and `2t-1` entries.
//!
//! # Usage
//!
//! ```
//! use btfs::index::{Index, MinDegree};
//!
//! let mut index = Index::new(MinDegree::new(2)?);
//! for name in ["A", "B", "C", "D", "E"] {
//!     index.insert(name.to_string(), name.len())?;
//! }
//!
//! assert_eq!(index.keys().map(String::as_str).collect::<Vec<_>>(), ["A", "B", "C", "D", "E"]);
//! assert!(index.height() >= 2);
//!
//! index.remove("C")?;
//! assert!(index.get("C").is_none());
//! # Ok::<(), btfs::index::IndexError>(())
//! ```

mod node;
mod tree;

pub use node::NodeId;
pub use tree::{Index, IndexError, InvariantViolation, Iter, MinDegree};
