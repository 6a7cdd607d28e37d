//! A file/folder namespace where every folder keeps its children in its own
//! B-tree.
//!
//! - [`index`]: the ordered index engine (a B-tree keyed by name)
//! - [`namespace`]: path resolution and file/folder operations over one index
//!   per folder
//! - [`state_file`]: the flat `kind,name,parentPath` persistence format
//! - [`config`]: environment configuration for the shell
//! - [`shell`]: the line-oriented command shell used by the binary

// Forbid unwrap() in library code so a bad state file or command cannot panic.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

pub mod config;
pub mod index;
pub mod namespace;
pub mod shell;
pub mod state_file;

#[cfg(test)]
mod simulation;
