//! Namespace entries: files and folders.

use std::fmt;

use crate::index::{Index, MinDegree};

/// Entry kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    /// Name used in messages and in the state file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
        }
    }

    /// Parse the state-file spelling of a kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "file" => Some(Self::File),
            "folder" => Some(Self::Folder),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an entry holds.
///
/// A folder exclusively owns the index of its direct children; a file owns
/// nothing.
#[derive(Debug)]
pub enum Contents {
    File,
    Folder(Index<String, Entry>),
}

/// A file or folder record.
#[derive(Debug)]
pub struct Entry {
    name: String,
    contents: Contents,
}

impl Entry {
    #[must_use]
    pub fn file(name: &str) -> Self {
        Self {
            name: name.to_string(),
            contents: Contents::File,
        }
    }

    /// Create a folder with an empty child index.
    #[must_use]
    pub fn folder(name: &str, degree: MinDegree) -> Self {
        Self {
            name: name.to_string(),
            contents: Contents::Folder(Index::new(degree)),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.name);
    }

    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        match self.contents {
            Contents::File => EntryKind::File,
            Contents::Folder(_) => EntryKind::Folder,
        }
    }

    /// The child index, if this entry is a folder.
    #[must_use]
    pub const fn children(&self) -> Option<&Index<String, Self>> {
        match &self.contents {
            Contents::Folder(index) => Some(index),
            Contents::File => None,
        }
    }

    pub const fn children_mut(&mut self) -> Option<&mut Index<String, Self>> {
        match &mut self.contents {
            Contents::Folder(index) => Some(index),
            Contents::File => None,
        }
    }
}

/// Tear down a folder's subtree, children before their parents.
///
/// Returns the number of entries removed.
pub(crate) fn teardown(index: &mut Index<String, Entry>) -> usize {
    let names: Vec<String> = index.keys().cloned().collect();
    let mut removed = 0;
    for name in names {
        if let Some(children) = index.get_mut(name.as_str()).and_then(Entry::children_mut) {
            removed += teardown(children);
        }
        if index.remove(name.as_str()).is_ok() {
            removed += 1;
        }
    }
    removed
}
