//! Pre-order traversal of the namespace and the views built on it.

use std::fmt;

use crate::index::Iter;
use crate::namespace::{Entry, EntryKind, Namespace, NsPath};

/// An entry reached by a traversal, with the path of its parent folder.
#[derive(Debug, Clone)]
pub struct Visit<'a> {
    pub parent: NsPath,
    pub entry: &'a Entry,
}

impl Visit<'_> {
    /// Full path of the visited entry.
    #[must_use]
    pub fn path(&self) -> NsPath {
        self.parent.join(self.entry.name())
    }
}

/// Pre-order iterator over every entry below the root folder.
///
/// A folder is yielded before its children; siblings come in name order.
pub struct Walk<'a> {
    stack: Vec<(Iter<'a, String, Entry>, NsPath)>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(root: Option<&'a Entry>) -> Self {
        let stack = root
            .and_then(Entry::children)
            .map(|children| vec![(children.iter(), NsPath::root())])
            .unwrap_or_default();
        Self { stack }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (siblings, parent) = self.stack.last_mut()?;
            let Some((_, entry)) = siblings.next() else {
                self.stack.pop();
                continue;
            };

            let parent = parent.clone();
            if let Some(children) = entry.children() {
                self.stack.push((children.iter(), parent.join(entry.name())));
            }
            return Some(Visit { parent, entry });
        }
    }
}

/// One flattened entry: enough to recreate it with a create call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub kind: EntryKind,
    pub name: String,
    pub parent: NsPath,
}

impl From<Visit<'_>> for Record {
    fn from(visit: Visit<'_>) -> Self {
        Self {
            kind: visit.entry.kind(),
            name: visit.entry.name().to_string(),
            parent: visit.parent,
        }
    }
}

/// Outcome of replaying records into a namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Records recreated.
    pub restored: usize,
    /// Records whose create call failed.
    pub rejected: usize,
}

/// Indented text rendering of a namespace.
pub struct TreeView<'a> {
    pub(crate) namespace: &'a Namespace,
}

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "root/")?;
        let mut empty = true;
        for visit in self.namespace.walk() {
            empty = false;
            let indent = "    ".repeat(visit.parent.len() + 1);
            writeln!(f, "{indent}{} ({})", visit.entry.name(), visit.entry.kind())?;
        }
        if empty {
            writeln!(f, "  (Root folder is empty)")?;
        }
        Ok(())
    }
}
