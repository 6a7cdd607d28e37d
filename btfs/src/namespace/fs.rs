//! The hierarchical namespace: one index per folder, composed into a tree.
//!
//! Every operation first resolves a path to a folder by one index lookup per
//! segment, validates the request against that folder, and only then mutates
//! the folder's index. Each mutating call emits exactly one `tracing` event:
//! `info` on success, `warn` on failure.

use crate::index::{Index, MinDegree};
use crate::namespace::entry::teardown;
use crate::namespace::walk::{Record, RestoreSummary, TreeView, Visit, Walk};
use crate::namespace::{Entry, EntryKind, NamespaceError, NsPath, ROOT_NAME};

/// Characters that would break path splitting or the state file.
const RESERVED_CHARS: [char; 4] = ['/', ',', '\n', '\r'];

/// A path-addressable file/folder tree.
///
/// Owns a top-level index holding exactly one entry, the root folder.
#[derive(Debug)]
pub struct Namespace {
    top: Index<String, Entry>,
    degree: MinDegree,
}

impl Namespace {
    /// Create a namespace with an empty root folder.
    #[must_use]
    pub fn new(degree: MinDegree) -> Self {
        let mut top = Index::new(degree);
        let inserted = top.insert(ROOT_NAME.to_string(), Entry::folder(ROOT_NAME, degree));
        debug_assert!(inserted.is_ok(), "an empty index accepts any key");
        Self { top, degree }
    }

    /// Build a namespace by replaying flattened records.
    pub fn from_records<I>(degree: MinDegree, records: I) -> (Self, RestoreSummary)
    where
        I: IntoIterator<Item = Record>,
    {
        let mut namespace = Self::new(degree);
        let summary = namespace.restore(records);
        (namespace, summary)
    }

    /// Minimum degree used for every folder index.
    #[must_use]
    pub const fn min_degree(&self) -> MinDegree {
        self.degree
    }

    /// Resolve a path to an entry.
    ///
    /// The empty path resolves to the root folder. Every segment but the last
    /// must name a folder.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceError::NotFound` if any segment is missing or passes
    /// through a file.
    pub fn resolve(&self, path: &NsPath) -> Result<&Entry, NamespaceError> {
        let Some((parent, name)) = path.split_last() else {
            return self.top.get(ROOT_NAME).ok_or_else(|| NamespaceError::NotFound {
                kind: Some(EntryKind::Folder),
                name: ROOT_NAME.to_string(),
                path: NsPath::root(),
            });
        };

        match self.folder(&parent).ok().and_then(|folder| folder.get(name)) {
            Some(entry) => Ok(entry),
            None => Err(NamespaceError::NotFound {
                kind: None,
                name: name.to_string(),
                path: parent,
            }),
        }
    }

    /// Create an empty folder.
    pub fn create_folder(&mut self, name: &str, parent: &NsPath) -> Result<(), NamespaceError> {
        self.create(name, EntryKind::Folder, parent)
    }

    /// Create a file.
    pub fn create_file(&mut self, name: &str, parent: &NsPath) -> Result<(), NamespaceError> {
        self.create(name, EntryKind::File, parent)
    }

    fn create(&mut self, name: &str, kind: EntryKind, parent: &NsPath) -> Result<(), NamespaceError> {
        let result = self.insert_new(name, kind, parent);
        match &result {
            Ok(()) => tracing::info!("{kind} '{name}' created in {parent}"),
            Err(e) => tracing::warn!("failed to create {kind} '{name}': {e}"),
        }
        result
    }

    /// Delete a file.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceError::NotFound` if `name` is absent or is a folder.
    pub fn delete_file(&mut self, name: &str, parent: &NsPath) -> Result<(), NamespaceError> {
        let result = self.remove_file(name, parent);
        match &result {
            Ok(()) => tracing::info!("file '{name}' deleted from {parent}"),
            Err(e) => tracing::warn!("failed to delete file '{name}': {e}"),
        }
        result
    }

    /// Delete a folder and everything below it.
    ///
    /// Descendants are removed first, deepest first, so no child index ever
    /// outlives the entry that owns it. Returns the number of descendants
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceError::NotFound` if `name` is absent or is a file.
    pub fn delete_folder(&mut self, name: &str, parent: &NsPath) -> Result<usize, NamespaceError> {
        let result = self.remove_folder(name, parent);
        match &result {
            Ok(descendants) => {
                tracing::info!("folder '{name}' deleted from {parent} ({descendants} descendants)");
            }
            Err(e) => tracing::warn!("failed to delete folder '{name}': {e}"),
        }
        result
    }

    /// Rename an entry within its folder.
    ///
    /// The entry keeps its identity and, for folders, its whole subtree.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceError::AlreadyExists` if `new_name` is taken, or
    /// `NamespaceError::NotFound` if `old_name` is absent.
    pub fn rename(&mut self, old_name: &str, new_name: &str, parent: &NsPath) -> Result<(), NamespaceError> {
        let result = self.rename_entry(old_name, new_name, parent);
        match &result {
            Ok(()) => tracing::info!("renamed '{old_name}' to '{new_name}' in {parent}"),
            Err(e) => tracing::warn!("failed to rename '{old_name}' to '{new_name}': {e}"),
        }
        result
    }

    /// Move an entry of any kind to another folder.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceError::NotFound` if the entry is absent at `source`,
    /// `NamespaceError::AlreadyExists` if `dest` has an entry of that name, or
    /// `NamespaceError::MoveIntoSelf` if `dest` lies inside the moved folder.
    pub fn move_entry(&mut self, name: &str, source: &NsPath, dest: &NsPath) -> Result<(), NamespaceError> {
        self.report_move(name, None, source, dest)
    }

    /// Move a file to another folder.
    pub fn move_file(&mut self, name: &str, source: &NsPath, dest: &NsPath) -> Result<(), NamespaceError> {
        self.report_move(name, Some(EntryKind::File), source, dest)
    }

    /// Move a folder, with its subtree, to another folder.
    pub fn move_folder(&mut self, name: &str, source: &NsPath, dest: &NsPath) -> Result<(), NamespaceError> {
        self.report_move(name, Some(EntryKind::Folder), source, dest)
    }

    fn report_move(
        &mut self,
        name: &str,
        kind: Option<EntryKind>,
        source: &NsPath,
        dest: &NsPath,
    ) -> Result<(), NamespaceError> {
        let result = self.relocate(name, kind, source, dest);
        match &result {
            Ok(moved) => tracing::info!("moved {moved} '{name}' from {source} to {dest}"),
            Err(e) => tracing::warn!("failed to move '{name}': {e}"),
        }
        result.map(|_| ())
    }

    /// Pre-order traversal of every entry below the root.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self.top.get(ROOT_NAME))
    }

    /// Every entry with the given name and kind, with its full path.
    ///
    /// Lazy: each call starts a fresh traversal and nothing is mutated.
    pub fn search<'a>(&'a self, name: &'a str, kind: EntryKind) -> impl Iterator<Item = Visit<'a>> + 'a {
        self.walk()
            .filter(move |visit| visit.entry.kind() == kind && visit.entry.name() == name)
    }

    /// One record per entry, parents before their children.
    #[must_use]
    pub fn flatten(&self) -> Vec<Record> {
        self.walk().map(Record::from).collect()
    }

    /// Replay flattened records as create calls.
    ///
    /// Successful creates are logged at `debug` rather than `info`. A failed
    /// create (a name collision, or a parent that was never created) is logged
    /// and counted, and replay carries on with the next record.
    pub fn restore<I>(&mut self, records: I) -> RestoreSummary
    where
        I: IntoIterator<Item = Record>,
    {
        let mut summary = RestoreSummary::default();
        for record in records {
            match self.insert_new(&record.name, record.kind, &record.parent) {
                Ok(()) => {
                    summary.restored += 1;
                    tracing::debug!("restored {} '{}' in {}", record.kind, record.name, record.parent);
                }
                Err(e) => {
                    summary.rejected += 1;
                    tracing::warn!("failed to restore {} '{}': {e}", record.kind, record.name);
                }
            }
        }
        summary
    }

    /// Indented text view of the whole tree.
    #[must_use]
    pub const fn display(&self) -> TreeView<'_> {
        TreeView { namespace: self }
    }

    /// Number of entries below the root.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.walk().count()
    }

    fn root_folder(&self) -> Result<&Index<String, Entry>, NamespaceError> {
        self.top
            .get(ROOT_NAME)
            .and_then(Entry::children)
            .ok_or_else(|| NamespaceError::PathNotFound { path: NsPath::root() })
    }

    fn root_folder_mut(&mut self) -> Result<&mut Index<String, Entry>, NamespaceError> {
        self.top
            .get_mut(ROOT_NAME)
            .and_then(Entry::children_mut)
            .ok_or_else(|| NamespaceError::PathNotFound { path: NsPath::root() })
    }

    /// Walk to the index of the folder at `path`.
    fn folder(&self, path: &NsPath) -> Result<&Index<String, Entry>, NamespaceError> {
        let mut current = self.root_folder()?;
        for (depth, segment) in path.segments().iter().enumerate() {
            let entry = current
                .get(segment.as_str())
                .ok_or_else(|| NamespaceError::PathNotFound {
                    path: path.prefix(depth + 1),
                })?;
            current = entry.children().ok_or_else(|| NamespaceError::NotAFolder {
                path: path.prefix(depth + 1),
            })?;
        }
        Ok(current)
    }

    fn folder_mut(&mut self, path: &NsPath) -> Result<&mut Index<String, Entry>, NamespaceError> {
        let mut current = self.root_folder_mut()?;
        for (depth, segment) in path.segments().iter().enumerate() {
            let entry = current
                .get_mut(segment.as_str())
                .ok_or_else(|| NamespaceError::PathNotFound {
                    path: path.prefix(depth + 1),
                })?;
            current = entry.children_mut().ok_or_else(|| NamespaceError::NotAFolder {
                path: path.prefix(depth + 1),
            })?;
        }
        Ok(current)
    }

    fn insert_new(&mut self, name: &str, kind: EntryKind, parent: &NsPath) -> Result<(), NamespaceError> {
        validate_name(name)?;
        let degree = self.degree;
        let folder = self.folder_mut(parent)?;
        if folder.contains_key(name) {
            return Err(NamespaceError::AlreadyExists {
                name: name.to_string(),
                path: parent.clone(),
            });
        }

        let entry = match kind {
            EntryKind::File => Entry::file(name),
            EntryKind::Folder => Entry::folder(name, degree),
        };
        folder.insert(name.to_string(), entry)?;
        Ok(())
    }

    fn remove_file(&mut self, name: &str, parent: &NsPath) -> Result<(), NamespaceError> {
        let folder = self.folder_mut(parent)?;
        if folder.get(name).map(Entry::kind) != Some(EntryKind::File) {
            return Err(NamespaceError::NotFound {
                kind: Some(EntryKind::File),
                name: name.to_string(),
                path: parent.clone(),
            });
        }
        folder.remove(name)?;
        Ok(())
    }

    fn remove_folder(&mut self, name: &str, parent: &NsPath) -> Result<usize, NamespaceError> {
        let folder = self.folder_mut(parent)?;
        let Some(children) = folder.get_mut(name).and_then(Entry::children_mut) else {
            return Err(NamespaceError::NotFound {
                kind: Some(EntryKind::Folder),
                name: name.to_string(),
                path: parent.clone(),
            });
        };

        let descendants = teardown(children);
        folder.remove(name)?;
        Ok(descendants)
    }

    fn rename_entry(&mut self, old_name: &str, new_name: &str, parent: &NsPath) -> Result<(), NamespaceError> {
        validate_name(new_name)?;
        let folder = self.folder_mut(parent)?;
        if folder.contains_key(new_name) {
            return Err(NamespaceError::AlreadyExists {
                name: new_name.to_string(),
                path: parent.clone(),
            });
        }

        let Ok(mut entry) = folder.remove(old_name) else {
            return Err(NamespaceError::NotFound {
                kind: None,
                name: old_name.to_string(),
                path: parent.clone(),
            });
        };
        entry.set_name(new_name);
        folder.insert(new_name.to_string(), entry)?;
        Ok(())
    }

    /// Move an entry between folders, validating everything up front.
    fn relocate(
        &mut self,
        name: &str,
        kind: Option<EntryKind>,
        source: &NsPath,
        dest: &NsPath,
    ) -> Result<EntryKind, NamespaceError> {
        let source_folder = self.folder(source)?;
        let dest_folder = self.folder(dest)?;

        let moved = match source_folder.get(name) {
            Some(entry) if kind.is_none_or(|k| k == entry.kind()) => entry.kind(),
            _ => {
                return Err(NamespaceError::NotFound {
                    kind,
                    name: name.to_string(),
                    path: source.clone(),
                });
            }
        };

        if dest_folder.contains_key(name) {
            return Err(NamespaceError::AlreadyExists {
                name: name.to_string(),
                path: dest.clone(),
            });
        }

        if moved == EntryKind::Folder && dest.starts_with(&source.join(name)) {
            return Err(NamespaceError::MoveIntoSelf {
                name: name.to_string(),
                source: source.clone(),
                dest: dest.clone(),
            });
        }

        let entry = self.folder_mut(source)?.remove(name)?;
        self.folder_mut(dest)?.insert(name.to_string(), entry)?;
        Ok(moved)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(MinDegree::DEFAULT)
    }
}

fn validate_name(name: &str) -> Result<(), NamespaceError> {
    if name.is_empty() || name.contains(RESERVED_CHARS) {
        return Err(NamespaceError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
