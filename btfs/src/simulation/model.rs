//! Reference model of the namespace for simulation.
//!
//! Every entry is stored under its full path in a sorted map. `NsPath`
//! orders segment by segment, so map order is the namespace's pre-order walk
//! with siblings in name order.

use std::collections::BTreeMap;

use crate::namespace::{EntryKind, NsPath};

/// Flat path-to-kind map with the namespace's success rules.
#[derive(Debug, Default, Clone)]
pub struct Model {
    entries: BTreeMap<NsPath, EntryKind>,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn entries(&self) -> &BTreeMap<NsPath, EntryKind> {
        &self.entries
    }

    #[must_use]
    pub fn is_folder(&self, path: &NsPath) -> bool {
        path.is_root() || self.entries.get(path) == Some(&EntryKind::Folder)
    }

    /// Every folder path, the root first.
    #[must_use]
    pub fn folders(&self) -> Vec<NsPath> {
        std::iter::once(NsPath::root())
            .chain(
                self.entries
                    .iter()
                    .filter(|(_, kind)| **kind == EntryKind::Folder)
                    .map(|(path, _)| path.clone()),
            )
            .collect()
    }

    /// Direct children of the folder at `parent`.
    #[must_use]
    pub fn children(&self, parent: &NsPath) -> Vec<(String, EntryKind)> {
        self.entries
            .iter()
            .filter(|(path, _)| path.len() == parent.len() + 1 && path.starts_with(parent))
            .filter_map(|(path, kind)| path.segments().last().map(|name| (name.clone(), *kind)))
            .collect()
    }

    /// Returns `false` if the namespace must reject the create.
    pub fn create(&mut self, name: &str, kind: EntryKind, parent: &NsPath) -> bool {
        let path = parent.join(name);
        if !valid_name(name) || !self.is_folder(parent) || self.entries.contains_key(&path) {
            return false;
        }
        self.entries.insert(path, kind);
        true
    }

    pub fn delete_file(&mut self, name: &str, parent: &NsPath) -> bool {
        let path = parent.join(name);
        if self.entries.get(&path) != Some(&EntryKind::File) {
            return false;
        }
        self.entries.remove(&path);
        true
    }

    /// Returns the number of descendants removed, or `None` on rejection.
    pub fn delete_folder(&mut self, name: &str, parent: &NsPath) -> Option<usize> {
        let path = parent.join(name);
        if self.entries.get(&path) != Some(&EntryKind::Folder) {
            return None;
        }
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(&path));
        Some(before - self.entries.len() - 1)
    }

    pub fn rename(&mut self, old: &str, new: &str, parent: &NsPath) -> bool {
        let from = parent.join(old);
        let to = parent.join(new);
        if !valid_name(new)
            || !self.is_folder(parent)
            || self.entries.contains_key(&to)
            || !self.entries.contains_key(&from)
        {
            return false;
        }
        self.rebase(&from, &to);
        true
    }

    /// Move `name` from `source` to `dest`; `kind` restricts what may move.
    pub fn relocate(&mut self, name: &str, kind: Option<EntryKind>, source: &NsPath, dest: &NsPath) -> bool {
        let from = source.join(name);
        let to = dest.join(name);
        if !self.is_folder(source) || !self.is_folder(dest) {
            return false;
        }
        let Some(&moved) = self.entries.get(&from) else {
            return false;
        };
        if kind.is_some_and(|k| k != moved) || self.entries.contains_key(&to) {
            return false;
        }
        if moved == EntryKind::Folder && dest.starts_with(&from) {
            return false;
        }
        self.rebase(&from, &to);
        true
    }

    /// Re-key `from` and everything below it under `to`.
    fn rebase(&mut self, from: &NsPath, to: &NsPath) {
        let moved: Vec<NsPath> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(from))
            .cloned()
            .collect();

        for key in moved {
            if let Some(kind) = self.entries.remove(&key) {
                let rest = &key.segments()[from.len()..];
                let target = NsPath::from_segments(to.segments().iter().chain(rest));
                self.entries.insert(target, kind);
            }
        }
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', ',', '\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> NsPath {
        NsPath::parse(s)
    }

    #[test]
    fn test_model_rules() {
        let mut model = Model::new();
        assert!(model.create("docs", EntryKind::Folder, &NsPath::root()));
        assert!(model.create("old", EntryKind::File, &path("docs")));
        assert!(!model.create("old", EntryKind::Folder, &path("docs")));
        assert!(!model.create("x", EntryKind::File, &path("docs/old")));

        assert!(model.rename("docs", "attic", &NsPath::root()));
        assert!(model.entries().contains_key(&path("attic/old")));

        assert!(!model.relocate("attic", None, &NsPath::root(), &path("attic")));
        assert!(model.create("sub", EntryKind::Folder, &NsPath::root()));
        assert!(model.relocate("attic", Some(EntryKind::Folder), &NsPath::root(), &path("sub")));
        assert!(model.entries().contains_key(&path("sub/attic/old")));

        assert_eq!(model.delete_folder("sub", &NsPath::root()), Some(2));
        assert!(model.entries().is_empty());
    }

    #[test]
    fn test_model_order_is_preorder() {
        let mut model = Model::new();
        model.create("b", EntryKind::Folder, &NsPath::root());
        model.create("a", EntryKind::File, &NsPath::root());
        model.create("z", EntryKind::File, &path("b"));
        model.create("c", EntryKind::File, &NsPath::root());

        let order: Vec<String> = model.entries().keys().map(NsPath::state_string).collect();
        assert_eq!(order, ["a", "b", "b/z", "c"]);
    }
}
