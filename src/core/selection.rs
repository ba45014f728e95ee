use crate::core::{Entry, IngestError, IngestResult};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

/* ============================= Selection tree ============================== */

/// The filtered hierarchy plus a flat, walk-ordered registry of every entry
/// in it (the root itself is not registered; it anchors the tree but is not
/// selectable).
#[derive(Debug)]
pub struct SelectionTree {
    root: Entry,
    registry: Vec<PathBuf>,
    index: HashSet<PathBuf>,
}

/// One flattened display row, in registry order.
#[derive(Debug, Clone)]
pub struct EntryRow {
    pub path: PathBuf,
    pub name: String,
    pub depth: usize,
    pub is_dir: bool,
    pub size_kb: f64,
}

impl SelectionTree {
    #[must_use]
    pub fn new(root: Entry) -> Self {
        let mut registry = Vec::new();
        collect_paths(&root, &mut registry);
        let index = registry.iter().cloned().collect();
        Self {
            root,
            registry,
            index,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Entry {
        &self.root
    }

    /// Every registered entry path, depth-first, directories before files.
    #[must_use]
    pub fn registry(&self) -> &[PathBuf] {
        &self.registry
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains(path)
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Flatten the tree into display rows; row order matches `registry()`.
    #[must_use]
    pub fn rows(&self) -> Vec<EntryRow> {
        let mut rows = Vec::with_capacity(self.registry.len());
        for child in &self.root.children {
            collect_rows(child, 0, &mut rows);
        }
        rows
    }
}

fn collect_paths(entry: &Entry, out: &mut Vec<PathBuf>) {
    for child in &entry.children {
        out.push(child.path.clone());
        collect_paths(child, out);
    }
}

fn collect_rows(entry: &Entry, depth: usize, rows: &mut Vec<EntryRow>) {
    rows.push(EntryRow {
        path: entry.path.clone(),
        name: entry.name.clone(),
        depth,
        is_dir: entry.is_dir,
        size_kb: entry.size_kb(),
    });
    for child in &entry.children {
        collect_rows(child, depth + 1, rows);
    }
}

/* ============================= Selection state ============================= */

/// The SelectionSet: absolute paths currently marked selected, preserving the
/// order in which they were selected (staging copies in that order).
#[derive(Debug, Default)]
pub struct SelectionState {
    ordered: Vec<PathBuf>,
    member: HashSet<PathBuf>,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_selected(&self, path: &Path) -> bool {
        self.member.contains(path)
    }

    /// Selected paths in selection order.
    #[must_use]
    pub fn selected_paths(&self) -> &[PathBuf] {
        &self.ordered
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn clear(&mut self) {
        self.ordered.clear();
        self.member.clear();
    }

    /// Flip one entry's flag. No cascade: a directory's state is independent
    /// of its children's. Returns the new state.
    pub fn toggle(&mut self, tree: &SelectionTree, path: &Path) -> IngestResult<bool> {
        if !tree.contains(path) {
            return Err(IngestError::UnknownEntry {
                path: path.to_path_buf(),
            });
        }
        if self.member.remove(path) {
            self.ordered.retain(|p| p.as_path() != path);
            Ok(false)
        } else {
            self.member.insert(path.to_path_buf());
            self.ordered.push(path.to_path_buf());
            Ok(true)
        }
    }

    /// Set one entry's flag; idempotent in both directions.
    pub fn set_selected(&mut self, tree: &SelectionTree, path: &Path, on: bool) -> IngestResult<()> {
        if !tree.contains(path) {
            return Err(IngestError::UnknownEntry {
                path: path.to_path_buf(),
            });
        }
        if on {
            if self.member.insert(path.to_path_buf()) {
                self.ordered.push(path.to_path_buf());
            }
        } else if self.member.remove(path) {
            self.ordered.retain(|p| p.as_path() != path);
        }
        Ok(())
    }

    /// Set every registered entry's flag at once; the set becomes either the
    /// full registry (in registry order) or empty.
    pub fn select_all(&mut self, tree: &SelectionTree, on: bool) {
        self.clear();
        if on {
            self.ordered = tree.registry().to_vec();
            self.member = self.ordered.iter().cloned().collect();
        }
    }
}
