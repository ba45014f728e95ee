use crate::core::{Entry, FilterPolicy, IngestError, IngestResult, SelectionTree};
use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

/* =========================== Filesystem & paths ============================ */

/// Render a relative path with forward slashes, for display and digest text.
#[must_use]
pub fn path_to_unix(p: &Path) -> String {
    let mut s = String::new();
    for comp in p {
        if !s.is_empty() {
            s.push('/');
        }
        s.push_str(&comp.to_string_lossy());
    }
    s
}

/// Raw recursive size of a directory: every contained file counts, including
/// files and subtrees the selection tree filters out.
#[must_use]
pub fn dir_size_bytes(dir: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    let mut total: u64 = 0;
    for ent in entries.flatten() {
        let is_dir = ent.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
        if is_dir {
            total += dir_size_bytes(&ent.path());
        } else {
            total += ent.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    total
}

/* ================================ Scanner ================================== */

#[derive(Default, Debug)]
pub struct ScanStats {
    /// Ignore-list directory names actually encountered during the walk.
    pub ignored_dirs: HashSet<String>,
    /// File names dropped by the name and extension filters.
    pub ignored_files: HashSet<String>,
    /// Entries dropped for exceeding the size ceiling.
    pub oversized: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct ScanResult {
    pub tree: SelectionTree,
    pub stats: ScanStats,
}

/// Walk `root` and build the filtered selection tree.
///
/// The root itself must exist, be a directory, and be readable; anything else
/// fails with `FilesystemAccess`. Unreadable directories further down are
/// skipped with a warning instead of failing the scan.
pub fn scan_root(root: &Path, policy: &FilterPolicy) -> IngestResult<ScanResult> {
    let canon = dunce::canonicalize(root).map_err(|e| IngestError::FilesystemAccess {
        path: root.to_path_buf(),
        source: e,
    })?;
    if !canon.is_dir() {
        return Err(IngestError::FilesystemAccess {
            path: canon,
            source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        });
    }
    // The root must be readable up front; the recursive walk treats read
    // failures as skips.
    fs::read_dir(&canon).map_err(|e| IngestError::FilesystemAccess {
        path: canon.clone(),
        source: e,
    })?;

    let mut stats = ScanStats::default();
    let (size_bytes, children) = scan_dir_contents(&canon, policy, &mut stats);

    let name = canon
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let root_entry = Entry {
        name,
        path: canon,
        size_bytes,
        is_dir: true,
        children,
    };

    let tree = SelectionTree::new(root_entry);
    log::debug!(
        "scan of {} produced {} entries ({} ignored dirs, {} ignored files, {} oversized)",
        tree.root().path.display(),
        tree.len(),
        stats.ignored_dirs.len(),
        stats.ignored_files.len(),
        stats.oversized.len()
    );
    Ok(ScanResult { tree, stats })
}

/// Returns the raw byte total of `dir` plus the kept child entries,
/// subdirectories first, each block sorted by name.
fn scan_dir_contents(
    dir: &Path,
    policy: &FilterPolicy,
    stats: &mut ScanStats,
) -> (u64, Vec<Entry>) {
    let Ok(entries) = fs::read_dir(dir) else {
        log::warn!("skipping unreadable directory {}", dir.display());
        return (0, Vec::new());
    };

    let mut dirs: Vec<Entry> = Vec::new();
    let mut files: Vec<Entry> = Vec::new();
    let mut raw: u64 = 0;

    for ent in entries.flatten() {
        let path = ent.path();
        let base: String = ent.file_name().to_string_lossy().into_owned();

        let is_dir = ent.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
        if is_dir {
            if policy.ignores_dir(&base) {
                stats.ignored_dirs.insert(base);
                raw += dir_size_bytes(&path);
                continue;
            }

            let (sub_bytes, sub_children) = scan_dir_contents(&path, policy, stats);
            raw += sub_bytes;
            if policy.exceeds_size(sub_bytes) {
                stats.oversized.push(path);
                continue;
            }
            dirs.push(Entry {
                name: base,
                path,
                size_bytes: sub_bytes,
                is_dir: true,
                children: sub_children,
            });
            continue;
        }

        let len = ent.metadata().map(|m| m.len()).unwrap_or(0);
        raw += len;
        if policy.ignores_file(&path) {
            stats.ignored_files.insert(base);
            continue;
        }
        if policy.exceeds_size(len) {
            stats.oversized.push(path);
            continue;
        }
        files.push(Entry {
            name: base,
            path,
            size_bytes: len,
            is_dir: false,
            children: Vec::new(),
        });
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));

    let mut children = dirs;
    children.append(&mut files);
    (raw, children)
}
