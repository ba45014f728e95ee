use std::collections::HashSet;
use std::path::Path;

/* ============================= Filter policy =============================== */

pub const DEFAULT_MAX_ENTRY_KB: u64 = 1024;

const DEFAULT_IGNORED_DIRS: &[&str] = &[
    "venv",
    ".venv",
    "env",
    ".env",
    "node_modules",
    "__pycache__",
    ".git",
    "build",
    "dist",
    "images",
    "icons",
];

const DEFAULT_IGNORED_EXTS: &[&str] = &[".pyc", ".log", ".lock", ".ds_store"];

// macOS Finder metadata; in practice the file occurs as this exact dotfile
// name, which no suffix rule reaches.
const DEFAULT_IGNORED_FILENAMES: &[&str] = &[".DS_Store"];

/// Filtering rules applied while the selection tree is built.
///
/// Entries in all three sets are held lowercased; matching is
/// case-insensitive. The default policy carries the stock ignore lists and
/// the stock 1024 KB size ceiling; callers wanting different rules construct
/// their own.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    /// Directory names excluded wherever they appear in the walk.
    pub ignored_dirs: HashSet<String>,
    /// Extension-style patterns excluded for files (".log", ".tar.gz"),
    /// matched against the dotted suffixes of the name.
    pub ignored_exts: HashSet<String>,
    /// Whole file names excluded outright (".DS_Store").
    pub ignored_filenames: HashSet<String>,
    /// Entries whose computed size exceeds this many kilobytes are dropped.
    pub max_entry_kb: u64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        let mut policy =
            Self::new(DEFAULT_IGNORED_DIRS, DEFAULT_IGNORED_EXTS, DEFAULT_MAX_ENTRY_KB);
        policy.ignored_filenames = DEFAULT_IGNORED_FILENAMES
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        policy
    }
}

impl FilterPolicy {
    #[must_use]
    pub fn new(ignored_dirs: &[&str], ignored_exts: &[&str], max_entry_kb: u64) -> Self {
        Self {
            ignored_dirs: ignored_dirs.iter().map(|s| s.to_lowercase()).collect(),
            ignored_exts: ignored_exts.iter().map(|s| s.to_lowercase()).collect(),
            ignored_filenames: HashSet::new(),
            max_entry_kb,
        }
    }

    #[must_use]
    pub fn ignores_dir(&self, name: &str) -> bool {
        self.ignored_dirs.contains(&name.to_lowercase())
    }

    #[must_use]
    pub fn ignores_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let name_lower = name.to_lowercase();
        self.ignored_filenames.contains(&name_lower)
            || name_matches_extension_filters(&name_lower, &self.ignored_exts)
    }

    #[must_use]
    pub fn exceeds_size(&self, size_bytes: u64) -> bool {
        size_bytes > self.max_entry_kb.saturating_mul(1024)
    }
}

/// Check if a lowercased file name matches any pattern in the filter set.
/// Every dotted suffix is tried, so ".tar.gz" catches "bundle.tar.gz" and
/// ".gz" catches it too. A dot in the first position marks a hidden file,
/// not a suffix: ".lock" the dotfile and a bare name like "log" never match
/// an extension pattern.
fn name_matches_extension_filters(name_lower: &str, filters: &HashSet<String>) -> bool {
    let mut dot_pos = 0;
    while let Some(pos) = name_lower[dot_pos..].find('.') {
        let actual_pos = dot_pos + pos;
        if actual_pos > 0 && filters.contains(&name_lower[actual_pos..]) {
            return true;
        }
        dot_pos = actual_pos + 1;
    }
    false
}
