use crate::core::{
    CopyProgress, FilterPolicy, IngestError, IngestResult, Ingestor, RunManifest, ScanStats,
    SelectionState, SelectionTree, WorkArea, save_manifest, scan_root, stage_selection,
};
use chrono::Local;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

/* ================================= Types =================================== */

/// Paths of one processing pass, all derived from the source root.
#[derive(Debug, Clone)]
pub struct IngestionRun {
    pub source_root: PathBuf,
    pub staging_dir: PathBuf,
    pub output_dir: PathBuf,
    pub digest_file: PathBuf,
}

/// Staging removal failed after the digest was already produced. Non-fatal:
/// the run still counts as successful.
#[derive(Debug, Clone)]
pub struct CleanupWarning {
    pub staging_dir: PathBuf,
    pub message: String,
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "staging directory '{}' could not be removed: {}",
            self.staging_dir.display(),
            self.message
        )
    }
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub run: IngestionRun,
    /// Digest content as read back from the written file.
    pub digest_text: String,
    pub staged_items: usize,
    pub manifest_file: PathBuf,
    pub cleanup: Option<CleanupWarning>,
}

/* ================================ Workflow ================================= */

/// Single-threaded driver for the whole flow: choose a root, adjust the
/// selection, process. Everything runs synchronously on the caller's thread;
/// progress is reported through the callback handed to [`Workflow::process`].
pub struct Workflow {
    area: WorkArea,
    policy: FilterPolicy,
    root: Option<PathBuf>,
    tree: Option<SelectionTree>,
    stats: Option<ScanStats>,
    selection: SelectionState,
}

impl Workflow {
    #[must_use]
    pub fn new(area: WorkArea, policy: FilterPolicy) -> Self {
        Self {
            area,
            policy,
            root: None,
            tree: None,
            stats: None,
            selection: SelectionState::new(),
        }
    }

    #[must_use]
    pub fn work_area(&self) -> &WorkArea {
        &self.area
    }

    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    #[must_use]
    pub fn tree(&self) -> Option<&SelectionTree> {
        self.tree.as_ref()
    }

    #[must_use]
    pub fn scan_stats(&self) -> Option<&ScanStats> {
        self.stats.as_ref()
    }

    /// Selected paths in selection order.
    #[must_use]
    pub fn selection(&self) -> &[PathBuf] {
        self.selection.selected_paths()
    }

    #[must_use]
    pub fn is_selected(&self, path: &Path) -> bool {
        self.selection.is_selected(path)
    }

    /// Scan a new root. The previous tree and selection are dropped first,
    /// so a failed scan leaves the workflow at the empty baseline.
    pub fn choose_root(&mut self, path: &Path) -> IngestResult<()> {
        self.reset();
        let scanned = scan_root(path, &self.policy)?;
        self.root = Some(scanned.tree.root().path.clone());
        self.tree = Some(scanned.tree);
        self.stats = Some(scanned.stats);
        Ok(())
    }

    pub fn toggle(&mut self, path: &Path) -> IngestResult<bool> {
        let tree = self.tree.as_ref().ok_or_else(|| IngestError::UnknownEntry {
            path: path.to_path_buf(),
        })?;
        self.selection.toggle(tree, path)
    }

    pub fn set_selected(&mut self, path: &Path, on: bool) -> IngestResult<()> {
        let tree = self.tree.as_ref().ok_or_else(|| IngestError::UnknownEntry {
            path: path.to_path_buf(),
        })?;
        self.selection.set_selected(tree, path, on)
    }

    pub fn select_all(&mut self, on: bool) {
        if let Some(tree) = &self.tree {
            self.selection.select_all(tree, on);
        }
    }

    /// Drop the tree, selection, and chosen root.
    pub fn reset(&mut self) {
        self.root = None;
        self.tree = None;
        self.stats = None;
        self.selection.clear();
    }

    /// Run one pass: stage the selection, ingest the staging directory,
    /// persist the digest and manifest, read the digest back, clean up.
    ///
    /// An empty selection fails with `NoSelection` before anything touches
    /// the filesystem. An ingestion failure aborts with the staging directory
    /// left in place and no digest written. After success or ingestion
    /// failure the workflow returns to the empty baseline; other errors leave
    /// the state untouched so the caller may retry.
    pub fn process(
        &mut self,
        ingestor: &dyn Ingestor,
        progress: &mut dyn FnMut(CopyProgress),
    ) -> IngestResult<RunOutcome> {
        if self.selection.is_empty() {
            return Err(IngestError::NoSelection);
        }
        let root = self.root.clone().ok_or(IngestError::NoSelection)?;

        let started_at = Local::now();
        let run = IngestionRun {
            source_root: root.clone(),
            staging_dir: self.area.staging_dir(&root),
            output_dir: self.area.output_dir(&root),
            digest_file: self.area.digest_file(&root),
        };
        log::info!(
            "processing {} selected items from {}",
            self.selection.len(),
            root.display()
        );

        let selection = self.selection.selected_paths().to_vec();
        let staged_items = stage_selection(&root, &run.staging_dir, &selection, progress)?;

        let digest = match ingestor.ingest(&run.staging_dir) {
            Ok(d) => d,
            Err(e) => {
                log::warn!(
                    "ingestion failed, staging left at {}: {e:#}",
                    run.staging_dir.display()
                );
                self.reset();
                return Err(IngestError::IngestionFailure {
                    staging_dir: run.staging_dir,
                    message: format!("{e:#}"),
                });
            }
        };

        fs::create_dir_all(&run.output_dir)?;
        fs::write(&run.digest_file, digest.combined())?;
        let digest_text = fs::read_to_string(&run.digest_file)?;

        let manifest = RunManifest {
            source_root: run.source_root.display().to_string(),
            staging_dir: run.staging_dir.display().to_string(),
            output_dir: run.output_dir.display().to_string(),
            digest_file: run.digest_file.display().to_string(),
            started_at: started_at.to_rfc3339(),
            finished_at: Local::now().to_rfc3339(),
            staged_items,
            digest_bytes: digest_text.len() as u64,
        };
        let manifest_file = save_manifest(&run.output_dir, &manifest)?;

        let cleanup = match fs::remove_dir_all(&run.staging_dir) {
            Ok(()) => None,
            Err(e) => {
                log::warn!(
                    "could not remove staging directory {}: {e}",
                    run.staging_dir.display()
                );
                Some(CleanupWarning {
                    staging_dir: run.staging_dir.clone(),
                    message: e.to_string(),
                })
            }
        };

        self.reset();
        log::info!("digest written to {}", run.digest_file.display());
        Ok(RunOutcome {
            run,
            digest_text,
            staged_items,
            manifest_file,
            cleanup,
        })
    }
}
