use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/* ============================== Work area ================================== */

pub const DIGEST_FILE_NAME: &str = "output_digest.txt";
pub const MANIFEST_FILE_NAME: &str = "run_manifest.json";

const OUTPUT_SUBDIR: &str = "Ingestion";

/// Base name of the source folder, used to key staging and output paths.
#[must_use]
pub fn source_base_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "root".to_string())
}

/// The fixed on-disk area runs operate in.
///
/// Staging lands at `<work_root>/<base>`, output at
/// `<work_root>/Ingestion/<base>_ingest_<user>`. Both derivations are
/// deterministic per source folder, so reruns overwrite rather than pile up;
/// two runs of a same-named folder by the same user share paths (known gap).
#[derive(Debug, Clone)]
pub struct WorkArea {
    pub work_root: PathBuf,
    pub user: String,
}

impl Default for WorkArea {
    fn default() -> Self {
        Self::detect()
    }
}

impl WorkArea {
    #[must_use]
    pub fn new(work_root: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            work_root: work_root.into(),
            user: user.into(),
        }
    }

    /// Platform defaults: per-user local data directory and the OS user name.
    #[must_use]
    pub fn detect() -> Self {
        let work_root = dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("ingot");
        Self {
            work_root,
            user: detect_user(),
        }
    }

    #[must_use]
    pub fn staging_dir(&self, source_root: &Path) -> PathBuf {
        self.work_root.join(source_base_name(source_root))
    }

    #[must_use]
    pub fn output_dir(&self, source_root: &Path) -> PathBuf {
        self.work_root.join(OUTPUT_SUBDIR).join(format!(
            "{}_ingest_{}",
            source_base_name(source_root),
            self.user
        ))
    }

    #[must_use]
    pub fn digest_file(&self, source_root: &Path) -> PathBuf {
        self.output_dir(source_root).join(DIGEST_FILE_NAME)
    }
}

fn detect_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/* ============================== Run manifest =============================== */

/// Record of one successful run, written beside the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunManifest {
    pub source_root: String,
    pub staging_dir: String,
    pub output_dir: String,
    pub digest_file: String,
    pub started_at: String,
    pub finished_at: String,
    pub staged_items: usize,
    pub digest_bytes: u64,
}

pub fn save_manifest(output_dir: &Path, manifest: &RunManifest) -> io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let path = output_dir.join(MANIFEST_FILE_NAME);
    let tmp = path.with_extension("json.tmp");

    let data = serde_json::to_vec_pretty(manifest).map_err(|e| io::Error::other(e.to_string()))?;

    fs::write(&tmp, data)?;
    fs::rename(&tmp, &path)?;
    Ok(path)
}

#[must_use]
pub fn load_manifest(output_dir: &Path) -> Option<RunManifest> {
    let data = fs::read(output_dir.join(MANIFEST_FILE_NAME)).ok()?;
    serde_json::from_slice::<RunManifest>(&data).ok()
}
