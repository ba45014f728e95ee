use crate::core::{IngestError, IngestResult};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// One progress unit, emitted after each top-level selected item is copied.
#[derive(Debug, Clone)]
pub struct CopyProgress {
    pub index: usize,
    pub total: usize,
    pub path: PathBuf,
}

/// Copy the selected paths into `staging_dir`, preserving their layout
/// relative to `root`. Paths are copied in selection order; directories are
/// copied wholesale (staging applies no filtering) and merge into any
/// pre-existing destination subtree, overwriting on conflict. Copied files
/// keep their permissions and modification times.
pub fn stage_selection(
    root: &Path,
    staging_dir: &Path,
    selection: &[PathBuf],
    progress: &mut dyn FnMut(CopyProgress),
) -> IngestResult<usize> {
    fs::create_dir_all(staging_dir)?;

    let total = selection.len();
    for (i, src) in selection.iter().enumerate() {
        let rel = src
            .strip_prefix(root)
            .map_err(|_| IngestError::EscapesRoot {
                path: src.clone(),
                root: root.to_path_buf(),
            })?;
        let dest = staging_dir.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let is_dir = fs::symlink_metadata(src)?.is_dir();
        if is_dir {
            copy_dir_recursive(src, &dest)?;
        } else {
            copy_file(src, &dest)?;
        }

        progress(CopyProgress {
            index: i + 1,
            total,
            path: src.clone(),
        });
    }

    log::debug!(
        "staged {} items into {}",
        total,
        staging_dir.display()
    );
    Ok(total)
}

/// Recursive copy; existing destination directories are merged into,
/// existing files overwritten.
pub fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for ent in fs::read_dir(src)? {
        let ent = ent?;
        let from = ent.path();
        let to = dest.join(ent.file_name());
        if ent.file_type()?.is_dir() {
            copy_dir_recursive(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
        }
    }
    Ok(())
}

/// `fs::copy` carries contents and permissions; the source's modification
/// time needs an explicit pass afterwards.
fn copy_file(src: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(src, dest)?;
    let mtime = fs::metadata(src)?.modified()?;
    fs::File::options().write(true).open(dest)?.set_modified(mtime)?;
    Ok(())
}
