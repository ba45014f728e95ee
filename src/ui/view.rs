use ingot::core::{EntryRow, RunManifest, ScanStats};
use std::path::Path;

/// Digest previews longer than this are truncated on screen; the file on
/// disk always holds the full text.
pub const PREVIEW_CHAR_LIMIT: usize = 4_000;

#[must_use]
pub fn row_label(row: &EntryRow) -> String {
    let indent = "  ".repeat(row.depth);
    let marker = if row.is_dir { "/" } else { "" };
    format!("{indent}{}{marker}  [{:.2} KB]", row.name, row.size_kb)
}

#[must_use]
pub fn stats_line(entries: usize, stats: &ScanStats) -> String {
    format!(
        "{entries} selectable entries ({} ignored folders, {} ignored files, {} over the size limit)",
        stats.ignored_dirs.len(),
        stats.ignored_files.len(),
        stats.oversized.len()
    )
}

#[must_use]
pub fn last_run_line(manifest: &RunManifest) -> String {
    format!(
        "Last run: {} top-level items staged, {} digest bytes, finished {}",
        manifest.staged_items, manifest.digest_bytes, manifest.finished_at
    )
}

#[must_use]
pub fn preview(text: &str) -> String {
    let total_chars = text.chars().count();
    if total_chars <= PREVIEW_CHAR_LIMIT {
        return text.to_string();
    }
    let footer = format!(
        "\n\n[Preview truncated to {PREVIEW_CHAR_LIMIT} of {total_chars} chars; the digest file holds the full text]"
    );
    let keep = PREVIEW_CHAR_LIMIT.saturating_sub(footer.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(&footer);
    out
}

/// Open `dir` in the native file browser; errors bubble up as a notice.
pub fn reveal_in_file_manager(dir: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "windows")]
    std::process::Command::new("explorer").arg(dir).spawn()?;
    #[cfg(target_os = "macos")]
    std::process::Command::new("open").arg(dir).spawn()?;
    #[cfg(all(unix, not(target_os = "macos")))]
    std::process::Command::new("xdg-open").arg(dir).spawn()?;
    Ok(())
}

#[must_use]
pub fn copy_to_clipboard(text: &str) -> bool {
    if let Ok(mut cb) = arboard::Clipboard::new() {
        return cb.set_text(text.to_string()).is_ok();
    }
    false
}
