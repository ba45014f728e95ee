use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use ingot::core::*;
use pretty_assertions::assert_eq;

fn mkfile(p: &Path, content: &str) {
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, content).unwrap();
}

#[test]
fn files_keep_their_relative_layout_and_content() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src-root");
    let staging = tmp.path().join("staging");
    mkfile(&root.join("docs/guide.md"), "guide body\n");

    let selection = vec![root.join("docs/guide.md")];
    let staged = stage_selection(&root, &staging, &selection, &mut |_| {}).unwrap();

    assert_eq!(staged, 1);
    let copied = staging.join("docs/guide.md");
    assert_eq!(fs::read_to_string(copied).unwrap(), "guide body\n");
}

#[test]
fn directories_are_copied_wholesale() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src-root");
    let staging = tmp.path().join("staging");

    // Staging applies no filtering: whatever lives under a selected
    // directory comes along, ignore lists notwithstanding.
    mkfile(&root.join("sub/keep.txt"), "keep");
    mkfile(&root.join("sub/node_modules/dep.js"), "dep");
    mkfile(&root.join("sub/trace.log"), "log");

    let selection = vec![root.join("sub")];
    stage_selection(&root, &staging, &selection, &mut |_| {}).unwrap();

    assert!(staging.join("sub/keep.txt").is_file());
    assert!(staging.join("sub/node_modules/dep.js").is_file());
    assert!(staging.join("sub/trace.log").is_file());
}

#[test]
fn restaging_merges_and_overwrites() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src-root");
    let staging = tmp.path().join("staging");

    mkfile(&root.join("sub/keep.txt"), "fresh");
    mkfile(&staging.join("sub/keep.txt"), "stale");
    mkfile(&staging.join("sub/leftover.txt"), "old run");

    let selection = vec![root.join("sub")];
    stage_selection(&root, &staging, &selection, &mut |_| {}).unwrap();

    // Conflicting files are overwritten; unrelated leftovers survive.
    assert_eq!(
        fs::read_to_string(staging.join("sub/keep.txt")).unwrap(),
        "fresh"
    );
    assert_eq!(
        fs::read_to_string(staging.join("sub/leftover.txt")).unwrap(),
        "old run"
    );
}

#[test]
fn copies_carry_the_source_modification_time() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src-root");
    let staging = tmp.path().join("staging");

    mkfile(&root.join("a.txt"), "alpha\n");
    mkfile(&root.join("docs/guide.md"), "guide\n");

    // Age the sources so a fresh copy's own timestamp cannot pass by luck.
    let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
    for rel in ["a.txt", "docs/guide.md"] {
        fs::File::options()
            .write(true)
            .open(root.join(rel))
            .unwrap()
            .set_modified(stamp)
            .unwrap();
    }

    let selection = vec![root.join("a.txt"), root.join("docs")];
    stage_selection(&root, &staging, &selection, &mut |_| {}).unwrap();

    for rel in ["a.txt", "docs/guide.md"] {
        let want = fs::metadata(root.join(rel)).unwrap().modified().unwrap();
        let got = fs::metadata(staging.join(rel)).unwrap().modified().unwrap();
        assert_eq!(got, want, "{rel}");
    }
}

#[test]
fn progress_reports_one_unit_per_item_in_selection_order() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src-root");
    let staging = tmp.path().join("staging");

    mkfile(&root.join("a.txt"), "a");
    mkfile(&root.join("b.txt"), "b");
    mkfile(&root.join("c.txt"), "c");

    // Deliberately not in scan order.
    let selection = vec![root.join("c.txt"), root.join("a.txt")];
    let mut seen = Vec::new();
    stage_selection(&root, &staging, &selection, &mut |p: CopyProgress| {
        seen.push((p.index, p.total, p.path));
    })
    .unwrap();

    assert_eq!(
        seen,
        vec![
            (1, 2, root.join("c.txt")),
            (2, 2, root.join("a.txt")),
        ]
    );
}

#[test]
fn paths_outside_the_root_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src-root");
    let staging = tmp.path().join("staging");
    fs::create_dir_all(&root).unwrap();

    let outside = tmp.path().join("elsewhere.txt");
    fs::write(&outside, "x").unwrap();

    let err = stage_selection(&root, &staging, &[outside], &mut |_| {}).unwrap_err();

    assert!(matches!(err, IngestError::EscapesRoot { .. }));
    assert!(err.to_string().contains("escapes source folder"));
}

#[test]
fn an_empty_selection_stages_nothing() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src-root");
    let staging = tmp.path().join("staging");
    fs::create_dir_all(&root).unwrap();

    let staged = stage_selection(&root, &staging, &[], &mut |_| {}).unwrap();

    assert_eq!(staged, 0);
    assert!(staging.is_dir());
    assert_eq!(fs::read_dir(&staging).unwrap().count(), 0);
}
