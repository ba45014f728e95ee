use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use ingot::core::*;
use pretty_assertions::assert_eq;

fn mkfile(p: &Path, content: &str) {
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, content).unwrap();
}

fn project_workflow(tmp: &TempDir) -> (Workflow, PathBuf) {
    let src = tmp.path().join("project");
    mkfile(&src.join("a.txt"), "alpha\n");
    mkfile(&src.join("docs/guide.md"), "guide\n");

    let work = tmp.path().join("work");
    let mut wf = Workflow::new(WorkArea::new(&work, "tester"), FilterPolicy::default());
    wf.choose_root(&src).unwrap();
    (wf, work)
}

struct FailingIngestor;

impl Ingestor for FailingIngestor {
    fn ingest(&self, _dir: &Path) -> anyhow::Result<Digest> {
        anyhow::bail!("simulated digester crash")
    }
}

#[test]
fn successful_run_writes_the_digest_and_cleans_up() {
    let tmp = TempDir::new().unwrap();
    let (mut wf, work) = project_workflow(&tmp);
    wf.select_all(true);

    let outcome = wf.process(&DirectoryDigester, &mut |_| {}).unwrap();

    let digest_file = work.join("Ingestion/project_ingest_tester/output_digest.txt");
    assert_eq!(outcome.run.digest_file, digest_file);
    assert!(digest_file.is_file());
    assert_eq!(outcome.digest_text, fs::read_to_string(&digest_file).unwrap());
    assert!(outcome.digest_text.starts_with("Directory: project\n"));

    // Three staged items: docs, docs/guide.md, a.txt.
    assert_eq!(outcome.staged_items, 3);

    // Staging is gone and the cleanup raised no warning.
    assert!(!work.join("project").exists());
    assert!(outcome.cleanup.is_none());

    // Terminal outcome: the workflow is back at the empty baseline.
    assert!(wf.root().is_none());
    assert!(wf.tree().is_none());
    assert!(wf.selection().is_empty());
}

#[test]
fn digest_layout_is_summary_tree_content() {
    let tmp = TempDir::new().unwrap();
    let (mut wf, _work) = project_workflow(&tmp);
    wf.select_all(true);

    let outcome = wf.process(&DirectoryDigester, &mut |_| {}).unwrap();
    let text = outcome.digest_text;

    let summary_end = text.find("\n\n").unwrap();
    let summary = &text[..summary_end];
    assert!(summary.contains("Files analyzed: 2"));

    let rest = &text[summary_end + 2..];
    let tree_end = rest.find("\n\n").unwrap();
    let tree = &rest[..tree_end];
    assert_eq!(tree, "project\n├── a.txt\n└── docs\n    └── guide.md");

    let content = &rest[tree_end + 2..];
    assert!(content.contains("File: a.txt"));
    assert!(content.contains("File: docs/guide.md"));
    assert!(content.contains("alpha\n"));
}

#[test]
fn empty_selection_fails_before_touching_the_disk() {
    let tmp = TempDir::new().unwrap();
    let (mut wf, work) = project_workflow(&tmp);

    let err = wf.process(&DirectoryDigester, &mut |_| {}).unwrap_err();

    assert!(matches!(err, IngestError::NoSelection));
    assert!(!work.exists());

    // Not a terminal outcome: the tree and root survive for another try.
    assert!(wf.root().is_some());
    assert!(wf.tree().is_some());
}

#[test]
fn failed_ingestion_leaves_staging_for_inspection() {
    let tmp = TempDir::new().unwrap();
    let (mut wf, work) = project_workflow(&tmp);
    wf.select_all(true);

    let err = wf.process(&FailingIngestor, &mut |_| {}).unwrap_err();

    match &err {
        IngestError::IngestionFailure { staging_dir, message } => {
            assert_eq!(staging_dir, &work.join("project"));
            assert!(message.contains("simulated digester crash"));
        }
        other => panic!("expected IngestionFailure, got {other:?}"),
    }

    // The staged copy is intact, no digest was written.
    assert!(work.join("project/a.txt").is_file());
    assert!(work.join("project/docs/guide.md").is_file());
    assert!(!work.join("Ingestion").exists());

    // Terminal outcome: state returns to the empty baseline.
    assert!(wf.root().is_none());
    assert!(wf.selection().is_empty());
}

#[test]
fn reruns_produce_identical_digests() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("project");
    mkfile(&src.join("a.txt"), "alpha\n");
    mkfile(&src.join("docs/guide.md"), "guide\n");
    let work = tmp.path().join("work");

    let mut run = || {
        let mut wf = Workflow::new(WorkArea::new(&work, "tester"), FilterPolicy::default());
        wf.choose_root(&src).unwrap();
        wf.select_all(true);
        wf.process(&DirectoryDigester, &mut |_| {}).unwrap().digest_text
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
}

#[test]
fn progress_covers_the_selection_in_order() {
    let tmp = TempDir::new().unwrap();
    let (mut wf, _work) = project_workflow(&tmp);

    let registry = wf.tree().unwrap().registry().to_vec();
    let a = registry
        .iter()
        .find(|p| p.file_name().is_some_and(|n| n == "a.txt"))
        .cloned()
        .unwrap();
    let docs = registry
        .iter()
        .find(|p| p.file_name().is_some_and(|n| n == "docs"))
        .cloned()
        .unwrap();

    wf.set_selected(&a, true).unwrap();
    wf.set_selected(&docs, true).unwrap();

    let mut seen = Vec::new();
    wf.process(&DirectoryDigester, &mut |p| seen.push((p.index, p.total, p.path)))
        .unwrap();

    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], (1, 2, a));
    assert_eq!(seen[1], (2, 2, docs));
}

#[cfg(unix)]
mod unix_cleanup {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::PermissionsExt;

    fn chmod(path: &Path, mode: u32) {
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_mode(mode);
        fs::set_permissions(path, perms).unwrap();
    }

    /// Whether read-only directory bits actually block deletion here. They do
    /// not for a privileged user.
    fn permissions_bite(tmp: &TempDir) -> bool {
        let scratch = tmp.path().join("perm-scratch");
        fs::create_dir(&scratch).unwrap();
        fs::write(scratch.join("f"), "x").unwrap();
        chmod(&scratch, 0o555);
        let bites = fs::remove_file(scratch.join("f")).is_err();
        chmod(&scratch, 0o755);
        fs::remove_dir_all(&scratch).unwrap();
        bites
    }

    struct LockingIngestor;

    impl Ingestor for LockingIngestor {
        fn ingest(&self, dir: &Path) -> anyhow::Result<Digest> {
            let digest = DirectoryDigester.ingest(dir)?;
            // Make a staged subdirectory undeletable so the cleanup fails.
            let mut perms = fs::metadata(dir.join("docs"))?.permissions();
            perms.set_mode(0o555);
            fs::set_permissions(dir.join("docs"), perms)?;
            Ok(digest)
        }
    }

    #[test]
    fn cleanup_failure_is_reported_but_not_fatal() {
        let tmp = TempDir::new().unwrap();
        if !permissions_bite(&tmp) {
            return;
        }

        let (mut wf, work) = project_workflow(&tmp);
        wf.select_all(true);

        let outcome = wf.process(&LockingIngestor, &mut |_| {}).unwrap();

        // The digest is there; the run succeeded.
        assert!(outcome.run.digest_file.is_file());

        let warning = outcome.cleanup.expect("cleanup should have failed");
        assert_eq!(warning.staging_dir, work.join("project"));
        assert!(warning.to_string().contains("could not be removed"));

        // Restore permissions so the tempdir can be dropped.
        let docs = work.join("project/docs");
        if docs.exists() {
            chmod(&docs, 0o755);
        }
    }
}
