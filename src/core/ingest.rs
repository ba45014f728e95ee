use crate::core::{path_to_unix, source_base_name};
use anyhow::Context;
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

/// The three text blocks an ingestion produces.
#[derive(Debug, Clone)]
pub struct Digest {
    pub summary: String,
    pub tree: String,
    pub content: String,
}

impl Digest {
    /// The persisted digest layout: summary, blank line, tree, blank line,
    /// content.
    #[must_use]
    pub fn combined(&self) -> String {
        format!("{}\n\n{}\n\n{}", self.summary, self.tree, self.content)
    }
}

/// The ingestion collaborator: turns a directory into (summary, tree,
/// content). The workflow treats implementations as opaque; any error aborts
/// the run and leaves the staging directory in place for inspection.
pub trait Ingestor {
    fn ingest(&self, dir: &Path) -> anyhow::Result<Digest>;
}

/// Stock ingestor that digests the staged directory directly.
///
/// Output carries no timestamps, so a fixed directory digests to identical
/// bytes on every run.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryDigester;

const CONTENT_RULE: &str = "================================================";

impl Ingestor for DirectoryDigester {
    fn ingest(&self, dir: &Path) -> anyhow::Result<Digest> {
        let mut files: Vec<(String, PathBuf, u64)> = Vec::new();
        collect_files(dir, dir, &mut files)
            .with_context(|| format!("walking staging directory {}", dir.display()))?;
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let name = source_base_name(dir);
        let rel_names: Vec<String> = files.iter().map(|(rel, _, _)| rel.clone()).collect();
        let tree = render_digest_tree(&rel_names, &name);

        let mut content = String::new();
        for (idx, (rel, path, _)) in files.iter().enumerate() {
            if idx > 0 {
                content.push('\n');
            }
            content.push_str(CONTENT_RULE);
            content.push('\n');
            content.push_str("File: ");
            content.push_str(rel);
            content.push('\n');
            content.push_str(CONTENT_RULE);
            content.push('\n');
            match fs::read_to_string(path) {
                Ok(body) => {
                    content.push_str(&body);
                    if !body.ends_with('\n') {
                        content.push('\n');
                    }
                }
                Err(e) => {
                    log::warn!("cannot read {} as text: {e}", path.display());
                    content.push_str("[non-text or unreadable file omitted]\n");
                }
            }
        }

        let total_bytes: u64 = files.iter().map(|(_, _, len)| len).sum();
        let summary = format!(
            "Directory: {name}\nFiles analyzed: {}\nTotal size: {:.2} KB\nEstimated tokens: {}",
            files.len(),
            total_bytes as f64 / 1024.0,
            count_tokens(&content)
        );

        Ok(Digest {
            summary,
            tree,
            content,
        })
    }
}

fn collect_files(
    base: &Path,
    dir: &Path,
    out: &mut Vec<(String, PathBuf, u64)>,
) -> io::Result<()> {
    for ent in fs::read_dir(dir)? {
        let ent = ent?;
        let path = ent.path();
        if ent.file_type()?.is_dir() {
            collect_files(base, &path, out)?;
        } else {
            let len = ent.metadata()?.len();
            let rel = path.strip_prefix(base).unwrap_or(&path);
            out.push((path_to_unix(rel), path.clone(), len));
        }
    }
    Ok(())
}

fn render_digest_tree(paths: &[String], root_name: &str) -> String {
    #[derive(Default)]
    struct T {
        children: BTreeMap<String, Box<T>>,
    }
    fn insert_path(node: &mut T, parts: &[&str]) {
        if parts.is_empty() {
            return;
        }
        let entry = node.children.entry(parts[0].to_string()).or_default();
        if parts.len() > 1 {
            insert_path(entry, &parts[1..]);
        }
    }
    fn render(node: &T, prefix: &mut String, out: &mut String) {
        let len = node.children.len();
        for (idx, (name, child)) in node.children.iter().enumerate() {
            let last = idx + 1 == len;
            out.push_str(prefix);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(name);
            out.push('\n');

            if !child.children.is_empty() {
                let saved = prefix.len();
                prefix.push_str(if last { "    " } else { "│   " });
                render(child, prefix, out);
                prefix.truncate(saved);
            }
        }
    }

    let mut root = T::default();
    for p in paths {
        let parts: Vec<&str> = p.split('/').filter(|s| !s.is_empty()).collect();
        insert_path(&mut root, &parts);
    }

    let mut out = String::new();
    out.push_str(root_name);
    out.push('\n');
    let mut prefix = String::new();
    render(&root, &mut prefix, &mut out);
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

#[cfg(feature = "tokens")]
fn count_tokens(text: &str) -> usize {
    use std::sync::OnceLock;
    use tiktoken_rs::{CoreBPE, o200k_base};
    static BPE: OnceLock<CoreBPE> = OnceLock::new();
    let bpe = BPE.get_or_init(|| o200k_base().expect("failed to load o200k_base BPE"));
    bpe.encode_with_special_tokens(text).len()
}

#[cfg(not(feature = "tokens"))]
fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}
