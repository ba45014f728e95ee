use anyhow::Result;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use std::collections::HashSet;
use std::path::Path;

use ingot::core::{
    CopyProgress, DirectoryDigester, FilterPolicy, IngestError, RunOutcome, WorkArea, Workflow,
    load_manifest,
};

use crate::ui::view;

/// Drive the whole interactive flow: pick a folder, adjust the selection,
/// process, inspect the result, repeat.
pub fn run_session() -> Result<()> {
    println!(
        "ingot {} - stage a folder selection and digest it into one text file",
        env!("CARGO_PKG_VERSION")
    );

    let mut wf = Workflow::new(WorkArea::detect(), FilterPolicy::default());
    let digester = DirectoryDigester;

    loop {
        if wf.tree().is_none() && !prompt_for_root(&mut wf)? {
            return Ok(());
        }

        let entry_count = wf.tree().map(ingot::core::SelectionTree::len).unwrap_or(0);
        let prompt = format!("{} of {entry_count} entries selected", wf.selection().len());
        let actions = [
            "Pick entries",
            "Select all",
            "Clear selection",
            "Process selection",
            "Rescan folder",
            "Choose another folder",
            "Quit",
        ];
        let choice = Select::new()
            .with_prompt(prompt)
            .items(&actions)
            .default(0)
            .interact()?;

        match choice {
            0 => pick_entries(&mut wf)?,
            1 => wf.select_all(true),
            2 => wf.select_all(false),
            3 => process(&mut wf, &digester)?,
            4 => rescan(&mut wf)?,
            5 => {
                if wf.selection().is_empty()
                    || Confirm::new()
                        .with_prompt("Discard the current selection?")
                        .default(true)
                        .interact()?
                {
                    wf.reset();
                }
            }
            _ => return Ok(()),
        }
    }
}

/// Ask for a root until a scannable one is given; `false` means quit.
fn prompt_for_root(wf: &mut Workflow) -> Result<bool> {
    loop {
        let raw: String = Input::new()
            .with_prompt("Folder to ingest (empty to quit)")
            .allow_empty(true)
            .interact_text()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        match wf.choose_root(Path::new(trimmed)) {
            Ok(()) => {
                let empty = wf.tree().is_none_or(ingot::core::SelectionTree::is_empty);
                if let (Some(tree), Some(stats)) = (wf.tree(), wf.scan_stats()) {
                    println!("{}", view::stats_line(tree.len(), stats));
                }
                if empty {
                    println!("Nothing selectable under {trimmed}; pick another folder.");
                    wf.reset();
                    continue;
                }
                if let Some(root) = wf.root() {
                    if let Some(last) = load_manifest(&wf.work_area().output_dir(root)) {
                        println!("{}", view::last_run_line(&last));
                    }
                }
                return Ok(true);
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }
}

/// Rebuild the tree for the current root to pick up filesystem changes.
/// The rebuild clears the selection, so ask first when one exists.
fn rescan(wf: &mut Workflow) -> Result<()> {
    let Some(root) = wf.root().map(Path::to_path_buf) else {
        return Ok(());
    };
    if !wf.selection().is_empty()
        && !Confirm::new()
            .with_prompt("Rescanning clears the selection. Continue?")
            .default(true)
            .interact()?
    {
        return Ok(());
    }
    match wf.choose_root(&root) {
        Ok(()) => {
            if let (Some(tree), Some(stats)) = (wf.tree(), wf.scan_stats()) {
                println!("{}", view::stats_line(tree.len(), stats));
            }
            if wf.tree().is_none_or(ingot::core::SelectionTree::is_empty) {
                println!("Nothing selectable under {} any more.", root.display());
                wf.reset();
            }
        }
        Err(e) => eprintln!("error: {e}"),
    }
    Ok(())
}

fn pick_entries(wf: &mut Workflow) -> Result<()> {
    let Some(tree) = wf.tree() else {
        return Ok(());
    };
    let rows = tree.rows();
    let labels: Vec<String> = rows.iter().map(view::row_label).collect();
    let defaults: Vec<bool> = rows.iter().map(|r| wf.is_selected(&r.path)).collect();

    let picked = MultiSelect::new()
        .with_prompt("Select files or folders (Space to toggle, Enter to confirm)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;
    let picked: HashSet<usize> = picked.into_iter().collect();

    for (i, row) in rows.iter().enumerate() {
        wf.set_selected(&row.path, picked.contains(&i))?;
    }
    Ok(())
}

fn process(wf: &mut Workflow, digester: &DirectoryDigester) -> Result<()> {
    let outcome = wf.process(digester, &mut |p: CopyProgress| {
        println!("  [{}/{}] {}", p.index, p.total, p.path.display());
    });

    match outcome {
        Ok(outcome) => show_outcome(&outcome)?,
        Err(e) => {
            eprintln!("error: {e}");
            if let IngestError::IngestionFailure { staging_dir, .. } = &e {
                eprintln!(
                    "staging directory left at {} for inspection",
                    staging_dir.display()
                );
            }
        }
    }
    Ok(())
}

fn show_outcome(outcome: &RunOutcome) -> Result<()> {
    println!();
    println!("Digest written to {}", outcome.run.digest_file.display());
    println!(
        "{} top-level items staged; digest is {} bytes",
        outcome.staged_items,
        outcome.digest_text.len()
    );
    if let Some(warning) = &outcome.cleanup {
        eprintln!("warning: {warning}");
    }
    println!();
    println!("{}", view::preview(&outcome.digest_text));
    println!();

    loop {
        let actions = ["Reveal output folder", "Copy digest to clipboard", "Continue"];
        let choice = Select::new()
            .with_prompt("Result")
            .items(&actions)
            .default(2)
            .interact()?;
        match choice {
            0 => {
                if let Err(e) = view::reveal_in_file_manager(&outcome.run.output_dir) {
                    eprintln!("error: could not open the file manager: {e}");
                }
            }
            1 => {
                if view::copy_to_clipboard(&outcome.digest_text) {
                    println!("Copied.");
                } else {
                    eprintln!("error: clipboard unavailable");
                }
            }
            _ => return Ok(()),
        }
    }
}
