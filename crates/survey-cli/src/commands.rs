//! Subcommand implementations
//!
//! Each command renders its report to a `String`; `main` prints it.

use anyhow::{Context, Result};
use serde_json::json;
use std::fmt::Write as _;
use std::path::Path;
use survey_document::{SurveyDocument, UsageRecord};
use survey_editor::{EditorConfig, SurveyEditor};
use survey_io::{read_survey, write_document, write_snapshot, SurveyFormat};

/// Open a survey file as an editing session
pub(crate) fn open(path: &Path, config: EditorConfig) -> Result<(SurveyEditor, SurveyFormat)> {
    let file = read_survey(path).with_context(|| format!("failed to open {}", path.display()))?;
    let format = file.format();
    let editor = file
        .into_editor(config)
        .with_context(|| format!("failed to start a session on {}", path.display()))?;
    Ok((editor, format))
}

/// Outcome of `check`
#[derive(Debug)]
pub(crate) struct CheckReport {
    pub(crate) output: String,
    pub(crate) clean: bool,
}

/// Invalid references and expression issues
pub(crate) fn check(editor: &SurveyEditor, as_json: bool) -> Result<CheckReport> {
    let diagnostics = editor.diagnose();
    let issues = editor.validate_expressions();
    let clean = diagnostics.is_empty() && issues.is_empty();

    let output = if as_json {
        serde_json::to_string_pretty(&json!({
            "surveyKey": editor.document().survey_key(),
            "items": editor.document().len(),
            "invalidReferences": diagnostics,
            "expressionIssues": issues,
        }))?
    } else {
        let mut out = String::new();
        writeln!(
            out,
            "{}: {} items, {} invalid references, {} expression issues",
            editor.document().survey_key(),
            editor.document().len(),
            diagnostics.len(),
            issues.len()
        )?;
        for d in &diagnostics {
            writeln!(out, "  invalid: {} ({:?})", d.usage, d.reason)?;
        }
        for i in &issues {
            writeln!(out, "  {} {}: {}", i.item_key, i.location, i.issue)?;
        }
        out
    };
    Ok(CheckReport { output, clean })
}

/// Usages of `target` and its subtree
pub(crate) fn usages(editor: &SurveyEditor, target: &str) -> Result<String> {
    let found = editor
        .get_reference_usages(target)
        .with_context(|| format!("invalid key '{target}'"))?;
    Ok(render_usages(target, &found))
}

fn render_usages(target: &str, usages: &[UsageRecord]) -> String {
    if usages.is_empty() {
        return format!("no usages of {target}\n");
    }
    let mut out = String::new();
    for usage in usages {
        let _ = writeln!(out, "{usage}");
    }
    out
}

/// Rename an item and write the file back in its own format
pub(crate) fn rename(
    editor: &mut SurveyEditor,
    format: SurveyFormat,
    key: &str,
    new_local_key: &str,
    output: &Path,
) -> Result<String> {
    let new_key = editor
        .rename_item(key, new_local_key)
        .with_context(|| format!("failed to rename '{key}'"))?;
    match format {
        SurveyFormat::Document => write_document(output, editor.document()),
        SurveyFormat::Snapshot => write_snapshot(output, &editor.to_snapshot()),
    }
    .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(format!("renamed {key} -> {new_key}\n"))
}

/// Indented item tree
pub(crate) fn tree(document: &SurveyDocument) -> String {
    let mut out = String::new();
    render_node(document, document.survey_key(), 0, &mut out);
    out
}

fn render_node(document: &SurveyDocument, full_key: &str, depth: usize, out: &mut String) {
    let Some(item) = document.get(full_key) else {
        return;
    };
    let _ = write!(out, "{:indent$}{} [{}]", "", item.key().item_key(), item.item_type(), indent = depth * 2);
    if let Some(label) = item.label() {
        let _ = write!(out, " {label}");
    }
    out.push('\n');
    for child in document.children_of(full_key).unwrap_or_default() {
        render_node(document, child, depth + 1, out);
    }
}

/// History entries with the cursor marked
pub(crate) fn history(editor: &SurveyEditor) -> String {
    let mut out = String::new();
    for entry in editor.history() {
        let marker = if entry.index == editor.current_index() { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:>3}  {}  {}  {}",
            entry.index,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.fingerprint.short(),
            entry.description
        );
    }
    out
}
