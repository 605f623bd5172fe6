use crate::client::FileReport;
use crate::editor::Session;
use crate::IssueKind;
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use unicode_segmentation::UnicodeSegmentation;

pub const CSV_HEADER: &str =
    "filename,word_count,spelling_issues,grammar_issues,spelling_pct,grammar_pct,overall_accuracy";

lazy_static! {
    static ref UNSAFE_NAME: Regex = Regex::new(r"[^a-zA-Z0-9\-_.]").unwrap();
    static ref FINAL_EXTENSION: Regex = Regex::new(r"\.\w+$").unwrap();
}

/// Derived per-file metrics. Counters come from server stats when present,
/// otherwise from the issue list; the word count falls back to counting the
/// content locally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileScore {
    pub word_count: usize,
    pub spelling_issues: usize,
    pub grammar_issues: usize,
    pub spelling_pct: f64,
    pub grammar_pct: f64,
    pub overall_accuracy: f64,
}

pub fn score(file: &FileReport) -> FileScore {
    let stats = file.stats.clone().unwrap_or_default();

    let word_count = stats
        .word_count
        .or_else(|| file.content.as_deref().map(count_words))
        .unwrap_or(0);
    let spelling_issues = stats
        .spelling_issues
        .unwrap_or_else(|| count_kind(file, IssueKind::Spelling));
    let grammar_issues = stats
        .grammar_issues
        .unwrap_or_else(|| count_kind(file, IssueKind::Grammar));
    let total = spelling_issues + grammar_issues;

    let (spelling_pct, grammar_pct, overall_accuracy) = if word_count > 0 {
        let words = word_count as f64;
        (
            spelling_issues as f64 / words * 100.0,
            grammar_issues as f64 / words * 100.0,
            (100.0 - total as f64 / words * 100.0).max(0.0),
        )
    } else {
        (0.0, 0.0, 100.0)
    };

    FileScore {
        word_count,
        spelling_issues,
        grammar_issues,
        spelling_pct,
        grammar_pct,
        overall_accuracy,
    }
}

fn count_kind(file: &FileReport, kind: IssueKind) -> usize {
    file.issues.iter().filter(|i| i.kind == kind).count()
}

pub fn count_words(text: &str) -> usize {
    text.unicode_words().count()
}

fn format_pct(value: f64) -> String {
    format!("{:.2}%", value)
}

/// CSV summary across all analyzed files, fixed header, one row per file.
pub fn csv_summary(files: &[(&FileReport, FileScore)]) -> String {
    let rows: Vec<String> = files
        .iter()
        .map(|(file, score)| {
            format!(
                "{},{},{},{},{:.2},{:.2},{:.2}",
                file.id,
                score.word_count,
                score.spelling_issues,
                score.grammar_issues,
                score.spelling_pct,
                score.grammar_pct,
                score.overall_accuracy
            )
        })
        .collect();

    format!("{}\n{}", CSV_HEADER, rows.join("\n"))
}

pub fn write_csv(path: &Path, files: &[(&FileReport, FileScore)]) -> Result<()> {
    fs::write(path, csv_summary(files))
        .with_context(|| format!("Failed to write CSV report: {}", path.display()))
}

/// Plain-text report for one file: stats block, then a numbered issue list.
pub fn file_report_text(file: &FileReport, score: FileScore) -> String {
    let mut lines = vec![
        format!("File: {}", file.id),
        format!("Word count: {}", score.word_count),
        format!(
            "Spelling issues: {} ({})",
            score.spelling_issues,
            format_pct(score.spelling_pct)
        ),
        format!(
            "Grammar issues: {} ({})",
            score.grammar_issues,
            format_pct(score.grammar_pct)
        ),
        format!("Overall accuracy: {}", format_pct(score.overall_accuracy)),
        String::new(),
        "Issues:".to_string(),
    ];

    if file.issues.is_empty() {
        lines.push("  None".to_string());
    } else {
        for (idx, issue) in file.issues.iter().enumerate() {
            let suggestions = if issue.suggestions.is_empty() {
                String::new()
            } else {
                format!(" Suggestions: {}", issue.suggestions.join(", "))
            };
            lines.push(format!(
                "  {}. [{}] {} ({}){}",
                idx + 1,
                issue.kind,
                issue.message,
                issue.original,
                suggestions
            ));
        }
    }

    lines.join("\n")
}

pub fn write_file_report(dir: &Path, file: &FileReport, score: FileScore) -> Result<PathBuf> {
    let path = dir.join(format!("{}_report.txt", sanitize_file_name(&file.id)));
    fs::write(&path, file_report_text(file, score))
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(path)
}

/// Replace anything outside `[A-Za-z0-9-_.]` with an underscore.
pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_NAME.replace_all(name, "_").into_owned()
}

/// Name for an exported corrected document: sanitized stem plus
/// `_corrected.txt`.
pub fn corrected_file_name(file_id: &str) -> String {
    let safe = sanitize_file_name(file_id);
    let stem = FINAL_EXTENSION.replace(&safe, "");
    format!("{}_corrected.txt", stem)
}

/// Write the session's current buffer as the corrected document.
pub fn write_corrected(dir: &Path, session: &Session) -> Result<PathBuf> {
    let path = dir.join(corrected_file_name(session.file_id()));
    fs::write(&path, session.export())
        .with_context(|| format!("Failed to write corrected document: {}", path.display()))?;
    Ok(path)
}
