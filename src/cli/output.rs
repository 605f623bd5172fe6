use crate::client::FileReport;
use crate::editor::{SegmentKind, Session, SessionIssue};
use crate::intake::Notice;
use crate::report::FileScore;
use crate::{Issue, IssueKind};
use anyhow::{Context, Result};
use colored::*;
use dialoguer::theme::{ColorfulTheme, SimpleTheme};
use dialoguer::Select;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonFile {
    id: String,
    word_count: usize,
    spelling_issues: usize,
    grammar_issues: usize,
    spelling_pct: f64,
    grammar_pct: f64,
    overall_accuracy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    issues: Vec<Issue>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonOutput {
    files_checked: usize,
    total_issues: usize,
    files: Vec<JsonFile>,
}

/// Print still-active transient warnings (rejected uploads and the like).
pub fn print_notices(notices: &[Notice], colored_output: bool) {
    let now = Instant::now();
    for notice in notices.iter().filter(|n| n.is_active(now)) {
        if colored_output {
            eprintln!("{} {}", "⚠".yellow().bold(), notice.message().yellow());
        } else {
            eprintln!("⚠ {}", notice.message());
        }
    }
}

pub fn print_results(
    files: &[(&FileReport, FileScore)],
    colored_output: bool,
    format: &OutputFormat,
    max_suggestions: usize,
) {
    match format {
        OutputFormat::Text => print_text_results(files, colored_output, max_suggestions),
        OutputFormat::Json => print_json_results(files),
    }
}

fn print_text_results(
    files: &[(&FileReport, FileScore)],
    colored_output: bool,
    max_suggestions: usize,
) {
    for (file, score) in files {
        if colored_output {
            println!("\n{}", file.id.bold().underline());
        } else {
            println!("\n{}", file.id);
        }

        if let Some(error) = &file.error {
            if colored_output {
                println!("  {}", error.red());
            } else {
                println!("  {}", error);
            }
            continue;
        }

        let stats_line = format!(
            "Words: {} | Spelling: {} ({:.2}%) | Grammar: {} ({:.2}%) | Accuracy: {:.2}%",
            score.word_count,
            score.spelling_issues,
            score.spelling_pct,
            score.grammar_issues,
            score.grammar_pct,
            score.overall_accuracy
        );
        if colored_output {
            println!("  {}", stats_line.dimmed());
        } else {
            println!("  {}", stats_line);
        }

        if file.issues.is_empty() {
            if colored_output {
                println!("  {}", "No issues detected.".green());
            } else {
                println!("  No issues detected.");
            }
            continue;
        }

        for issue in &file.issues {
            let range = format!("{}..{}", issue.position.start, issue.position.end);
            if colored_output {
                let tag = match issue.kind {
                    IssueKind::Spelling => "spelling".red().bold(),
                    IssueKind::Grammar => "grammar".magenta().bold(),
                };
                println!(
                    "  {} [{}] {} ({})",
                    range.blue().bold(),
                    tag,
                    issue.message,
                    issue.original.bold()
                );
            } else {
                println!(
                    "  {} [{}] {} ({})",
                    range, issue.kind, issue.message, issue.original
                );
            }

            if !issue.suggestions.is_empty() {
                if colored_output {
                    let suggestions = issue
                        .suggestions
                        .iter()
                        .take(max_suggestions)
                        .map(|s| s.green().to_string())
                        .collect::<Vec<_>>()
                        .join(&", ".dimmed().to_string());
                    println!("    {} {}", "→".dimmed(), suggestions);
                } else {
                    let suggestions = issue
                        .suggestions
                        .iter()
                        .take(max_suggestions)
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!("    → {}", suggestions);
                }
            }
        }
    }
}

fn print_json_results(files: &[(&FileReport, FileScore)]) {
    let json_files: Vec<JsonFile> = files
        .iter()
        .map(|(file, score)| JsonFile {
            id: file.id.clone(),
            word_count: score.word_count,
            spelling_issues: score.spelling_issues,
            grammar_issues: score.grammar_issues,
            spelling_pct: score.spelling_pct,
            grammar_pct: score.grammar_pct,
            overall_accuracy: score.overall_accuracy,
            error: file.error.clone(),
            issues: file.issues.clone(),
        })
        .collect();

    let output = JsonOutput {
        files_checked: files.len(),
        total_issues: files
            .iter()
            .map(|(_, s)| s.spelling_issues + s.grammar_issues)
            .sum(),
        files: json_files,
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

/// Render the session buffer with pending issues highlighted inline.
pub fn render_segments(session: &Session, colored_output: bool) -> String {
    session
        .segments()
        .map(|segment| {
            if !colored_output {
                return segment.text.to_string();
            }
            match segment.kind {
                SegmentKind::Plain => segment.text.to_string(),
                SegmentKind::Placeholder => segment.text.yellow().to_string(),
                SegmentKind::Issue(IssueKind::Spelling) => {
                    segment.text.red().underline().to_string()
                }
                SegmentKind::Issue(IssueKind::Grammar) => {
                    segment.text.magenta().underline().to_string()
                }
            }
        })
        .collect()
}

pub fn print_check_summary(total_issues: usize, file_count: usize, colored_output: bool) {
    println!();
    if total_issues == 0 {
        if colored_output {
            println!("{}", "✓ No issues found!".green().bold());
        } else {
            println!("✓ No issues found!");
        }
    } else {
        let issue_word = if total_issues == 1 { "issue" } else { "issues" };
        if colored_output {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_issues.to_string().red().bold(),
                issue_word,
                file_count,
                if file_count == 1 { "file" } else { "files" }
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_issues,
                issue_word,
                file_count,
                if file_count == 1 { "file" } else { "files" }
            );
        }
    }
}

pub fn print_fix_summary(total_applied: usize, file_count: usize, colored_output: bool) {
    println!();
    if total_applied == 0 {
        if colored_output {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
    } else {
        let fix_word = if total_applied == 1 {
            "correction"
        } else {
            "corrections"
        };
        if colored_output {
            println!(
                "{} {} {} applied to {} {}",
                "✓".green().bold(),
                total_applied.to_string().green().bold(),
                fix_word,
                file_count,
                if file_count == 1 { "file" } else { "files" }
            );
        } else {
            println!(
                "✓ {} {} applied to {} {}",
                total_applied,
                fix_word,
                file_count,
                if file_count == 1 { "file" } else { "files" }
            );
        }
    }
}

/// Ask which suggestion to apply for one pending issue. Returns None when the
/// user skips (explicitly or via escape).
pub fn prompt_suggestion(issue: &SessionIssue, colored_output: bool) -> Result<Option<String>> {
    let prompt = format!("[{}] {} ({})", issue.kind, issue.message, issue.original);

    let mut items: Vec<String> = issue.suggestions.clone();
    items.push("Skip".to_string());

    let selection = if colored_output {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact_opt()
    } else {
        Select::with_theme(&SimpleTheme)
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact_opt()
    }
    .context("Failed to read suggestion choice")?;

    Ok(selection.and_then(|idx| issue.suggestions.get(idx).cloned()))
}
