use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io;
use std::path::PathBuf;
use turbotext::cli::output::{self, OutputFormat};
use turbotext::client::{AnalyzeClient, FileReport};
use turbotext::editor::Session;
use turbotext::intake::{self, FileQueue, QueuedDocument};
use turbotext::ocr::Recognizer;
use turbotext::report;
use turbotext::Config;

#[derive(Parser, Debug)]
#[command(name = "turbotext")]
#[command(version, about = "Spell & grammar analysis for your documents", long_about = None)]
struct Cli {
    /// Files or directories to analyze
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Apply suggested corrections and write corrected documents
    #[arg(short, long)]
    fix: bool,

    /// Interactive mode for selecting corrections
    #[arg(short, long, requires = "fix")]
    interactive: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if issues are found
    #[arg(long)]
    no_fail: bool,

    /// Base URL of the analysis service
    #[arg(long, env = "TURBOTEXT_API_BASE")]
    api_base: Option<String>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Write a CSV summary of all analyzed files
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Write a plain-text report per file into this directory
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    /// Directory for corrected documents (default: current directory)
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Also accept PDF uploads
    #[arg(long)]
    allow_pdf: bool,

    /// Ask the service to inline decoded file content
    #[arg(long)]
    include_content: bool,

    /// Skip OCR for queued images
    #[arg(long)]
    no_ocr: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Fetch decoded text for a previously analyzed file
    Content {
        /// Content id returned by the analysis service
        content_id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "turbotext", &mut io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = Config::load(cli.api_base.clone(), cli.allow_pdf, cli.include_content)?;

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command, &config);
    }

    // Validate input files
    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    let colored = !cli.no_color;
    let mut intake = intake::collect(&cli.files, config.allow_pdf);
    output::print_notices(&intake.notices, colored);

    // Convert queued images to text documents before upload
    if !cli.no_ocr && !intake.images.is_empty() {
        let recognizer = Recognizer::new(&config.ocr_command, &config.ocr_languages);
        for image in &intake.images {
            let pb = spinner(format!("Recognizing {}...", image.display()));
            match recognizer.recognize(image) {
                Ok(document) => {
                    pb.finish_and_clear();
                    intake.queue.add(document);
                }
                Err(err) => {
                    pb.finish_and_clear();
                    eprintln!("Warning: {:#}", err);
                }
            }
        }
    }

    if intake.queue.is_empty() {
        anyhow::bail!("No supported files to analyze.");
    }

    // Upload and analyze
    let client = AnalyzeClient::new(&config.api_base, config.include_content)?;
    let documents: Vec<QueuedDocument> = intake.queue.iter().cloned().collect();

    let pb = spinner(format!("Analyzing {} file(s)...", documents.len()));
    let response = match client.analyze(&documents) {
        Ok(response) => {
            pb.finish_and_clear();
            response
        }
        Err(err) => {
            pb.finish_and_clear();
            return Err(err.into());
        }
    };

    let scored: Vec<(&FileReport, report::FileScore)> = response
        .files
        .iter()
        .map(|file| (file, report::score(file)))
        .collect();

    output::print_results(&scored, colored, &cli.format, config.max_suggestions);

    // Local export artifacts
    if let Some(path) = &cli.csv {
        report::write_csv(path, &scored)?;
        println!("CSV summary written to {}", path.display());
    }
    if let Some(dir) = &cli.report_dir {
        fs::create_dir_all(dir)?;
        for (file, score) in &scored {
            report::write_file_report(dir, file, *score)?;
        }
        println!("Reports written to {}", dir.display());
    }

    let total_issues: usize = scored
        .iter()
        .map(|(_, score)| score.spelling_issues + score.grammar_issues)
        .sum();

    if cli.fix {
        let total_applied = run_fix(&response.files, &intake.queue, &client, &cli, colored)?;
        output::print_fix_summary(total_applied, response.files.len(), colored);
    } else {
        output::print_check_summary(total_issues, response.files.len(), colored);
    }

    // Exit with appropriate code
    if total_issues > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}

fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Content { content_id } => {
            let client = AnalyzeClient::new(&config.api_base, false)?;
            let content = client.fetch_content(&content_id)?;
            println!("{}", content);
        }
    }
    Ok(())
}

/// Open an editor session per analyzed file and apply corrections, writing a
/// corrected document whenever at least one suggestion was taken.
fn run_fix(
    files: &[FileReport],
    queue: &FileQueue,
    client: &AnalyzeClient,
    cli: &Cli,
    colored: bool,
) -> Result<usize> {
    let out_dir = cli.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&out_dir)?;

    let mut total_applied = 0;

    for file in files {
        if file.error.is_some() || file.issues.is_empty() {
            continue;
        }

        let content = match resolve_content(file, queue, client) {
            Some(content) => content,
            None => {
                eprintln!(
                    "Warning: no text content available for {}; skipping",
                    file.id
                );
                continue;
            }
        };

        let mut session = Session::new(file.id.as_str(), content, &file.issues);

        let applied = if cli.interactive {
            println!("\n{}", output::render_segments(&session, colored));
            apply_interactive(&mut session, colored)?
        } else {
            session.apply_all()
        };

        total_applied += applied;
        if applied > 0 {
            let path = report::write_corrected(&out_dir, &session)?;
            println!("Corrected document written to {}", path.display());
        }
    }

    Ok(total_applied)
}

/// Walk pending issues in ascending start order, prompting for each one.
fn apply_interactive(session: &mut Session, colored: bool) -> Result<usize> {
    let mut ids: Vec<usize> = session
        .pending()
        .filter(|issue| !issue.suggestions.is_empty())
        .map(|issue| issue.id)
        .collect();
    ids.sort_by_key(|&id| {
        session
            .issues()
            .iter()
            .find(|issue| issue.id == id)
            .map_or(usize::MAX, |issue| issue.position.start)
    });

    let mut applied = 0;
    for id in ids {
        let issue = match session.issues().iter().find(|issue| issue.id == id) {
            Some(issue) => issue.clone(),
            None => continue,
        };
        if let Some(choice) = output::prompt_suggestion(&issue, colored)? {
            if session.apply(id, &choice) {
                applied += 1;
            }
        }
    }

    Ok(applied)
}

/// Content resolution order: inline content from the analysis response, then
/// the content endpoint, then the local file when it is plain text.
fn resolve_content(file: &FileReport, queue: &FileQueue, client: &AnalyzeClient) -> Option<String> {
    if let Some(content) = &file.content {
        return Some(content.clone());
    }
    if let Some(content_id) = &file.content_id {
        match client.fetch_content(content_id) {
            Ok(content) => return Some(content),
            Err(err) => eprintln!("Warning: {}", err),
        }
    }
    queue.get(&file.id).and_then(|doc| doc.local_text())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb
}
