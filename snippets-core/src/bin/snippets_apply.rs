//! Snippets Apply CLI - run a render pass from the command line
//!
//! Reads rendered markup, a snippet export and a page description, and
//! prints the markup with all applicable snippets injected.
//!
//! Usage:
//!     snippets-apply page.html --snippets snippets.json --page page.json
//!     cat page.html | snippets-apply - --snippets snippets.json --page page.json
//!     snippets-apply page.html -s snippets.json -p page.json --json -v

use clap::Parser;
use snippets_core::{EngineConfig, JsonPage, PassReport, SnapshotLoader, SnippetEngine};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "snippets-apply")]
#[command(about = "Inject markup snippets into a rendered page")]
#[command(version)]
struct Args {
    /// Markup file to process (`-` reads standard input)
    markup: PathBuf,

    /// Snippet definitions (JSON array or `{ "snippets": [...] }`)
    #[arg(short, long)]
    snippets: PathBuf,

    /// Page fields as a JSON object
    #[arg(short, long)]
    page: PathBuf,

    /// Engine configuration JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load definitions without validating them
    #[arg(long)]
    no_validate: bool,

    /// Print the full pass report as JSON instead of the markup
    #[arg(long)]
    json: bool,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "snippets_core=debug"
    } else {
        "snippets_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let engine = match &args.config {
        Some(path) => EngineConfig::from_file(path).and_then(SnippetEngine::with_config),
        None => Ok(SnippetEngine::new()),
    };
    let engine = match engine {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let mut loader = SnapshotLoader::new();
    if args.no_validate {
        loader = loader.skip_validation();
    }
    let snapshot = match loader.load_from_file(&args.snippets) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading snippets: {}", e);
            std::process::exit(1);
        }
    };

    let page = match load_page(&args.page) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            eprintln!("Error loading page: {}", e);
            std::process::exit(1);
        }
    };

    let markup = match read_markup(&args.markup) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error reading markup: {}", e);
            std::process::exit(1);
        }
    };

    if args.verbose {
        eprintln!("Snippets: {} enabled", snapshot.len());
        eprintln!("Markup: {} bytes", markup.len());
        eprintln!();
    }

    let report = engine.apply_all_with_report(&markup, &page, &snapshot);

    if args.json {
        output_json(&report);
    } else {
        print!("{}", report.markup);
        for warning in &report.warnings {
            eprintln!("warning: snippet {}: {}", warning.snippet_id, warning.message);
        }
    }
}

fn load_page(path: &Path) -> Result<JsonPage, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read page file: {}", e))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse page JSON: {}", e))?;
    if !value.is_object() {
        return Err("Page JSON must be an object".to_string());
    }
    Ok(JsonPage::from_value(value))
}

fn read_markup(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut markup = String::new();
        std::io::stdin()
            .read_to_string(&mut markup)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        return Ok(markup);
    }
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read markup file: {}", e))
}

fn output_json(report: &PassReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing report: {}", e);
            std::process::exit(1);
        }
    }
}
