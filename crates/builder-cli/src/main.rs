//! Page builder command-line host
//!
//! Opens a page file, replays a JSON command script against it, saves the result and optionally
//! prints an outline of the forest.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p builder-cli -- page.json --script edits.json --outline
//! ```
//!
//! A script is a JSON array of commands:
//!
//! ```json
//! [
//!   {"op": "add", "spec": {"type": "section"}},
//!   {"op": "add", "spec": {"type": "text", "props": {"text": "Hello"}}, "parent": "n-1"},
//!   {"op": "drop", "id": "n-2", "target": "dropzone-root-0"},
//!   {"op": "undo"}
//! ]
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use builder_core::{
    Autosave, AutosaveOutcome, BuilderConfig, BuilderError, CodeGenerator, Command,
    CommandResult, JsonFileGateway, OutlineGenerator, PageState, PageStore, SequentialIdGenerator,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "builder-cli")]
#[command(version, about = "Edit a page-builder document from the command line")]
struct Cli {
    /// Page file (JSON list of root components). Created on save if missing.
    page: PathBuf,

    /// JSON array of commands to replay against the page.
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// TOML configuration (history_limit, autosave_interval_ms).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generate ids as `<PREFIX>-1`, `<PREFIX>-2`, ... instead of UUIDs.
    #[arg(long, value_name = "PREFIX")]
    sequential_ids: Option<String>,

    /// Print the outline of the resulting page to stdout.
    #[arg(long)]
    outline: bool,

    /// Do not write the page back.
    #[arg(long)]
    dry_run: bool,
}

/// What a run did, for the final summary.
#[derive(Debug)]
struct Report {
    results: Vec<CommandResult>,
    saved: bool,
    state: PageState,
    outline: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: &Path) -> Result<BuilderConfig, BuilderError> {
    Ok(BuilderConfig::load(path)?)
}

fn load_script(path: &Path) -> Result<Vec<Command>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid script {}", path.display()))
}

fn run(cli: &Cli) -> Result<Report> {
    let config = match cli.config.as_deref() {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BuilderConfig::default(),
    };
    let mut store = match &cli.sequential_ids {
        Some(prefix) => {
            PageStore::with_id_generator(config.clone(), SequentialIdGenerator::new(prefix.clone()))
        }
        None => PageStore::new(config.clone()),
    };

    let mut gateway = JsonFileGateway::new(&cli.page);
    store
        .load(&mut gateway)
        .with_context(|| format!("failed to open page {}", gateway.path().display()))?;

    let mut results = Vec::new();
    if let Some(script) = &cli.script {
        let commands = load_script(script)?;
        tracing::info!(count = commands.len(), "replaying script");
        for (index, command) in commands.into_iter().enumerate() {
            let result = store
                .execute(command)
                .map_err(BuilderError::from)
                .with_context(|| format!("command #{index} failed"))?;
            if !result.is_applied() {
                tracing::warn!(index, "command had no effect");
            }
            results.push(result);
        }
    }

    let saved = if cli.dry_run {
        false
    } else {
        let mut autosave = Autosave::new(config.autosave_interval());
        tracing::debug!(interval_ms = autosave.interval().as_millis() as u64, "saving page");
        match autosave.tick(&mut store, &mut gateway, Instant::now()) {
            AutosaveOutcome::Saved => true,
            AutosaveOutcome::Clean | AutosaveOutcome::NotDue => false,
            AutosaveOutcome::Failed(err) => {
                anyhow::bail!("failed to save page {}: {err}", gateway.path().display())
            }
        }
    };

    let outline = cli
        .outline
        .then(|| OutlineGenerator::default().generate(&store.to_forest()));

    Ok(Report {
        results,
        saved,
        state: store.get_page_state(),
        outline,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let report = run(&cli)?;
    let applied = report.results.iter().filter(|r| r.is_applied()).count();
    tracing::info!(
        commands = report.results.len(),
        applied,
        nodes = report.state.node_count,
        saved = report.saved,
        "done"
    );

    if let Some(outline) = report.outline {
        print!("{outline}");
    }
    Ok(())
}
