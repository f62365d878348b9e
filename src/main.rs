//! `topodot`: render topology documents as Graphviz DOT.
//!
//! DOT goes to stdout (or `-o`); logs go to stderr.

mod config;
mod document;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::task::JoinSet;

use config::{CliConfig, ConfigError, Overrides};
use topology::{Diagnostic, GenerateError, Generated, Kind, NodeIdMap, RankDir, RenderOptions};

#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("{count} diagnostic(s) reported and --deny-warnings is set")]
    DeniedWarnings { count: usize },
    #[error("{failed} of {total} document(s) failed to render")]
    BatchFailed { failed: usize, total: usize },
}

#[derive(Parser, Debug)]
#[command(name = "topodot", version, about = "Render rack, site and server topology documents as Graphviz DOT")]
struct Cli {
    /// Graph name after `digraph` (env: TOPODOT_GRAPH_NAME).
    #[arg(long, global = true)]
    graph_name: Option<String>,

    /// Layout direction: TB, LR, BT or RL (env: TOPODOT_RANKDIR).
    #[arg(long, global = true)]
    rankdir: Option<RankDir>,

    /// Font for graph, node and edge text (env: TOPODOT_FONT).
    #[arg(long, global = true)]
    font: Option<String>,

    /// Leave port nodes out of rack clusters.
    #[arg(long, global = true)]
    no_ports: bool,

    /// More logging: -v for debug, -vv for trace.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Exit non-zero when any diagnostic is reported.
    #[arg(long, global = true)]
    deny_warnings: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            graph_name: self.graph_name.clone(),
            rankdir: self.rankdir,
            font: self.font.clone(),
            no_ports: self.no_ports,
            verbose: self.verbose,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one document.
    Render(RenderArgs),
    /// Print the detected schema kind of a document.
    Classify(ClassifyArgs),
    /// Render many documents concurrently into a directory.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    input: PathBuf,

    /// Write DOT here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the node-id map and diagnostics as JSON.
    #[arg(long)]
    id_map: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    input: PathBuf,
}

#[derive(Args, Debug)]
struct BatchArgs {
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory receiving `{stem}.dot` and `{stem}.ids.json`.
    #[arg(long, env = "TOPODOT_OUT_DIR")]
    out_dir: PathBuf,
}

/// JSON written next to the DOT output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdMapReport<'a> {
    kind: Kind,
    node_ids: &'a NodeIdMap,
    diagnostics: &'a [Diagnostic],
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = CliConfig::from_env()?.with_overrides(cli.overrides());

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();

    let options = config.render_options();
    match cli.command {
        Command::Render(args) => render(args, &options, cli.deny_warnings).await,
        Command::Classify(args) => {
            let document = document::load(&args.input).await?;
            println!("{}", topology::classify(&document));
            Ok(())
        }
        Command::Batch(args) => batch(args, &options, cli.deny_warnings).await,
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn render(args: RenderArgs, options: &RenderOptions, deny_warnings: bool) -> Result<(), CliError> {
    let document = document::load(&args.input).await?;
    let generated = topology::generate(&document, options)?;

    match &args.output {
        Some(path) => write(path, &generated.dot).await?,
        None => print!("{}", generated.dot),
    }
    if let Some(path) = &args.id_map {
        write(path, &id_map_json(&generated)?).await?;
    }

    tracing::info!(
        input = %args.input.display(),
        kind = %generated.kind,
        nodes = generated.node_ids.len(),
        diagnostics = generated.diagnostics.len(),
        "rendered"
    );
    check_warnings(generated.diagnostics.len(), deny_warnings)
}

async fn batch(args: BatchArgs, options: &RenderOptions, deny_warnings: bool) -> Result<(), CliError> {
    tokio::fs::create_dir_all(&args.out_dir)
        .await
        .map_err(|source| CliError::Write { path: args.out_dir.clone(), source })?;

    let mut tasks = JoinSet::new();
    for input in args.inputs {
        let options = options.clone();
        let out_dir = args.out_dir.clone();
        tasks.spawn(async move {
            let result = render_into(&input, &out_dir, options).await;
            (input, result)
        });
    }

    let total = tasks.len();
    let mut failed = 0;
    let mut warnings = 0;
    while let Some(joined) = tasks.join_next().await {
        let (input, result) = joined?;
        match result {
            Ok(generated) => {
                warnings += generated.diagnostics.len();
                tracing::info!(
                    input = %input.display(),
                    kind = %generated.kind,
                    nodes = generated.node_ids.len(),
                    diagnostics = generated.diagnostics.len(),
                    "rendered"
                );
            }
            Err(e) => {
                failed += 1;
                tracing::error!(input = %input.display(), error = %e, "render failed");
            }
        }
    }

    if failed > 0 {
        return Err(CliError::BatchFailed { failed, total });
    }
    tracing::info!(total, out_dir = %args.out_dir.display(), "batch complete");
    check_warnings(warnings, deny_warnings)
}

/// Load, generate on the blocking pool, then write both outputs.
async fn render_into(input: &Path, out_dir: &Path, options: RenderOptions) -> Result<Generated, CliError> {
    let document = document::load(input).await?;
    let generated = tokio::task::spawn_blocking(move || topology::generate(&document, &options)).await??;

    let stem = input
        .file_stem()
        .map_or_else(|| "topology".to_string(), |s| s.to_string_lossy().into_owned());
    write(&out_dir.join(format!("{stem}.dot")), &generated.dot).await?;
    write(&out_dir.join(format!("{stem}.ids.json")), &id_map_json(&generated)?).await?;
    Ok(generated)
}

// =============================================================================
// HELPERS
// =============================================================================

fn id_map_json(generated: &Generated) -> Result<String, CliError> {
    let report = IdMapReport {
        kind: generated.kind,
        node_ids: &generated.node_ids,
        diagnostics: &generated.diagnostics,
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}

async fn write(path: &Path, contents: &str) -> Result<(), CliError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| CliError::Write { path: path.to_path_buf(), source })
}

fn check_warnings(count: usize, deny_warnings: bool) -> Result<(), CliError> {
    if deny_warnings && count > 0 {
        return Err(CliError::DeniedWarnings { count });
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
