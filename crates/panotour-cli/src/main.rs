//! Panotour CLI - Command line interface for panorama tours

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, config as config_cmd, edit, io, tour};
use config::Config;
use output::OutputFormat;
use panotour_storage::{DocumentStore, FileStore};

#[derive(Parser)]
#[command(name = "panotour")]
#[command(author, version, about = "Build and inspect panorama tour graphs")]
pub struct Cli {
    /// Data directory holding the tours
    #[arg(short, long, global = true)]
    pub data_dir: Option<String>,

    /// Output format: table, json
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a tour document
    Import(io::ImportArgs),
    /// Export a tour document
    Export(io::ExportArgs),
    /// List stored tours
    List,
    /// Show the group tree and counts of a tour
    Inspect(tour::InspectArgs),
    /// Check a tour for broken references
    Validate(tour::ValidateArgs),
    /// Connect two vertices with an edge
    Connect(edit::ConnectArgs),
    /// Delete a vertex, edge or group
    Delete(edit::DeleteArgs),
    /// Manage configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with the document store
pub struct AppContext {
    pub store: Arc<FileStore>,
    pub config: Config,
}

impl AppContext {
    pub async fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config = Config::load();
        let data_dir = cli
            .data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| config.data_dir());
        tracing::debug!("Using data directory: {:?}", data_dir);

        let store = FileStore::new(data_dir);
        store.initialize().await?;

        Ok(Self {
            store: Arc::new(store),
            config,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting panotour CLI");

    // These don't touch the store
    match &cli.command {
        Commands::Config(args) => return config_cmd::run(args, cli.output_format()),
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let ctx = AppContext::new(&cli).await?;

    match &cli.command {
        Commands::Import(args) => io::run_import(args, &cli, &ctx).await?,
        Commands::Export(args) => io::run_export(args, &cli, &ctx).await?,
        Commands::List => tour::run_list(&cli, &ctx).await?,
        Commands::Inspect(args) => tour::run_inspect(args, &cli, &ctx).await?,
        Commands::Validate(args) => tour::run_validate(args, &cli, &ctx).await?,
        Commands::Connect(args) => edit::run_connect(args, &cli, &ctx).await?,
        Commands::Delete(args) => edit::run_delete(args, &cli, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    Ok(())
}
