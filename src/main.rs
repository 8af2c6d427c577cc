use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scripture_quiz::cache::{AssetRequest, FetchSource, InstallOutcome};
use scripture_quiz::config::{self, ConfigOverrides};

const DEFAULT_FILTER: &str = "scripture_quiz=info";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON content pack used when no API key is set
    #[arg(long)]
    content: Option<PathBuf>,

    /// Where the interactive app writes its log
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Directory holding the offline asset caches
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the offline asset cache
    #[command(subcommand)]
    Assets(AssetsCommand),
}

#[derive(Subcommand, Debug)]
enum AssetsCommand {
    /// Install the current cache version and drop older ones
    Sync,
    /// List cache generations
    List,
    /// Fetch a URL through the cache
    Fetch { url: String },
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// The TUI owns stdout, so interactive runs log to a file.
fn init_file_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_assets(config: config::Config, command: AssetsCommand) -> anyhow::Result<()> {
    let handle = scripture_quiz::open_asset_cache(&config).await?;

    match command {
        AssetsCommand::Sync => {
            match handle.install().await? {
                InstallOutcome::Installed { assets } => {
                    println!("Installed {} ({assets} assets)", config.manifest.version)
                }
                InstallOutcome::AlreadyInstalled => {
                    println!("{} already installed", config.manifest.version)
                }
            }
            for name in handle.activate().await? {
                println!("Deleted {name}");
            }
        }
        AssetsCommand::List => {
            let caches = handle.list().await?;
            if caches.is_empty() {
                println!("No caches in {}", config.cache_dir.display());
            }
            for (name, active) in caches {
                let marker = if active { "*" } else { " " };
                println!("{marker} {name}");
            }
        }
        AssetsCommand::Fetch { url } => {
            let fetched = handle.fetch(AssetRequest::get(url)).await?;
            let source = match fetched.source {
                FetchSource::Cache => "cache",
                FetchSource::Network => "network",
                FetchSource::Passthrough => "network, not cached",
            };
            println!(
                "{} {} bytes from {source} ({})",
                fetched.response.status,
                fetched.response.body.len(),
                fetched.response.content_type.as_deref().unwrap_or("unknown type")
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let path = args.config.clone().or_else(config::default_config_path);
    let mut config = config::load_config_from_path(path.as_deref())?;
    ConfigOverrides {
        content_file: args.content,
        log_file: args.log_file,
        cache_dir: args.cache_dir,
    }
    .apply(&mut config);

    match args.command {
        Some(Command::Assets(command)) => {
            init_stderr_logging();
            run_assets(config, command).await
        }
        None => {
            init_file_logging(&config.log_file)?;
            scripture_quiz::run(config).await?;
            Ok(())
        }
    }
}
