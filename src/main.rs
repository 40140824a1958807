//! CommitCraft - AI-assisted commit and release messages in your terminal.
//!
//! Running `commitcraft` inside a git repository opens the commit wizard;
//! `commitcraft --release` opens the release wizard. The chosen message is
//! printed to stdout once the terminal is restored.

#![allow(clippy::single_match_else)]

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commitcraft::ai::{AiPipeline, GroqClient};
use commitcraft::core::{Config, ConfigPaths, CredentialStore, RecordStore, SqliteStore};
use commitcraft::git::GitResolver;
use commitcraft::{tui, App, AppMode, APP_NAME};

/// AI-assisted commit and release messages
#[derive(Parser)]
#[command(name = "commitcraft")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Open the release wizard instead of the commit wizard
    #[arg(short, long)]
    release: bool,

    /// Print the global configuration file path and exit
    #[arg(long)]
    config_path: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the saved messages of the current repository
    History {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// List releases instead of commits
        #[arg(long)]
        releases: bool,
    },

    /// Show the resolved configuration
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if cli.config_path {
        let cwd = current_dir()?;
        let paths = ConfigPaths::discover(&cwd)?;
        println!("{}", paths.global.display());
        return Ok(());
    }

    match cli.command {
        None => {
            let mode = if cli.release { AppMode::Release } else { AppMode::Commit };
            cmd_run(mode)?;
        }
        Some(Commands::History { format, releases }) => {
            cmd_history(format, releases)?;
        }
        Some(Commands::Config) => {
            cmd_config()?;
        }
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

/// Log to `<data_dir>/commitcraft/commitcraft.log`; the TUI owns the
/// terminal. Falls back to stderr at `warn` when the file cannot be opened.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match open_log_file() {
        Some(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(false).with_ansi(false).with_writer(Mutex::new(file)))
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(false).with_writer(io::stderr))
                .with(EnvFilter::new("warn"))
                .init();
        }
    }
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = Config::data_dir()?;
    std::fs::create_dir_all(&dir).ok()?;
    OpenOptions::new().create(true).append(true).open(dir.join(format!("{APP_NAME}.log"))).ok()
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("failed to read the current directory")
}

/// Root of the repository containing `cwd`.
fn workspace_root(cwd: &Path) -> Result<PathBuf> {
    GitResolver::system(cwd)
        .resolve_root()
        .context("commitcraft has to be run inside a git repository")
}

/// Open the interactive wizard.
fn cmd_run(mode: AppMode) -> Result<()> {
    let cwd = current_dir()?;
    let paths = ConfigPaths::discover(&cwd)?;
    let config = Config::load_with(&paths).context("failed to load configuration")?;

    let root = workspace_root(&cwd)?;
    let resolver = Arc::new(GitResolver::system(&root));

    let db_path = SqliteStore::default_path()?;
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open the database at {}", db_path.display()))?;

    let transport = Arc::new(GroqClient::new(config.ai.base_url.clone()));
    let pipeline = Arc::new(AiPipeline::new(transport, config.prompts.clone()));

    tracing::info!(workspace = %root.display(), ?mode, "starting wizard");
    let app = App::new(
        config,
        mode,
        root,
        Box::new(store),
        resolver,
        CredentialStore::new(paths.env_file),
    )?;

    if let Some(message) = tui::run_tui(app, pipeline)? {
        println!("{message}");
    }

    Ok(())
}

/// Print the saved commits (or releases) of the current repository.
fn cmd_history(format: OutputFormat, releases: bool) -> Result<()> {
    let cwd = current_dir()?;
    let config = Config::load(&cwd).context("failed to load configuration")?;
    let root = workspace_root(&cwd)?;
    let workspace = root.to_string_lossy().into_owned();
    let store = SqliteStore::open(&SqliteStore::default_path()?)?;

    if releases {
        let records = store.list_releases(&workspace)?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
            OutputFormat::Text => {
                for release in &records {
                    println!(
                        "#{:<4} {} {:<6} {}",
                        release.id,
                        release.created_at.format("%Y-%m-%d"),
                        release.release_type,
                        release.title
                    );
                }
                println!("\nTotal: {} releases", records.len());
            }
        }
        return Ok(());
    }

    let records = store.list_commits(&workspace)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Text => {
            for commit in &records {
                let message =
                    config.final_commit_message(&commit.commit_type, &commit.scope, &commit.message_translated);
                let first_line = message.lines().next().unwrap_or_default();
                println!("#{:<4} {} {}", commit.id, commit.created_at.format("%Y-%m-%d"), first_line);
            }
            println!("\nTotal: {} commits", records.len());
        }
    }

    Ok(())
}

/// Show the resolved configuration.
fn cmd_config() -> Result<()> {
    let cwd = current_dir()?;
    let config = Config::load(&cwd).context("failed to load configuration")?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
}
