//! Stockpile CLI
//!
//! Command-line inventory tracker backed by a versioned file in a hosted
//! repository. Works fully offline; mutations queue locally and replay on
//! the next sync.
//!
//! # Commands
//!
//! - `add` / `edit` / `remove` - Mutate the collection
//! - `list` / `search` / `stats` - Read-only views
//! - `sync` / `status` - Drive and inspect synchronization
//! - `export` / `import` - Backup envelopes
//! - `delete-all` - Wipe the collection (requires `--yes`)

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use stockpile_engine::{FileLocalStore, InventoryService, SyncOrchestrator};
use stockpile_remote::{GitHubHost, RemoteConfig, RemoteStore};
use tracing_subscriber::EnvFilter;

pub(crate) type Service = InventoryService<GitHubHost>;

/// Offline-first inventory tracker.
#[derive(Parser)]
#[command(name = "stockpile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory for local state files
    #[arg(global = true, long, default_value = ".stockpile")]
    data_dir: PathBuf,

    /// Work offline; mutations queue for a later sync
    #[arg(global = true, long)]
    offline: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Repository owner
    #[arg(global = true, long, env = "STOCKPILE_OWNER")]
    owner: Option<String>,

    /// Repository name
    #[arg(global = true, long, env = "STOCKPILE_REPO")]
    repo: Option<String>,

    /// API token
    #[arg(global = true, long, env = "STOCKPILE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Path of the inventory file inside the repository
    #[arg(global = true, long)]
    file_path: Option<String>,

    /// Branch holding the inventory file
    #[arg(global = true, long)]
    branch: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an item
    Add {
        /// Item name
        name: String,

        /// Stock count
        #[arg(short, long, default_value = "1")]
        quantity: u32,

        /// Grouping label
        #[arg(short, long)]
        group: String,

        /// Physical location label
        #[arg(short, long)]
        location: String,

        /// Free-form details
        #[arg(short, long)]
        details: Option<String>,
    },

    /// Edit an item's fields
    Edit {
        /// Item id
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New stock count
        #[arg(short, long)]
        quantity: Option<u32>,

        /// New grouping label
        #[arg(short, long)]
        group: Option<String>,

        /// New location label
        #[arg(short, long)]
        location: Option<String>,

        /// New details (empty string clears)
        #[arg(short, long)]
        details: Option<String>,
    },

    /// Remove an item
    Remove {
        /// Item id
        id: String,
    },

    /// List all items
    List,

    /// Search names and details
    Search {
        /// Substring to look for (case-insensitive)
        term: String,
    },

    /// Summarize the collection
    Stats,

    /// Run one sync cycle
    Sync,

    /// Show sync status
    Status,

    /// Export a backup envelope
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Restore from a backup envelope
    Import {
        /// Backup file to read
        input: PathBuf,
    },

    /// Delete every item, remotely and locally
    DeleteAll {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if matches!(cli.command, Commands::Version) {
        println!("stockpile {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let service = build_service(&cli)?;
    if cli.offline {
        service.set_online(false);
    }
    service.load()?;

    match cli.command {
        Commands::Add {
            name,
            quantity,
            group,
            location,
            details,
        } => commands::add::run(&service, &name, quantity, &group, &location, details)?,
        Commands::Edit {
            id,
            name,
            quantity,
            group,
            location,
            details,
        } => commands::edit::run(&service, &id, name, quantity, group, location, details)?,
        Commands::Remove { id } => commands::remove::run(&service, &id)?,
        Commands::List => commands::list::run(&service)?,
        Commands::Search { term } => commands::search::run(&service, &term)?,
        Commands::Stats => commands::stats::run(&service)?,
        Commands::Sync => commands::sync::run(&service)?,
        Commands::Status => commands::status::run(&service)?,
        Commands::Export { output } => commands::backup::export(&service, output.as_deref())?,
        Commands::Import { input } => commands::backup::import(&service, &input)?,
        Commands::DeleteAll { yes } => commands::delete_all::run(&service, yes)?,
        Commands::Version => {}
    }

    Ok(())
}

fn build_service(cli: &Cli) -> Result<Service, Box<dyn std::error::Error>> {
    let owner = required(&cli.owner, "--owner", "STOCKPILE_OWNER", cli.offline)?;
    let repo = required(&cli.repo, "--repo", "STOCKPILE_REPO", cli.offline)?;
    let token = required(&cli.token, "--token", "STOCKPILE_TOKEN", cli.offline)?;

    let mut config = RemoteConfig::new(owner, repo, token);
    if let Some(path) = &cli.file_path {
        config = config.with_path(path);
    }
    if let Some(branch) = &cli.branch {
        config = config.with_branch(branch);
    }

    let remote = RemoteStore::new(GitHubHost::new(config)?);
    let local = Arc::new(FileLocalStore::new(&cli.data_dir)?);
    Ok(InventoryService::with_orchestrator(SyncOrchestrator::new(
        remote, local,
    )))
}

fn required(
    value: &Option<String>,
    flag: &str,
    env: &str,
    offline: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    match value {
        Some(v) => Ok(v.clone()),
        // Offline never talks to the host, so credentials are optional.
        None if offline => Ok(String::new()),
        None => Err(format!("{flag} (or {env}) is required").into()),
    }
}
