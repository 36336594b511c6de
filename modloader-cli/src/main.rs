use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "modloader", about = "Discover, inspect and load mods")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Mods directory (defaults to $MODLOADER_MODS_DIR or ./Mods)
    #[arg(long, global = true)]
    mods_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered mods
    List,
    /// Show mod details
    Info {
        /// Mod id
        id: String,
    },
    /// Enable a mod
    Enable {
        /// Mod id to enable
        id: String,
    },
    /// Disable a mod
    Disable {
        /// Mod id to disable
        id: String,
    },
    /// Load every mod and report the result
    Start,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mods_dir = cli.mods_dir.unwrap_or_else(modloader_paths::mods_dir);
    tracing::debug!(mods_dir = %mods_dir.display(), "Using mods directory");

    match cli.command {
        Commands::List => commands::mods::list(&mods_dir),
        Commands::Info { id } => commands::mods::info(&mods_dir, &id),
        Commands::Enable { id } => commands::mods::set_enabled(&mods_dir, &id, true),
        Commands::Disable { id } => commands::mods::set_enabled(&mods_dir, &id, false),
        Commands::Start => commands::mods::start(&mods_dir),
    }
}
