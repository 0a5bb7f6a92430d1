//! cfs: categorised markdown documents kept in step with GitHub issues.
//!
//! # Usage
//!
//! ```text
//! cfs init
//! cfs create <category> <title> [--content <text>]
//! cfs list [category] [--json]
//! cfs show <category> <id>
//! cfs complete <category> <id>
//! cfs delete <category> <id> [--yes]
//! cfs link <category> <id> <issue>
//! cfs unlink <category> <id>
//! cfs status [--include <cat>]... [--exclude <cat>]... [--diff] [--json]
//! cfs sync [--dry-run] [--include <cat>]... [--exclude <cat>]...
//! ```
//!
//! Global flags: `--root <path>` (default: nearest ancestor holding `.cfs/`),
//! `--verbose`.

mod commands;
mod prompt;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    create::CreateArgs,
    docs::{CompleteArgs, DeleteArgs, ListArgs, ShowArgs},
    init::InitArgs,
    link::{LinkArgs, UnlinkArgs},
    status::StatusArgs,
    sync::SyncArgs,
    Global,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "cfs",
    version,
    about = "Manage categorised markdown documents and sync them with GitHub issues",
    long_about = None,
)]
struct Cli {
    /// Project root (directory containing `.cfs/`).
    #[arg(long, global = true, value_name = "PATH")]
    root: Option<PathBuf>,

    /// Show debug logging on stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create `.cfs/` and every category directory.
    Init(InitArgs),

    /// Create a new document with the next free id.
    Create(CreateArgs),

    /// List documents.
    List(ListArgs),

    /// Print a document.
    Show(ShowArgs),

    /// Mark a document as done.
    Complete(CompleteArgs),

    /// Delete a document.
    Delete(DeleteArgs),

    /// Link a document to an existing GitHub issue.
    Link(LinkArgs),

    /// Remove a document's GitHub issue link.
    Unlink(UnlinkArgs),

    /// Show what sync would do.
    Status(StatusArgs),

    /// Reconcile documents with GitHub issues.
    Sync(SyncArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let global = Global { root: cli.root };
    match cli.command {
        Commands::Init(args) => args.run(&global),
        Commands::Create(args) => args.run(&global),
        Commands::List(args) => args.run(&global),
        Commands::Show(args) => args.run(&global),
        Commands::Complete(args) => args.run(&global),
        Commands::Delete(args) => args.run(&global),
        Commands::Link(args) => args.run(&global),
        Commands::Unlink(args) => args.run(&global),
        Commands::Status(args) => args.run(&global),
        Commands::Sync(args) => args.run(&global),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
