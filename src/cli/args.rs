// src/cli/args.rs
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A bookmark manager for the terminal.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Database to operate on, by name.
    #[arg(long = "name", global = true)]
    pub name: Option<String>,

    /// Sets a custom config file.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Overwrite/skip confirmations where the command supports it.
    #[arg(long, global = true)]
    pub force: bool,

    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Repeat for more verbose logging.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum ColorMode {
    Always,
    Never,
    Auto,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List or query records.
    Records {
        /// Full-text query across title/url/desc/tags.
        query: Option<String>,

        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Manage named databases.
    Database {
        #[command(subcommand)]
        action: DatabaseAction,
    },

    /// Create, list, or prune backups.
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },

    /// Import bookmarks from an external source.
    Import {
        #[command(subcommand)]
        source: ImportSource,
    },

    /// Delete databases or backups.
    Remove {
        target: String,
    },

    /// Show or set configuration values.
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Print the version.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum DatabaseAction {
    Create { name: String },
    List,
    Drop { name: String },
    Lock { name: String },
    Unlock { name: String },
}

#[derive(Subcommand, Debug)]
pub enum BackupAction {
    Create,
    List,
    Prune,
}

#[derive(Subcommand, Debug)]
pub enum ImportSource {
    Browser,
    Database { path: PathBuf },
    Git { url: String, name: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    Show,
    Set { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_well_formed() {
        Cli::command().debug_assert();
    }
}
