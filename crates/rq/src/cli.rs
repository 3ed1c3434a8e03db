//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the rq CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// rq - search a spaced-repetition card collection
#[derive(Parser, Debug)]
#[command(name = "rq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (log compiled queries and skipped values)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Card file to search (default: from config, then the XDG data dir)
    #[arg(long, global = true, env = "RQ_CARDS")]
    pub cards: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search cards
    #[command(alias = "s")]
    Search {
        /// Query, e.g. `deck:japanese is:due sortBy:srsLevel`
        ///
        /// Quote the query, or put it after `--`, when a term starts with `-`.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Sort field when the query has no sortBy (default: deck)
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending when the query has no sortBy
        #[arg(long)]
        desc: bool,

        /// Skip this many matches
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Maximum number of matches to show (default: 10)
        #[arg(long, conflicts_with = "all")]
        limit: Option<usize>,

        /// Show all matches (no limit)
        #[arg(long)]
        all: bool,
    },

    /// Show how a query is compiled
    #[command(alias = "p")]
    Parse {
        /// Query to compile
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Key, e.g. `cards` or `search.sort_by`
        key: String,
        /// Value
        value: String,
    },

    /// Print the config file path
    Path,
}

/// Shell types for completions
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}
