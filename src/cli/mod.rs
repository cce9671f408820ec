//! Command line interface for cachedhash.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// cachedhash - compute-or-cache keyed by normalized parameters.
#[derive(Parser, Debug)]
#[command(name = "cachedhash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "cachedhash.toml")]
    pub config: PathBuf,

    /// Verbose mode.
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode.
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Cache key parameters shared by the key-based commands.
#[derive(Args, Debug, Clone)]
pub struct ParamArgs {
    /// Arguments equal to this token are treated as null parameters.
    #[arg(long)]
    pub null_token: Option<String>,

    /// Query parameters, in order.
    pub params: Vec<String>,
}

impl ParamArgs {
    /// Maps the raw arguments to optional parameters.
    pub fn to_params(&self) -> Vec<Option<String>> {
        self.params
            .iter()
            .map(|p| match &self.null_token {
                Some(token) if p == token => None,
                _ => Some(p.clone()),
            })
            .collect()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Writes a default configuration file.
    Init {
        /// Target directory (default: current directory).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Prints the cache key for the given parameters.
    Key {
        #[command(flatten)]
        params: ParamArgs,

        /// Also print the normalized material that gets hashed.
        #[arg(long)]
        material: bool,
    },

    /// Prints the cached value for the given parameters.
    Get {
        #[command(flatten)]
        params: ParamArgs,
    },

    /// Prints the cached output of a command, running it on a miss.
    Run {
        #[command(flatten)]
        params: ParamArgs,

        /// Command to run on a miss (after `--`).
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Removes the cached value for the given parameters.
    Remove {
        #[command(flatten)]
        params: ParamArgs,
    },

    /// Lists stored entries.
    List,

    /// Shows version.
    Version,
}
