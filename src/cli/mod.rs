//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "modlinker",
    version,
    about = "Workshop link bot: turns link requests in comments into result replies",
    long_about = "Modlinker recognizes link requests such as \"linkmod: Colony Manager\" in comment \
                  text, searches the Steam Workshop for each request and replies with the results \
                  formatted as reddit markdown."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/modlinker/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the link requests recognized in a text
    Parse {
        /// Comment text
        text: String,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Search the workshop directly
    Search {
        /// Search query text
        query: String,

        /// Number of results to return
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Search scenarios instead of mods
        #[arg(long)]
        scenario: bool,

        /// Game version, either dotted ("1.0") or alpha digits ("18")
        #[arg(long)]
        version: Option<String>,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Build the replies for a text without posting them
    Reply {
        /// Comment text
        text: String,
    },

    /// Answer a stream of JSON-lines comments, printing the replies
    Run {
        /// Comment file (defaults to stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Show analytics counts
    Stats {
        /// Number of most requested results to list
        #[arg(short, long, default_value = "5")]
        top: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
