use clap::{Parser, Subcommand};
use segcat_parser::SafeMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "segcat")]
#[command(author, version, about = "Inspect concat segment lists and their virtual timeline")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a descriptor and print its timeline
    Timeline {
        /// Descriptor to parse
        #[arg(required = true)]
        script: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Safe-filename mode (auto, on, off); overrides the config file
        #[arg(long)]
        safe: Option<SafeMode>,
    },

    /// Show which segment a seek to a timeline position selects
    Locate {
        /// Descriptor to parse
        #[arg(required = true)]
        script: PathBuf,

        /// Timeline position, e.g. 25, 1:30 or 1500ms
        #[arg(required = true, allow_hyphen_values = true)]
        time: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a file is a versioned concat descriptor
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
