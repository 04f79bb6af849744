//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "ragbot")]
#[command(about = "Retrieval-augmented question answering over a local document set")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, falling back to config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS (also enabled by server.enable_cors)
        #[arg(long)]
        cors: bool,
    },
    /// Answer a single question and print the result
    Ask {
        /// The question to answer
        question: String,
        /// Print the sources the answer was grounded on
        #[arg(long)]
        sources: bool,
    },
    /// Build and persist the similarity index without answering
    Index,
    /// Create the audit tables
    Init,
    /// Generate a new API key and the secret to put in the config file
    Keygen,
}
