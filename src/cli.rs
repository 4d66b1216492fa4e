//! CLI definitions for mnemo.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// mnemo CLI.
#[derive(Parser)]
#[command(name = "mnemo")]
#[command(about = "Hybrid retrieval engine and TTL session cache")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.mnemo/config.toml)
    #[arg(short, long, global = true, env = "MNEMO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Embed and store a document or conversation turn
    Add {
        /// Text to store
        text: String,

        /// Owning source file or conversation id
        #[arg(short, long, default_value = "cli")]
        scope: String,
    },

    /// Nearest documents by embedding distance
    Search {
        query: String,

        /// Number of results (default: retrieval.default_top_k)
        #[arg(short)]
        k: Option<usize>,

        /// Only return documents owned by this scope
        #[arg(short, long)]
        scope: Option<String>,
    },

    /// Vector results merged with substring matches
    Hybrid {
        query: String,

        /// Number of results (default: retrieval.default_top_k)
        #[arg(short)]
        k: Option<usize>,

        /// Rank with reciprocal rank fusion and print scores
        #[arg(long)]
        ranked: bool,

        /// Weight of vector results in ranked mode (0.0 - 1.0)
        #[arg(long, default_value_t = 0.5, requires = "ranked")]
        alpha: f32,
    },

    /// Delete every stored document
    Clear,

    /// Index snapshot commands
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Key-value cache commands
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum SnapshotAction {
    /// Write vectors.bin and metadata.json
    Save {
        /// Snapshot directory (default: retrieval.snapshot_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Load a snapshot into an empty store
    Import {
        /// Snapshot directory (default: retrieval.snapshot_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub(crate) enum CacheAction {
    /// Store a value (JSON, or taken as a plain string)
    Set {
        key: String,
        value: String,

        /// Lifetime in seconds (default: cache.default_ttl_secs)
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Print a live value as JSON
    Get { key: String },

    /// Remove a key
    Delete { key: String },

    /// Remove every key
    Clear,
}
