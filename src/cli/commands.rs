//! CLI commands and argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// AO transaction-history harvester CLI
#[derive(Parser, Debug)]
#[command(name = "ao-harvest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl an entity's full transaction history to a JSON file
    Fetch {
        /// Entity (wallet or process) id
        entity_id: String,

        /// Query type (e.g. received, sent, transfer, token_transfers)
        #[arg(short, long, default_value = "received")]
        query_type: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Checkpoint file for resumable crawls
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Records between checkpoint saves
        #[arg(long, default_value = "100")]
        checkpoint_step: usize,

        /// Maximum records to fetch
        #[arg(long)]
        max_records: Option<usize>,

        /// Window start, unix seconds or "YYYY-MM-DD HH:MM:SS" UTC
        #[arg(long)]
        min_ingested_at: Option<String>,

        /// Window end, unix seconds or "YYYY-MM-DD HH:MM:SS" UTC
        #[arg(long)]
        max_ingested_at: Option<String>,

        /// Minimum block height
        #[arg(long)]
        min_block: Option<i64>,

        /// Maximum block height
        #[arg(long)]
        max_block: Option<i64>,

        /// Drop records whose block is not yet confirmed
        #[arg(long)]
        final_only: bool,

        /// Process id, required for token_transfers_from_process
        #[arg(long)]
        from_process: Option<String>,

        /// Page size for the first request
        #[arg(long)]
        initial_batch_size: Option<usize>,

        /// Upper bound on the page size
        #[arg(long)]
        max_batch_size: Option<usize>,
    },

    /// Probe the total matching count without crawling
    Count {
        /// Entity (wallet or process) id
        entity_id: String,

        /// Query type
        #[arg(short, long, default_value = "received")]
        query_type: String,

        /// Window start, unix seconds or "YYYY-MM-DD HH:MM:SS" UTC
        #[arg(long)]
        min_ingested_at: Option<String>,

        /// Window end, unix seconds or "YYYY-MM-DD HH:MM:SS" UTC
        #[arg(long)]
        max_ingested_at: Option<String>,

        /// Process id, required for token_transfers_from_process
        #[arg(long)]
        from_process: Option<String>,
    },

    /// Aggregate statistics over a saved crawl result
    Stats {
        /// Records file produced by `fetch` (JSON array of edges)
        input: PathBuf,

        /// Which report to compute
        #[arg(short, long, default_value = "all")]
        report: Report,
    },
}

/// Output format for command results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Human-readable text
    Text,
}

/// Statistics reports available from `stats`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Report {
    /// Every report below
    All,
    /// Ticket sales from Quantity tags
    Tickets,
    /// Catch-type tallies
    Catches,
    /// Chat-message count
    Chats,
    /// User-received records and unique addresses
    Users,
}
