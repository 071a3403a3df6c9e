// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # ao-harvest
//!
//! Resilient cursor-paginated crawler for Arweave/AO GraphQL transaction
//! history, with local deduplication, finality filtering, resumable
//! checkpoints, and a handful of game-analytics aggregations.
//!
//! ## Features
//!
//! - **Adaptive pagination**: probes the server's true maximum page size and
//!   locks onto it
//! - **Bounded retries**: every page request gets a fixed retry budget; pages
//!   that exhaust it are recorded in an append-only error-cursor log instead
//!   of aborting the run
//! - **Local dedup**: at-least-once upstream delivery is turned into a
//!   unique-id output stream by renaming repeats
//! - **Checkpoints**: periodic whole-snapshot JSON checkpoints; a crawl
//!   resumes from the last checkpointed record's cursor
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ao_harvest::{CrawlOptions, GraphqlClient, HarvestConfig, QueryType, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = GraphqlClient::new(HarvestConfig::default());
//!
//!     let records = client
//!         .get_all_transaction_summaries(
//!             "sZe_mf4uJs1khzh0QZmNnaxdoXtBa51LRh2uhnDyk3Y",
//!             QueryType::Received,
//!             CrawlOptions::default().with_checkpoint("received.json", 100),
//!         )
//!         .await?;
//!
//!     println!("fetched {} transactions", records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        Crawler (driver)                    │
//! │  count probe → page loop → dedup/finality → checkpoint     │
//! └────────────────────────────────────────────────────────────┘
//!                │               │                │
//! ┌──────────────┴──┬────────────┴────┬───────────┴────────────┐
//! │  GraphqlClient  │  BatchSize      │  CheckpointStore       │
//! │  retry budget   │  Controller     │  snapshot + resume     │
//! │  error-cursor   │  probe/lock     │  atomic rename         │
//! │  log            │  heuristic      │                        │
//! └─────────────────┴─────────────────┴────────────────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and time utilities
pub mod types;

/// Client configuration
pub mod config;

/// GraphQL query construction and wire types
pub mod query;

/// GraphQL client: single-page fetch with retry budget
pub mod client;

/// Adaptive page-size controller
pub mod batch;

/// Duplicate-id and finality filtering
pub mod dedup;

/// Checkpoint persistence and resume
pub mod checkpoint;

/// Pagination driver
pub mod crawler;

/// Domain aggregations over fetched records
pub mod analysis;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::GraphqlClient;
pub use config::HarvestConfig;
pub use crawler::{CrawlOptions, Crawler};
pub use error::{Error, Result};
pub use query::{QueryType, TxEdge, TxNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
