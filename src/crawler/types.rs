//! Crawl options and statistics

use std::path::PathBuf;

use crate::dedup::PageStats;

/// Per-run options for a crawl.
///
/// `None` fields fall back to the client's [`HarvestConfig`]
/// (crate::config::HarvestConfig) defaults; explicit values win.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Page size for the first request
    pub initial_batch_size: Option<usize>,
    /// Upper bound on the requested page size
    pub max_batch_size: Option<usize>,
    /// Attempts per page request
    pub max_retries: Option<u32>,
    /// Delay between attempts, in seconds
    pub retry_delay_secs: Option<f64>,
    /// Cooperative sleep between pages, in seconds
    pub batch_sleep_secs: Option<f64>,
    /// Stop once this many records have accumulated
    pub max_total_records: Option<usize>,
    /// Minimum `ingested_at` timestamp (inclusive)
    pub min_ingested_at: Option<i64>,
    /// Maximum `ingested_at` timestamp (inclusive)
    pub max_ingested_at: Option<i64>,
    /// Minimum block height (inclusive)
    pub min_block: Option<i64>,
    /// Maximum block height (inclusive)
    pub max_block: Option<i64>,
    /// Keep records whose block is not yet confirmed
    pub include_non_final: bool,
    /// Process id for from-process query types
    pub from_process: Option<String>,
    /// Checkpoint file path; `None` disables checkpointing
    pub checkpoint_path: Option<PathBuf>,
    /// Save a checkpoint every this many newly kept records; 0 disables
    pub checkpoint_step: usize,
    /// Safety cap on page fetches, against a server that never returns an
    /// empty page
    pub max_pages: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            initial_batch_size: None,
            max_batch_size: None,
            max_retries: None,
            retry_delay_secs: None,
            batch_sleep_secs: None,
            max_total_records: None,
            min_ingested_at: None,
            max_ingested_at: None,
            min_block: None,
            max_block: None,
            include_non_final: true,
            from_process: None,
            checkpoint_path: None,
            checkpoint_step: 100,
            max_pages: 100_000,
        }
    }
}

impl CrawlOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ingestion-timestamp window
    #[must_use]
    pub fn with_ingested_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_ingested_at = min;
        self.max_ingested_at = max;
        self
    }

    /// Set the block-height window
    #[must_use]
    pub fn with_block_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_block = min;
        self.max_block = max;
        self
    }

    /// Cap the total number of records returned
    #[must_use]
    pub fn with_max_total(mut self, max: usize) -> Self {
        self.max_total_records = Some(max);
        self
    }

    /// Enable checkpointing at the given path and cadence
    #[must_use]
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>, step: usize) -> Self {
        self.checkpoint_path = Some(path.into());
        self.checkpoint_step = step;
        self
    }

    /// Set whether non-final records are kept
    #[must_use]
    pub fn with_include_non_final(mut self, include: bool) -> Self {
        self.include_non_final = include;
        self
    }

    /// Set the process id for from-process query types
    #[must_use]
    pub fn with_from_process(mut self, process: impl Into<String>) -> Self {
        self.from_process = Some(process.into());
        self
    }

    /// Set initial and maximum page sizes
    #[must_use]
    pub fn with_batch_sizes(mut self, initial: usize, max: usize) -> Self {
        self.initial_batch_size = Some(initial);
        self.max_batch_size = Some(max);
        self
    }

    /// Override the per-page retry budget and delay
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, delay_secs: f64) -> Self {
        self.max_retries = Some(max_retries);
        self.retry_delay_secs = Some(delay_secs);
        self
    }

    /// Override the inter-page sleep
    #[must_use]
    pub fn with_batch_sleep(mut self, secs: f64) -> Self {
        self.batch_sleep_secs = Some(secs);
        self
    }
}

/// Statistics from one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    /// Pages fetched in the paging loop (the count probe excluded)
    pub pages_fetched: usize,
    /// Records received from the gateway
    pub records_received: usize,
    /// Records kept after dedup and finality filtering
    pub records_kept: usize,
    /// Local repeats renamed
    pub duplicates: usize,
    /// Records dropped for lacking a confirmed block
    pub non_final_dropped: usize,
    /// Total matching count reported by the gateway, if the probe succeeded
    pub total_count: Option<u64>,
    /// Whether the run resumed from a checkpoint
    pub resumed: bool,
}

impl CrawlStats {
    /// Fold one page's filter stats into the totals
    pub fn add_page(&mut self, page: PageStats) {
        self.pages_fetched += 1;
        self.records_received += page.received;
        self.records_kept += page.kept;
        self.duplicates += page.duplicates;
        self.non_final_dropped += page.non_final;
    }
}
