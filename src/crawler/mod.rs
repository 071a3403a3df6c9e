//! Cursor-paginated crawl driver
//!
//! [`Crawler`] walks a transaction history page by page through a
//! [`PageFetcher`], advancing an opaque cursor, renaming duplicates,
//! filtering unconfirmed records, adapting the requested page size to
//! what the gateway actually serves, and periodically snapshotting
//! accumulated records to a checkpoint file.
//!
//! A run moves through four phases: option resolution and checkpoint
//! resume, a count probe whose records are discarded, the paging loop,
//! and final truncation to `max_total_records`.

mod types;

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::batch::BatchSizeController;
use crate::checkpoint::{resume_cursor, CheckpointStore};
use crate::client::PageFetcher;
use crate::config::HarvestConfig;
use crate::dedup::DedupFilter;
use crate::error::Result;
use crate::query::{PageRequest, QueryType, TxEdge};

pub use types::{CrawlOptions, CrawlStats};

/// Drives a full crawl over one entity's transaction history.
pub struct Crawler<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    config: HarvestConfig,
    options: CrawlOptions,
    stats: CrawlStats,
}

impl<'a, F: PageFetcher + ?Sized> Crawler<'a, F> {
    /// Create a crawler over the given fetcher.
    pub fn new(fetcher: &'a F, config: HarvestConfig, options: CrawlOptions) -> Self {
        Self {
            fetcher,
            config,
            options,
            stats: CrawlStats::default(),
        }
    }

    /// Statistics from the most recent [`run`](Self::run).
    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Fetch the entity's complete transaction history for one query type.
    ///
    /// Returns every kept record in gateway order. A page whose retry
    /// budget is exhausted ends the run with the records accumulated so
    /// far rather than failing the whole crawl; a failed count probe
    /// returns an empty result.
    pub async fn run(&mut self, entity_id: &str, query_type: QueryType) -> Result<Vec<TxEdge>> {
        self.stats = CrawlStats::default();

        let initial_size = self
            .options
            .initial_batch_size
            .unwrap_or(self.config.initial_batch_size);
        let max_size = self
            .options
            .max_batch_size
            .unwrap_or(self.config.max_batch_size)
            .max(initial_size);
        let batch_sleep = Duration::from_secs_f64(
            self.options
                .batch_sleep_secs
                .unwrap_or(self.config.batch_sleep_secs),
        );

        let mut base_request = PageRequest::new(entity_id, query_type);
        base_request.limit = initial_size;
        base_request.min_ingested_at = self.options.min_ingested_at;
        base_request.max_ingested_at = self.options.max_ingested_at;
        base_request.min_block = self.options.min_block;
        base_request.max_block = self.options.max_block;
        base_request.from_process = self.options.from_process.clone();
        base_request.validate()?;

        let mut records: Vec<TxEdge> = Vec::new();
        let mut cursor = String::new();
        let mut dedup = DedupFilter::new();
        let store = self
            .options
            .checkpoint_path
            .as_ref()
            .map(CheckpointStore::new);

        if let Some(store) = &store {
            if let Some(prior) = store.load().await? {
                if let Some(resumed) = resume_cursor(&prior) {
                    info!(
                        entity_id,
                        cursor = resumed,
                        records = prior.len(),
                        "resuming from checkpoint"
                    );
                    cursor = resumed.to_string();
                }
                dedup.seed(&prior);
                self.stats.resumed = true;
                records = prior;
            }
        }

        // Count probe. Its records are discarded; only the reported total
        // matters, and a probe failure yields an empty run rather than an
        // error.
        let mut count_request = base_request.clone();
        count_request.want_count = true;
        count_request.cursor = cursor.clone();
        let Some(probe) = self.fetcher.fetch_page(&count_request).await? else {
            error!(entity_id, "failed to get initial response, aborting crawl");
            return Ok(Vec::new());
        };
        self.stats.total_count = probe.total_count;
        info!(
            entity_id,
            query_type = %query_type,
            total_count = probe.total_count.unwrap_or(0),
            "starting crawl"
        );

        let mut controller = BatchSizeController::new(initial_size, max_size);
        let mut since_checkpoint = 0usize;

        loop {
            if let Some(cap) = self.options.max_total_records {
                if records.len() >= cap {
                    break;
                }
            }
            if self.stats.pages_fetched >= self.options.max_pages {
                warn!(
                    pages = self.stats.pages_fetched,
                    "page safety cap reached, stopping crawl"
                );
                break;
            }

            let mut request = base_request.clone();
            request.cursor = cursor.clone();
            request.limit = controller.size();
            let Some(page) = self.fetcher.fetch_page(&request).await? else {
                error!(
                    cursor = %cursor,
                    records = records.len(),
                    "giving up on page, returning partial results"
                );
                break;
            };

            let received = page.len();
            if received == 0 {
                // Upstream exhausted
                self.stats.pages_fetched += 1;
                break;
            }

            let (kept, page_stats) = dedup.process_page(page.edges, self.options.include_non_final);
            debug!(
                received = page_stats.received,
                kept = page_stats.kept,
                duplicates = page_stats.duplicates,
                non_final = page_stats.non_final,
                "page processed"
            );
            self.stats.add_page(page_stats);

            let kept_count = kept.len();
            if let Some(last) = kept.last() {
                cursor = last.cursor.clone();
            }
            records.extend(kept);
            since_checkpoint += kept_count;

            if let Some(store) = &store {
                if self.options.checkpoint_step > 0 && since_checkpoint >= self.options.checkpoint_step {
                    match store.save(&records).await {
                        Ok(()) => since_checkpoint = 0,
                        Err(err) => error!(error = %err, "failed to save checkpoint"),
                    }
                }
            }

            if kept_count == 0 {
                // Every record on the page was dropped; the cursor cannot
                // advance, so stop instead of refetching the same page.
                break;
            }

            controller.observe(received);
            tokio::time::sleep(batch_sleep).await;
        }

        if let Some(store) = &store {
            if self.options.checkpoint_step > 0 && since_checkpoint > 0 {
                if let Err(err) = store.save(&records).await {
                    error!(error = %err, "failed to save final checkpoint");
                }
            }
        }

        if let Some(cap) = self.options.max_total_records {
            records.truncate(cap);
        }
        info!(
            entity_id,
            records = records.len(),
            pages = self.stats.pages_fetched,
            duplicates = self.stats.duplicates,
            "crawl finished"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests;
