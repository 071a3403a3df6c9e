use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use super::*;
use crate::query::{Page, TxNode};

/// One scripted fetch result.
enum Step {
    /// A page with the given edges and optional total count
    Page(Vec<TxEdge>, Option<u64>),
    /// Retry budget exhausted
    Exhausted,
}

/// Replays a fixed sequence of pages and records every request it sees.
struct ScriptedFetcher {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl ScriptedFetcher {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Option<Page>> {
        self.requests.lock().unwrap().push(request.clone());
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("fetcher script ran out of pages");
        match step {
            Step::Page(edges, total_count) => Ok(Some(Page { edges, total_count })),
            Step::Exhausted => Ok(None),
        }
    }
}

fn edge(id: &str, cursor: &str) -> TxEdge {
    TxEdge {
        cursor: cursor.to_string(),
        node: TxNode {
            id: id.to_string(),
            block: Some(crate::query::BlockRef {
                timestamp: Some(1_700_000_000),
                height: Some(1_400_000),
            }),
            ..TxNode::default()
        },
    }
}

fn non_final_edge(id: &str, cursor: &str) -> TxEdge {
    let mut e = edge(id, cursor);
    e.node.block = None;
    e
}

fn fast_options() -> CrawlOptions {
    CrawlOptions::default().with_batch_sleep(0.0)
}

fn config() -> HarvestConfig {
    HarvestConfig::default()
}

#[tokio::test]
async fn crawl_renames_duplicate_across_pages() {
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(vec![edge("a", "c1"), edge("b", "c2")], Some(3)),
        Step::Page(vec![edge("a", "c1"), edge("b", "c2")], None),
        Step::Page(vec![edge("b", "c3")], None),
        Step::Page(vec![], None),
    ]);
    let mut crawler = Crawler::new(&fetcher, config(), fast_options());

    let records = crawler
        .run("entity-1", QueryType::Received)
        .await
        .unwrap();

    let ids: Vec<&str> = records.iter().map(|e| e.node.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "1-b"]);
    assert_eq!(records[2].node.original_id.as_deref(), Some("b"));
    assert_eq!(crawler.stats().duplicates, 1);
    assert_eq!(crawler.stats().total_count, Some(3));

    // Count probe, two data pages, one empty page
    let requests = fetcher.requests();
    assert_eq!(requests.len(), 4);
    assert!(requests[0].want_count);
    assert!(!requests[1].want_count);
    let cursors: Vec<&str> = requests.iter().map(|r| r.cursor.as_str()).collect();
    assert_eq!(cursors, vec!["", "", "c2", "c3"]);
}

#[tokio::test]
async fn failed_count_probe_yields_empty_result() {
    let fetcher = ScriptedFetcher::new(vec![Step::Exhausted]);
    let mut crawler = Crawler::new(&fetcher, config(), fast_options());

    let records = crawler.run("entity-1", QueryType::Sent).await.unwrap();

    assert!(records.is_empty());
    assert_eq!(fetcher.requests().len(), 1);
}

#[tokio::test]
async fn exhausted_page_returns_partial_results() {
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(vec![], Some(10)),
        Step::Page(vec![edge("a", "c1"), edge("b", "c2")], None),
        Step::Exhausted,
    ]);
    let mut crawler = Crawler::new(&fetcher, config(), fast_options());

    let records = crawler
        .run("entity-1", QueryType::Received)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].node.id, "a");
    assert_eq!(fetcher.requests().len(), 3);
}

#[tokio::test]
async fn max_total_records_stops_without_extra_fetch() {
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(vec![], Some(9)),
        Step::Page(vec![edge("a", "c1"), edge("b", "c2"), edge("c", "c3")], None),
        Step::Page(vec![edge("d", "c4"), edge("e", "c5"), edge("f", "c6")], None),
    ]);
    let options = fast_options().with_max_total(5);
    let mut crawler = Crawler::new(&fetcher, config(), options);

    let records = crawler
        .run("entity-1", QueryType::Received)
        .await
        .unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(records.last().unwrap().node.id, "e");
    // Probe plus two pages; the cap is hit before a third request
    assert_eq!(fetcher.requests().len(), 3);
}

#[tokio::test]
async fn fully_filtered_page_ends_run() {
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(vec![], Some(4)),
        Step::Page(vec![edge("a", "c1")], None),
        Step::Page(
            vec![non_final_edge("p", "c2"), non_final_edge("q", "c3")],
            None,
        ),
    ]);
    let options = fast_options().with_include_non_final(false);
    let mut crawler = Crawler::new(&fetcher, config(), options);

    let records = crawler
        .run("entity-1", QueryType::Received)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(crawler.stats().non_final_dropped, 2);
    // The second data page kept nothing, so no further page is requested
    assert_eq!(fetcher.requests().len(), 3);
}

#[tokio::test]
async fn cursor_advances_to_last_kept_record() {
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(vec![], Some(3)),
        Step::Page(vec![edge("a", "c1"), non_final_edge("b", "c2")], None),
        Step::Page(vec![edge("c", "c3")], None),
        Step::Page(vec![], None),
    ]);
    let options = fast_options().with_include_non_final(false);
    let mut crawler = Crawler::new(&fetcher, config(), options);

    crawler.run("entity-1", QueryType::Received).await.unwrap();

    let requests = fetcher.requests();
    // The dropped record's cursor is never used
    assert_eq!(requests[2].cursor, "c1");
    assert_eq!(requests[3].cursor, "c3");
}

#[tokio::test]
async fn batch_size_adapts_to_served_pages() {
    let full = |n: usize, prefix: &str| -> Vec<TxEdge> {
        (0..n)
            .map(|i| edge(&format!("{prefix}{i}"), &format!("{prefix}c{i}")))
            .collect()
    };
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(vec![], Some(100)),
        Step::Page(full(2, "a"), None),
        Step::Page(full(4, "b"), None),
        Step::Page(full(8, "c"), None),
        Step::Page(full(3, "d"), None),
        Step::Page(vec![], None),
    ]);
    let options = fast_options().with_batch_sizes(2, 8);
    let mut crawler = Crawler::new(&fetcher, config(), options);

    crawler.run("entity-1", QueryType::Received).await.unwrap();

    let limits: Vec<usize> = fetcher.requests().iter().map(|r| r.limit).collect();
    // Doubles while pages come back full, then collapses to a short page
    assert_eq!(limits, vec![2, 2, 4, 8, 8, 3]);
}

#[tokio::test]
async fn max_pages_cap_stops_runaway_crawl() {
    // A gateway that keeps serving the same full page forever would loop
    // without the cap; dedup drops repeats so each page keeps nothing new
    // after the first -- use distinct records instead.
    let mut steps = vec![Step::Page(vec![], Some(100))];
    for i in 0..10 {
        steps.push(Step::Page(
            vec![edge(&format!("r{i}"), &format!("c{i}"))],
            None,
        ));
    }
    let fetcher = ScriptedFetcher::new(steps);
    let mut options = fast_options();
    options.max_pages = 3;
    let mut crawler = Crawler::new(&fetcher, config(), options);

    let records = crawler
        .run("entity-1", QueryType::Received)
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn validation_failure_is_an_error() {
    let fetcher = ScriptedFetcher::new(vec![]);
    let mut crawler = Crawler::new(&fetcher, config(), fast_options());

    let err = crawler
        .run("entity-1", QueryType::TokenTransfersFromProcess)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("from_process"));
    assert!(fetcher.requests().is_empty());
}

#[tokio::test]
async fn checkpoint_saved_on_cadence_and_resumed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crawl.json");

    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(vec![], Some(4)),
        Step::Page(vec![edge("a", "c1"), edge("b", "c2")], None),
        Step::Page(vec![edge("c", "c3"), edge("d", "c4")], None),
        Step::Page(vec![], None),
    ]);
    let options = fast_options().with_checkpoint(&path, 2);
    let mut crawler = Crawler::new(&fetcher, config(), options);
    let first = crawler
        .run("entity-1", QueryType::Received)
        .await
        .unwrap();
    assert_eq!(first.len(), 4);

    let saved: Vec<TxEdge> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved.len(), 4);

    // A second run resumes from the saved cursor instead of refetching
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(vec![], Some(4)),
        Step::Page(vec![], None),
    ]);
    let options = fast_options().with_checkpoint(&path, 2);
    let mut crawler = Crawler::new(&fetcher, config(), options);
    let second = crawler
        .run("entity-1", QueryType::Received)
        .await
        .unwrap();

    assert_eq!(second.len(), 4);
    assert!(crawler.stats().resumed);
    let requests = fetcher.requests();
    assert_eq!(requests[1].cursor, "c4");
}

#[tokio::test]
async fn resumed_run_renames_against_checkpointed_ids() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crawl.json");

    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(vec![], Some(2)),
        Step::Page(vec![edge("a", "c1"), edge("b", "c2")], None),
        Step::Page(vec![], None),
    ]);
    let options = fast_options().with_checkpoint(&path, 1);
    let mut crawler = Crawler::new(&fetcher, config(), options);
    crawler.run("entity-1", QueryType::Received).await.unwrap();

    // The gateway serves "b" again after the resume point
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(vec![], Some(3)),
        Step::Page(vec![edge("b", "c3")], None),
        Step::Page(vec![], None),
    ]);
    let options = fast_options().with_checkpoint(&path, 1);
    let mut crawler = Crawler::new(&fetcher, config(), options);
    let records = crawler
        .run("entity-1", QueryType::Received)
        .await
        .unwrap();

    let ids: Vec<&str> = records.iter().map(|e| e.node.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "1-b"]);
}

#[tokio::test]
async fn range_options_flow_into_requests() {
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(vec![], Some(0)),
        Step::Page(vec![], None),
    ]);
    let options = fast_options()
        .with_ingested_range(Some(100), Some(200))
        .with_block_range(Some(1_000), None);
    let mut crawler = Crawler::new(&fetcher, config(), options);

    crawler.run("entity-1", QueryType::Debit).await.unwrap();

    let requests = fetcher.requests();
    assert_eq!(requests[1].min_ingested_at, Some(100));
    assert_eq!(requests[1].max_ingested_at, Some(200));
    assert_eq!(requests[1].min_block, Some(1_000));
    assert_eq!(requests[1].max_block, None);
}

#[test]
fn default_options() {
    let options = CrawlOptions::default();
    assert!(options.include_non_final);
    assert_eq!(options.checkpoint_step, 100);
    assert_eq!(options.max_pages, 100_000);
    assert!(options.checkpoint_path.is_none());
}
