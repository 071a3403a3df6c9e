//! Duplicate-id and finality filtering
//!
//! The gateway delivers at-least-once: a record can reappear on a later
//! page under the same id. Repeats are kept but renamed so the output
//! stream has unique ids, and records without a confirmed block can be
//! dropped on request.

use std::collections::HashMap;

use crate::query::TxEdge;

/// Per-page filter statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageStats {
    /// Records received from the gateway
    pub received: usize,
    /// Records kept after filtering
    pub kept: usize,
    /// Records that were local repeats (renamed, and kept unless non-final)
    pub duplicates: usize,
    /// Records dropped for lacking a confirmed block
    pub non_final: usize,
}

/// Tracks which record ids have been seen within one crawl.
///
/// Owned by a single driver invocation; there is no global state.
#[derive(Debug, Default)]
pub struct DedupFilter {
    seen: HashMap<String, u64>,
}

impl DedupFilter {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed occurrence counts from checkpointed records so a resumed
    /// crawl keeps renaming consistently.
    pub fn seed(&mut self, edges: &[TxEdge]) {
        for edge in edges {
            let id = edge
                .node
                .original_id
                .as_deref()
                .unwrap_or(&edge.node.id)
                .to_string();
            *self.seen.entry(id).or_insert(0) += 1;
        }
    }

    /// How many times an id has been observed
    pub fn occurrences(&self, id: &str) -> u64 {
        self.seen.get(id).copied().unwrap_or(0)
    }

    /// Process one page of records, preserving input order.
    ///
    /// The Nth occurrence (N >= 2) of an id is renamed to `"{N-1}-{id}"`
    /// with the original id preserved in `original_id`; cursor and tags are
    /// untouched. With `include_non_final` false, records without a
    /// confirmed block are dropped entirely, but still count toward the
    /// seen-id bookkeeping.
    pub fn process_page(
        &mut self,
        edges: Vec<TxEdge>,
        include_non_final: bool,
    ) -> (Vec<TxEdge>, PageStats) {
        let mut stats = PageStats {
            received: edges.len(),
            ..PageStats::default()
        };
        let mut kept = Vec::with_capacity(edges.len());

        for mut edge in edges {
            let count = self.seen.entry(edge.node.id.clone()).or_insert(0);
            *count += 1;

            if *count > 1 {
                stats.duplicates += 1;
                let original = edge.node.id.clone();
                edge.node.id = format!("{}-{}", *count - 1, original);
                edge.node.original_id = Some(original);
            }

            if !include_non_final && !edge.is_final() {
                stats.non_final += 1;
                continue;
            }

            stats.kept += 1;
            kept.push(edge);
        }

        (kept, stats)
    }
}
