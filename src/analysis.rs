//! Aggregations over fetched transaction records
//!
//! Event-level statistics computed from crawl results: ticket sales from
//! token transfers, catch-type tallies, chat-message and user-received
//! filters. All functions take record slices and never touch the network.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use tracing::warn;

use crate::query::TxEdge;

/// Smallest token quantity worth one ticket
pub const TICKET_UNIT: i64 = 5_000_000_000_000;

/// Catch tag value to catch kind
static CATCH_KINDS: Lazy<BTreeMap<i64, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        (2, "Common"),
        (3, "Rare"),
        (4, "Legendary"),
        (5, "Crown"),
        (6, "MessageBottle"),
        (7, "Boot"),
        (8, "Chips"),
        (9, "Hat"),
        (10, "Trash"),
    ])
});

/// Total tickets sold: the sum of every record's `Quantity` tag divided by
/// [`TICKET_UNIT`]. Records without a parseable quantity are skipped.
pub fn ticket_sales(records: &[TxEdge]) -> f64 {
    records
        .iter()
        .filter_map(|edge| {
            let quantity = edge.node.tag_value("Quantity")?;
            match quantity.parse::<i64>() {
                Ok(q) => Some(q as f64 / TICKET_UNIT as f64),
                Err(_) => {
                    warn!(id = %edge.node.id, quantity, "unparseable Quantity tag");
                    None
                }
            }
        })
        .sum()
}

/// Tally catch records by kind. Every kind appears in the result, zero
/// counts included; `Catch` values outside the known range are skipped.
pub fn catch_counts(records: &[TxEdge]) -> BTreeMap<&'static str, u64> {
    let mut counts: BTreeMap<&'static str, u64> =
        CATCH_KINDS.values().map(|kind| (*kind, 0)).collect();
    for edge in records {
        for tag in edge.node.tags.iter().filter(|t| t.name == "Catch") {
            let kind = tag
                .value
                .parse::<i64>()
                .ok()
                .and_then(|v| CATCH_KINDS.get(&v).copied());
            match kind {
                Some(kind) => *counts.entry(kind).or_insert(0) += 1,
                None => warn!(id = %edge.node.id, value = %tag.value, "unknown Catch value"),
            }
        }
    }
    counts
}

/// Records whose `Action` tag equals `ChatMessage`
pub fn chat_messages(records: &[TxEdge]) -> Vec<&TxEdge> {
    records
        .iter()
        .filter(|edge| edge.node.tag_value("Action") == Some("ChatMessage"))
        .collect()
}

/// Records sent directly by users, i.e. without a `From-Process` tag
pub fn user_received(records: &[TxEdge]) -> Vec<&TxEdge> {
    records
        .iter()
        .filter(|edge| !edge.node.has_tag("From-Process"))
        .collect()
}

/// Distinct owner addresses among the given records
pub fn unique_owner_addresses(records: &[&TxEdge]) -> usize {
    records
        .iter()
        .filter_map(|edge| edge.node.owner.as_ref().map(|o| o.address.as_str()))
        .collect::<HashSet<_>>()
        .len()
}
