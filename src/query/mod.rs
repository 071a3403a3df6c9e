//! GraphQL query construction and wire types
//!
//! The gateway exposes one `transactions` query; everything here is about
//! rendering the right filter condition into that query and parsing the
//! edge list that comes back.

mod builder;
mod types;

pub use builder::{build_details_payload, build_summary_payload};
pub use types::{BlockRef, DataRef, Owner, Page, Tag, TxEdge, TxNode};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ============================================================================
// Query Type
// ============================================================================

/// Named filter condition for the transactions query.
///
/// Each variant corresponds to one condition of the gateway query; the
/// variable `$entityId` is bound to the entity under inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryType {
    /// Messages the entity sent (ao data protocol, entity as owner)
    #[serde(rename = "sent")]
    Sent,
    /// Messages pushed by the entity's process
    #[serde(rename = "sent_process")]
    SentProcess,
    /// Catch actions pushed by the entity's process
    #[serde(rename = "sent_action_catch")]
    SentActionCatch,
    /// Everything addressed to the entity
    #[serde(rename = "received")]
    Received,
    /// Entity-create events addressed to the entity
    #[serde(rename = "received_action_entityCreate")]
    ReceivedActionEntityCreate,
    /// Position updates addressed to the entity
    #[serde(rename = "received_action_entityUpdatePosition")]
    ReceivedActionEntityUpdatePosition,
    /// Chat messages addressed to the entity
    #[serde(rename = "received_action_chatMessage")]
    ReceivedActionChatMessage,
    /// Debit notices addressed to the entity
    #[serde(rename = "debit")]
    Debit,
    /// Credit notices addressed to the entity
    #[serde(rename = "credit")]
    Credit,
    /// Credit and debit notices addressed to the entity
    #[serde(rename = "transfer")]
    Transfer,
    /// Token transfers addressed to the entity (post-genesis ingestion only)
    #[serde(rename = "token_transfers")]
    TokenTransfers,
    /// Token transfers from a specific process, addressed to the entity
    #[serde(rename = "token_transfers_from_process")]
    TokenTransfersFromProcess,
}

impl QueryType {
    /// Canonical name used on the CLI and in logs
    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Sent => "sent",
            QueryType::SentProcess => "sent_process",
            QueryType::SentActionCatch => "sent_action_catch",
            QueryType::Received => "received",
            QueryType::ReceivedActionEntityCreate => "received_action_entityCreate",
            QueryType::ReceivedActionEntityUpdatePosition => {
                "received_action_entityUpdatePosition"
            }
            QueryType::ReceivedActionChatMessage => "received_action_chatMessage",
            QueryType::Debit => "debit",
            QueryType::Credit => "credit",
            QueryType::Transfer => "transfer",
            QueryType::TokenTransfers => "token_transfers",
            QueryType::TokenTransfersFromProcess => "token_transfers_from_process",
        }
    }

    /// Whether this condition needs a `from_process` id interpolated
    pub fn needs_from_process(self) -> bool {
        matches!(self, QueryType::TokenTransfersFromProcess)
    }

    /// All supported query types
    pub fn all() -> &'static [QueryType] {
        &[
            QueryType::Sent,
            QueryType::SentProcess,
            QueryType::SentActionCatch,
            QueryType::Received,
            QueryType::ReceivedActionEntityCreate,
            QueryType::ReceivedActionEntityUpdatePosition,
            QueryType::ReceivedActionChatMessage,
            QueryType::Debit,
            QueryType::Credit,
            QueryType::Transfer,
            QueryType::TokenTransfers,
            QueryType::TokenTransfersFromProcess,
        ]
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        QueryType::all()
            .iter()
            .copied()
            .find(|q| q.as_str() == s)
            .ok_or_else(|| Error::UnsupportedQueryType {
                name: s.to_string(),
            })
    }
}

// ============================================================================
// Page Request
// ============================================================================

/// One page request against the transactions query
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Entity whose transactions are being fetched
    pub entity_id: String,
    /// Filter condition
    pub query_type: QueryType,
    /// Pagination cursor, empty for the first page
    pub cursor: String,
    /// Requested page size
    pub limit: usize,
    /// Ask the server for the total matching count (first request only)
    pub want_count: bool,
    /// Minimum `ingested_at` timestamp (inclusive)
    pub min_ingested_at: Option<i64>,
    /// Maximum `ingested_at` timestamp (inclusive)
    pub max_ingested_at: Option<i64>,
    /// Minimum block height (inclusive)
    pub min_block: Option<i64>,
    /// Maximum block height (inclusive)
    pub max_block: Option<i64>,
    /// Process id interpolated into from-process conditions
    pub from_process: Option<String>,
}

impl PageRequest {
    /// Create a request for the first page of a crawl
    pub fn new(entity_id: impl Into<String>, query_type: QueryType) -> Self {
        Self {
            entity_id: entity_id.into(),
            query_type,
            cursor: String::new(),
            limit: 100,
            want_count: false,
            min_ingested_at: None,
            max_ingested_at: None,
            min_block: None,
            max_block: None,
            from_process: None,
        }
    }

    /// Validate caller-supplied ranges; a bad range fails fast and is
    /// never retried.
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_ingested_at, self.max_ingested_at) {
            if min >= max {
                return Err(Error::invalid_range("ingested_at", min, max));
            }
        }
        if let (Some(min), Some(max)) = (self.min_block, self.max_block) {
            if min >= max {
                return Err(Error::invalid_range("block", min, max));
            }
        }
        if self.query_type.needs_from_process() && self.from_process.is_none() {
            return Err(Error::validation(format!(
                "query type '{}' requires a from_process id",
                self.query_type
            )));
        }
        Ok(())
    }
}
