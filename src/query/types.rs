//! Wire types for the transactions query
//!
//! These mirror the gateway's GraphQL response shape and double as the
//! checkpoint file format (a plain JSON array of edges).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Records
// ============================================================================

/// One edge of the transactions connection: a record plus its pagination
/// cursor. The cursor is opaque and only ever passed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEdge {
    /// Continuation token for the position after this record
    pub cursor: String,
    /// The transaction itself
    pub node: TxNode,
}

impl TxEdge {
    /// Whether the underlying transaction is in a confirmed block
    pub fn is_final(&self) -> bool {
        self.node.is_final()
    }
}

/// A transaction record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxNode {
    /// Transaction id; rewritten to `"{n}-{id}"` for the (n+1)th local
    /// occurrence of a duplicate
    pub id: String,

    /// Original id, present only on renamed duplicates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,

    /// Receiving entity
    #[serde(default)]
    pub recipient: Option<String>,

    /// Gateway ingestion timestamp (unix seconds)
    #[serde(default)]
    pub ingested_at: Option<i64>,

    /// Containing block, absent while the transaction is pending
    #[serde(default)]
    pub block: Option<BlockRef>,

    /// Ordered name/value tag pairs
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Data payload descriptor
    #[serde(default)]
    pub data: Option<DataRef>,

    /// Signing owner
    #[serde(default)]
    pub owner: Option<Owner>,
}

impl TxNode {
    /// A record is final iff its containing block has a confirmed integer
    /// height.
    pub fn is_final(&self) -> bool {
        self.block.as_ref().is_some_and(|b| b.height.is_some())
    }

    /// Value of the first tag with the given name
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    /// Whether any tag with the given name is present
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }
}

/// Block reference carried by confirmed transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    /// Block timestamp (unix seconds)
    #[serde(default)]
    pub timestamp: Option<i64>,
    /// Block height; `None` means the block is not confirmed
    #[serde(default)]
    pub height: Option<i64>,
}

/// A name/value tag pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    /// Create a tag
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Data payload descriptor (size is a decimal string on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRef {
    #[serde(default)]
    pub size: Option<String>,
}

/// Signing owner of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub address: String,
}

// ============================================================================
// Page
// ============================================================================

/// One successfully fetched page
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Records in arrival order
    pub edges: Vec<TxEdge>,
    /// Total matching count; present only when the request asked for it
    pub total_count: Option<u64>,
}

impl Page {
    /// Parse a raw GraphQL response body into a page.
    ///
    /// An explicit `errors` payload and a missing `data.transactions` shape
    /// are both protocol errors, retryable within the page's budget.
    pub fn from_response(body: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(body)?;

        if let Some(errors) = envelope.errors {
            let messages = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::graphql(messages));
        }

        let transactions = envelope
            .data
            .and_then(|d| d.transactions)
            .ok_or_else(|| Error::malformed("response has no data.transactions"))?;

        Ok(Self {
            edges: transactions.edges,
            total_count: transactions.count,
        })
    }

    /// Number of records in the page
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the page carries no records (the exhaustion signal)
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

// ============================================================================
// GraphQL envelope
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<EnvelopeData>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    transactions: Option<TransactionConnection>,
}

#[derive(Debug, Deserialize)]
struct TransactionConnection {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    edges: Vec<TxEdge>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    #[serde(default)]
    message: String,
}
