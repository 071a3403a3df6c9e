//! GraphQL document builder
//!
//! Renders the filter condition, optional range fragments, and the optional
//! `count` field into the gateway's `transactions` query.

use serde_json::{json, Value};

use super::{PageRequest, QueryType};
use crate::error::Result;
use crate::types::SortOrder;

/// Ingestion timestamp of the first indexed block; token-transfer conditions
/// pin this lower bound to keep the gateway from scanning pre-genesis data.
const INGESTION_GENESIS: i64 = 1_696_107_600;

/// Render the filter condition for a query type.
///
/// `$entityId` is bound via variables; the from-process id has to be
/// interpolated because the gateway query takes it inside the tag filter.
fn condition_fragment(query_type: QueryType, from_process: Option<&str>) -> String {
    match query_type {
        QueryType::Sent => {
            r#"tags: [{name: "Data-Protocol", values: ["ao"]}], owners: [$entityId]"#.to_string()
        }
        QueryType::SentProcess => {
            r#"tags: [{name: "From-Process", values: [$entityId]}]"#.to_string()
        }
        QueryType::SentActionCatch => {
            r#"tags: [{name: "From-Process", values: [$entityId]}, {name: "Action", values: ["Catch"]}]"#
                .to_string()
        }
        QueryType::Received => "recipients: [$entityId]".to_string(),
        QueryType::ReceivedActionEntityCreate => {
            r#"tags: [{name: "Action", values: ["Reality.EntityCreate"]}], recipients: [$entityId]"#
                .to_string()
        }
        QueryType::ReceivedActionEntityUpdatePosition => {
            r#"tags: [{name: "Action", values: ["Reality.EntityUpdatePosition"]}], recipients: [$entityId]"#
                .to_string()
        }
        QueryType::ReceivedActionChatMessage => {
            r#"tags: [{name: "Action", values: ["ChatMessage"]}], recipients: [$entityId]"#
                .to_string()
        }
        QueryType::Debit => {
            r#"tags: [{name: "Action", values: ["Debit-Notice"]}], recipients: [$entityId]"#
                .to_string()
        }
        QueryType::Credit => {
            r#"tags: [{name: "Action", values: ["Credit-Notice"]}], recipients: [$entityId]"#
                .to_string()
        }
        QueryType::Transfer => {
            r#"tags: [{name: "Action", values: ["Credit-Notice", "Debit-Notice"]}], recipients: [$entityId]"#
                .to_string()
        }
        QueryType::TokenTransfers => format!(
            r#"tags: [{{name: "Action", values: ["Credit-Notice", "Debit-Notice"]}}], recipients: [$entityId], ingested_at: {{min: {INGESTION_GENESIS}}}"#
        ),
        QueryType::TokenTransfersFromProcess => {
            // validated upstream; an empty id would match nothing, not error
            let process = from_process.unwrap_or_default();
            format!(
                r#"tags: [{{name: "Action", values: ["Credit-Notice", "Debit-Notice"]}}, {{name: "From-Process", values: ["{process}"]}}], recipients: [$entityId]"#
            )
        }
    }
}

/// Render optional `ingested_at` / `block` range fragments
fn range_fragments(request: &PageRequest) -> Vec<String> {
    let mut fragments = Vec::new();

    if request.min_ingested_at.is_some() || request.max_ingested_at.is_some() {
        let mut parts = Vec::new();
        if let Some(min) = request.min_ingested_at {
            parts.push(format!("min: {min}"));
        }
        if let Some(max) = request.max_ingested_at {
            parts.push(format!("max: {max}"));
        }
        fragments.push(format!("ingested_at: {{{}}}", parts.join(", ")));
    }

    if request.min_block.is_some() || request.max_block.is_some() {
        let mut parts = Vec::new();
        if let Some(min) = request.min_block {
            parts.push(format!("min: {min}"));
        }
        if let Some(max) = request.max_block {
            parts.push(format!("max: {max}"));
        }
        fragments.push(format!("block: {{{}}}", parts.join(", ")));
    }

    fragments
}

/// Build the request payload (`query` + `variables`) for one summary page.
///
/// Validates the request's ranges first; a bad range surfaces synchronously
/// and never reaches the wire.
pub fn build_summary_payload(request: &PageRequest) -> Result<Value> {
    request.validate()?;

    let condition = condition_fragment(request.query_type, request.from_process.as_deref());
    let filters = std::iter::once(condition)
        .chain(range_fragments(request))
        .collect::<Vec<_>>()
        .join(", ");
    let count_field = if request.want_count { "count" } else { "" };

    let query = format!(
        r"query ($entityId: String!, $limit: Int!, $sortOrder: SortOrder!, $cursor: String) {{
  transactions(
    sort: $sortOrder
    first: $limit
    after: $cursor
    {filters}
  ) {{
    {count_field}
    edges {{
      cursor
      node {{
        id
        recipient
        ingested_at
        block {{
          timestamp
          height
        }}
        tags {{
          name
          value
        }}
        data {{
          size
        }}
        owner {{
          address
        }}
      }}
    }}
  }}
}}"
    );

    Ok(json!({
        "query": query,
        "variables": {
            "entityId": request.entity_id,
            "limit": request.limit,
            "sortOrder": SortOrder::IngestedAtDesc.as_str(),
            "cursor": request.cursor,
        }
    }))
}

/// Build the request payload for one page of message details
/// (results pushed for a message by a given process).
pub fn build_details_payload(
    message_id: &str,
    from_process_id: &str,
    limit: usize,
    cursor: &str,
    want_count: bool,
) -> Value {
    let count_field = if want_count { "count" } else { "" };

    let query = format!(
        r#"query ($fromProcessId: String!, $messageId: String!, $limit: Int!, $sortOrder: SortOrder!, $cursor: String) {{
  transactions(
    sort: $sortOrder
    first: $limit
    after: $cursor
    tags: [{{name: "Pushed-For", values: [$messageId]}}, {{name: "From-Process", values: [$fromProcessId]}}], ingested_at: {{min: {INGESTION_GENESIS}}}
  ) {{
    {count_field}
    edges {{
      cursor
      node {{
        id
        ingested_at
        recipient
        block {{
          timestamp
          height
        }}
        tags {{
          name
          value
        }}
        data {{
          size
        }}
        owner {{
          address
        }}
      }}
    }}
  }}
}}"#
    );

    json!({
        "query": query,
        "variables": {
            "fromProcessId": from_process_id,
            "messageId": message_id,
            "limit": limit,
            "sortOrder": SortOrder::IngestedAtDesc.as_str(),
            "cursor": cursor,
        }
    })
}
