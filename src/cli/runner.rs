//! CLI runner - executes commands

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::info;

use crate::analysis;
use crate::cli::commands::{Cli, Commands, OutputFormat, Report};
use crate::client::{GraphqlClient, PageFetcher};
use crate::config::HarvestConfig;
use crate::crawler::CrawlOptions;
use crate::error::{Error, Result};
use crate::query::{PageRequest, QueryType, TxEdge};
use crate::types::parse_utc_timestamp;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch {
                entity_id,
                query_type,
                output,
                checkpoint,
                checkpoint_step,
                max_records,
                min_ingested_at,
                max_ingested_at,
                min_block,
                max_block,
                final_only,
                from_process,
                initial_batch_size,
                max_batch_size,
            } => {
                let mut options = CrawlOptions::default()
                    .with_ingested_range(
                        parse_time_arg(min_ingested_at.as_deref())?,
                        parse_time_arg(max_ingested_at.as_deref())?,
                    )
                    .with_block_range(*min_block, *max_block)
                    .with_include_non_final(!final_only);
                options.initial_batch_size = *initial_batch_size;
                options.max_batch_size = *max_batch_size;
                options.max_total_records = *max_records;
                options.from_process = from_process.clone();
                if let Some(path) = checkpoint {
                    options = options.with_checkpoint(path, *checkpoint_step);
                }
                self.fetch(entity_id, query_type, options, output.as_deref())
                    .await
            }
            Commands::Count {
                entity_id,
                query_type,
                min_ingested_at,
                max_ingested_at,
                from_process,
            } => {
                self.count(
                    entity_id,
                    query_type,
                    parse_time_arg(min_ingested_at.as_deref())?,
                    parse_time_arg(max_ingested_at.as_deref())?,
                    from_process.clone(),
                )
                .await
            }
            Commands::Stats { input, report } => self.stats(input, *report),
        }
    }

    fn config(&self) -> Result<HarvestConfig> {
        let config = match &self.cli.config {
            Some(path) => HarvestConfig::from_yaml_file(path)?,
            None => HarvestConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    async fn fetch(
        &self,
        entity_id: &str,
        query_type: &str,
        options: CrawlOptions,
        output: Option<&Path>,
    ) -> Result<()> {
        let query_type: QueryType = query_type.parse()?;
        let client = GraphqlClient::new(self.config()?);

        let records = client
            .get_all_transaction_summaries(entity_id, query_type, options)
            .await?;
        info!(records = records.len(), "fetch complete");

        let body = serde_json::to_string_pretty(&records)?;
        match output {
            Some(path) => {
                fs::write(path, body)?;
                println!("{} records written to {}", records.len(), path.display());
            }
            None => println!("{body}"),
        }
        Ok(())
    }

    async fn count(
        &self,
        entity_id: &str,
        query_type: &str,
        min_ingested_at: Option<i64>,
        max_ingested_at: Option<i64>,
        from_process: Option<String>,
    ) -> Result<()> {
        let query_type: QueryType = query_type.parse()?;
        let client = GraphqlClient::new(self.config()?);

        let mut request = PageRequest::new(entity_id, query_type);
        request.want_count = true;
        request.limit = 1;
        request.min_ingested_at = min_ingested_at;
        request.max_ingested_at = max_ingested_at;
        request.from_process = from_process;

        let page = client
            .fetch_page(&request)
            .await?
            .ok_or_else(|| Error::Other("count probe failed after retries".to_string()))?;
        let total = page.total_count.unwrap_or(0);

        match self.cli.format {
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "entity_id": entity_id,
                    "query_type": query_type.as_str(),
                    "count": total,
                }))?
            ),
            OutputFormat::Text => println!("{total}"),
        }
        Ok(())
    }

    fn stats(&self, input: &PathBuf, report: Report) -> Result<()> {
        let records: Vec<TxEdge> = serde_json::from_str(&fs::read_to_string(input)?)?;

        let mut out = serde_json::Map::new();
        out.insert("records".to_string(), json!(records.len()));
        if matches!(report, Report::All | Report::Tickets) {
            out.insert("tickets_sold".to_string(), json!(analysis::ticket_sales(&records)));
        }
        if matches!(report, Report::All | Report::Catches) {
            out.insert("catches".to_string(), json!(analysis::catch_counts(&records)));
        }
        if matches!(report, Report::All | Report::Chats) {
            out.insert(
                "chat_messages".to_string(),
                json!(analysis::chat_messages(&records).len()),
            );
        }
        if matches!(report, Report::All | Report::Users) {
            let direct = analysis::user_received(&records);
            out.insert("user_received".to_string(), json!(direct.len()));
            out.insert(
                "unique_user_addresses".to_string(),
                json!(analysis::unique_owner_addresses(&direct)),
            );
        }

        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            OutputFormat::Text => {
                for (key, value) in &out {
                    println!("{key}: {value}");
                }
            }
        }
        Ok(())
    }
}

/// Parse a time argument as unix seconds, falling back to a naive UTC
/// `YYYY-MM-DD HH:MM:SS` string.
fn parse_time_arg(arg: Option<&str>) -> Result<Option<i64>> {
    match arg {
        None => Ok(None),
        Some(raw) => match raw.parse::<i64>() {
            Ok(ts) => Ok(Some(ts)),
            Err(_) => Ok(Some(parse_utc_timestamp(raw)?)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_raw_timestamps() {
        assert_eq!(parse_time_arg(Some("1734572396")).unwrap(), Some(1_734_572_396));
    }

    #[test]
    fn parses_utc_strings() {
        let ts = parse_time_arg(Some("2024-12-19 19:56:50")).unwrap().unwrap();
        assert_eq!(ts, 1_734_638_210);
    }

    #[test]
    fn absent_is_none() {
        assert_eq!(parse_time_arg(None).unwrap(), None);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_time_arg(Some("yesterday")).is_err());
    }
}
