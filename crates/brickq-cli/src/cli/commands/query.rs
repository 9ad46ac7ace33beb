//! `brickq query`: run one query and print the count or the rows.
//!
//! Usage:
//!   brickq query -q query.rq --db SodaHall
//!   brickq query --saved "Power Meters" --rows --compact
//!   brickq query --saved "Map VAVs to Zones and Rooms" --rows --format json

use std::sync::Arc;

use anyhow::{Context, Result};
use brickq_client::prefixes::compact;
use brickq_client::{catalog, Identifier, MemoryStore, QueryClient, QueryOutcome, ResultSource};
use serde_json::json;

use super::super::args::{OutputFormat, QueryArgs};
use super::catalog::unknown_query;
use super::resolve_config;
use crate::exit_codes::EXIT_SUCCESS;

pub async fn run(args: QueryArgs) -> Result<i32> {
    let body = load_body(&args)?;
    let config = resolve_config(Some(&args.endpoint), &args.cache)?;

    let client = if args.no_cache {
        QueryClient::with_store(config, Arc::new(MemoryStore::new()))?
    } else {
        QueryClient::new(config)?
    };

    tracing::debug!(dataset = %args.dataset, "running query");
    let outcome = client.query(&args.dataset, &body).await?;

    print!("{}", render(&args, &outcome));
    Ok(EXIT_SUCCESS)
}

fn load_body(args: &QueryArgs) -> Result<String> {
    if let Some(name) = &args.saved {
        return catalog::find(name)
            .map(|q| q.body.to_string())
            .ok_or_else(|| unknown_query(name));
    }

    let path = args
        .file
        .as_ref()
        .context("either --file or --saved is required")?;
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read query file {}", path.display()))
}

fn render(args: &QueryArgs, outcome: &QueryOutcome) -> String {
    let table = &outcome.table;
    let source = match outcome.source {
        ResultSource::Cache => "cache",
        ResultSource::Upstream => "upstream",
    };

    match (args.format, args.rows) {
        (OutputFormat::Text, false) => format!("{}\n", table.len()),
        (OutputFormat::Text, true) => {
            let mut out = String::new();
            for row in table {
                let cells: Vec<String> = row.iter().map(|id| cell(id, args.compact)).collect();
                out.push_str(&cells.join(" "));
                out.push('\n');
            }
            out
        }
        (OutputFormat::Json, rows) => {
            let mut doc = json!({
                "dataset": args.dataset,
                "source": source,
                "count": table.len(),
            });
            if rows {
                doc["rows"] = json!(table);
            }
            format!("{}\n", doc)
        }
    }
}

fn cell(id: &Identifier, compact_names: bool) -> String {
    if compact_names {
        compact(id)
    } else {
        id.to_string()
    }
}
