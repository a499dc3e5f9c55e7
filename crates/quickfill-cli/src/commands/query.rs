//! Query command - print matching terms.

use crate::app::App;
use crate::OutputFormat;
use quickfill_core::{Config, Kind, QueryEngine};
use std::time::Instant;

/// Run the query command.
pub fn run(
    config: Config,
    url: Option<String>,
    kind: Kind,
    text: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let app = App::new(config, url)?;
    let engine = QueryEngine::new(&app.store, &app.keys, app.config.query.clone());

    let start = Instant::now();
    let outcome = engine.query(&kind, text)?;
    let elapsed = start.elapsed();

    match output {
        OutputFormat::Text => {
            for item in &outcome.items {
                println!("{}", item.term);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome.items)?);
        }
    }

    for skipped in &outcome.skipped {
        eprintln!("warning: skipped result {} ({})", skipped.id, skipped.reason);
    }
    tracing::debug!(
        results = outcome.items.len(),
        cache_hit = outcome.cache_hit,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "Query finished"
    );

    Ok(())
}
