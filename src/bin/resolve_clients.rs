//! Offline resolver: runs the client identity resolution over an exported
//! visit log and prints the resulting profiles (or a search over them).
//!
//! Usage: `resolve_clients <rows.json> [query]`
//!
//! `rows.json` is an array of objects mapping column label to cell value.

use shop_clients_api::models::RawRow;
use shop_clients_api::record_store::cell_to_string;
use shop_clients_api::resolution::resolve_profiles;
use shop_clients_api::search::search_profiles;
use std::collections::HashMap;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("Usage: resolve_clients <rows.json> [query]"))?;
    let query = args.collect::<Vec<_>>().join(" ");

    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
    let objects: Vec<HashMap<String, serde_json::Value>> = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("{} is not a JSON array of row objects: {}", path, e))?;

    let rows: Vec<RawRow> = objects
        .iter()
        .map(|object| {
            object
                .iter()
                .map(|(label, cell)| (label.trim().to_string(), cell_to_string(cell)))
                .collect()
        })
        .collect();

    tracing::info!("Loaded {} row(s) from {}", rows.len(), path);
    let resolution = resolve_profiles(&rows);

    let output = if query.trim().is_empty() {
        serde_json::json!({
            "stats": resolution.stats,
            "profiles": resolution.profiles,
        })
    } else {
        serde_json::to_value(search_profiles(&resolution.profiles, &query))?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
