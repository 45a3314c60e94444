mod config;
mod models;
mod pipeline;
mod scrapers;
mod table;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config::Config;
use scrapers::BrowserSession;
use tracing::{info, warn, Level};
use tracing_subscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏠 Rental Scout - Padmapper Crawler");
    info!("====================================");

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    config.validate()?;
    info!(
        "{} regions, {} seeded listings",
        config.regions.len(),
        config.seed_listings.len()
    );

    // A crawl with no network should die before any region is processed.
    preflight(&config.base_url).await?;

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-c received; finishing the current listing then shutting down");
            flag.store(true, Ordering::Relaxed);
        }
    });

    // The session drops (and Chrome is torn down) before the export runs,
    // whether the crawl finished, failed or was cancelled.
    let report = {
        let mut session = BrowserSession::launch(&config)?;
        pipeline::run_crawl(&mut session, &config, &cancel)?
    };

    if report.cancelled {
        warn!("Crawl cancelled; exporting what was collected");
    }
    info!(
        "✅ Crawl finished: {} rows from {} links ({} skipped)",
        report.table.len(),
        report.links_discovered,
        report.links_skipped
    );

    let rows = report.table.finalize(&config.columns);
    let json = serde_json::to_string_pretty(&rows)?;
    tokio::fs::write("rental_listings.json", json).await?;
    info!("💾 Saved {} rows to rental_listings.json", rows.len());

    Ok(())
}

/// Environment check: the target site must be reachable at startup.
async fn preflight(base_url: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to create HTTP client")?;

    client
        .get(base_url)
        .send()
        .await
        .with_context(|| format!("Preflight request to {} failed", base_url))?;

    Ok(())
}
