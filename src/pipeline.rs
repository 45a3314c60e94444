use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::scrapers::{ExtractError, PadmapperScraper, PageSource};
use crate::table::ListingTable;

/// Outcome of one crawl run. Rows extracted before a cancellation or a
/// partial failure are always retained.
#[derive(Debug)]
pub struct CrawlReport {
    pub table: ListingTable,
    pub links_discovered: usize,
    pub links_skipped: usize,
    pub cancelled: bool,
}

/// Drive the full pipeline over one page source: regions to search URLs,
/// discovery, extraction, aggregation.
///
/// `cancel` is checked between regions and between listing extractions;
/// setting it stops the crawl at the next boundary without losing rows.
pub fn run_crawl<P: PageSource>(
    source: &mut P,
    config: &Config,
    cancel: &AtomicBool,
) -> Result<CrawlReport> {
    let scraper = PadmapperScraper::new(config)?;
    let mut table = ListingTable::new();
    let mut links: Vec<String> = Vec::new();
    let mut cancelled = false;

    for region in &config.regions {
        if cancel.load(Ordering::Relaxed) {
            cancelled = true;
            break;
        }
        let search_url = scraper.search_url(region);
        info!("Discovering listings in {}...", region.name);
        let found: Vec<String> = scraper.discover_links(source, &search_url).collect();
        info!("Found {} links in {}", found.len(), region.name);
        links.extend(found);
    }

    // Seeded listings skip discovery entirely; the aggregator still
    // deduplicates them against discovered links.
    links.extend(config.seed_listings.iter().cloned());
    let links_discovered = links.len();

    for link in links {
        if cancel.load(Ordering::Relaxed) {
            warn!("Cancellation requested; stopping before {}", link);
            cancelled = true;
            break;
        }
        match scraper.extract(source, &link) {
            Ok(row) => {
                if !table.add(row) {
                    debug!("Skipping duplicate listing {}", link);
                }
            }
            Err(e @ ExtractError::Insufficient) => {
                warn!("Skipping {}: {}", link, e);
                table.record_skip();
            }
            Err(ExtractError::Navigation(e)) => {
                warn!("Skipping {}: {:#}", link, e);
                table.record_skip();
            }
        }
    }

    let links_skipped = table.skipped();
    Ok(CrawlReport {
        table,
        links_discovered,
        links_skipped,
        cancelled,
    })
}
