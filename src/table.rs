use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::config::ColumnSpec;
use crate::models::Listing;

/// Ordered accumulation of listing rows, deduplicated by listing URL.
///
/// Rows grow monotonically during a crawl; `finalize` projects them onto the
/// fixed column schema for the export collaborator.
#[derive(Debug, Default)]
pub struct ListingTable {
    rows: Vec<Listing>,
    seen: HashSet<String>,
    skipped: usize,
}

impl ListingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `row` unless its listing URL was seen before. First-seen wins;
    /// duplicate data is never merged. Returns whether the row was kept.
    pub fn add(&mut self, row: Listing) -> bool {
        if !self.seen.insert(row.listing_url.clone()) {
            debug!("Duplicate listing dropped: {}", row.listing_url);
            return false;
        }
        self.rows.push(row);
        true
    }

    /// Count one link that failed extraction, for the run report.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn rows(&self) -> &[Listing] {
        &self.rows
    }

    /// Project every row onto the full column schema, in column order,
    /// substituting each column's default where a value is missing. Rows are
    /// never dropped here.
    pub fn finalize(self, columns: &[ColumnSpec]) -> Vec<IndexMap<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| {
                        let value = row
                            .column_value(&column.name)
                            .unwrap_or_else(|| column.default.clone());
                        (column.name.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}
