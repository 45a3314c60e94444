use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::models::{BoundingBox, GeoPoint, Region};

/// One export column: its header and the sentinel used when a listing did
/// not yield a value for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default)]
    pub default: Value,
}

/// Crawl limits. All bounds are per-navigation or per-search; there is no
/// whole-crawl timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Safety cap on result pages followed for a single search URL.
    pub max_pages_per_search: usize,
    /// Retry attempts after the first failed navigation.
    pub nav_retries: u32,
    /// Base delay for exponential backoff between retries, in milliseconds.
    pub backoff_base_ms: u64,
    /// Upper bound on waiting for a page's dynamic content marker.
    pub render_wait_ms: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_pages_per_search: 20,
            nav_retries: 3,
            backoff_base_ms: 500,
            render_wait_ms: 10_000,
        }
    }
}

impl Limits {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn render_wait(&self) -> Duration {
        Duration::from_millis(self.render_wait_ms)
    }
}

/// Run configuration: the fixed column schema, the two amenity vocabularies,
/// the named search regions, and environment/site parameters.
///
/// The defaults carry the Toronto tables; a JSON file can override any part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    /// Path segment naming the searched metro area, e.g. `toronto-on`.
    pub area_slug: String,
    pub columns: Vec<ColumnSpec>,
    pub unit_amenities: Vec<String>,
    pub building_amenities: Vec<String>,
    pub regions: Vec<Region>,
    /// Known listing URLs fed straight to extraction, bypassing discovery.
    pub seed_listings: Vec<String>,
    pub browser_binary: Option<PathBuf>,
    pub limits: Limits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.padmapper.com".to_string(),
            area_slug: "toronto-on".to_string(),
            columns: default_columns(),
            unit_amenities: to_strings(&[
                "Balcony",
                "In Unit Laundry",
                "Air Conditioning",
                "High Ceilings",
                "Furnished",
                "Hardwood Floor",
            ]),
            building_amenities: to_strings(&[
                "Controlled Access",
                "Fitness Center",
                "Swimming Pool",
                "Roof Deck",
                "Storage",
                "Residents Lounge",
                "Outdoor Space",
            ]),
            regions: default_regions(),
            seed_listings: Vec::new(),
            browser_binary: None,
            limits: Limits::default(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file (JSON). Missing keys fall back
    /// to the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject malformed input before the crawl starts.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;
        if self.columns.is_empty() {
            bail!("Column schema is empty");
        }
        for region in &self.regions {
            let b = &region.bounding_box;
            let coords = [
                b.southwest.lon,
                b.southwest.lat,
                b.northeast.lon,
                b.northeast.lat,
            ];
            if coords.iter().any(|c| !c.is_finite()) {
                bail!("Region '{}' has non-finite coordinates", region.name);
            }
            if b.southwest.lon >= b.northeast.lon || b.southwest.lat >= b.northeast.lat {
                bail!(
                    "Region '{}' bounding box corners are not southwest/northeast ordered",
                    region.name
                );
            }
        }
        Ok(())
    }

    /// Browser binary to launch. The CHROME_PATH environment variable takes
    /// precedence over the configured value.
    pub fn browser_path(&self) -> Option<PathBuf> {
        env::var_os("CHROME_PATH")
            .map(PathBuf::from)
            .or_else(|| self.browser_binary.clone())
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn default_columns() -> Vec<ColumnSpec> {
    [
        "Building",
        "Neighbourhood",
        "Address",
        "City",
        "Listing",
        "Bed",
        "Bath",
        "SqFt",
        "Price",
        "Unit Amenities",
        "Building Amenities",
        "Pets",
        "Latitude",
        "Longitude",
        "Date",
    ]
    .iter()
    .map(|name| ColumnSpec {
        name: name.to_string(),
        default: Value::Null,
    })
    .collect()
}

fn default_regions() -> Vec<Region> {
    let regions: [(&str, (f64, f64), (f64, f64)); 8] = [
        ("Downtown Core", (-79.398, 43.643), (-79.3762, 43.66)),
        ("Midtown", (-79.4165, 43.67), (-79.388, 43.7)),
        ("West End", (-79.449, 43.628), (-79.402, 43.65)),
        ("East End", (-79.36, 43.65), (-79.315, 43.685)),
        ("North Toronto", (-79.425, 43.7), (-79.383, 43.73)),
        ("University Area", (-79.4042, 43.6572), (-79.39, 43.6675)),
        (
            "Scarborough",
            (-79.21498455469643, 43.74522758306715),
            (-79.17281544530357, 43.78977241693285),
        ),
        (
            "Etobicoke",
            (-79.57890339741783, 43.6379061704074),
            (-79.53609660258218, 43.682093829592596),
        ),
    ];

    regions
        .into_iter()
        .map(|(name, sw, ne)| Region {
            name: name.to_string(),
            bounding_box: BoundingBox {
                southwest: GeoPoint { lon: sw.0, lat: sw.1 },
                northeast: GeoPoint { lon: ne.0, lat: ne.1 },
            },
        })
        .collect()
}
