use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Presence mapping from a fixed amenity vocabulary term to a 0/1 flag.
pub type AmenityFlags = IndexMap<String, u8>;

/// A point as longitude/latitude, matching the order the site's search
/// query expects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Axis-aligned geographic box spanned by its southwest and northeast corners.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub southwest: GeoPoint,
    pub northeast: GeoPoint,
}

/// Named search area. Loaded once at startup and used only to build search
/// query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub bounding_box: BoundingBox,
}

/// Normalized record for one rental listing.
///
/// Field-level parse failures leave the field `None`; a listing is only
/// rejected outright when both price and address are missing. Identity for
/// deduplication is `listing_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub building: Option<String>,
    pub neighbourhood: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub listing_url: String,
    pub bed: Option<f32>,
    pub bath: Option<f32>,
    pub sqft: Option<u32>,
    pub price: Option<i64>,
    pub unit_amenities: AmenityFlags,
    pub building_amenities: AmenityFlags,
    pub pets: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub scraped_at: DateTime<Utc>,
}

impl Listing {
    /// Value of one export column for this listing, or `None` when the field
    /// was not extracted (the aggregator fills the column default instead).
    pub fn column_value(&self, column: &str) -> Option<Value> {
        match column {
            "Building" => self.building.clone().map(Value::String),
            "Neighbourhood" => self.neighbourhood.clone().map(Value::String),
            "Address" => self.address.clone().map(Value::String),
            "City" => self.city.clone().map(Value::String),
            "Listing" | "Listing URL" => Some(Value::String(self.listing_url.clone())),
            "Bed" => float_value(self.bed),
            "Bath" => float_value(self.bath),
            "SqFt" => self.sqft.map(|n| Value::Number(n.into())),
            "Price" => self.price.map(|n| Value::Number(n.into())),
            "Unit Amenities" => serde_json::to_value(&self.unit_amenities).ok(),
            "Building Amenities" => serde_json::to_value(&self.building_amenities).ok(),
            "Pets" => self.pets.clone().map(Value::String),
            "Latitude" => self.latitude.and_then(number_value),
            "Longitude" => self.longitude.and_then(number_value),
            "Date" => Some(Value::String(self.scraped_at.to_rfc3339())),
            _ => None,
        }
    }
}

fn float_value(value: Option<f32>) -> Option<Value> {
    value.and_then(|v| number_value(v as f64))
}

fn number_value(value: f64) -> Option<Value> {
    serde_json::Number::from_f64(value).map(Value::Number)
}
