use std::collections::{HashSet, VecDeque};

use anyhow::Result;
use chrono::Utc;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::models::{AmenityFlags, Listing, Region};
use crate::scrapers::traits::PageSource;

/// Anchor identifying one listing card in a search result page. Detail
/// pages live under /buildings/ on the site.
const LISTING_CARD_MARKER: &str = "a[href*='/buildings/']";
/// Detail pages render the summary header before anything else useful.
const DETAIL_MARKER: &str = "h1";

const BED_UNITS: &[&str] = &["bed", "beds", "bedroom", "bedrooms"];
const BATH_UNITS: &[&str] = &["bath", "baths", "bathroom", "bathrooms"];
const SQFT_UNITS: &[&str] = &["sqft", "ft²"];

/// Recoverable per-listing failure. Logged and counted by the pipeline,
/// never fatal for the crawl.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page failed to render: {0:#}")]
    Navigation(anyhow::Error),
    #[error("listing is missing both price and address")]
    Insufficient,
}

/// Site-specific scraping logic for padmapper.com: bounded search URLs,
/// result-page pagination and detail-page extraction.
pub struct PadmapperScraper {
    base: Url,
    area_slug: String,
    unit_amenities: Vec<String>,
    building_amenities: Vec<String>,
    max_pages: usize,
}

impl PadmapperScraper {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            base: Url::parse(&config.base_url)?,
            area_slug: config.area_slug.clone(),
            unit_amenities: config.unit_amenities.clone(),
            building_amenities: config.building_amenities.clone(),
            max_pages: config.limits.max_pages_per_search,
        })
    }

    /// Bounded search URL for one region. Coordinates are embedded as
    /// `box=sw_lon,sw_lat,ne_lon,ne_lat`, the order the site expects.
    pub fn search_url(&self, region: &Region) -> String {
        let b = &region.bounding_box;
        format!(
            "{}://{}/apartments/{}?box={},{},{},{}",
            self.base.scheme(),
            self.base.host_str().unwrap_or_default(),
            self.area_slug,
            b.southwest.lon,
            b.southwest.lat,
            b.northeast.lon,
            b.northeast.lat,
        )
    }

    /// Lazy pagination over one search URL. A fresh call re-paginates from
    /// page one.
    pub fn discover_links<'a, P: PageSource>(
        &self,
        source: &'a mut P,
        search_url: &str,
    ) -> LinkStream<'a, P> {
        LinkStream {
            source,
            base: self.base.clone(),
            pending: VecDeque::new(),
            next_url: Some(search_url.to_string()),
            visited_pages: HashSet::new(),
            seen_links: HashSet::new(),
            pages_left: self.max_pages,
            done: false,
        }
    }

    /// Render one listing page and parse it into a normalized row.
    pub fn extract<P: PageSource>(
        &self,
        source: &mut P,
        url: &str,
    ) -> Result<Listing, ExtractError> {
        let html = source
            .page(url, Some(DETAIL_MARKER))
            .map_err(ExtractError::Navigation)?;
        let document = Html::parse_document(&html);
        self.listing_from_document(&document, url)
    }

    fn listing_from_document(
        &self,
        document: &Html,
        url: &str,
    ) -> Result<Listing, ExtractError> {
        let title = text_of(document, "h1");
        let (title_building, title_address, title_city) = title
            .as_deref()
            .map(split_title)
            .unwrap_or((None, None, None));

        let building = text_of(document, "[class*='building-name']").or(title_building);
        let address = text_of(document, "[itemprop='streetAddress']").or(title_address);
        let city = text_of(document, "[itemprop='addressLocality']").or(title_city);
        let neighbourhood = text_of(document, "[class*='neighborhood'] a")
            .or_else(|| text_of(document, "[class*='neighbourhood'] a"));

        let body = document.root_element().text().collect::<String>();

        // Price is scoped to a price node when one exists; the whole page is
        // only a fallback because related-listing cards also carry prices.
        let price = text_of(document, "[class*='price']")
            .as_deref()
            .and_then(parse_price)
            .or_else(|| parse_price(&body));

        let mut bed = number_before(&body, BED_UNITS).map(|n| n as f32);
        if bed.is_none() && body.to_lowercase().contains("studio") {
            bed = Some(0.0);
        }
        let bath = number_before(&body, BATH_UNITS).map(|n| n as f32);
        let sqft = number_before(&body, SQFT_UNITS).map(|n| n.round() as u32);

        if price.is_none() && address.is_none() {
            return Err(ExtractError::Insufficient);
        }

        let amenity_text = section_text(document, "[class*='amenit']").unwrap_or_else(|| body.clone());
        let unit_amenities = amenity_flags(&self.unit_amenities, &amenity_text);
        let building_amenities = amenity_flags(&self.building_amenities, &amenity_text);

        Ok(Listing {
            building,
            neighbourhood,
            address,
            city,
            listing_url: url.to_string(),
            bed,
            bath,
            sqft,
            price,
            unit_amenities,
            building_amenities,
            pets: pet_policy(document),
            latitude: geo_coordinate(document, "latitude"),
            longitude: geo_coordinate(document, "longitude"),
            scraped_at: Utc::now(),
        })
    }
}

/// Lazy, finite, non-restartable stream of listing URLs for one search URL.
///
/// Links are yielded in DOM order within a page, pages in visitation order.
/// The stream ends at the last page, on a repeated page URL (cycle guard),
/// at the page safety limit, when a page contributes nothing new, or early
/// when a page fails to render after retries (partial result, logged).
pub struct LinkStream<'a, P: PageSource> {
    source: &'a mut P,
    base: Url,
    pending: VecDeque<String>,
    next_url: Option<String>,
    visited_pages: HashSet<String>,
    seen_links: HashSet<String>,
    pages_left: usize,
    done: bool,
}

impl<P: PageSource> Iterator for LinkStream<'_, P> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(link) = self.pending.pop_front() {
                return Some(link);
            }
            if self.done {
                return None;
            }

            let Some(page_url) = self.next_url.take() else {
                self.done = true;
                return None;
            };
            if self.pages_left == 0 {
                warn!("Page limit reached at {}; stopping pagination", page_url);
                self.done = true;
                return None;
            }
            if !self.visited_pages.insert(page_url.clone()) {
                debug!("Already visited {}; stopping pagination", page_url);
                self.done = true;
                return None;
            }
            self.pages_left -= 1;

            let html = match self.source.page(&page_url, Some(LISTING_CARD_MARKER)) {
                Ok(html) => html,
                Err(e) => {
                    warn!(
                        "Search page {} failed to render: {:#}; ending discovery early",
                        page_url, e
                    );
                    self.done = true;
                    return None;
                }
            };
            let document = Html::parse_document(&html);

            let mut fresh = 0usize;
            for link in listing_links(&document, &self.base) {
                if self.seen_links.insert(link.clone()) {
                    self.pending.push_back(link);
                    fresh += 1;
                }
            }
            debug!("{} new links on {}", fresh, page_url);

            self.next_url = next_page_url(&document, &self.base);
            if fresh == 0 {
                self.done = true;
            }
        }
    }
}

/// Listing-card targets in DOM order, deduplicated within the page.
fn listing_links(document: &Html, base: &Url) -> Vec<String> {
    let card = Selector::parse(LISTING_CARD_MARKER).unwrap();
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in document.select(&card) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if let Some(link) = normalize_link(base, href) {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }
    links
}

/// Absolute listing URL with query and fragment dropped, so identity
/// comparisons are stable across pages and regions.
fn normalize_link(base: &Url, href: &str) -> Option<String> {
    let mut url = base.join(href).ok()?;
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

/// Next-page control, if any. The query string is kept: it carries the page
/// number.
fn next_page_url(document: &Html, base: &Url) -> Option<String> {
    let rel_next = Selector::parse("a[rel='next']").unwrap();
    let candidate = document
        .select(&rel_next)
        .next()
        .or_else(|| {
            let anchors = Selector::parse("a").unwrap();
            document.select(&anchors).find(|a| {
                let label = a.text().collect::<String>();
                label.trim().eq_ignore_ascii_case("next")
                    || a.value()
                        .attr("aria-label")
                        .is_some_and(|l| l.eq_ignore_ascii_case("next"))
            })
        })?;

    let href = candidate.value().attr("href")?;
    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url.to_string())
}

/// Case-insensitive presence flags for every vocabulary term. Terms absent
/// from the text get an explicit 0; text outside the vocabulary is ignored.
pub fn amenity_flags(vocabulary: &[String], text: &str) -> AmenityFlags {
    let haystack = text.to_lowercase();
    vocabulary
        .iter()
        .map(|term| {
            let hit = haystack.contains(&term.to_lowercase());
            (term.clone(), u8::from(hit))
        })
        .collect()
}

/// Joined, whitespace-collapsed text of the first element matching
/// `selector`, if any.
fn text_of(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| collapse_ws(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Concatenated text of every element matching `selector`.
fn section_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let joined = document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");
    let joined = collapse_ws(&joined);
    (!joined.is_empty()).then_some(joined)
}

fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a detail-page header like
/// "The Lakefront at 17 Bathurst St, Toronto, ON" into building, address
/// and city parts. Headers without " at " name only the building.
fn split_title(title: &str) -> (Option<String>, Option<String>, Option<String>) {
    match title.split_once(" at ") {
        Some((building, rest)) => {
            let mut parts = rest.split(',').map(str::trim);
            let address = parts
                .next()
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let city = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
            (Some(building.trim().to_string()), address, city)
        }
        None => (Some(title.trim().to_string()), None, None),
    }
}

/// First dollar amount in the text: "$2,300/mo" -> 2300. Cents are dropped.
fn parse_price(text: &str) -> Option<i64> {
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        rest = &rest[pos + 1..];
        let digits: String = rest
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',')
            .filter(char::is_ascii_digit)
            .collect();
        if !digits.is_empty() {
            return digits.parse().ok();
        }
    }
    None
}

/// Number immediately preceding a unit word in free text: "2 Beds",
/// "1.5 bath", "750 sqft". Unit words match whole tokens only, so street
/// names like "Bathurst" never count.
fn number_before(text: &str, units: &[&str]) -> Option<f64> {
    let mut prev: Option<f64> = None;
    for raw in text.split_whitespace() {
        let token = raw.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '.' && c != '²');
        let lower = token.to_lowercase();
        if units.iter().any(|unit| lower == *unit) {
            if let Some(n) = prev {
                return Some(n);
            }
        }
        prev = parse_number(token);
    }
    None
}

fn parse_number(token: &str) -> Option<f64> {
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return None;
    }
    cleaned.parse().ok()
}

/// Pet policy text: a dedicated policy node when present, otherwise the
/// first list item mentioning pets.
fn pet_policy(document: &Html) -> Option<String> {
    if let Some(text) = text_of(document, "[class*='pet']") {
        return Some(text);
    }
    let items = Selector::parse("li").unwrap();
    document
        .select(&items)
        .map(|el| collapse_ws(&el.text().collect::<String>()))
        .find(|t| t.to_lowercase().contains("pet"))
}

/// Geo coordinate from page metadata (`place:location:latitude` and
/// friends) or a map widget's data attributes. `axis` is "latitude" or
/// "longitude".
fn geo_coordinate(document: &Html, axis: &str) -> Option<f64> {
    let meta = Selector::parse("meta").unwrap();
    for el in document.select(&meta) {
        let key = el
            .value()
            .attr("name")
            .or_else(|| el.value().attr("property"));
        if key.is_some_and(|k| k.ends_with(axis)) {
            if let Some(value) = el
                .value()
                .attr("content")
                .and_then(|c| c.trim().parse().ok())
            {
                return Some(value);
            }
        }
    }

    let data_attr = format!("data-{}", axis);
    let widget = Selector::parse(&format!("[{}]", data_attr)).ok()?;
    document
        .select(&widget)
        .next()
        .and_then(|el| el.value().attr(data_attr.as_str()))
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;

    struct FakeSource(HashMap<String, String>);

    impl PageSource for FakeSource {
        fn page(&mut self, url: &str, _marker: Option<&str>) -> Result<String> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("no such page: {url}"))
        }
    }

    fn scraper_with(max_pages: usize) -> PadmapperScraper {
        let mut config = Config::default();
        config.limits.max_pages_per_search = max_pages;
        PadmapperScraper::new(&config).unwrap()
    }

    fn search_page(links: &[&str], next: Option<&str>) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{href}">listing card</a>"#))
            .collect();
        let pager = next
            .map(|href| format!(r#"<a rel="next" href="{href}">Next</a>"#))
            .unwrap_or_default();
        format!("<html><body><div class='list'>{anchors}</div>{pager}</body></html>")
    }

    fn listing_page(title: &str, price: &str, summary: &str, amenities: &[&str]) -> String {
        let items: String = amenities
            .iter()
            .map(|a| format!("<li>{a}</li>"))
            .collect();
        format!(
            r#"<html><head>
            <meta name="place:location:latitude" content="43.6403" />
            <meta name="place:location:longitude" content="-79.3996" />
            </head><body>
            <h1>{title}</h1>
            <div class="price-summary">{price}</div>
            <div class="detail-summary">{summary}</div>
            <ul class="amenities-list">{items}</ul>
            <div class="pet-policy">Cats and small dogs allowed</div>
            </body></html>"#
        )
    }

    #[test]
    fn search_url_embeds_coordinates_in_order() {
        let scraper = scraper_with(20);
        let region = &Config::default().regions[0];
        assert_eq!(
            scraper.search_url(region),
            "https://www.padmapper.com/apartments/toronto-on?box=-79.398,43.643,-79.3762,43.66"
        );
    }

    #[test]
    fn discovery_paginates_and_dedups() {
        let scraper = scraper_with(20);
        let search = "https://www.padmapper.com/apartments/toronto-on?box=-79.4,43.6,-79.3,43.7";
        let page2 = "https://www.padmapper.com/apartments/toronto-on?box=-79.4,43.6,-79.3,43.7&page=2";

        let mut pages = HashMap::new();
        pages.insert(
            search.to_string(),
            search_page(
                &["/buildings/p1", "/buildings/p2", "/buildings/p2", "/buildings/p3"],
                Some(page2),
            ),
        );
        // Page 2 repeats p1 and adds one new link, with no pager.
        pages.insert(
            page2.to_string(),
            search_page(&["/buildings/p1", "/buildings/p4"], None),
        );

        let mut source = FakeSource(pages);
        let links: Vec<String> = scraper.discover_links(&mut source, search).collect();
        assert_eq!(
            links,
            vec![
                "https://www.padmapper.com/buildings/p1",
                "https://www.padmapper.com/buildings/p2",
                "https://www.padmapper.com/buildings/p3",
                "https://www.padmapper.com/buildings/p4",
            ]
        );
    }

    #[test]
    fn discovery_terminates_without_next_control() {
        let scraper = scraper_with(20);
        let search = "https://www.padmapper.com/apartments/toronto-on?box=0,0,1,1";
        let mut pages = HashMap::new();
        pages.insert(search.to_string(), search_page(&["/buildings/p1"], None));

        let mut source = FakeSource(pages);
        let links: Vec<String> = scraper.discover_links(&mut source, search).collect();
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn discovery_respects_page_safety_limit() {
        let scraper = scraper_with(5);
        let mut pages = HashMap::new();
        // Every page links one unique listing and points at the next page.
        for i in 0..50 {
            let url = format!("https://www.padmapper.com/apartments/toronto-on?page={i}");
            let next = format!("https://www.padmapper.com/apartments/toronto-on?page={}", i + 1);
            let link = format!("/buildings/p{i}");
            pages.insert(url, search_page(&[link.as_str()], Some(next.as_str())));
        }

        let mut source = FakeSource(pages);
        let start = "https://www.padmapper.com/apartments/toronto-on?page=0";
        let links: Vec<String> = scraper.discover_links(&mut source, start).collect();
        assert_eq!(links.len(), 5);
    }

    #[test]
    fn discovery_stops_on_pagination_cycle() {
        let scraper = scraper_with(20);
        let page_a = "https://www.padmapper.com/apartments/toronto-on?page=1";
        let page_b = "https://www.padmapper.com/apartments/toronto-on?page=2";
        let mut pages = HashMap::new();
        pages.insert(
            page_a.to_string(),
            search_page(&["/buildings/p1"], Some(page_b)),
        );
        pages.insert(
            page_b.to_string(),
            search_page(&["/buildings/p2"], Some(page_a)),
        );

        let mut source = FakeSource(pages);
        let links: Vec<String> = scraper.discover_links(&mut source, page_a).collect();
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn discovery_yields_partial_result_on_render_failure() {
        let scraper = scraper_with(20);
        let search = "https://www.padmapper.com/apartments/toronto-on?page=1";
        let missing = "https://www.padmapper.com/apartments/toronto-on?page=2";
        let mut pages = HashMap::new();
        pages.insert(
            search.to_string(),
            search_page(&["/buildings/p1", "/buildings/p2"], Some(missing)),
        );

        let mut source = FakeSource(pages);
        let links: Vec<String> = scraper.discover_links(&mut source, search).collect();
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn amenity_matching_sets_presence_flags() {
        let config = Config::default();
        let text = "Bright corner unit with a large Balcony and access to the Roof Deck.";

        let unit = amenity_flags(&config.unit_amenities, text);
        assert_eq!(unit["Balcony"], 1);
        for (term, flag) in &unit {
            if term != "Balcony" {
                assert_eq!(*flag, 0, "unexpected unit flag for {term}");
            }
        }

        let building = amenity_flags(&config.building_amenities, text);
        assert_eq!(building["Roof Deck"], 1);
        for (term, flag) in &building {
            if term != "Roof Deck" {
                assert_eq!(*flag, 0, "unexpected building flag for {term}");
            }
        }
    }

    #[test]
    fn extraction_parses_a_full_listing() {
        let scraper = scraper_with(20);
        let url = "https://www.padmapper.com/buildings/p470812";
        let mut pages = HashMap::new();
        pages.insert(
            url.to_string(),
            listing_page(
                "The Lakefront at 17 Bathurst St, Toronto, ON",
                "$2,450/mo",
                "1 Bed 1 Bath 640 sqft",
                &["Balcony", "In Unit Laundry", "Fitness Center"],
            ),
        );

        let mut source = FakeSource(pages);
        let listing = scraper.extract(&mut source, url).unwrap();
        assert_eq!(listing.building.as_deref(), Some("The Lakefront"));
        assert_eq!(listing.address.as_deref(), Some("17 Bathurst St"));
        assert_eq!(listing.city.as_deref(), Some("Toronto"));
        assert_eq!(listing.price, Some(2450));
        assert_eq!(listing.bed, Some(1.0));
        assert_eq!(listing.bath, Some(1.0));
        assert_eq!(listing.sqft, Some(640));
        assert_eq!(listing.latitude, Some(43.6403));
        assert_eq!(listing.longitude, Some(-79.3996));
        assert_eq!(listing.unit_amenities["Balcony"], 1);
        assert_eq!(listing.unit_amenities["In Unit Laundry"], 1);
        assert_eq!(listing.unit_amenities["Furnished"], 0);
        assert_eq!(listing.building_amenities["Fitness Center"], 1);
        assert_eq!(listing.building_amenities["Swimming Pool"], 0);
        assert_eq!(
            listing.pets.as_deref(),
            Some("Cats and small dogs allowed")
        );
    }

    #[test]
    fn extraction_tolerates_missing_sqft() {
        let scraper = scraper_with(20);
        let url = "https://www.padmapper.com/buildings/p1";
        let mut pages = HashMap::new();
        pages.insert(
            url.to_string(),
            listing_page(
                "39 Niagara St at 39 Niagara St, Toronto, ON",
                "$2,100/mo",
                "2 Beds 2 Baths — sqft",
                &[],
            ),
        );

        let mut source = FakeSource(pages);
        let listing = scraper.extract(&mut source, url).unwrap();
        assert_eq!(listing.sqft, None);
        assert_eq!(listing.price, Some(2100));
        assert_eq!(listing.bed, Some(2.0));
        assert_eq!(listing.bath, Some(2.0));
        assert!(listing.address.is_some());
    }

    #[test]
    fn extraction_rejects_listing_without_price_and_address() {
        let scraper = scraper_with(20);
        let url = "https://www.padmapper.com/buildings/p2";
        let mut pages = HashMap::new();
        pages.insert(
            url.to_string(),
            "<html><body><h1>Coming soon</h1></body></html>".to_string(),
        );

        let mut source = FakeSource(pages);
        match scraper.extract(&mut source, url) {
            Err(ExtractError::Insufficient) => {}
            other => panic!("expected Insufficient, got {other:?}"),
        }
    }

    #[test]
    fn extraction_reports_navigation_failure() {
        let scraper = scraper_with(20);
        let mut source = FakeSource(HashMap::new());
        match scraper.extract(&mut source, "https://www.padmapper.com/buildings/p404") {
            Err(ExtractError::Navigation(_)) => {}
            other => panic!("expected Navigation, got {other:?}"),
        }
    }

    #[test]
    fn studio_listings_count_as_zero_beds() {
        let scraper = scraper_with(20);
        let url = "https://www.padmapper.com/buildings/p3";
        let mut pages = HashMap::new();
        pages.insert(
            url.to_string(),
            listing_page(
                "The Annex at 10 Walmer Rd, Toronto, ON",
                "$1,850/mo",
                "Studio 1 Bath 420 sqft",
                &[],
            ),
        );

        let mut source = FakeSource(pages);
        let listing = scraper.extract(&mut source, url).unwrap();
        assert_eq!(listing.bed, Some(0.0));
    }

    #[test]
    fn price_parser_handles_commas_and_suffixes() {
        assert_eq!(parse_price("$2,300/mo"), Some(2300));
        assert_eq!(parse_price("from $1,895 per month"), Some(1895));
        assert_eq!(parse_price("$— call for pricing $2,050"), Some(2050));
        assert_eq!(parse_price("no pricing here"), None);
    }

    #[test]
    fn number_before_matches_whole_unit_tokens() {
        assert_eq!(number_before("2 Beds 1.5 Baths", BED_UNITS), Some(2.0));
        assert_eq!(number_before("2 Beds 1.5 Baths", BATH_UNITS), Some(1.5));
        assert_eq!(number_before("1,050 sqft", SQFT_UNITS), Some(1050.0));
        assert_eq!(number_before("— sqft", SQFT_UNITS), None);
        assert_eq!(number_before("3 bedrooms", BED_UNITS), Some(3.0));
        // Street names that merely start with a unit word do not count.
        assert_eq!(number_before("17 Bathurst St", BATH_UNITS), None);
    }

    #[test]
    fn links_are_normalized_for_identity() {
        let base = Url::parse("https://www.padmapper.com").unwrap();
        assert_eq!(
            normalize_link(&base, "/buildings/p1?utm=feed#photos").as_deref(),
            Some("https://www.padmapper.com/buildings/p1")
        );
        assert_eq!(
            normalize_link(&base, "https://www.padmapper.com/buildings/p2").as_deref(),
            Some("https://www.padmapper.com/buildings/p2")
        );
    }
}
