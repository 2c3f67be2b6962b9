//! Craigslist sublets adapter: static search-results HTML, no JS rendering.

use chrono::Datelike;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::model::{Borough, Listing, ListingSource, ScrapeError};
use crate::parser::dates::extract_date_range;
use crate::parser::location::{
    extract_neighborhood, extract_parenthetical, get_borough, normalize_neighborhood,
};
use crate::parser::price::parse_price;
use crate::parser::structured::{
    detect_listing_type, extract_apartment_details, extract_furnished,
};

use super::Scraper;
use super::fetcher::Fetcher;

const SEARCH_URL: &str = "https://newyork.craigslist.org/search/sub?max_price=2200";

pub struct CraigslistScraper {
    fetcher: Fetcher,
}

impl CraigslistScraper {
    pub fn new() -> Self {
        Self {
            fetcher: Fetcher::new(),
        }
    }
}

impl Default for CraigslistScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Scraper for CraigslistScraper {
    fn source(&self) -> ListingSource {
        ListingSource::Craigslist
    }

    async fn scrape(&self, cfg: &AppConfig) -> Result<Vec<Listing>, ScrapeError> {
        info!("Scraping Craigslist: {SEARCH_URL}");
        let html = self.fetcher.fetch_html(SEARCH_URL).await?;

        let default_year = cfg.scoring.target_start_date.year();
        let listings = parse_search_results(&html, cfg.max_listings_per_source, default_year);
        info!("Craigslist: {} listings parsed", listings.len());
        Ok(listings)
    }
}

fn parse_search_results(html: &str, limit: usize, default_year: i32) -> Vec<Listing> {
    let document = Html::parse_document(html);

    let item_sel = match Selector::parse("li.cl-static-search-result") {
        Ok(sel) => sel,
        Err(e) => {
            warn!("Bad selector: {e}");
            return Vec::new();
        }
    };
    let link_sel = Selector::parse("a").unwrap();
    let title_sel = Selector::parse(".title").unwrap();
    let price_sel = Selector::parse(".price").unwrap();
    let location_sel = Selector::parse(".location").unwrap();

    let mut listings = Vec::new();
    for item in document.select(&item_sel).take(limit) {
        if let Some(listing) = parse_item(
            &item,
            &link_sel,
            &title_sel,
            &price_sel,
            &location_sel,
            default_year,
        ) {
            listings.push(listing);
        }
    }
    listings
}

fn parse_item(
    item: &scraper::ElementRef<'_>,
    link_sel: &Selector,
    title_sel: &Selector,
    price_sel: &Selector,
    location_sel: &Selector,
    default_year: i32,
) -> Option<Listing> {
    let link = item.select(link_sel).next()?;
    let source_url = link.value().attr("href").unwrap_or("").to_string();

    let text_of = |sel: &Selector| -> String {
        item.select(sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    };

    let title = text_of(title_sel);
    let price_text = text_of(price_sel);
    let location_text = text_of(location_sel);

    // Craigslist's location tag is freeform; fall back to the trailing
    // "(Neighborhood)" convention in the title, then to a full text scan.
    let (neighborhood, borough) = if location_text.is_empty() {
        let parenthetical = extract_parenthetical(&title);
        if parenthetical.is_empty() {
            extract_neighborhood(&title)
        } else {
            let canonical = normalize_neighborhood(&parenthetical);
            (canonical.clone(), get_borough(&canonical))
        }
    } else {
        let canonical = normalize_neighborhood(&location_text);
        match get_borough(&canonical) {
            Borough::Unknown => extract_neighborhood(&location_text),
            borough => (canonical, borough),
        }
    };

    let (available_from, available_to) = extract_date_range(&title, default_year);

    let mut listing = Listing::new(ListingSource::Craigslist);
    listing.source_url = source_url;
    listing.price_monthly = parse_price(&price_text);
    listing.price_raw = price_text;
    listing.neighborhood = neighborhood;
    listing.borough = borough;
    listing.listing_type = detect_listing_type(&title);
    listing.apartment_details = extract_apartment_details(&title);
    listing.is_furnished = extract_furnished(&title);
    listing.available_from = available_from;
    listing.available_to = available_to;
    listing.description = title.chars().take(300).collect();
    listing.raw_text = title.clone();
    listing.title = title;
    Some(listing)
}
