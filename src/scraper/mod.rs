//! Source adapters. Each adapter owns one site's fetch-and-extract logic
//! and hands back partially-filled listings; the normalizer fills the rest.

pub mod craigslist;
pub mod facebook;
pub mod fetcher;

use crate::config::AppConfig;
use crate::model::{Listing, ListingSource, ScrapeError};

#[async_trait::async_trait]
pub trait Scraper: Send + Sync {
    fn source(&self) -> ListingSource;

    async fn scrape(&self, cfg: &AppConfig) -> Result<Vec<Listing>, ScrapeError>;
}

/// All adapters keyed by the name used on the command line.
pub fn registry() -> Vec<(&'static str, Box<dyn Scraper>)> {
    vec![
        ("craigslist", Box::new(craigslist::CraigslistScraper::new())),
        ("facebook", Box::new(facebook::FacebookScraper::new())),
    ]
}
