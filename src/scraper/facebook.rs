//! Facebook groups adapter: posts come from an Apify actor run, then an
//! LLM extraction pass turns each free-form post into a listing.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::model::{Listing, ListingSource, ScrapeError};
use crate::parser::llm::{LlmExtractor, is_iso_post, listing_from_extracted};

use super::Scraper;
use super::fetcher::Fetcher;

const ACTOR_ENDPOINT: &str =
    "https://api.apify.com/v2/acts/apify~facebook-groups-scraper/run-sync-get-dataset-items";
const RESULTS_LIMIT: usize = 10;
const RAW_TEXT_LIMIT: usize = 1000;

pub struct FacebookScraper {
    fetcher: Fetcher,
}

impl FacebookScraper {
    pub fn new() -> Self {
        Self {
            fetcher: Fetcher::new(),
        }
    }

    /// Runs the actor synchronously for one group and returns its dataset.
    async fn fetch_group_posts(
        &self,
        token: &str,
        group_url: &str,
    ) -> Result<Vec<Value>, ScrapeError> {
        info!("Scraping Facebook group: {group_url}");

        let run_input = json!({
            "startUrls": [{"url": group_url}],
            "resultsLimit": RESULTS_LIMIT,
            "onlyPostsNewerThan": "5 hours",
            "maxComments": 0,
            "includeNestedComments": false,
        });

        let response = self
            .fetcher
            .client()
            .post(ACTOR_ENDPOINT)
            .query(&[("token", token)])
            .json(&run_input)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScrapeError::InvalidResponse(format!(
                "apify actor returned status {}",
                response.status()
            )));
        }

        let items: Vec<Value> = response.json().await?;
        info!("  Got {} posts from {group_url}", items.len());
        if items.len() >= RESULTS_LIMIT {
            warn!(
                "  Hit result limit for {group_url} ({}/{RESULTS_LIMIT}), \
                 some posts may have been missed",
                items.len()
            );
        }
        Ok(items)
    }
}

impl Default for FacebookScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Scraper for FacebookScraper {
    fn source(&self) -> ListingSource {
        ListingSource::Facebook
    }

    async fn scrape(&self, cfg: &AppConfig) -> Result<Vec<Listing>, ScrapeError> {
        if cfg.apify_api_token.is_empty() {
            warn!("No Apify API token configured, skipping Facebook groups");
            return Ok(Vec::new());
        }
        if cfg.anthropic_api_key.is_empty() {
            warn!("No Anthropic API key configured, skipping Facebook groups");
            return Ok(Vec::new());
        }

        let extractor = LlmExtractor::new(&cfg.anthropic_api_key);

        let mut posts = Vec::new();
        for group_url in &cfg.facebook_group_urls {
            match self.fetch_group_posts(&cfg.apify_api_token, group_url).await {
                Ok(items) => posts.extend(items),
                Err(e) => error!("Failed to scrape group {group_url}: {e}"),
            }
            self.fetcher.polite_delay(cfg.scrape_delay_seconds).await;
        }
        info!("Fetched {} total Facebook posts", posts.len());

        let mut listings = Vec::new();
        for post in &posts {
            match post_to_listing(post, &extractor).await {
                Ok(Some(listing)) => listings.push(listing),
                Ok(None) => {}
                Err(e) => warn!("LLM extraction failed: {e}"),
            }
        }

        info!("Facebook: {} listings parsed", listings.len());
        Ok(listings)
    }
}

async fn post_to_listing(
    post: &Value,
    extractor: &LlmExtractor,
) -> Result<Option<Listing>, ScrapeError> {
    let text = post_text(post);
    if text.trim().len() < 20 {
        return Ok(None);
    }

    let Some(fields) = extractor.extract(&text).await? else {
        return Ok(None);
    };
    if is_iso_post(&fields) {
        return Ok(None);
    }

    let mut listing = listing_from_extracted(&fields, ListingSource::Facebook);
    listing.source_url = post_url(post);
    listing.raw_text = text.chars().take(RAW_TEXT_LIMIT).collect();
    listing.posted_date = post_timestamp(post);
    listing.images = post_images(post);
    Ok(Some(listing))
}

fn str_field(post: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| post.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string()
}

fn post_text(post: &Value) -> String {
    str_field(post, &["text", "message"])
}

fn post_url(post: &Value) -> String {
    str_field(post, &["url", "postUrl"])
}

/// Actor output carries timestamps as either RFC 3339 strings or epoch
/// seconds depending on the post kind.
fn post_timestamp(post: &Value) -> Option<DateTime<Utc>> {
    let raw = post.get("time").or_else(|| post.get("timestamp"))?;
    if let Some(s) = raw.as_str() {
        return DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));
    }
    if let Some(epoch) = raw.as_i64() {
        return DateTime::from_timestamp(epoch, 0);
    }
    None
}

fn post_images(post: &Value) -> Vec<String> {
    if let Some(images) = post.get("images").and_then(Value::as_array) {
        return images
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }
    if let Some(media) = post.get("media").and_then(Value::as_array) {
        return media
            .iter()
            .filter_map(|m| m.get("url").and_then(Value::as_str))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();
    }
    Vec::new()
}
