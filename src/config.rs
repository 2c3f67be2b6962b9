use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::model::{Borough, ConfigError, ListingType};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    // API keys
    #[serde(default)]
    pub apify_api_token: String,
    #[serde(default)]
    pub anthropic_api_key: String,

    // Persistence
    #[serde(default = "default_db_path")]
    pub db_path: String,

    // Facebook groups to scan
    #[serde(default = "default_facebook_group_urls")]
    pub facebook_group_urls: Vec<String>,

    // Scraping behavior
    #[serde(default = "default_max_listings")]
    pub max_listings_per_source: usize,
    #[serde(default = "default_scrape_delay")]
    pub scrape_delay_seconds: u64,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            apify_api_token: String::new(),
            anthropic_api_key: String::new(),
            db_path: default_db_path(),
            facebook_group_urls: default_facebook_group_urls(),
            max_listings_per_source: default_max_listings(),
            scrape_delay_seconds: default_scrape_delay(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Everything the rating engine needs, injected so the scoring functions
/// stay pure and testable with alternate tables.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: Weights,
    #[serde(default = "default_location_tiers")]
    pub location_tiers: Vec<LocationTier>,
    #[serde(default)]
    pub borough_fallback: BoroughScores,
    #[serde(default)]
    pub type_scores: TypeScores,
    #[serde(default = "default_trusted_sources")]
    pub trusted_sources: Vec<String>,
    #[serde(default = "default_max_budget")]
    pub max_budget: i64,
    #[serde(default = "default_target_start")]
    pub target_start_date: NaiveDate,
    #[serde(default = "default_target_end_min")]
    pub target_end_date_min: NaiveDate,
    #[serde(default = "default_target_end_ideal")]
    pub target_end_date_ideal: NaiveDate,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            location_tiers: default_location_tiers(),
            borough_fallback: BoroughScores::default(),
            type_scores: TypeScores::default(),
            trusted_sources: default_trusted_sources(),
            max_budget: default_max_budget(),
            target_start_date: default_target_start(),
            target_end_date_min: default_target_end_min(),
            target_end_date_ideal: default_target_end_ideal(),
        }
    }
}

/// Dimension weights, expected to sum to 1.0.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub price: f64,
    pub location: f64,
    #[serde(rename = "type")]
    pub listing_type: f64,
    pub timing: f64,
    pub bonus: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            price: 0.25,
            location: 0.30,
            listing_type: 0.20,
            timing: 0.15,
            bonus: 0.10,
        }
    }
}

/// One ranked group of neighborhoods sharing a desirability score.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationTier {
    pub score: f64,
    pub neighborhoods: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoroughScores {
    pub manhattan: f64,
    pub brooklyn: f64,
    pub queens: f64,
    pub bronx: f64,
    pub staten_island: f64,
    pub unknown: f64,
}

impl Default for BoroughScores {
    fn default() -> Self {
        Self {
            manhattan: 5.0,
            brooklyn: 3.0,
            queens: 2.5,
            bronx: 1.5,
            staten_island: 1.0,
            unknown: 2.0,
        }
    }
}

impl BoroughScores {
    pub fn score(&self, borough: Borough) -> f64 {
        match borough {
            Borough::Manhattan => self.manhattan,
            Borough::Brooklyn => self.brooklyn,
            Borough::Queens => self.queens,
            Borough::Bronx => self.bronx,
            Borough::StatenIsland => self.staten_island,
            Borough::Unknown => self.unknown,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TypeScores {
    pub studio: f64,
    pub one_bedroom: f64,
    pub two_bedroom: f64,
    pub three_plus_bedroom: f64,
    pub hotel_extended_stay: f64,
    pub room_in_shared: f64,
    pub unknown: f64,
}

impl Default for TypeScores {
    fn default() -> Self {
        Self {
            studio: 10.0,
            one_bedroom: 9.0,
            two_bedroom: 6.0,
            three_plus_bedroom: 5.0,
            hotel_extended_stay: 7.0,
            room_in_shared: 4.5,
            unknown: 3.0,
        }
    }
}

impl TypeScores {
    pub fn score(&self, listing_type: ListingType) -> f64 {
        match listing_type {
            ListingType::Studio => self.studio,
            ListingType::OneBedroom => self.one_bedroom,
            ListingType::TwoBedroom => self.two_bedroom,
            ListingType::ThreePlusBedroom => self.three_plus_bedroom,
            ListingType::HotelExtendedStay => self.hotel_extended_stay,
            ListingType::RoomInShared => self.room_in_shared,
            ListingType::Unknown => self.unknown,
        }
    }
}

/// Loads config from a JSON file; a missing file means defaults.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    if !Path::new(path).exists() {
        info!("No config file at {path}, using defaults");
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

fn default_db_path() -> String {
    "listings.db".to_string()
}

fn default_facebook_group_urls() -> Vec<String> {
    [
        "https://www.facebook.com/groups/I9150/",
        "https://www.facebook.com/groups/nycroom/",
        "https://www.facebook.com/groups/1651982041751861/",
        "https://www.facebook.com/groups/nycsublets/",
        "https://www.facebook.com/groups/I1895/",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_listings() -> usize {
    100
}

fn default_scrape_delay() -> u64 {
    2
}

fn default_max_budget() -> i64 {
    2000
}

fn default_target_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, 1).unwrap_or_default()
}

fn default_target_end_min() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 31).unwrap_or_default()
}

fn default_target_end_ideal() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 30).unwrap_or_default()
}

fn default_trusted_sources() -> Vec<String> {
    ["LeaseBreak", "Listings Project", "Furnished Finder"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn tier(score: f64, neighborhoods: &[&str]) -> LocationTier {
    LocationTier {
        score,
        neighborhoods: neighborhoods.iter().map(|s| s.to_string()).collect(),
    }
}

// Tier 1: Midtown East / near Grand Central, descending to
// Tier 5: Brooklyn / Queens commuter areas.
fn default_location_tiers() -> Vec<LocationTier> {
    vec![
        tier(
            10.0,
            &[
                "Midtown East",
                "Murray Hill",
                "Turtle Bay",
                "Kips Bay",
                "Tudor City",
                "Sutton Place",
            ],
        ),
        tier(
            8.0,
            &[
                "Lower East Side",
                "East Village",
                "Nolita",
                "Alphabet City",
                "Two Bridges",
            ],
        ),
        tier(
            6.5,
            &[
                "Midtown",
                "Midtown West",
                "Hell's Kitchen",
                "Chelsea",
                "Flatiron",
                "Gramercy",
                "Union Square",
                "NoMad",
                "Hudson Yards",
                "West Village",
                "Greenwich Village",
                "SoHo",
                "NoHo",
                "Tribeca",
                "Financial District",
                "Battery Park City",
                "Chinatown",
                "Little Italy",
            ],
        ),
        tier(
            5.0,
            &[
                "Upper East Side",
                "Yorkville",
                "Lenox Hill",
                "Carnegie Hill",
                "Upper West Side",
            ],
        ),
        tier(
            3.5,
            &[
                "Williamsburg",
                "DUMBO",
                "Brooklyn Heights",
                "Downtown Brooklyn",
                "Fort Greene",
                "Clinton Hill",
                "Park Slope",
                "Cobble Hill",
                "Boerum Hill",
                "Carroll Gardens",
                "Prospect Heights",
                "Greenpoint",
                "Bushwick",
                "Bed-Stuy",
                "Long Island City",
                "Astoria",
                "Sunnyside",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let w = Weights::default();
        let total = w.price + w.location + w.listing_type + w.timing + w.bonus;
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn default_tiers_are_ranked() {
        let tiers = default_location_tiers();
        assert_eq!(tiers.len(), 5);
        for pair in tiers.windows(2) {
            assert!(pair[0].score > pair[1].score);
        }
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"db_path": "custom.db"}"#).expect("parses");
        assert_eq!(cfg.db_path, "custom.db");
        assert_eq!(cfg.scoring.max_budget, 2000);
        assert_eq!(cfg.max_listings_per_source, 100);
    }
}
