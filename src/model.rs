// Core data types: Listing, source/type/borough enums, error types.
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Fixed set of marketplaces a listing can originate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingSource {
    Facebook,
    Craigslist,
    LeaseBreak,
    SpareRoom,
    ListingsProject,
    FurnishedFinder,
    Roomi,
}

impl fmt::Display for ListingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListingSource::Facebook => "Facebook",
            ListingSource::Craigslist => "Craigslist",
            ListingSource::LeaseBreak => "LeaseBreak",
            ListingSource::SpareRoom => "SpareRoom",
            ListingSource::ListingsProject => "Listings Project",
            ListingSource::FurnishedFinder => "Furnished Finder",
            ListingSource::Roomi => "Roomi",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ListingType {
    Studio,
    OneBedroom,
    TwoBedroom,
    ThreePlusBedroom,
    RoomInShared,
    HotelExtendedStay,
    #[default]
    Unknown,
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListingType::Studio => "Studio",
            ListingType::OneBedroom => "1BR",
            ListingType::TwoBedroom => "2BR",
            ListingType::ThreePlusBedroom => "3BR+",
            ListingType::RoomInShared => "Room in Shared",
            ListingType::HotelExtendedStay => "Hotel/Extended Stay",
            ListingType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Borough {
    Manhattan,
    Brooklyn,
    Queens,
    Bronx,
    StatenIsland,
    #[default]
    Unknown,
}

impl fmt::Display for Borough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Borough::Manhattan => "Manhattan",
            Borough::Brooklyn => "Brooklyn",
            Borough::Queens => "Queens",
            Borough::Bronx => "Bronx",
            Borough::StatenIsland => "Staten Island",
            Borough::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

impl Borough {
    /// Lenient parse for externally supplied borough strings.
    pub fn parse(raw: &str) -> Borough {
        match raw.trim().to_lowercase().as_str() {
            "manhattan" => Borough::Manhattan,
            "brooklyn" => Borough::Brooklyn,
            "queens" => Borough::Queens,
            "bronx" | "the bronx" => Borough::Bronx,
            "staten island" => Borough::StatenIsland,
            _ => Borough::Unknown,
        }
    }
}

/// Per-dimension sub-scores produced by the rating engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingBreakdown {
    pub price: f64,
    pub location: f64,
    pub listing_type: f64,
    pub timing: f64,
    pub bonus: f64,
}

impl RatingBreakdown {
    /// Dimension label/value pairs in the fixed storage order.
    pub fn pairs(&self) -> [(&'static str, f64); 5] {
        [
            ("price", self.price),
            ("location", self.location),
            ("type", self.listing_type),
            ("timing", self.timing),
            ("bonus", self.bonus),
        ]
    }

    /// Compact display form: "P:6.5 L:10.0 T:9.0 T:5.0 B:3.0".
    pub fn compact(&self) -> String {
        self.pairs()
            .iter()
            .map(|(label, value)| {
                let initial = label.chars().next().unwrap_or('?').to_ascii_uppercase();
                format!("{initial}:{value:.1}")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One apartment listing, partially populated by a source adapter and
/// progressively filled in by the normalization, dedup and scoring stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    // Identity
    pub id: String,
    pub source: ListingSource,
    pub source_url: String,
    pub raw_text: String,

    // Core fields
    pub title: String,
    pub price_monthly: Option<i64>,
    pub price_raw: String,

    // Location
    pub neighborhood: String,
    pub borough: Borough,
    pub address: String,

    // Type
    pub listing_type: ListingType,
    pub apartment_details: String,
    pub is_furnished: Option<bool>,

    // Availability
    pub available_from: Option<NaiveDate>,
    pub available_to: Option<NaiveDate>,

    // Scoring (populated by the rating engine)
    pub rating: f64,
    pub rating_breakdown: Option<RatingBreakdown>,

    // Metadata
    pub posted_date: Option<DateTime<Utc>>,
    pub scraped_at: DateTime<Utc>,
    pub description: String,
    pub contact_info: String,
    pub images: Vec<String>,
}

impl Listing {
    pub fn new(source: ListingSource) -> Self {
        Self {
            id: String::new(),
            source,
            source_url: String::new(),
            raw_text: String::new(),
            title: String::new(),
            price_monthly: None,
            price_raw: String::new(),
            neighborhood: String::new(),
            borough: Borough::Unknown,
            address: String::new(),
            listing_type: ListingType::Unknown,
            apartment_details: String::new(),
            is_furnished: None,
            available_from: None,
            available_to: None,
            rating: 0.0,
            rating_breakdown: None,
            posted_date: None,
            scraped_at: Utc::now(),
            description: String::new(),
            contact_info: String::new(),
            images: Vec::new(),
        }
    }

    /// Deterministic dedup fingerprint derived from stable listing content.
    ///
    /// Structured sites keep a stable per-listing URL, so the URL alone
    /// identifies the posting. Facebook posts (and anything without a URL)
    /// fall back to a content hash over price, neighborhood, type and the
    /// first 50 tokens of the raw text.
    pub fn generate_fingerprint(&self) -> String {
        let content = if self.source != ListingSource::Facebook && !self.source_url.is_empty() {
            self.source_url.clone()
        } else {
            let lowered = self.raw_text.to_lowercase();
            let normalized_text = lowered
                .split_whitespace()
                .take(50)
                .collect::<Vec<_>>()
                .join(" ");
            let price = self.price_monthly.map(|p| p.to_string()).unwrap_or_default();
            format!(
                "{}|{}|{}|{}",
                price,
                self.neighborhood.to_lowercase(),
                self.listing_type,
                normalized_text
            )
        };

        let digest = Sha256::digest(content.as_bytes());
        let mut hex = String::with_capacity(16);
        for byte in digest.iter().take(8) {
            hex.push_str(&format!("{byte:02x}"));
        }
        hex
    }

    /// Display-ready flat row in the exact spreadsheet column order.
    pub fn sheet_row(&self) -> Vec<String> {
        let furnished = match self.is_furnished {
            Some(true) => "Yes".to_string(),
            Some(false) => "No".to_string(),
            None => String::new(),
        };
        let breakdown = self
            .rating_breakdown
            .as_ref()
            .map(RatingBreakdown::compact)
            .unwrap_or_default();

        vec![
            "New".to_string(),                            // A: Status
            format!("{:.1}", self.rating),                // B: Rating
            self.price_monthly
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".to_string()),    // C: Price
            self.neighborhood.clone(),                    // D: Neighborhood
            self.borough.to_string(),                     // E: Borough
            self.listing_type.to_string(),                // F: Type
            self.apartment_details.clone(),               // G: Apartment Details
            self.available_from
                .map(|d| d.to_string())
                .unwrap_or_default(),                     // H: Available From
            self.available_to
                .map(|d| d.to_string())
                .unwrap_or_default(),                     // I: Available To
            furnished,                                    // J: Furnished
            self.source.to_string(),                      // K: Source
            self.source_url.clone(),                      // L: Link
            self.description.chars().take(300).collect(), // M: Description
            breakdown,                                    // N: Rating Breakdown
            self.contact_info.clone(),                    // O: Contact
            self.scraped_at.to_rfc3339(),                 // P: Scraped At
            self.id.clone(),                              // Q: Listing ID
        ]
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("llm extraction error: {0}")]
    Llm(#[from] LlmError),
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed api response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
