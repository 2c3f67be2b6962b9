//! Batch normalization: fill the typed fields an adapter left empty, drop
//! "in search of" posts, and reject clearly invalid records.

use chrono::Datelike;
use tracing::info;

use crate::config::AppConfig;
use crate::model::{Borough, Listing, ListingType};
use crate::parser::dates::extract_date_range;
use crate::parser::location::{extract_neighborhood, get_borough};
use crate::parser::price::extract_price_from_text;
use crate::parser::structured::{
    detect_listing_type, extract_apartment_details, extract_furnished,
};

// Phrases that mark a post as someone looking for housing, not offering it.
const ISO_CUES: [&str; 8] = [
    "iso",
    "in search of",
    "looking for",
    "seeking",
    "i need",
    "i'm looking",
    "im looking",
    "anyone know",
];

pub fn normalize_all(listings: &mut [Listing], cfg: &AppConfig) {
    for listing in listings.iter_mut() {
        normalize_listing(listing, cfg);
    }
}

/// Derives missing fields from the listing's own text. Fields the adapter
/// already resolved are left untouched.
fn normalize_listing(listing: &mut Listing, cfg: &AppConfig) {
    let haystack = if listing.raw_text.is_empty() {
        format!("{} {}", listing.title, listing.description)
    } else {
        listing.raw_text.clone()
    };

    if listing.price_monthly.is_none() {
        listing.price_monthly = extract_price_from_text(&haystack);
    }

    if listing.neighborhood.is_empty() {
        let (neighborhood, borough) = extract_neighborhood(&haystack);
        listing.neighborhood = neighborhood;
        if listing.borough == Borough::Unknown {
            listing.borough = borough;
        }
    } else if listing.borough == Borough::Unknown {
        listing.borough = get_borough(&listing.neighborhood);
    }

    if listing.listing_type == ListingType::Unknown {
        listing.listing_type = detect_listing_type(&haystack);
    }

    if listing.apartment_details.is_empty() {
        listing.apartment_details = extract_apartment_details(&haystack);
    }

    if listing.is_furnished.is_none() {
        listing.is_furnished = extract_furnished(&haystack);
    }

    if listing.available_from.is_none() && listing.available_to.is_none() {
        let year = cfg.scoring.target_start_date.year();
        let (from, to) = extract_date_range(&haystack, year);
        listing.available_from = from;
        listing.available_to = to;
    }
}

/// Drops posts whose opening text reads like a housing request.
pub fn filter_iso_posts(listings: Vec<Listing>) -> Vec<Listing> {
    let before = listings.len();
    let kept: Vec<Listing> = listings
        .into_iter()
        .filter(|listing| {
            let text = if listing.raw_text.is_empty() {
                &listing.description
            } else {
                &listing.raw_text
            };
            let head: String = text.to_lowercase().chars().take(100).collect();
            !ISO_CUES.iter().any(|cue| head.contains(cue))
        })
        .collect();
    info!("ISO filter: {} -> {} listings", before, kept.len());
    kept
}

/// Rejects listings that are clearly invalid: absurd prices, availability
/// years far outside the target window, or no content at all.
pub fn validate(listing: &Listing, cfg: &AppConfig) -> bool {
    if let Some(price) = listing.price_monthly {
        if !(100..=15000).contains(&price) {
            return false;
        }
    }

    let target_year = cfg.scoring.target_start_date.year();
    if let Some(from) = listing.available_from {
        if from.year() != target_year && from.year() != target_year - 1 {
            return false;
        }
    }
    if let Some(to) = listing.available_to {
        if to.year() != target_year && to.year() != target_year + 1 {
            return false;
        }
    }

    if listing.source_url.is_empty() && listing.description.is_empty() && listing.raw_text.is_empty()
    {
        return false;
    }

    true
}
