//! Rating engine: scores a listing 1.0-10.0 against user preferences.
//!
//! Pure functions of (listing, config); recomputing on unchanged inputs
//! always yields the identical result.

use chrono::{Datelike, NaiveDate};

use crate::config::ScoringConfig;
use crate::model::{Listing, RatingBreakdown};

/// Computes the composite rating and its per-dimension breakdown.
pub fn compute_rating(listing: &Listing, cfg: &ScoringConfig) -> (f64, RatingBreakdown) {
    let breakdown = RatingBreakdown {
        price: score_price(listing.price_monthly, cfg.max_budget),
        location: score_location(&listing.neighborhood, listing.borough, cfg),
        listing_type: cfg.type_scores.score(listing.listing_type),
        timing: score_timing(listing.available_from, listing.available_to, cfg),
        bonus: score_bonus(listing, cfg),
    };

    let w = &cfg.weights;
    let composite = breakdown.price * w.price
        + breakdown.location * w.location
        + breakdown.listing_type * w.listing_type
        + breakdown.timing * w.timing
        + breakdown.bonus * w.bonus;
    let composite = (composite.clamp(1.0, 10.0) * 10.0).round() / 10.0;

    (composite, breakdown)
}

/// Piecewise price score around the budget cap B:
/// ≤B-800 exceptional, linear between B-150 and B, hard zero past B+200.
pub fn score_price(price_monthly: Option<i64>, budget: i64) -> f64 {
    let Some(price) = price_monthly else {
        return 4.0;
    };
    if price <= budget - 800 {
        return 10.0;
    }
    if price <= budget - 500 {
        return 9.0;
    }
    if price <= budget - 300 {
        return 8.0;
    }
    if price <= budget - 150 {
        return 7.0;
    }
    if price <= budget {
        return 5.0 + 2.0 * (budget - price) as f64 / 150.0;
    }
    if price <= budget + 200 {
        return 2.0;
    }
    0.0
}

/// Tier lookup: exact match first, then bidirectional substring, then the
/// borough-level fallback table.
pub fn score_location(neighborhood: &str, borough: crate::model::Borough, cfg: &ScoringConfig) -> f64 {
    if neighborhood.is_empty() {
        return cfg.borough_fallback.score(borough);
    }

    for tier in &cfg.location_tiers {
        if tier
            .neighborhoods
            .iter()
            .any(|n| n.eq_ignore_ascii_case(neighborhood))
        {
            return tier.score;
        }
    }

    let neighborhood_lower = neighborhood.to_lowercase();
    for tier in &cfg.location_tiers {
        for n in &tier.neighborhoods {
            let n_lower = n.to_lowercase();
            if n_lower.contains(&neighborhood_lower) || neighborhood_lower.contains(&n_lower) {
                return tier.score;
            }
        }
    }

    cfg.borough_fallback.score(borough)
}

/// Overlap between the listing's availability window and the target window.
pub fn score_timing(
    available_from: Option<NaiveDate>,
    available_to: Option<NaiveDate>,
    cfg: &ScoringConfig,
) -> f64 {
    if available_from.is_none() && available_to.is_none() {
        return 5.0;
    }

    // Default missing ends generously
    let year = cfg.target_start_date.year();
    let start = available_from
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 6, 1).unwrap_or(cfg.target_start_date));
    let end = available_to.unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(cfg.target_end_date_ideal)
    });

    let overlap_start = start.max(cfg.target_start_date);
    let overlap_end = end.min(cfg.target_end_date_ideal);
    if overlap_start > overlap_end {
        return 0.0;
    }

    let target_days = (cfg.target_end_date_ideal - cfg.target_start_date).num_days();
    if target_days == 0 {
        return 5.0;
    }

    let overlap_days = (overlap_end - overlap_start).num_days();
    let coverage_ratio = overlap_days as f64 / target_days as f64;

    // Penalty for starting noticeably after the target start
    let mut start_penalty = 0.0;
    if start > cfg.target_start_date {
        let days_late = (start - cfg.target_start_date).num_days();
        if days_late > 7 {
            start_penalty = (days_late as f64 * 0.2).min(3.0);
        }
    }

    // Bonus for covering through the ideal (or minimum acceptable) end
    let end_bonus = if end >= cfg.target_end_date_ideal {
        1.0
    } else if end >= cfg.target_end_date_min {
        0.5
    } else {
        0.0
    };

    (coverage_ratio * 8.0 + end_bonus - start_penalty).clamp(0.0, 10.0)
}

/// Additive bonus for desirable attributes, capped at 10.
pub fn score_bonus(listing: &Listing, cfg: &ScoringConfig) -> f64 {
    let mut score: f64 = 0.0;

    if listing.is_furnished == Some(true) {
        score += 3.0;
    }
    if !listing.images.is_empty() {
        score += 2.0;
    }
    if cfg
        .trusted_sources
        .iter()
        .any(|s| s == &listing.source.to_string())
    {
        score += 2.0;
    }
    if !listing.address.is_empty() {
        score += 1.5;
    }
    if !listing.contact_info.is_empty() {
        score += 1.5;
    }

    score.min(10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Borough, ListingSource, ListingType};

    fn cfg() -> ScoringConfig {
        ScoringConfig::default()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn price_tiers() {
        assert_eq!(score_price(Some(1000), 2000), 10.0);
        assert_eq!(score_price(Some(1200), 2000), 10.0);
        assert_eq!(score_price(Some(1400), 2000), 9.0);
        assert_eq!(score_price(Some(1600), 2000), 8.0);
        assert_eq!(score_price(Some(1800), 2000), 7.0);
        assert_eq!(score_price(Some(2100), 2000), 2.0);
        assert_eq!(score_price(Some(3000), 2000), 0.0);
        assert_eq!(score_price(None, 2000), 4.0);
    }

    #[test]
    fn price_linear_segment_boundaries() {
        let at_budget = score_price(Some(2000), 2000);
        assert!((5.0..=7.0).contains(&at_budget));
        let near_budget = score_price(Some(1950), 2000);
        assert!((5.0..=7.0).contains(&near_budget));
    }

    #[test]
    fn price_is_non_increasing() {
        let mut previous = f64::INFINITY;
        for price in (0..3500).step_by(10) {
            let score = score_price(Some(price), 2000);
            assert!(
                score <= previous,
                "score rose from {previous} to {score} at ${price}"
            );
            previous = score;
        }
    }

    #[test]
    fn location_exact_tier_match() {
        assert_eq!(score_location("Midtown East", Borough::Manhattan, &cfg()), 10.0);
        assert_eq!(score_location("lower east side", Borough::Manhattan, &cfg()), 8.0);
        assert_eq!(score_location("Williamsburg", Borough::Brooklyn, &cfg()), 3.5);
    }

    #[test]
    fn location_substring_match() {
        // "East Williamsburg" isn't in any tier list but contains a tier entry
        assert_eq!(
            score_location("East Williamsburg", Borough::Brooklyn, &cfg()),
            3.5
        );
    }

    #[test]
    fn location_borough_fallback() {
        assert_eq!(score_location("", Borough::Manhattan, &cfg()), 5.0);
        assert_eq!(score_location("", Borough::Unknown, &cfg()), 2.0);
        assert_eq!(score_location("Pelham Bay", Borough::Bronx, &cfg()), 1.5);
    }

    #[test]
    fn type_table() {
        let c = cfg();
        assert_eq!(c.type_scores.score(ListingType::Studio), 10.0);
        assert_eq!(c.type_scores.score(ListingType::RoomInShared), 4.5);
        assert_eq!(c.type_scores.score(ListingType::Unknown), 3.0);
    }

    #[test]
    fn timing_unknown_is_neutral() {
        assert_eq!(score_timing(None, None, &cfg()), 5.0);
    }

    #[test]
    fn timing_no_overlap_is_zero() {
        let score = score_timing(Some(d(2026, 10, 15)), Some(d(2026, 11, 30)), &cfg());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn timing_full_coverage_scores_high() {
        let score = score_timing(Some(d(2026, 7, 1)), Some(d(2026, 9, 30)), &cfg());
        assert_eq!(score, 9.0); // full ratio * 8 + 1.0 end bonus
    }

    #[test]
    fn timing_late_start_penalized() {
        let on_time = score_timing(Some(d(2026, 7, 1)), Some(d(2026, 9, 30)), &cfg());
        let late = score_timing(Some(d(2026, 7, 20)), Some(d(2026, 9, 30)), &cfg());
        assert!(late < on_time);
    }

    #[test]
    fn timing_zero_length_target_window_is_neutral() {
        let mut c = cfg();
        c.target_end_date_ideal = c.target_start_date;
        let score = score_timing(Some(d(2026, 7, 1)), Some(d(2026, 9, 30)), &c);
        assert_eq!(score, 5.0);
    }

    #[test]
    fn timing_missing_end_defaults_generously() {
        let score = score_timing(Some(d(2026, 7, 1)), None, &cfg());
        assert_eq!(score, 9.0);
    }

    #[test]
    fn bonus_caps_at_ten() {
        let mut l = Listing::new(ListingSource::LeaseBreak);
        l.is_furnished = Some(true);
        l.images = vec!["a.jpg".into()];
        l.address = "405 E 42nd St".into();
        l.contact_info = "555-0100".into();
        // 3 + 2 + 2 (trusted) + 1.5 + 1.5 = 10, capped
        assert_eq!(score_bonus(&l, &cfg()), 10.0);
    }

    #[test]
    fn bonus_ignores_unfurnished() {
        let mut l = Listing::new(ListingSource::Craigslist);
        l.is_furnished = Some(false);
        assert_eq!(score_bonus(&l, &cfg()), 0.0);
    }

    #[test]
    fn rating_stays_in_range() {
        let empty = Listing::new(ListingSource::Craigslist);
        let (rating, _) = compute_rating(&empty, &cfg());
        assert!((1.0..=10.0).contains(&rating));

        let mut worst = Listing::new(ListingSource::Craigslist);
        worst.price_monthly = Some(9000);
        worst.available_from = Some(d(2026, 11, 1));
        worst.available_to = Some(d(2026, 12, 1));
        let (rating, _) = compute_rating(&worst, &cfg());
        assert!((1.0..=10.0).contains(&rating));
        assert!(rating < 2.0);
    }

    #[test]
    fn strong_listing_rates_high() {
        let mut l = Listing::new(ListingSource::LeaseBreak);
        l.neighborhood = "Midtown East".into();
        l.borough = Borough::Manhattan;
        l.listing_type = ListingType::Studio;
        l.price_monthly = Some(1600);
        l.is_furnished = Some(true);
        l.available_from = Some(d(2026, 7, 1));
        l.available_to = Some(d(2026, 8, 31));

        let (rating, breakdown) = compute_rating(&l, &cfg());
        assert!(rating >= 8.0, "expected >= 8.0, got {rating}");
        assert_eq!(breakdown.location, 10.0);
        assert_eq!(breakdown.listing_type, 10.0);
    }

    #[test]
    fn rating_is_deterministic() {
        let mut l = Listing::new(ListingSource::Facebook);
        l.price_monthly = Some(1750);
        l.neighborhood = "Astoria".into();
        let first = compute_rating(&l, &cfg());
        let second = compute_rating(&l, &cfg());
        assert_eq!(first, second);
    }
}
