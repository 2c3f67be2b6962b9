//! Deduplication engine: exact fingerprints across runs plus a fuzzy
//! cross-field heuristic within a batch.

use std::collections::HashSet;

use tracing::info;

use crate::model::Listing;

/// Two known prices further apart than this are different offerings.
pub const PRICE_WINDOW_USD: i64 = 50;
/// Token-sort similarity (0-100) above which texts are considered the same.
pub const SIMILARITY_THRESHOLD: f64 = 70.0;
/// Only the head of the text carries the identifying signal.
pub const TEXT_PREFIX_CHARS: usize = 200;

/// Filters a batch down to listings not seen in any prior run and not
/// duplicated within the batch itself.
pub struct Deduplicator {
    seen_fingerprints: HashSet<String>,
}

impl Default for Deduplicator {
    /// Dry-run mode: no persisted state, in-batch dedup only.
    fn default() -> Self {
        Self {
            seen_fingerprints: HashSet::new(),
        }
    }
}

impl Deduplicator {
    /// Seeds the seen set from persisted state (previously emitted
    /// fingerprints merged with ids already present in the output store).
    pub fn new(seed: HashSet<String>) -> Self {
        info!("Loaded {} previously seen fingerprints", seed.len());
        Self {
            seen_fingerprints: seed,
        }
    }

    /// Returns only the genuinely new listings, in input order, assigning
    /// each one its fingerprint as `id` if not set upstream.
    pub fn deduplicate(&mut self, listings: Vec<Listing>) -> Vec<Listing> {
        let input_len = listings.len();
        let mut new_listings: Vec<Listing> = Vec::new();
        let mut batch_fingerprints: HashSet<String> = HashSet::new();

        for mut listing in listings {
            let fp = if listing.id.is_empty() {
                listing.generate_fingerprint()
            } else {
                listing.id.clone()
            };
            listing.id = fp.clone();

            // Already seen in a prior run
            if self.seen_fingerprints.contains(&fp) {
                continue;
            }

            // Exact duplicate within this batch
            if batch_fingerprints.contains(&fp) {
                continue;
            }

            // Near-duplicate of something already accepted
            if new_listings
                .iter()
                .any(|other| are_likely_duplicates(&listing, other))
            {
                continue;
            }

            batch_fingerprints.insert(fp);
            new_listings.push(listing);
        }

        info!(
            "Dedup: {} input -> {} unique new listings",
            input_len,
            new_listings.len()
        );
        new_listings
    }
}

/// Fuzzy duplicate test: a short-circuiting AND over price proximity,
/// neighborhood agreement, type equality and text similarity. A field
/// missing on both sides is inconclusive and passes through; a field known
/// on exactly one side counts as a mismatch for price.
pub fn are_likely_duplicates(a: &Listing, b: &Listing) -> bool {
    match (a.price_monthly, b.price_monthly) {
        (Some(pa), Some(pb)) => {
            if (pa - pb).abs() > PRICE_WINDOW_USD {
                return false;
            }
        }
        (None, None) => {}
        _ => return false,
    }

    if !a.neighborhood.is_empty()
        && !b.neighborhood.is_empty()
        && !a.neighborhood.eq_ignore_ascii_case(&b.neighborhood)
    {
        return false;
    }

    if a.listing_type != b.listing_type {
        return false;
    }

    let text_a = comparison_text(a);
    let text_b = comparison_text(b);
    if text_a.is_empty() || text_b.is_empty() {
        // Not enough evidence to call it a duplicate
        return false;
    }

    token_sort_ratio(&text_a, &text_b) > SIMILARITY_THRESHOLD
}

fn comparison_text(listing: &Listing) -> String {
    let source = if listing.description.is_empty() {
        &listing.raw_text
    } else {
        &listing.description
    };
    source.chars().take(TEXT_PREFIX_CHARS).collect()
}

/// Token-order-insensitive similarity in 0-100: sort the whitespace tokens
/// of each side, then compare with normalized Levenshtein.
fn token_sort_ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&sorted_tokens(a), &sorted_tokens(b)) * 100.0
}

fn sorted_tokens(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut tokens: Vec<&str> = lower.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListingSource, ListingType};

    fn listing(price: Option<i64>, neighborhood: &str, text: &str) -> Listing {
        let mut l = Listing::new(ListingSource::Facebook);
        l.price_monthly = price;
        l.neighborhood = neighborhood.into();
        l.listing_type = ListingType::OneBedroom;
        l.raw_text = text.into();
        l
    }

    #[test]
    fn empty_batch() {
        let mut dedup = Deduplicator::default();
        assert!(dedup.deduplicate(Vec::new()).is_empty());
    }

    #[test]
    fn identical_urls_collapse() {
        let mut a = Listing::new(ListingSource::Craigslist);
        a.source_url = "https://newyork.craigslist.org/sub/42.html".into();
        let mut b = a.clone();
        b.description = "slightly different text".into();

        let mut dedup = Deduplicator::default();
        let result = dedup.deduplicate(vec![a, b]);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn seeded_seen_set_suppresses_reruns() {
        let a = listing(Some(1800), "East Village", "sunny 1br near tompkins square park");
        let mut first = Deduplicator::default();
        let accepted = first.deduplicate(vec![a.clone()]);
        assert_eq!(accepted.len(), 1);

        let seed: std::collections::HashSet<String> =
            accepted.iter().map(|l| l.id.clone()).collect();
        let mut second = Deduplicator::new(seed);
        assert!(second.deduplicate(vec![a]).is_empty());
    }

    #[test]
    fn fuzzy_duplicates_collapse() {
        let a = listing(
            Some(1820),
            "East Village",
            "sunny 1br near tompkins square park, laundry in building, pets ok",
        );
        let b = listing(
            Some(1860),
            "East Village",
            "near tompkins square park sunny 1br, pets ok, laundry in building",
        );

        let mut dedup = Deduplicator::default();
        assert_eq!(dedup.deduplicate(vec![a, b]).len(), 1);
    }

    #[test]
    fn different_neighborhoods_do_not_collapse() {
        let a = listing(
            Some(1820),
            "East Village",
            "sunny 1br near the park, laundry in building, pets ok",
        );
        let b = listing(
            Some(1820),
            "Astoria",
            "sunny 1br near the park, laundry in building, pets ok",
        );

        let mut dedup = Deduplicator::default();
        assert_eq!(dedup.deduplicate(vec![a, b]).len(), 2);
    }

    #[test]
    fn price_gap_disqualifies() {
        let a = listing(Some(1800), "East Village", "sunny 1br near the park");
        let b = listing(Some(1900), "East Village", "sunny 1br near the park");
        assert!(!are_likely_duplicates(&a, &b));
    }

    #[test]
    fn single_known_price_disqualifies() {
        let a = listing(Some(1800), "East Village", "sunny 1br near the park");
        let b = listing(None, "East Village", "sunny 1br near the park");
        assert!(!are_likely_duplicates(&a, &b));
    }

    #[test]
    fn both_prices_unknown_is_inconclusive() {
        let a = listing(None, "East Village", "sunny 1br near tompkins square park");
        let b = listing(None, "East Village", "sunny 1br near tompkins square park");
        assert!(are_likely_duplicates(&a, &b));
    }

    #[test]
    fn type_mismatch_disqualifies() {
        let a = listing(Some(1800), "East Village", "sunny spot near the park");
        let mut b = a.clone();
        b.listing_type = ListingType::Unknown;
        assert!(!are_likely_duplicates(&a, &b));
    }

    #[test]
    fn no_text_means_no_duplicate() {
        let a = listing(Some(1800), "East Village", "");
        let b = listing(Some(1800), "East Village", "");
        assert!(!are_likely_duplicates(&a, &b));
    }

    #[test]
    fn symmetric() {
        let a = listing(
            Some(1820),
            "East Village",
            "sunny 1br near tompkins square park, laundry in building",
        );
        let b = listing(
            Some(1860),
            "",
            "near tompkins square park sunny 1br, laundry in building",
        );
        assert_eq!(are_likely_duplicates(&a, &b), are_likely_duplicates(&b, &a));
    }

    #[test]
    fn order_preserved() {
        let a = listing(Some(1200), "Astoria", "cheap room one");
        let b = listing(Some(2000), "Chelsea", "expensive loft two");
        let c = listing(Some(1500), "Harlem", "middling flat three");
        let mut dedup = Deduplicator::default();
        let out = dedup.deduplicate(vec![a, b, c]);
        let prices: Vec<_> = out.iter().map(|l| l.price_monthly).collect();
        assert_eq!(prices, vec![Some(1200), Some(2000), Some(1500)]);
    }
}
