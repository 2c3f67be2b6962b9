//! Rule-based detectors for unit type, furnished state and bed/bath details.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::ListingType;

const STUDIO_CUES: [&str; 3] = ["studio", "alcove studio", "bachelor"];
const HOTEL_CUES: [&str; 4] = ["hotel", "extended stay", "suite", "apart-hotel"];
const ROOM_CUES: [&str; 10] = [
    "room for rent",
    "room available",
    "shared apartment",
    "private room",
    "room in",
    "roommate",
    "looking for roommate",
    "spare room",
    "furnished room",
    "one room",
];

static BEDROOM_PATTERNS: LazyLock<Vec<(Regex, ListingType)>> = LazyLock::new(|| {
    [
        (r"\b1\s*(?:br|bed|bedroom|bdrm)\b", ListingType::OneBedroom),
        (r"\bone\s*(?:br|bed|bedroom|bdrm)\b", ListingType::OneBedroom),
        (r"\b2\s*(?:br|bed|bedroom|bdrm)\b", ListingType::TwoBedroom),
        (r"\btwo\s*(?:br|bed|bedroom|bdrm)\b", ListingType::TwoBedroom),
        (
            r"\b[3-9]\s*(?:br|bed|bedroom|bdrm)\b",
            ListingType::ThreePlusBedroom,
        ),
    ]
    .iter()
    .filter_map(|(pattern, t)| Regex::new(pattern).ok().map(|re| (re, *t)))
    .collect()
});

static BED_BATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d)\s*(?:bed(?:room)?s?|br|b)\s*[/,]?\s*(\d)\s*(?:bath(?:room)?s?|ba|b)")
        .expect("valid regex")
});
static BEDROOMS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\s*(?:bed(?:room)?s?|br)").expect("valid regex"));

/// Detects the unit category from text; first matching rule wins.
pub fn detect_listing_type(text: &str) -> ListingType {
    let lower = text.to_lowercase();

    if STUDIO_CUES.iter().any(|cue| lower.contains(cue)) {
        return ListingType::Studio;
    }

    for (pattern, listing_type) in BEDROOM_PATTERNS.iter() {
        if pattern.is_match(&lower) {
            return *listing_type;
        }
    }

    if HOTEL_CUES.iter().any(|cue| lower.contains(cue)) {
        return ListingType::HotelExtendedStay;
    }

    if ROOM_CUES.iter().any(|cue| lower.contains(cue)) {
        return ListingType::RoomInShared;
    }

    ListingType::Unknown
}

/// Extracts compact apartment details like "3b2ba" from text.
pub fn extract_apartment_details(text: &str) -> String {
    let lower = text.to_lowercase();

    if let Some(caps) = BED_BATH.captures(&lower) {
        return format!("{}b{}ba", &caps[1], &caps[2]);
    }

    if let Some(caps) = BEDROOMS_ONLY.captures(&lower) {
        return format!("{}br", &caps[1]);
    }

    if lower.contains("studio") {
        return "Studio".to_string();
    }

    String::new()
}

/// Tri-state furnished detector. The negated form is checked first since
/// "furnished" is a substring of "unfurnished".
pub fn extract_furnished(text: &str) -> Option<bool> {
    let lower = text.to_lowercase();
    if lower.contains("unfurnished") || lower.contains("un-furnished") {
        return Some(false);
    }
    if lower.contains("furnished") {
        return Some(true);
    }
    None
}
