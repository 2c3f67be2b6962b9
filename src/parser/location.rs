//! Neighborhood extraction and canonicalization.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Borough;

/// Canonical neighborhood -> borough table.
pub const NEIGHBORHOOD_BOROUGHS: &[(&str, Borough)] = &[
    // Manhattan — Midtown East core
    ("Midtown East", Borough::Manhattan),
    ("Murray Hill", Borough::Manhattan),
    ("Turtle Bay", Borough::Manhattan),
    ("Kips Bay", Borough::Manhattan),
    ("Tudor City", Borough::Manhattan),
    ("Sutton Place", Borough::Manhattan),
    // Manhattan — downtown east
    ("Lower East Side", Borough::Manhattan),
    ("East Village", Borough::Manhattan),
    ("Nolita", Borough::Manhattan),
    ("Alphabet City", Borough::Manhattan),
    ("Two Bridges", Borough::Manhattan),
    // Manhattan — other midtown/downtown
    ("Midtown", Borough::Manhattan),
    ("Midtown West", Borough::Manhattan),
    ("Hell's Kitchen", Borough::Manhattan),
    ("Chelsea", Borough::Manhattan),
    ("Flatiron", Borough::Manhattan),
    ("Gramercy", Borough::Manhattan),
    ("Union Square", Borough::Manhattan),
    ("NoMad", Borough::Manhattan),
    ("Hudson Yards", Borough::Manhattan),
    ("West Village", Borough::Manhattan),
    ("Greenwich Village", Borough::Manhattan),
    ("SoHo", Borough::Manhattan),
    ("NoHo", Borough::Manhattan),
    ("Tribeca", Borough::Manhattan),
    ("Financial District", Borough::Manhattan),
    ("Battery Park City", Borough::Manhattan),
    ("Chinatown", Borough::Manhattan),
    ("Little Italy", Borough::Manhattan),
    // Manhattan — uptown
    ("Upper East Side", Borough::Manhattan),
    ("Yorkville", Borough::Manhattan),
    ("Lenox Hill", Borough::Manhattan),
    ("Carnegie Hill", Borough::Manhattan),
    ("Upper West Side", Borough::Manhattan),
    ("Harlem", Borough::Manhattan),
    ("East Harlem", Borough::Manhattan),
    ("Washington Heights", Borough::Manhattan),
    // Brooklyn
    ("Williamsburg", Borough::Brooklyn),
    ("DUMBO", Borough::Brooklyn),
    ("Brooklyn Heights", Borough::Brooklyn),
    ("Downtown Brooklyn", Borough::Brooklyn),
    ("Fort Greene", Borough::Brooklyn),
    ("Clinton Hill", Borough::Brooklyn),
    ("Park Slope", Borough::Brooklyn),
    ("Cobble Hill", Borough::Brooklyn),
    ("Boerum Hill", Borough::Brooklyn),
    ("Carroll Gardens", Borough::Brooklyn),
    ("Prospect Heights", Borough::Brooklyn),
    ("Crown Heights", Borough::Brooklyn),
    ("Greenpoint", Borough::Brooklyn),
    ("Bushwick", Borough::Brooklyn),
    ("Bed-Stuy", Borough::Brooklyn),
    // Queens
    ("Long Island City", Borough::Queens),
    ("Astoria", Borough::Queens),
    ("Sunnyside", Borough::Queens),
    ("Ridgewood", Borough::Queens),
];

/// Common shorthand -> canonical neighborhood name. Keys are lowercase.
const NEIGHBORHOOD_ALIASES: &[(&str, &str)] = &[
    ("les", "Lower East Side"),
    ("lower east", "Lower East Side"),
    ("ues", "Upper East Side"),
    ("uws", "Upper West Side"),
    ("lic", "Long Island City"),
    ("fidi", "Financial District"),
    ("wburg", "Williamsburg"),
    ("bed stuy", "Bed-Stuy"),
    ("bedstuy", "Bed-Stuy"),
    ("bed-stuy", "Bed-Stuy"),
    ("hells kitchen", "Hell's Kitchen"),
    ("grand central", "Midtown East"),
    ("bk heights", "Brooklyn Heights"),
    ("downtown bk", "Downtown Brooklyn"),
    ("east vill", "East Village"),
    ("gramercy park", "Gramercy"),
];

// Aliases compiled with punctuation/whitespace boundaries so a short alias
// never matches inside an unrelated word, longest alias first.
static ALIAS_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    let mut aliases: Vec<_> = NEIGHBORHOOD_ALIASES.to_vec();
    aliases.sort_by_key(|(alias, _)| std::cmp::Reverse(alias.len()));
    aliases
        .into_iter()
        .filter_map(|(alias, canonical)| {
            let pattern = format!(
                r"(?:^|[\s,./\-()]){}(?:$|[\s,./\-()])",
                regex::escape(alias)
            );
            Regex::new(&pattern).ok().map(|re| (re, canonical))
        })
        .collect()
});

// Canonical names sorted longest-first for the substring pass.
static SORTED_NAMES: LazyLock<Vec<(&'static str, String, Borough)>> = LazyLock::new(|| {
    let mut names: Vec<_> = NEIGHBORHOOD_BOROUGHS
        .iter()
        .map(|(name, borough)| (*name, name.to_lowercase(), *borough))
        .collect();
    names.sort_by_key(|(name, _, _)| std::cmp::Reverse(name.len()));
    names
});

static BOROUGH_PATTERNS: LazyLock<Vec<(Borough, Regex)>> = LazyLock::new(|| {
    [
        (Borough::Manhattan, r"\bmanhattan\b|\bnyc\b"),
        (Borough::Brooklyn, r"\bbrooklyn\b|\bbk\b"),
        (Borough::Queens, r"\bqueens\b"),
        (Borough::Bronx, r"\bbronx\b"),
    ]
    .iter()
    .filter_map(|(borough, pattern)| Regex::new(pattern).ok().map(|re| (*borough, re)))
    .collect()
});

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)\s*$").expect("valid regex"));

/// Resolves the borough of a canonical neighborhood name.
pub fn get_borough(neighborhood: &str) -> Borough {
    NEIGHBORHOOD_BOROUGHS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(neighborhood))
        .map(|(_, borough)| *borough)
        .unwrap_or(Borough::Unknown)
}

/// Canonicalizes a bare location string: alias or case-normalized name if
/// recognized, the trimmed input otherwise.
pub fn normalize_neighborhood(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();
    if let Some((_, canonical)) = NEIGHBORHOOD_ALIASES.iter().find(|(a, _)| *a == lower) {
        return canonical.to_string();
    }
    if let Some((name, _)) = NEIGHBORHOOD_BOROUGHS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
    {
        return name.to_string();
    }
    trimmed.to_string()
}

/// Extracts a normalized neighborhood and borough from free text.
///
/// Alias matches (word-bounded, longest first) win over canonical-name
/// substring matches; borough keywords are the last resort and yield an
/// empty neighborhood.
pub fn extract_neighborhood(text: &str) -> (String, Borough) {
    if text.trim().is_empty() {
        return (String::new(), Borough::Unknown);
    }

    let lower = text.to_lowercase();
    let lower = lower.trim();

    for (pattern, canonical) in ALIAS_PATTERNS.iter() {
        if pattern.is_match(lower) {
            return (canonical.to_string(), get_borough(canonical));
        }
    }

    for (name, name_lower, borough) in SORTED_NAMES.iter() {
        if lower.contains(name_lower.as_str()) {
            return (name.to_string(), *borough);
        }
    }

    for (borough, pattern) in BOROUGH_PATTERNS.iter() {
        if pattern.is_match(lower) {
            return (String::new(), *borough);
        }
    }

    (String::new(), Borough::Unknown)
}

/// Craigslist-style trailing parenthetical: "Cozy 1BR (Midtown East)".
pub fn extract_parenthetical(text: &str) -> String {
    PARENTHETICAL
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name() {
        let (name, borough) = extract_neighborhood("Beautiful apartment in Midtown East");
        assert_eq!(name, "Midtown East");
        assert_eq!(borough, Borough::Manhattan);
    }

    #[test]
    fn les_alias() {
        let (name, borough) = extract_neighborhood("Sunny room on the LES");
        assert_eq!(name, "Lower East Side");
        assert_eq!(borough, Borough::Manhattan);
    }

    #[test]
    fn alias_needs_word_boundary() {
        // "les" inside "listles s" must not match; no other signal either.
        let (name, borough) = extract_neighborhood("a listless description");
        assert_eq!(name, "");
        assert_eq!(borough, Borough::Unknown);
    }

    #[test]
    fn brooklyn_neighborhood() {
        let (name, borough) = extract_neighborhood("Loft in Williamsburg, Brooklyn");
        assert_eq!(name, "Williamsburg");
        assert_eq!(borough, Borough::Brooklyn);
    }

    #[test]
    fn lic_alias() {
        let (name, borough) = extract_neighborhood("Studio in LIC near subway");
        assert_eq!(name, "Long Island City");
        assert_eq!(borough, Borough::Queens);
    }

    #[test]
    fn longer_name_wins() {
        // "Midtown East" must not collapse to "Midtown".
        let (name, _) = extract_neighborhood("great spot, midtown east location");
        assert_eq!(name, "Midtown East");
    }

    #[test]
    fn borough_keyword_fallback() {
        let (name, borough) = extract_neighborhood("Somewhere in Brooklyn, great deal");
        assert_eq!(name, "");
        assert_eq!(borough, Borough::Brooklyn);
    }

    #[test]
    fn unknown_location() {
        let (name, borough) = extract_neighborhood("Apartment somewhere nice");
        assert_eq!(name, "");
        assert_eq!(borough, Borough::Unknown);
    }

    #[test]
    fn parenthetical_suffix() {
        assert_eq!(
            extract_parenthetical("Cozy 1BR sublet (Midtown East)"),
            "Midtown East"
        );
        assert_eq!(extract_parenthetical("no location here"), "");
    }

    #[test]
    fn normalize_known_alias() {
        assert_eq!(normalize_neighborhood("les"), "Lower East Side");
        assert_eq!(normalize_neighborhood("WILLIAMSBURG"), "Williamsburg");
        assert_eq!(normalize_neighborhood("Somewhere Else"), "Somewhere Else");
    }

    #[test]
    fn borough_lookup() {
        assert_eq!(get_borough("Astoria"), Borough::Queens);
        assert_eq!(get_borough("nowhere"), Borough::Unknown);
    }
}
