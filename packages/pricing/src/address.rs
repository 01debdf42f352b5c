//! Search-location slugs derived from free-text addresses.
//!
//! Listing sites key their search pages by `{suburb}-{county}` tokens.
//! The slug is approximated from the last two comma-separated address
//! segments, which is lossy: addresses that do not end in
//! `..., suburb, county` produce odd or empty tokens.

/// Tokens stripped from the start of the county segment.
const COUNTY_PREFIXES: &[&str] = &["county", "co"];

/// Lowercases and keeps only letters, digits and hyphens, turning spaces
/// into hyphens first.
#[must_use]
pub fn slug(text: &str) -> String {
    text.replace(' ', "-")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}

/// Strips a leading `co.`, `co` or `county` token.
fn strip_county_prefix(county: &str) -> &str {
    if let Some(rest) = county.strip_prefix("co.") {
        return rest.trim_start();
    }

    COUNTY_PREFIXES
        .iter()
        .filter_map(|prefix| county.strip_prefix(*prefix))
        .find(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        .map_or(county, str::trim_start)
}

/// Derives the listing-site location token for `address`.
///
/// `"12 Main St, Ranelagh, Co. Dublin"` becomes `"ranelagh-dublin"`;
/// postal districts are dropped, so `"X, Y, Dublin 9"` becomes
/// `"y-dublin"`.
#[must_use]
pub fn search_location_slug(address: &str) -> String {
    let segments: Vec<String> = address
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let [.., suburb, county] = segments.as_slice() else {
        return segments.first().map(|s| slug(s)).unwrap_or_default();
    };

    let mut county = strip_county_prefix(county);
    if county.chars().any(|c| c.is_ascii_digit()) {
        county = county.split_whitespace().next().unwrap_or_default();
    }

    format!("{}-{}", slug(suburb), slug(county))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suburb_and_county() {
        assert_eq!(
            search_location_slug("12 Main St, Ranelagh, Co. Dublin"),
            "ranelagh-dublin"
        );
        assert_eq!(
            search_location_slug("Apartment 4, Salthill, County Galway"),
            "salthill-galway"
        );
        assert_eq!(
            search_location_slug("Main St, Bray, Co Wicklow"),
            "bray-wicklow"
        );
    }

    #[test]
    fn postal_district_is_truncated() {
        assert_eq!(search_location_slug("X, Y, Dublin 9"), "y-dublin");
        assert_eq!(
            search_location_slug("Flat 2, Rathmines, Dublin 6W"),
            "rathmines-dublin"
        );
    }

    #[test]
    fn county_word_prefix_needs_boundary() {
        assert_eq!(search_location_slug("Main St, Cobh, Cork"), "cobh-cork");
        assert_eq!(
            search_location_slug("Main St, Town, Coolock"),
            "town-coolock"
        );
    }

    #[test]
    fn multi_word_suburb_is_hyphenated() {
        assert_eq!(
            search_location_slug("1 The Green, Stoneybatter Village, Dublin 7"),
            "stoneybatter-village-dublin"
        );
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(search_location_slug(""), "");
        assert_eq!(search_location_slug(" , ,"), "");
        assert_eq!(search_location_slug("Ranelagh Village"), "ranelagh-village");
        assert_eq!(search_location_slug("St. Anne's, Co."), "st-annes-");
    }

    #[test]
    fn slug_keeps_letters_digits_hyphens() {
        assert_eq!(slug("Dún Laoghaire"), "dún-laoghaire");
        assert_eq!(slug("D6W (north)"), "d6w-north");
    }
}
