//! Address assembly, including merged addresses
//!
//! Some records hold two addresses in one set of fields, joined by a `ü`
//! glyph. The house number then always has one separator, the suburb one,
//! and the street one or two. With two street separators the middle token
//! holds words of both streets, e.g. `RAILWAYüSCHOOL TCE SOUTHüTERRA` or
//! `ROSSLYNüSWIFT WINGS ROADüROAD`, and the word boundary is recovered by
//! checking candidates against the street catalogue.

use crate::catalogue::Catalogue;
use crate::region::collapse_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;

/// Joins the two halves of a merged address field
pub const SEPARATOR: char = 'ü';

/// Edit distance tolerated when checking a candidate street name
const STREET_MATCH_THRESHOLD: usize = 2;

static HOUSE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+[a-zA-Z]?$").unwrap());

/// Build a single address from the house number, street and suburb
/// fields, choosing one half when the fields hold two addresses.
pub fn compose_address(
    house_number: &str,
    street_name: &str,
    suburb_name: &str,
    catalogue: &Catalogue,
) -> String {
    let address = if house_number.contains(SEPARATOR) {
        let (house_number1, house_number2) = split_pair(house_number);
        let (street_name1, street_name2) = split_street_names(street_name, catalogue);
        let (suburb_name1, suburb_name2) = split_pair(suburb_name);

        if is_house_number(house_number1) || !is_house_number(house_number2) {
            format_address(house_number1, &street_name1, suburb_name1, catalogue)
        } else {
            format_address(house_number2, &street_name2, suburb_name2, catalogue)
        }
    } else {
        format_address(house_number, street_name, suburb_name, catalogue)
    };

    collapse_whitespace(address.trim())
}

fn format_address(
    house_number: &str,
    street_name: &str,
    suburb_name: &str,
    catalogue: &Catalogue,
) -> String {
    let suburb_name = strip_hundred(suburb_name);
    let suburb_name = catalogue.canonical_suburb(suburb_name).unwrap_or(suburb_name);
    format!("{} {}, {}", house_number, street_name, suburb_name)
}

/// Whether the text looks like a house number ("12", "7A")
pub fn is_house_number(text: &str) -> bool {
    HOUSE_NUMBER_RE.is_match(text.trim())
}

/// Remove the "HD " (hundred) prefix
fn strip_hundred(suburb_name: &str) -> &str {
    suburb_name.strip_prefix("HD ").unwrap_or(suburb_name)
}

/// Split on the first separator; a field without one stands for both halves
fn split_pair(text: &str) -> (&str, &str) {
    match text.split_once(SEPARATOR) {
        Some((first, rest)) => (first, rest.split(SEPARATOR).next().unwrap_or(rest)),
        None => (text, text),
    }
}

/// Split a street field into the streets of the two addresses
pub fn split_street_names(street_name: &str, catalogue: &Catalogue) -> (String, String) {
    let tokens: Vec<&str> = street_name.split(SEPARATOR).collect();
    match tokens.as_slice() {
        [single] => (single.to_string(), single.to_string()),
        [first, second] => (first.to_string(), second.to_string()),
        [prefix, middle, suffix] => {
            let words: Vec<&str> = middle.split(' ').collect();
            match words.as_slice() {
                // "OLIVEüTUCKER PARADEüROAD" -> "OLIVE PARADE", "TUCKER ROAD"
                [first, second] => (format!("{prefix} {second}"), format!("{first} {suffix}")),
                // "ROSSLYNüSWIFT WINGS ROADüROAD": does "WINGS" belong to the
                // first street or the second?
                [first, second, third] => {
                    let street_name1 = format!("{prefix} {second} {third}");
                    let street_name2 = format!("{first} {suffix}");
                    let known1 = catalogue.closest_street(&street_name1, STREET_MATCH_THRESHOLD);
                    let known2 = catalogue.closest_street(&street_name2, STREET_MATCH_THRESHOLD);
                    for known in [known1, known2].into_iter().flatten() {
                        log::debug!(
                            "Matched street \"{}\" (known in {:?})",
                            known,
                            catalogue.suburbs_for_street(known)
                        );
                    }
                    if known1.is_none() && known2.is_none() {
                        (format!("{prefix} {third}"), format!("{first} {second} {suffix}"))
                    } else {
                        (street_name1, street_name2)
                    }
                }
                _ => {
                    log::debug!("Cannot split street name \"{}\"; using it whole", street_name);
                    let whole = street_name.replace(SEPARATOR, " ");
                    (whole.clone(), whole)
                }
            }
        }
        _ => {
            log::debug!("Cannot split street name \"{}\"; using it whole", street_name);
            let whole = street_name.replace(SEPARATOR, " ");
            (whole.clone(), whole)
        }
    }
}
