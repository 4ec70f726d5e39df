//! Development application records
//!
//! Reads the fields of one record group using a fixed catalogue of label
//! triples: the label in front of the value, the label bounding it on the
//! right and the label bounding it below.

use crate::address::compose_address;
use crate::catalogue::Catalogue;
use crate::document::ExtractionConfig;
use crate::region::{text_below, text_to_right_of};
use crate::segment::RecordGroup;
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RECEIVED_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{2}/\d{4}$").unwrap());

/// A development application extracted from a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub application_number: String,
    pub address: String,
    pub description: String,
    pub information_url: String,
    pub comment_url: String,
    pub scrape_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
}

/// Parses record groups into [`ParsedRecord`]s
pub struct RecordParser<'a> {
    catalogue: &'a Catalogue,
    comment_url: String,
    description_placeholder: String,
    scrape_date: NaiveDate,
}

impl<'a> RecordParser<'a> {
    /// Create a parser that stamps records with today's date
    pub fn new(catalogue: &'a Catalogue, config: &ExtractionConfig) -> Self {
        Self {
            catalogue,
            comment_url: config.comment_url.clone(),
            description_placeholder: config.description_placeholder.clone(),
            scrape_date: Local::now().date_naive(),
        }
    }

    pub fn with_scrape_date(mut self, scrape_date: NaiveDate) -> Self {
        self.scrape_date = scrape_date;
        self
    }

    /// Parse one record group. Returns `None` (and logs why) when the group
    /// has no application number, street or suburb.
    pub fn parse(&self, group: &RecordGroup, information_url: &str) -> Option<ParsedRecord> {
        let fragments = group.fragments.as_slice();

        let application_number = match text_to_right_of(
            fragments,
            "Application No",
            Some("Application Date"),
            Some("Applicants Name"),
        ) {
            Some(number) if !number.is_empty() => number.replace(['I', 'l', ','], "/"),
            _ => {
                log::warn!(
                    "Could not find the application number for the current development application; it will be ignored. Elements: {}",
                    group.summary()
                );
                return None;
            }
        };
        log::debug!("Found \"{}\"", application_number);

        let received_date = received_date_text(group).as_deref().and_then(parse_received_date);

        let house_number = text_to_right_of(
            fragments,
            "Property House No",
            Some("Planning Conditions"),
            Some("Lot"),
        )
        .filter(|number| number != "0")
        .unwrap_or_default();

        let Some(street_name) = required(text_to_right_of(
            fragments,
            "Property Street",
            Some("Planning Conditions"),
            Some("Property Suburb"),
        )) else {
            log::warn!(
                "Application number {} will be ignored because no street name was found. Elements: {}",
                application_number,
                group.summary()
            );
            return None;
        };

        let Some(suburb_name) = required(text_to_right_of(
            fragments,
            "Property Suburb",
            Some("Planning Conditions"),
            Some("Title"),
        )) else {
            log::warn!(
                "Application number {} will be ignored because no suburb name was found for street \"{}\". Elements: {}",
                application_number,
                street_name,
                group.summary()
            );
            return None;
        };

        let address = compose_address(&house_number, &street_name, &suburb_name, self.catalogue);

        let description = text_below(
            fragments,
            "Development Description",
            Some("Relevant Authority"),
            Some("Private Certifier Name"),
        )
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| self.description_placeholder.clone());

        Some(ParsedRecord {
            application_number,
            address,
            description,
            information_url: information_url.to_string(),
            comment_url: self.comment_url.clone(),
            scrape_date: self.scrape_date,
            received_date,
        })
    }
}

/// An address part that must be present: empty and "0" count as missing
fn required(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty() && t != "0")
}

/// The layout names the received date field either "Application Received"
/// or "Application received", each with its own neighboring labels.
fn received_date_text(group: &RecordGroup) -> Option<String> {
    let fragments = group.fragments.as_slice();
    let (label, bottom) = if group.has_text("Application Received") {
        ("Application Received", "Land Division Approval")
    } else if group.has_text("Application received") {
        ("Application received", "Building Application")
    } else {
        return None;
    };

    text_to_right_of(fragments, label, Some("Planning Approval"), Some(bottom))
        .or_else(|| {
            text_to_right_of(fragments, "Application Date", Some("Planning Approval"), Some(label))
        })
}

/// Parse a `D/MM/YYYY` date, strictly
pub fn parse_received_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if !RECEIVED_DATE_RE.is_match(text) {
        return None;
    }
    NaiveDate::parse_from_str(text, "%d/%m/%Y").ok()
}
