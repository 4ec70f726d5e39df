//! Reference street and suburb names
//!
//! Loaded once per run and shared read-only by every document parse.

use crate::fuzzy;
use crate::ExtractError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Known street names (with the suburbs they occur in) and canonical
/// suburb spellings
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    /// Street names in order of first appearance
    street_names: Vec<String>,
    street_suburbs: HashMap<String, Vec<String>>,
    suburb_names: HashMap<String, String>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both reference files
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        street_path: P,
        suburb_path: Q,
    ) -> Result<Self, ExtractError> {
        let mut catalogue = Self::new();
        catalogue.parse_street_names(&fs::read_to_string(street_path)?)?;
        catalogue.parse_suburb_names(&fs::read_to_string(suburb_path)?)?;
        log::info!(
            "Loaded {} street names and {} suburb names",
            catalogue.street_names.len(),
            catalogue.suburb_names.len()
        );
        Ok(catalogue)
    }

    /// Add `STREET,SUBURB` lines
    pub fn parse_street_names(&mut self, text: &str) -> Result<(), ExtractError> {
        for (street, suburb) in parse_pairs(text)? {
            self.add_street(&street, &suburb);
        }
        Ok(())
    }

    /// Add `RAW,CANONICAL` lines
    pub fn parse_suburb_names(&mut self, text: &str) -> Result<(), ExtractError> {
        for (raw, canonical) in parse_pairs(text)? {
            self.add_suburb(&raw, &canonical);
        }
        Ok(())
    }

    pub fn add_street(&mut self, street: &str, suburb: &str) {
        let street = street.trim().to_uppercase();
        let suburb = suburb.trim().to_uppercase();
        match self.street_suburbs.get_mut(&street) {
            Some(suburbs) => suburbs.push(suburb),
            None => {
                self.street_names.push(street.clone());
                self.street_suburbs.insert(street, vec![suburb]);
            }
        }
    }

    pub fn add_suburb(&mut self, raw: &str, canonical: &str) {
        self.suburb_names
            .insert(raw.trim().to_uppercase(), canonical.trim().to_uppercase());
    }

    /// The known street name closest to `name` within `threshold` edits
    pub fn closest_street(&self, name: &str, threshold: usize) -> Option<&str> {
        fuzzy::closest_match(name, self.street_names.iter().map(String::as_str), threshold)
            .map(|(street, _)| street)
    }

    /// Suburbs a street name is known to occur in
    pub fn suburbs_for_street(&self, street: &str) -> &[String] {
        self.street_suburbs
            .get(&street.trim().to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Canonical spelling of a suburb name, case-insensitively
    pub fn canonical_suburb(&self, name: &str) -> Option<&str> {
        self.suburb_names.get(&name.to_uppercase()).map(String::as_str)
    }
}

fn parse_pairs(text: &str) -> Result<Vec<(String, String)>, ExtractError> {
    let mut pairs = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let (first, rest) = line.split_once(',').ok_or_else(|| ExtractError::Catalogue {
            line: index + 1,
            content: line.to_string(),
        })?;
        // Extra columns are ignored
        let second = rest.split(',').next().unwrap_or(rest);
        pairs.push((first.to_string(), second.to_string()));
    }
    Ok(pairs)
}
