//! Document-level record extraction
//!
//! Pages are processed one at a time and in order: application numbers are
//! made unique across the whole document, so later pages depend on the
//! records found on earlier ones.

use crate::extractor::TextFragment;
use crate::record::{ParsedRecord, RecordParser};
use crate::segment::segment_page;
use crate::ExtractError;

/// Anything that can hand out a page's fragments on demand
pub trait PageSource {
    /// Number of pages reported by the document
    fn page_count(&self) -> u32;

    /// Fragments of a page (1-indexed), in top-left page space
    fn page_fragments(&self, page: u32) -> Result<Vec<TextFragment>, ExtractError>;
}

impl PageSource for Vec<Vec<TextFragment>> {
    fn page_count(&self) -> u32 {
        self.len() as u32
    }

    fn page_fragments(&self, page: u32) -> Result<Vec<TextFragment>, ExtractError> {
        page.checked_sub(1)
            .and_then(|index| self.get(index as usize))
            .cloned()
            .ok_or(ExtractError::PageOutOfRange {
                page,
                page_count: self.page_count(),
            })
    }
}

/// Configuration for record extraction
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Upper bound on pages read from one document (default: 500)
    pub max_pages: u32,
    /// Contact address stored with every record
    pub comment_url: String,
    /// Description used when none can be read
    pub description_placeholder: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_pages: 500,
            comment_url: "mailto:bbc@bbc.sa.gov.au".to_string(),
            description_placeholder: "No Description Provided".to_string(),
        }
    }
}

/// Extract every record from a document.
///
/// Pages that cannot be read are logged and skipped. At most
/// `config.max_pages` pages are visited regardless of the reported count.
pub fn parse_document<S: PageSource + ?Sized>(
    source: &S,
    information_url: &str,
    parser: &RecordParser,
    config: &ExtractionConfig,
) -> Vec<ParsedRecord> {
    log::info!("Reading development applications from {}", information_url);
    let mut records = Vec::new();

    for page in 1..=config.max_pages {
        let page_count = source.page_count();
        if page > page_count {
            break;
        }
        log::info!(
            "Reading and parsing applications from page {} of {}",
            page,
            page_count
        );

        // Dropped at the end of the iteration, before the next page is read
        let fragments = match source.page_fragments(page) {
            Ok(fragments) => fragments,
            Err(e) => {
                log::warn!("Skipping page {} of {}: {}", page, information_url, e);
                continue;
            }
        };

        for group in segment_page(&fragments) {
            if let Some(record) = parser.parse(&group, information_url) {
                push_unique(&mut records, record);
            }
        }
    }

    log::info!(
        "Parsed {} development application(s) from {}",
        records.len(),
        information_url
    );
    records
}

/// Append a record, suffixing its application number with " (n)" until it
/// is unique within `records`.
pub fn push_unique(records: &mut Vec<ParsedRecord>, mut record: ParsedRecord) {
    let base = record.application_number.clone();
    let mut suffix = 0;
    while records
        .iter()
        .any(|r| r.application_number == record.application_number)
    {
        suffix += 1;
        record.application_number = format!("{} ({})", base, suffix);
    }
    records.push(record);
}
