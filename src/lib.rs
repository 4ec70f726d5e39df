//! Development application extraction from positioned PDF text
//!
//! This crate provides:
//! - Positioned text extraction from PDF pages using lopdf
//! - Layout reconstruction: record segmentation by row overlap and fuzzy
//!   label location that tolerates misread, split labels
//! - Field extraction from label-delimited regions, including merged
//!   two-address fields

pub mod address;
pub mod catalogue;
pub mod document;
pub mod extractor;
pub mod fuzzy;
pub mod geometry;
pub mod labels;
pub mod record;
pub mod region;
pub mod segment;
pub mod store;

pub use catalogue::Catalogue;
pub use document::{parse_document, ExtractionConfig, PageSource};
pub use extractor::{PdfDocument, TextFragment};
pub use record::{ParsedRecord, RecordParser};
pub use segment::{segment_page, RecordGroup};
pub use store::{MemoryStore, RecordStore};

use std::path::Path;

/// Extract development application records from a PDF file
///
/// `information_url` is where the document came from; it is copied into
/// every record.
pub fn process_pdf<P: AsRef<Path>>(
    path: P,
    information_url: &str,
    parser: &RecordParser,
    config: &ExtractionConfig,
) -> Result<Vec<ParsedRecord>, ExtractError> {
    let document = PdfDocument::load(path)?;
    Ok(parse_document(&document, information_url, parser, config))
}

/// Extract development application records from a PDF in memory
pub fn process_pdf_mem(
    buffer: &[u8],
    information_url: &str,
    parser: &RecordParser,
    config: &ExtractionConfig,
) -> Result<Vec<ParsedRecord>, ExtractError> {
    let document = PdfDocument::load_mem(buffer)?;
    Ok(parse_document(&document, information_url, parser, config))
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("Malformed catalogue line {line}: {content:?}")]
    Catalogue { line: usize, content: String },
}

impl From<lopdf::Error> for ExtractError {
    fn from(e: lopdf::Error) -> Self {
        ExtractError::Parse(e.to_string())
    }
}
