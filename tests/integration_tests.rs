//! Integration tests for development application extraction

use chrono::NaiveDate;
use da_extract::labels::{find_label, find_label_match, right_neighbor, LabelEdge};
use da_extract::{
    parse_document, process_pdf_mem, segment_page, Catalogue, ExtractionConfig, MemoryStore,
    ParsedRecord, RecordParser, RecordStore, TextFragment,
};

// Helper to create test fragments: 6 units per character, 10 units high
fn frag(text: &str, x: f32, y: f32) -> TextFragment {
    TextFragment::new(text, x, y, text.chars().count() as f32 * 6.0, 10.0)
}

/// One complete record laid out the way the registers print it, starting
/// at `top`.
fn record_block(
    top: f32,
    number: &str,
    house: &str,
    street: &str,
    suburb: &str,
) -> Vec<TextFragment> {
    vec![
        frag("Application No", 0.0, top),
        frag(number, 100.0, top),
        frag("Application Date", 200.0, top),
        frag("Applicants Name", 0.0, top + 12.0),
        frag("Property House No", 0.0, top + 24.0),
        frag(house, 120.0, top + 24.0),
        frag("Planning Conditions", 400.0, top + 24.0),
        frag("Lot", 0.0, top + 36.0),
        frag("Property Street", 0.0, top + 48.0),
        frag(street, 120.0, top + 48.0),
        frag("Property Suburb", 0.0, top + 60.0),
        frag(suburb, 120.0, top + 60.0),
        frag("Title", 0.0, top + 72.0),
        frag("Development Description", 0.0, top + 84.0),
        frag("Relevant Authority", 250.0, top + 84.0),
        frag("NEW SHED", 0.0, top + 96.0),
        frag("Private Certifier Name", 0.0, top + 110.0),
    ]
}

fn scrape_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 6, 30).unwrap()
}

fn parse_pages(pages: Vec<Vec<TextFragment>>, catalogue: &Catalogue) -> Vec<ParsedRecord> {
    let config = ExtractionConfig::default();
    let parser = RecordParser::new(catalogue, &config).with_scrape_date(scrape_date());
    parse_document(&pages, "http://example.com/register.pdf", &parser, &config)
}

// ============================================================================
// Label Location Tests
// ============================================================================

#[test]
fn test_exact_label_beats_fuzzy_label() {
    let fragments = vec![
        frag("Property", 0.0, 0.0),
        frag("Streat", 52.0, 0.0),
        frag("Property", 0.0, 50.0),
        frag("Street", 52.0, 50.0),
    ];
    let found = find_label_match(&fragments, "Property Street").expect("label");
    assert_eq!(found.threshold, 0);
    assert_eq!(found.element.y, 50.0);
    assert_eq!(
        find_label(&fragments, "Property Street", LabelEdge::Rightmost).map(|f| f.text.as_str()),
        Some("Street")
    );
}

#[test]
fn test_right_neighbor_is_not_symmetric() {
    let fragments = vec![frag("Property", 0.0, 0.0), frag("Suburb", 52.0, 0.0)];
    assert_eq!(right_neighbor(&fragments, &fragments[0]), Some(&fragments[1]));
    assert_eq!(right_neighbor(&fragments, &fragments[1]), None);
}

// ============================================================================
// Single Record Tests
// ============================================================================

#[test]
fn test_minimal_record_bounded_by_applicant_row() {
    let fragments = vec![
        frag("Application No", 0.0, 0.0),
        frag("DA123/2020", 120.0, 0.0),
        frag("Applicants Name", 0.0, 12.0),
        frag("Property Street", 0.0, 20.0),
        frag("SMITH STREET", 150.0, 20.0),
        frag("Property Suburb", 0.0, 40.0),
        frag("BERRI", 150.0, 40.0),
    ];
    let mut catalogue = Catalogue::new();
    catalogue.add_suburb("BERRI", "BERRI");

    let groups = segment_page(&fragments);
    assert_eq!(groups.len(), 1);

    let config = ExtractionConfig::default();
    let parser = RecordParser::new(&catalogue, &config);
    let record = parser.parse(&groups[0], "http://example.com/a.pdf").expect("record");
    assert_eq!(record.application_number, "DA123/2020");
    assert!(record.address.contains("SMITH STREET, BERRI"));
    assert_eq!(record.description, "No Description Provided");
    assert_eq!(record.received_date, None);
}

#[test]
fn test_minimal_record_without_applicant_row() {
    // Nothing bounds the application number from below, so its region runs
    // to the bottom of the page and takes in the street and suburb values.
    let fragments = vec![
        frag("Application No", 0.0, 0.0),
        frag("DA123/2020", 120.0, 0.0),
        frag("Property Street", 0.0, 20.0),
        frag("SMITH STREET", 150.0, 20.0),
        frag("Property Suburb", 0.0, 40.0),
        frag("BERRI", 150.0, 40.0),
    ];
    let mut catalogue = Catalogue::new();
    catalogue.add_suburb("BERRI", "BERRI");

    let groups = segment_page(&fragments);
    assert_eq!(groups.len(), 1);

    let config = ExtractionConfig::default();
    let parser = RecordParser::new(&catalogue, &config);
    let record = parser.parse(&groups[0], "http://example.com/a.pdf").expect("record");
    assert_eq!(record.application_number, "DA123/2020 SM/TH STREET BERR/");
    assert_eq!(record.address, "SMITH STREET, BERRI");
}

#[test]
fn test_full_record_through_document_driver() {
    let pages = vec![record_block(100.0, "DA 12,2020", "4", "VAUGHAN TERRACE", "BERRI")];
    let records = parse_pages(pages, &Catalogue::new());

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.application_number, "DA 12/2020");
    assert_eq!(record.address, "4 VAUGHAN TERRACE, BERRI");
    assert_eq!(record.description, "NEW SHED");
    assert_eq!(record.information_url, "http://example.com/register.pdf");
    assert_eq!(record.comment_url, "mailto:bbc@bbc.sa.gov.au");
    assert_eq!(record.scrape_date, scrape_date());
}

#[test]
fn test_merged_address_picks_numeric_half() {
    let mut catalogue = Catalogue::new();
    catalogue.add_suburb("PASKEVILLE", "PASKEVILLE");
    let pages = vec![record_block(
        0.0,
        "DA 5/2020",
        "35ü4",
        "RAILWAY TCEüSCHOOL TERRACE",
        "PASKEVILLEüPASKEVILLE",
    )];
    let records = parse_pages(pages, &catalogue);
    assert_eq!(records[0].address, "35 RAILWAY TCE, PASKEVILLE");
}

#[test]
fn test_merged_address_ambiguous_street_uses_catalogue() {
    let mut catalogue = Catalogue::new();
    catalogue.add_street("SWIFT WINGS ROAD", "WALLAROO");
    catalogue.add_street("ROSSLYN ROAD", "WALLAROO");
    let pages = vec![record_block(
        0.0,
        "DA 6/2020",
        "ü4",
        "ROSSLYNüSWIFT WINGS ROADüROAD",
        "WALLAROOüWALLAROO",
    )];
    let records = parse_pages(pages, &catalogue);
    assert_eq!(records[0].address, "4 SWIFT WINGS ROAD, WALLAROO");
}

#[test]
fn test_record_without_street_is_dropped() {
    let block: Vec<TextFragment> = record_block(0.0, "DA 7/2020", "1", "KAY AVENUE", "BERRI")
        .into_iter()
        .filter(|f| f.text != "Property Street")
        .collect();
    assert!(parse_pages(vec![block], &Catalogue::new()).is_empty());
}

// ============================================================================
// Document Tests
// ============================================================================

#[test]
fn test_multiple_records_across_pages() {
    let mut first_page = record_block(50.0, "DA 1/2020", "1", "KAY AVENUE", "BERRI");
    first_page.extend(record_block(250.0, "DA 2/2020", "2", "KAY AVENUE", "BERRI"));
    let cover_page = vec![frag("Development Register", 0.0, 0.0)];
    let last_page = record_block(50.0, "DA 3/2020", "3", "KAY AVENUE", "BERRI");

    let records = parse_pages(vec![cover_page, first_page, last_page], &Catalogue::new());
    let numbers: Vec<&str> = records.iter().map(|r| r.application_number.as_str()).collect();
    assert_eq!(numbers, ["DA 1/2020", "DA 2/2020", "DA 3/2020"]);
    assert_eq!(records[1].address, "2 KAY AVENUE, BERRI");
}

#[test]
fn test_duplicate_application_numbers_are_suffixed() {
    let mut page = record_block(0.0, "DA1/2020", "1", "KAY AVENUE", "BERRI");
    page.extend(record_block(200.0, "DA1/2020", "9", "KAY AVENUE", "BERRI"));
    let records = parse_pages(vec![page], &Catalogue::new());

    let numbers: Vec<&str> = records.iter().map(|r| r.application_number.as_str()).collect();
    assert_eq!(numbers, ["DA1/2020", "DA1/2020 (1)"]);
    assert_eq!(records[1].address, "9 KAY AVENUE, BERRI");
}

#[test]
fn test_store_keeps_first_record_across_documents() {
    let catalogue = Catalogue::new();
    let first_page = record_block(0.0, "DA 1/2020", "1", "KAY AVENUE", "BERRI");
    let second_page = record_block(0.0, "DA 1/2020", "5", "KAY AVENUE", "BERRI");
    let first = parse_pages(vec![first_page], &catalogue);
    let second = parse_pages(vec![second_page], &catalogue);

    let mut store = MemoryStore::new();
    let inserted: Vec<bool> = first
        .into_iter()
        .chain(second)
        .map(|r| store.insert_if_absent(r))
        .collect();
    assert_eq!(inserted, [true, false]);
    assert_eq!(store.get("DA 1/2020").unwrap().address, "1 KAY AVENUE, BERRI");
}

// ============================================================================
// PDF Extraction Tests
// ============================================================================

/// Build a one-page PDF that places each string at a top-left position,
/// in 10pt Helvetica where every glyph is 500/1000 em wide.
fn create_register_pdf(lines: &[(&str, f32, f32)]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream, StringFormat};

    let mut doc = Document::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
        "FirstChar" => 32,
        "LastChar" => 255,
        "Widths" => (32..=255).map(|_| Object::Integer(500)).collect::<Vec<_>>(),
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
    ];
    for (text, x, y) in lines {
        operations.push(Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), (*x).into(), (792.0 - *y).into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
        ));
    }
    operations.push(Operation::new("ET", vec![]));
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

#[test]
fn test_pdf_fragments_have_top_left_geometry() {
    use da_extract::{PageSource, PdfDocument};

    let pdf = create_register_pdf(&[("Application No", 36.0, 100.0), ("DA 9/2020", 140.0, 100.0)]);
    let document = PdfDocument::load_mem(&pdf).unwrap();
    assert_eq!(document.page_count(), 1);

    let fragments = document.page_fragments(1).unwrap();
    assert_eq!(fragments.len(), 2);
    let label = &fragments[0];
    assert_eq!(label.text, "Application No");
    assert!((label.x - 36.0).abs() < 0.01);
    assert!((label.y - 100.0).abs() < 0.01);
    assert!((label.width - 70.0).abs() < 0.01);
    assert!((label.height - 10.0).abs() < 0.01);

    assert!(document.page_fragments(2).is_err());
}

#[test]
fn test_process_pdf_mem_extracts_record() {
    let pdf = create_register_pdf(&[
        ("Application No", 36.0, 100.0),
        ("DA 9/2020", 140.0, 100.0),
        ("Applicants Name", 36.0, 112.0),
        ("Property House No", 36.0, 124.0),
        ("21", 160.0, 124.0),
        ("Lot", 36.0, 136.0),
        ("Property Street", 36.0, 148.0),
        ("WILSON STREET", 160.0, 148.0),
        ("Property Suburb", 36.0, 160.0),
        ("BERRI", 160.0, 160.0),
        ("Title", 36.0, 172.0),
    ]);

    let catalogue = Catalogue::new();
    let config = ExtractionConfig::default();
    let parser = RecordParser::new(&catalogue, &config);
    let records = process_pdf_mem(&pdf, "http://example.com/r.pdf", &parser, &config).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].application_number, "DA 9/2020");
    assert_eq!(records[0].address, "21 WILSON STREET, BERRI");
}

#[test]
fn test_process_pdf_mem_rejects_garbage() {
    let catalogue = Catalogue::new();
    let config = ExtractionConfig::default();
    let parser = RecordParser::new(&catalogue, &config);
    assert!(process_pdf_mem(b"not a pdf", "u", &parser, &config).is_err());
}
