use da_extract::labels::find_record_anchors;
use da_extract::segment::sort_reading_order;
use da_extract::{segment_page, PageSource, PdfDocument};
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: debug_fragments <pdf_path> [page | min-max]");
        std::process::exit(1);
    }

    let document = match PdfDocument::load(&args[1]) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let range = args.get(2).map(|s| s.as_str()).unwrap_or("1");
    let (min_page, max_page) = if let Some((a, b)) = range.split_once('-') {
        (a.parse().unwrap_or(1), b.parse().unwrap_or(1))
    } else {
        let page = range.parse().unwrap_or(1);
        (page, page)
    };

    for page in min_page..=max_page.min(document.page_count()) {
        let mut fragments = match document.page_fragments(page) {
            Ok(fragments) => fragments,
            Err(e) => {
                println!("=== PAGE {} === error: {}", page, e);
                continue;
            }
        };
        sort_reading_order(&mut fragments);

        println!("=== PAGE {} ({} fragments) ===", page, fragments.len());
        for f in &fragments {
            println!(
                "  x={:7.1} y={:7.1} w={:7.1} h={:5.1} text={:?}",
                f.x, f.y, f.width, f.height, f.text
            );
        }

        let anchors = find_record_anchors(&fragments);
        println!("--- {} anchor(s) ---", anchors.len());
        for anchor in &anchors {
            println!("  x={:7.1} y={:7.1} text={:?}", anchor.x, anchor.y, anchor.text);
        }

        for (index, group) in segment_page(&fragments).iter().enumerate() {
            println!("--- record {} ({} fragments) ---", index + 1, group.fragments.len());
            println!("  {}", group.summary());
        }
        println!();
    }
}
