//! CLI tool for extracting development applications from PDF registers

use da_extract::{process_pdf, Catalogue, ExtractionConfig, MemoryStore, RecordParser, RecordStore};
use rayon::prelude::*;
use std::env;
use std::process;
use std::time::Instant;

fn main() {
    let args: Vec<String> = env::args().collect();
    let json_output = args.iter().any(|a| a == "--json");
    let verbose = args.iter().any(|a| a == "--verbose");
    let positional: Vec<&String> = args.iter().skip(1).filter(|a| !a.starts_with("--")).collect();

    if positional.len() < 3 {
        eprintln!(
            "Usage: {} <street_names.txt> <suburb_names.txt> <pdf_file>... [--json] [--verbose]",
            args[0]
        );
        eprintln!();
        eprintln!("Extracts development application records from PDF registers.");
        eprintln!("Street and suburb files hold one \"NAME,VALUE\" pair per line.");
        process::exit(1);
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    if let Err(e) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("Warning: could not initialise logging: {}", e);
    }

    let catalogue = match Catalogue::load(positional[0], positional[1]) {
        Ok(catalogue) => catalogue,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let config = ExtractionConfig::default();
    let parser = RecordParser::new(&catalogue, &config);
    let pdf_paths = &positional[2..];

    let start = Instant::now();

    // Documents are independent; pages within each stay sequential
    let results: Vec<_> = pdf_paths
        .par_iter()
        .map(|path| (path, process_pdf(path.as_str(), path.as_str(), &parser, &config)))
        .collect();

    let mut store = MemoryStore::new();
    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(records) => {
                for record in records {
                    store.insert_if_absent(record);
                }
            }
            Err(e) => {
                log::error!("Could not read {}: {}", path, e);
                failures += 1;
            }
        }
    }

    let elapsed = start.elapsed();

    if json_output {
        let records: Vec<_> = store.records().collect();
        match serde_json::to_string_pretty(&records) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("Development Applications");
        println!("========================");
        println!("Documents: {}", pdf_paths.len());
        println!("Records: {}", store.len());
        println!("Processing time: {}ms", elapsed.as_millis());
        println!();
        for record in store.records() {
            println!("{}", record.application_number);
            println!("  Address:     {}", record.address);
            println!("  Description: {}", record.description);
            println!(
                "  Received:    {}",
                record
                    .received_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            );
            println!("  Source:      {}", record.information_url);
        }
    }

    if failures == pdf_paths.len() {
        process::exit(2);
    }
}
