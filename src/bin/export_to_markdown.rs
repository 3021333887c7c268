//! Export a directory of pre-extracted OCR fragment JSON files to Markdown.
//!
//! Each input file `page_<N>.json` holds a JSON array of `RawFragment`
//! records for page `N`. This binary exists purely to exercise
//! `DocumentPipeline` end to end; it is not an OCR engine.
//!
//! Usage:
//!   cargo run --release --bin export_to_markdown -- --input-dir fragments/ --output result.md

use std::fs;
use std::path::PathBuf;

use ocr_layout::{DocumentPipeline, PipelineConfig, RawFragment, StaticAdapter};

struct ExportConfig {
    input_dir: PathBuf,
    output_path: PathBuf,
}

impl ExportConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut input_dir = PathBuf::from("fragments");
        let mut output_path = PathBuf::from("result.md");

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--input-dir" => {
                    i += 1;
                    if i < args.len() {
                        input_dir = PathBuf::from(&args[i]);
                    }
                }
                "--output" => {
                    i += 1;
                    if i < args.len() {
                        output_path = PathBuf::from(&args[i]);
                    }
                }
                _ => {}
            }
            i += 1;
        }

        Self { input_dir, output_path }
    }
}

fn load_fragments(input_dir: &PathBuf) -> Vec<RawFragment> {
    let mut fragments = Vec::new();
    let Ok(entries) = fs::read_dir(input_dir) else {
        eprintln!("no such input directory: {}", input_dir.display());
        return fragments;
    };
    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();
    for path in paths {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else { continue };
        match serde_json::from_str::<Vec<RawFragment>>(&content) {
            Ok(mut page_fragments) => fragments.append(&mut page_fragments),
            Err(e) => eprintln!("skipping {}: {e}", path.display()),
        }
    }
    fragments
}

fn main() {
    env_logger::init();
    let config = ExportConfig::from_args();
    let fragments = load_fragments(&config.input_dir);
    let page_count = fragments.iter().map(|f| f.page).max().unwrap_or(0);

    let adapter = StaticAdapter::new(fragments);
    let pipeline = match DocumentPipeline::new(PipelineConfig::default()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("failed to build pipeline: {e}");
            std::process::exit(1);
        }
    };

    match pipeline.process_document_to_markdown(&adapter, page_count) {
        Ok(markdown) => {
            if let Err(e) = fs::write(&config.output_path, markdown) {
                eprintln!("failed to write {}: {e}", config.output_path.display());
                std::process::exit(1);
            }
            println!("wrote {}", config.output_path.display());
        }
        Err(e) => {
            eprintln!("pipeline failed: {e}");
            std::process::exit(1);
        }
    }
}
