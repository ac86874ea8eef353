use clap::Parser;
use kaiseki::prelude::*;
use serde_json::{Map, Value};
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Recovers generation parameters from ComfyUI image metadata
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a JSON object of the image's text chunks (e.g. {"prompt": "...", "workflow": "..."})
    metadata_path: Option<String>,

    /// Path to a raw executable graph, used as the "prompt" entry
    #[arg(long = "prompt")]
    prompt_path: Option<String>,

    /// Path to a raw UI graph, used as the "workflow" entry
    #[arg(long = "workflow")]
    workflow_path: Option<String>,

    /// Extra rule catalog (JSON), appended after the built-in rules
    #[arg(long = "catalog")]
    catalog_path: Option<String>,

    /// Keep "{key}" placeholders instead of dropping values with missing inputs
    #[arg(long)]
    keep_missing: bool,

    /// Print every distinct value per field instead of the flattened result
    #[arg(long)]
    all: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.metadata_path.is_none() && cli.prompt_path.is_none() && cli.workflow_path.is_none() {
        exit_with_error("Provide a metadata file, or --prompt / --workflow.");
    }

    let metadata = load_metadata(&cli);

    let mut builder = Extractor::builder().propagate_none(!cli.keep_missing);
    if let Some(path) = &cli.catalog_path {
        let catalog = Catalog::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load catalog: {}", e)));
        builder = builder.with_extra_rules(catalog);
    }
    let extractor = builder.build();

    let start = Instant::now();
    if cli.all {
        let report = extractor
            .report(&metadata)
            .unwrap_or_else(|e| exit_with_error(&format!("Extraction failed: {}", e)));
        tracing::info!(elapsed = ?start.elapsed(), fields = report.fields.len(), "extraction finished");
        print_report(&report, cli.json);
    } else {
        let params = extractor.extract(&metadata);
        tracing::info!(elapsed = ?start.elapsed(), fields = params.len(), "extraction finished");
        print_params(&params, cli.json);
    }
}

/// Merges the metadata file with the individually supplied graphs; the latter take precedence.
fn load_metadata(cli: &Cli) -> Map<String, Value> {
    let mut metadata = match &cli.metadata_path {
        Some(path) => {
            let content = read_file(path, "metadata");
            match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => exit_with_error(&format!("Metadata file '{}' is not a JSON object", path)),
                Err(e) => exit_with_error(&format!("Failed to parse metadata JSON: {}", e)),
            }
        }
        None => Map::new(),
    };

    if let Some(path) = &cli.prompt_path {
        metadata.insert("prompt".to_string(), Value::String(read_file(path, "prompt")));
    }
    if let Some(path) = &cli.workflow_path {
        metadata.insert("workflow".to_string(), Value::String(read_file(path, "workflow")));
    }
    metadata
}

fn print_params(params: &ParamMap, as_json: bool) {
    let ordered = display_ordered(params);
    if as_json {
        let object: Map<String, Value> = ordered
            .iter()
            .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
            .collect();
        print_json(&object);
        return;
    }
    if ordered.is_empty() {
        println!("No parameters found.");
    }
    for (name, value) in ordered {
        println!("{}: {}", name, value);
    }
}

fn print_report(report: &ExtractionReport, as_json: bool) {
    if as_json {
        print_json(report);
        return;
    }
    if report.is_empty() {
        println!("No parameters found.");
    }
    for field in &report.fields {
        println!("{} ({}):", field.display_name, field.key);
        for value in &field.values {
            println!("  - {}", value);
        }
    }
    for (name, value) in &report.overrides {
        println!("{} (from UI graph): {}", name, value);
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => exit_with_error(&format!("Failed to serialize result: {}", e)),
    }
}

fn read_file(path: &str, what: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read {} file '{}': {}", what, path, e))
    })
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
