//! ATT&CK coverage scoring over a directory of detection documents.
//!
//! Reads a Navigator layer file, counts how many documents list each known
//! technique (sub-techniques also count toward their parent), and rewrites
//! the layer's scores. Reporting only; the validation pipeline never
//! depends on this.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use detci_core::coverage::{CoverageMap, Layer};
use detci_core::DetectionDocument;

#[derive(Parser, Debug)]
#[command(name = "attack_coverage")]
#[command(about = "Update Navigator layer scores from detection document coverage")]
struct Args {
    /// Navigator layer file to update
    #[arg(long, default_value = "layer.json")]
    layer: PathBuf,

    /// Directory containing detection documents
    #[arg(long, default_value = ".")]
    docs: PathBuf,

    /// Print the coverage summary without rewriting the layer file
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let layer_text = fs::read_to_string(&args.layer)
        .with_context(|| format!("could not read layer file {}", args.layer.display()))?;
    let mut layer: Layer = serde_json::from_str(&layer_text)
        .with_context(|| format!("could not parse layer file {}", args.layer.display()))?;

    let mut coverage =
        CoverageMap::with_known_ids(layer.techniques.iter().map(|t| t.technique_id.clone()));

    let mut scanned = 0usize;
    for entry in fs::read_dir(&args.docs)
        .with_context(|| format!("could not list {}", args.docs.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("  ✗ {} unreadable: {}", path.display(), e);
                continue;
            }
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let doc = DetectionDocument::from_source(&path, &text);
        if let Some(techniques) = doc.techniques() {
            coverage.record_document(&name, techniques);
        }
        scanned += 1;
    }

    coverage.apply_to_layer(&mut layer);

    let covered = coverage.covered_techniques().count();
    println!("Documents scanned:   {}", scanned);
    println!("Techniques covered:  {}", covered);
    for (id, files) in coverage.covered_techniques() {
        println!("  {}: {} document(s)", id, files.len());
    }

    if !args.dry_run {
        fs::write(&args.layer, serde_json::to_string_pretty(&layer)?)
            .with_context(|| format!("could not write {}", args.layer.display()))?;
        println!("Updated {}", args.layer.display());
    }

    Ok(())
}
