//! Dashboard generator: loads the result artifacts (or their synthetic
//! substitutes) and writes a single self-contained HTML page.
//!
//! Usage:
//!   liftboard [--results DIR] [--out FILE] [--synthetic]

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use liftboard::page::render_page;
use liftboard::session::RenderContext;
use liftboard::source::{ArtifactOrigin, FileSource, LoadedResults, ResultSource, SyntheticSource};

fn parse_arg(args: &[String], flag: &str, default: &str) -> String {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let results_dir = parse_arg(&args, "--results", "results");
    let out_path = parse_arg(&args, "--out", "dashboard.html");
    let synthetic = args.iter().any(|a| a == "--synthetic");

    println!("=== Quick Edit Dashboard Generator ===");

    let loaded: LoadedResults = if synthetic {
        println!("  source: synthetic");
        SyntheticSource.load()?
    } else {
        println!("  source: {}/", results_dir);
        FileSource::new(&results_dir).load()?
    };

    for m in &loaded.manifest {
        let origin = match m.origin {
            ArtifactOrigin::File => "file",
            ArtifactOrigin::Synthetic => "synthetic",
        };
        println!("  {}: {} ({} rows)", m.artifact, origin, m.rows);
    }

    let page = render_page(&loaded, &RenderContext::default())
        .context("rendering dashboard page")?;

    if let Some(parent) = Path::new(&out_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    fs::write(&out_path, &page).with_context(|| format!("writing {}", out_path))?;

    println!();
    println!("  {} written ({:.1} KB)", out_path, page.len() as f64 / 1024.0);
    Ok(())
}
