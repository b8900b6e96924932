//! `compare`: all-pairs similarity matrix over signature files.

use std::path::PathBuf;

use anyhow::Context;
use owo_colors::OwoColorize;
use seqsketch_rs::io::matrix::{labels_path, save_matrix};
use seqsketch_rs::SketchEngine;
use tracing::warn;

use crate::cli::args::CompareArgs;
use crate::cli::config_layer::{load_configuration, ConfigMerge};
use crate::cli::output::matrix_table;

/// Compare every loaded signature against every other
pub async fn compare_command(args: CompareArgs, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = load_configuration(config_path.as_deref())?;
    config.comparison.merge_with(&args.selection);
    let engine = SketchEngine::new(config)?;
    let key = engine.config().comparison.key();

    let patterns = args.signatures.clone();
    let (load, matrix) = tokio::task::spawn_blocking(move || {
        let load = engine.load_catalog(&patterns)?;
        if load.catalog.is_empty() {
            anyhow::bail!("No signatures loaded from {}", patterns.join(", "));
        }
        let matrix = engine.compare(&load.catalog, key)?;
        engine.metrics().log_summary();
        anyhow::Ok((load, matrix))
    })
    .await
    .context("Comparison task panicked")??;

    for entry in &matrix.excluded {
        warn!("{}: {}, left out of the matrix", entry.name, entry.reason);
    }
    if matrix.skipped_pairs > 0 {
        warn!(
            "{} pairs had different k-mer sizes and were scored 0",
            matrix.skipped_pairs
        );
    }
    if matrix.degenerate_pairs > 0 {
        warn!(
            "{} pairs involved an empty sketch and were scored 0",
            matrix.degenerate_pairs
        );
    }

    if !args.quiet {
        println!(
            "{} {} of {} signatures at {}",
            "📊 Similarity matrix:".bright_blue().bold(),
            matrix.len(),
            load.catalog.len(),
            key
        );
        println!("{}", matrix_table(&matrix));
    }

    if let Some(output) = &args.output {
        save_matrix(output, &matrix)?;
        println!(
            "{} {} (labels: {})",
            "✅ Matrix saved to:".bright_green().bold(),
            output.display().to_string().cyan(),
            labels_path(output).display()
        );
    }

    Ok(())
}
