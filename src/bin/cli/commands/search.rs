//! `search`: rank a signature collection against a query.

use std::path::PathBuf;

use anyhow::Context;
use seqsketch_rs::io::persistence::load_signature_file;
use seqsketch_rs::{SearchParams, Signature, SketchEngine, SketchError};
use tracing::info;

use crate::cli::args::SearchArgs;
use crate::cli::config_layer::{load_configuration, ConfigMerge};
use crate::cli::output::{hit_line, report_failures};

/// Rendered results for one query
struct QueryReport {
    query: String,
    lines: Result<Vec<String>, SketchError>,
}

/// Search every compatible query record against the targets
pub async fn search_command(args: SearchArgs, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = load_configuration(config_path.as_deref())?;
    config.comparison.merge_with(&args.selection);
    if let Some(threshold) = args.threshold {
        config.comparison.threshold = threshold;
    }
    let engine = SketchEngine::new(config)?;
    let params = SearchParams::from(&engine.config().comparison);
    let key = params.key();

    let query_path = args.query.clone();
    let patterns = args.targets.clone();
    let reports = tokio::task::spawn_blocking(move || {
        let loaded = load_signature_file(&query_path)?;
        report_failures(&loaded.failures);
        let queries: Vec<Signature> = loaded
            .signatures
            .into_iter()
            .filter(|signature| signature.sketch(&key).is_some())
            .collect();
        if queries.is_empty() {
            return Err(SketchError::incompatible_query(
                format!("{} holds no sketch for {key}", query_path.display()),
                key.ksize,
                key.moltype,
            )
            .into());
        }
        for query in &queries {
            info!("loaded query: {} ({key})", query.name());
        }

        let load = engine.load_catalog(&patterns)?;
        info!("loaded {} signatures", load.catalog.len());
        if load.catalog.positions_with(&key).is_empty() {
            return Err(SketchError::NoCompatibleSketches {
                ksize: key.ksize,
                moltype: key.moltype,
            }
            .into());
        }

        let reports: Vec<QueryReport> = engine
            .search(&queries, &load.catalog, &params)
            .into_iter()
            .map(|result| QueryReport {
                query: result.query.name().to_string(),
                lines: result.hits.map(|hits| {
                    hits.iter()
                        .map(|hit| hit_line(hit.name(), hit.score))
                        .collect()
                }),
            })
            .collect();
        engine.metrics().log_summary();
        anyhow::Ok(reports)
    })
    .await
    .context("Search task panicked")??;

    let multiple = reports.len() > 1;
    let mut failed = 0usize;
    for report in reports {
        if multiple {
            println!("query: {}", report.query);
        }
        match report.lines {
            Ok(lines) => {
                println!("{} matches:", lines.len());
                for line in lines {
                    println!("{line}");
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", report.query, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} queries could not be searched");
    }
    Ok(())
}
