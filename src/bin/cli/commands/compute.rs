//! `compute`: sketch sequence files into signature files.

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use anyhow::Context;
use owo_colors::OwoColorize;
use seqsketch_rs::io::persistence::save_signatures;
use seqsketch_rs::{Signature, SketchEngine};
use tracing::{info, warn};

use crate::cli::args::ComputeArgs;
use crate::cli::config_layer::{load_configuration, ConfigMerge};
use crate::cli::output::file_progress;

/// Default output for one input: `<basename>.sig` in the working directory
fn default_output(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "sequences".into());
    name.push(".sig");
    PathBuf::from(name)
}

/// First pair of inputs whose default outputs would overwrite each other
fn output_collision(inputs: &[PathBuf]) -> Option<(&Path, &Path, PathBuf)> {
    let mut seen: AHashMap<PathBuf, &Path> = AHashMap::with_capacity(inputs.len());
    for input in inputs {
        let output = default_output(input);
        if let Some(&first) = seen.get(&output) {
            return Some((first, input.as_path(), output));
        }
        seen.insert(output, input.as_path());
    }
    None
}

/// Compute signatures for every input file
pub async fn compute_command(args: ComputeArgs, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = load_configuration(config_path.as_deref())?;
    config.compute.merge_with(&args);

    if args.output.is_none() {
        if let Some((first, second, output)) = output_collision(&args.sequences) {
            anyhow::bail!(
                "{} and {} would both be written to {}; use -o to collect them in one file",
                first.display(),
                second.display(),
                output.display()
            );
        }
    }

    // Contradictory requests fail here, before any input is read.
    let engine = SketchEngine::new(config)?;
    let keys = engine.config().compute.keys();
    info!(
        "Sketching {} files at {}",
        args.sequences.len(),
        keys.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let paths = args.sequences.clone();
    let quiet = args.quiet;
    let (engine, outcomes) = tokio::task::spawn_blocking(move || {
        let pb = file_progress(paths.len(), quiet)?;
        let outcomes = engine.compute_files(&paths, |_| pb.inc(1));
        pb.finish_and_clear();
        anyhow::Ok((engine, outcomes))
    })
    .await
    .context("Sketching task panicked")??;

    let mut computed: Vec<(PathBuf, Signature)> = Vec::with_capacity(outcomes.len());
    let mut failed = 0usize;
    for (path, outcome) in outcomes {
        match outcome {
            Ok(file) => computed.push((path, file.signature)),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", "❌ Failed:".red(), path.display(), e);
            }
        }
    }

    if computed.is_empty() {
        anyhow::bail!("No signatures computed ({} files failed)", failed);
    }

    let mut written = 0usize;
    match &args.output {
        Some(output) => {
            let records: Vec<Signature> = computed
                .iter()
                .flat_map(|(_, signature)| signature.split())
                .collect();
            save_signatures(output, &records)?;
            written += records.len();
            if !quiet {
                println!(
                    "{} {} ({} signatures)",
                    "✅ Saved:".bright_green().bold(),
                    output.display().to_string().cyan(),
                    records.len()
                );
            }
        }
        None => {
            for (path, signature) in &computed {
                let output = default_output(path);
                let records = signature.split();
                save_signatures(&output, &records)?;
                written += records.len();
                if !quiet {
                    println!(
                        "{} {} ({} signatures)",
                        "✅ Saved:".bright_green().bold(),
                        output.display().to_string().cyan(),
                        records.len()
                    );
                }
            }
        }
    }

    if failed > 0 {
        warn!("{failed} of {} inputs could not be sketched", failed + computed.len());
    }
    engine.metrics().log_summary();
    info!("Wrote {written} signatures");

    Ok(())
}
