//! `import-csv`: convert hash dumps from other tools into signatures.

use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use seqsketch_rs::io::persistence::save_signatures;
use seqsketch_rs::SketchEngine;

use crate::cli::args::ImportCsvArgs;
use crate::cli::config_layer::load_configuration;
use crate::cli::output::report_failures;

fn default_output(csv: &Path) -> PathBuf {
    let stem = csv
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| "imported".into());
    let mut name = stem;
    name.push(".sig");
    PathBuf::from(name)
}

/// Import every CSV row as a signature
pub async fn import_csv_command(
    args: ImportCsvArgs,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_configuration(config_path.as_deref())?;
    let engine = SketchEngine::new(config)?;

    let loaded = engine.import_csv(&args.csv)?;
    report_failures(&loaded.failures);
    if loaded.signatures.is_empty() {
        anyhow::bail!("No signatures imported from {}", args.csv.display());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.csv));
    save_signatures(&output, &loaded.signatures)?;

    println!(
        "{} {} ({} signatures)",
        "✅ Imported:".bright_green().bold(),
        output.display().to_string().cyan(),
        loaded.signatures.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_replaces_the_extension() {
        assert_eq!(
            default_output(Path::new("dumps/short.csv")),
            PathBuf::from("short.sig")
        );
    }
}
