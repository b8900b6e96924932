//! Configuration management commands.
//!
//! This module contains commands for managing seqsketch configuration files,
//! including initialization, validation, and printing defaults.

use owo_colors::OwoColorize;
use seqsketch_rs::SketchConfig;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use crate::cli::args::{InitConfigArgs, ValidateConfigArgs};
use crate::cli::config_layer::load_configuration;

/// Row type for configuration tables.
#[derive(Tabled)]
struct SettingRow {
    setting: String,
    value: String,
}

impl SettingRow {
    fn new(setting: &str, value: impl ToString) -> Self {
        Self {
            setting: setting.to_string(),
            value: value.to_string(),
        }
    }
}

fn optional<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

/// Print default configuration in YAML format
pub async fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default seqsketch configuration".dimmed());
    println!(
        "{}",
        "# Save this to a file and customize as needed".dimmed()
    );
    println!(
        "{}",
        "# Usage: seqsketch --config your-config.yml compute <files>".dimmed()
    );
    println!();

    let config = SketchConfig::default();
    let yaml_output = serde_yaml::to_string(&config)?;
    println!("{}", yaml_output);

    Ok(())
}

/// Initialize a configuration file with defaults
pub async fn init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Configuration file already exists: {}. Use --force to overwrite or choose a different name with --output",
            args.output.display()
        ));
    }

    let config = SketchConfig::default();
    let yaml_content = serde_yaml::to_string(&config)?;
    tokio::fs::write(&args.output, yaml_content).await?;

    println!(
        "{} {}",
        "✅ Configuration saved to:".bright_green().bold(),
        args.output.display().to_string().cyan()
    );
    println!();
    println!("{}", "🔧 Key settings you can customize:".bright_blue().bold());

    let rows = vec![
        SettingRow::new("compute.ksizes", "K-mer sizes to sketch (default: [31])"),
        SettingRow::new("compute.num_hashes", "Hashes kept per sketch (default: 500)"),
        SettingRow::new("compute.protein", "Also build protein sketches (default: false)"),
        SettingRow::new("tokenizer.ambiguous_bases", "skip or reject windows with non-ACGT bases"),
        SettingRow::new("comparison.threshold", "Minimum search score (default: 0.08)"),
        SettingRow::new("performance.timeout_seconds", "Per-file time limit (default: none)"),
        SettingRow::new("plot.renderer", "External dendrogram/heatmap program"),
    ];

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);

    Ok(())
}

/// Validate a seqsketch configuration file
pub async fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "🔍 Validating configuration:".bright_blue().bold(),
        args.file.display().to_string().cyan()
    );
    println!();

    let config = match load_configuration(Some(args.file.as_path())).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => {
            println!("{}", "✅ Configuration file is valid!".bright_green().bold());
            println!();
            config
        }
        Err(e) => {
            eprintln!("{} {}", "❌ Configuration validation failed:".red(), e);
            println!();
            println!("{}", "🔧 Common issues:".bright_blue().bold());
            println!("   • Check YAML syntax (indentation, colons, quotes)");
            println!("   • Enable at least one of compute.dna / compute.protein");
            println!("   • Keep k-mer sizes within tokenizer.min_*_ksize and max_ksize");
            println!();
            println!(
                "{}",
                "💡 Tip: Use 'seqsketch print-default-config' to see valid format".dimmed()
            );
            return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
        }
    };

    let keys = config
        .compute
        .keys()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let mut rows = vec![
        SettingRow::new("Sketches", keys),
        SettingRow::new("Hashes per sketch", config.compute.num_hashes),
        SettingRow::new("Comparison", config.comparison.key()),
        SettingRow::new("Search threshold", config.comparison.threshold),
    ];

    if args.detailed {
        rows.extend([
            SettingRow::new("Seed", config.compute.seed),
            SettingRow::new("Max hash", optional(&config.compute.max_hash)),
            SettingRow::new("Ambiguous bases", format!("{:?}", config.tokenizer.ambiguous_bases)),
            SettingRow::new("Ignore ksize", config.comparison.ignore_ksize),
            SettingRow::new("Max threads", optional(&config.performance.max_threads)),
            SettingRow::new("Timeout (s)", optional(&config.performance.timeout_seconds)),
            SettingRow::new(
                "Plot renderer",
                optional(&config.plot.renderer.as_ref().map(|p| p.display().to_string())),
            ),
        ]);
    }

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);

    Ok(())
}
