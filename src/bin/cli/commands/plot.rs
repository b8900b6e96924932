//! `plot`: hand a saved matrix to an external dendrogram/heatmap renderer.

use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use seqsketch_rs::core::config::{PlotFormat, PLOT_RENDERER_ENV};
use seqsketch_rs::io::matrix::{labels_path, load_matrix};
use seqsketch_rs::SketchError;
use tokio::process::Command;
use tracing::debug;

use crate::cli::args::PlotArgs;
use crate::cli::config_layer::load_configuration;

/// `MATRIX.<kind>.<ext>` next to the matrix file
fn figure_path(matrix: &Path, kind: &str, format: PlotFormat) -> PathBuf {
    let mut name = matrix.as_os_str().to_os_string();
    name.push(format!(".{kind}.{}", format.extension()));
    PathBuf::from(name)
}

/// Render the dendrogram and heatmap of a saved matrix
pub async fn plot_command(args: PlotArgs, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_configuration(config_path.as_deref())?;
    config.plot.validate()?;

    let matrix = load_matrix(&args.matrix)?;
    debug!("Loaded {}x{} matrix", matrix.len(), matrix.len());

    let renderer = config.plot.resolve_renderer().ok_or_else(|| {
        SketchError::config_field(
            format!("no plot renderer configured; set plot.renderer or {PLOT_RENDERER_ENV}"),
            "plot.renderer",
        )
    })?;

    let format = if args.pdf {
        PlotFormat::Pdf
    } else {
        config.plot.format
    };
    let dendrogram = figure_path(&args.matrix, "dendro", format);
    let heatmap = figure_path(&args.matrix, "matrix", format);

    let mut command = Command::new(&renderer);
    command
        .arg(&args.matrix)
        .arg("--labels-file")
        .arg(labels_path(&args.matrix))
        .arg("--dendrogram")
        .arg(&dendrogram)
        .arg("--heatmap")
        .arg(&heatmap);
    if args.labels {
        command.arg("--labels");
    }

    debug!("Running renderer: {:?}", command);
    let status = command.status().await.map_err(|e| {
        SketchError::io(
            format!("Failed to run plot renderer: {}", renderer.display()),
            e,
        )
    })?;
    if !status.success() {
        anyhow::bail!("Plot renderer {} exited with {}", renderer.display(), status);
    }

    println!(
        "{} {}",
        "✅ Dendrogram:".bright_green().bold(),
        dendrogram.display().to_string().cyan()
    );
    println!(
        "{} {}",
        "✅ Heatmap:".bright_green().bold(),
        heatmap.display().to_string().cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figures_sit_next_to_the_matrix() {
        assert_eq!(
            figure_path(Path::new("out/cmp"), "dendro", PlotFormat::Png),
            PathBuf::from("out/cmp.dendro.png")
        );
        assert_eq!(
            figure_path(Path::new("cmp"), "matrix", PlotFormat::Pdf),
            PathBuf::from("cmp.matrix.pdf")
        );
    }
}
