//! Console output: progress, tables and failure reports.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use seqsketch_rs::io::persistence::LoadFailure;
use seqsketch_rs::SimilarityMatrix;
use tabled::{settings::Style as TableStyle, Table};

/// Progress bar over `len` files, hidden when `quiet`
pub fn file_progress(len: usize, quiet: bool) -> anyhow::Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.blue} {msg} [{bar:40.bright_blue/blue}] {pos}/{len} {elapsed_precise}",
        )?
        .progress_chars("=> "),
    );
    pb.set_message("Sketching");
    Ok(pb)
}

/// Print every load failure to stderr
pub fn report_failures(failures: &[LoadFailure]) {
    for failure in failures {
        let location = match failure.record {
            Some(record) => format!("{} (record {})", failure.path.display(), record),
            None => failure.path.display().to_string(),
        };
        eprintln!("{} {}: {}", "⚠️  Skipped".yellow(), location, failure.error);
    }
}

/// Render a similarity matrix with labels on both axes
pub fn matrix_table(matrix: &SimilarityMatrix) -> Table {
    let width = matrix.len();
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(width + 1);

    let mut header = Vec::with_capacity(width + 1);
    header.push(String::new());
    header.extend((0..width).map(|i| format!("[{}]", i + 1)));
    rows.push(header);

    for (i, label) in matrix.labels.iter().enumerate() {
        let mut row = Vec::with_capacity(width + 1);
        row.push(format!("[{}] {}", i + 1, label));
        row.extend(matrix.values.row(i).iter().map(|value| format!("{value:.3}")));
        rows.push(row);
    }

    let mut table = Table::from_iter(rows);
    table.with(TableStyle::rounded());
    table
}

/// One search hit line: name and score to three decimals
pub fn hit_line(name: &str, score: f64) -> String {
    format!("{name:<40}\t{score:.3}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use seqsketch_rs::MoleculeType;

    #[test]
    fn matrix_table_lists_every_label_and_value() {
        let matrix = SimilarityMatrix {
            ksize: 31,
            moltype: MoleculeType::Dna,
            labels: vec!["first".into(), "second".into()],
            positions: vec![0, 1],
            values: array![[1.0, 0.125], [0.125, 1.0]],
            excluded: Vec::new(),
            degenerate_pairs: 0,
            skipped_pairs: 0,
        };

        let rendered = matrix_table(&matrix).to_string();
        assert!(rendered.contains("[1] first"));
        assert!(rendered.contains("[2] second"));
        assert!(rendered.contains("0.125"));
        assert!(rendered.contains("1.000"));
    }

    #[test]
    fn hit_lines_use_three_decimals() {
        let line = hit_line("genome", 0.95833);
        assert!(line.starts_with("genome"));
        assert!(line.ends_with("\t0.958"));
    }
}
