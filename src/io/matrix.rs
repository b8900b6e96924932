//! Similarity matrix files.
//!
//! `compare -o NAME` writes `NAME` (JSON) and `NAME.labels.txt` (one label
//! per line). Both are read back by `plot` without recomputation.

use std::path::{Path, PathBuf};

use crate::core::errors::{Result, SketchError};
use crate::sketch::SimilarityMatrix;

/// Suffix appended to the matrix path for the labels file.
pub const LABELS_SUFFIX: &str = ".labels.txt";

/// Path of the labels file belonging to `matrix_path`
pub fn labels_path(matrix_path: &Path) -> PathBuf {
    let mut name = matrix_path.as_os_str().to_os_string();
    name.push(LABELS_SUFFIX);
    PathBuf::from(name)
}

/// Write the matrix JSON and its labels file
pub fn save_matrix(path: impl AsRef<Path>, matrix: &SimilarityMatrix) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string(matrix)?;
    std::fs::write(path, json + "\n").map_err(|e| {
        SketchError::io(format!("Failed to write matrix: {}", path.display()), e)
    })?;

    let labels_file = labels_path(path);
    let mut labels = matrix.labels.join("\n");
    labels.push('\n');
    std::fs::write(&labels_file, labels).map_err(|e| {
        SketchError::io(
            format!("Failed to write labels: {}", labels_file.display()),
            e,
        )
    })
}

/// Read and validate a matrix written by [`save_matrix`]
pub fn load_matrix(path: impl AsRef<Path>) -> Result<SimilarityMatrix> {
    let path = path.as_ref();
    let source = path.display().to_string();
    let json = std::fs::read_to_string(path)
        .map_err(|e| SketchError::io(format!("Failed to read matrix: {source}"), e))?;

    let matrix: SimilarityMatrix = serde_json::from_str(&json)
        .map_err(|e| SketchError::malformed_record(e.to_string(), source.as_str(), None))?;
    matrix
        .validate()
        .map_err(|e| e.with_source_name(source.as_str()))?;

    let labels_file = labels_path(path);
    if labels_file.is_file() {
        let labels = std::fs::read_to_string(&labels_file).map_err(|e| {
            SketchError::io(format!("Failed to read labels: {}", labels_file.display()), e)
        })?;
        let count = labels.lines().count();
        if count != matrix.len() {
            return Err(SketchError::malformed_record(
                format!("{count} labels for a {n}x{n} matrix", n = matrix.len()),
                labels_file.display().to_string(),
                None,
            ));
        }
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::MoleculeType;
    use ndarray::array;
    use tempfile::tempdir;

    fn matrix() -> SimilarityMatrix {
        SimilarityMatrix {
            ksize: 31,
            moltype: MoleculeType::Dna,
            labels: vec!["a.fa".into(), "b.fa".into()],
            positions: vec![0, 1],
            values: array![[1.0, 0.25], [0.25, 1.0]],
            excluded: Vec::new(),
            degenerate_pairs: 0,
            skipped_pairs: 0,
        }
    }

    #[test]
    fn writes_matrix_and_labels() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("cmp");
        save_matrix(&path, &matrix()).expect("save");

        let labels = std::fs::read_to_string(dir.path().join("cmp.labels.txt")).expect("labels");
        assert_eq!(labels, "a.fa\nb.fa\n");
        assert_eq!(load_matrix(&path).expect("load"), matrix());
    }

    #[test]
    fn mismatched_labels_file_is_malformed() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("cmp");
        save_matrix(&path, &matrix()).expect("save");
        std::fs::write(labels_path(&path), "only-one\n").expect("overwrite labels");

        let err = load_matrix(&path).unwrap_err();
        assert!(matches!(err, SketchError::MalformedInput { .. }));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("cmp");
        std::fs::write(&path, "{\"labels\": 3}").expect("write");
        assert!(matches!(
            load_matrix(&path).unwrap_err(),
            SketchError::MalformedInput { .. }
        ));
    }
}
