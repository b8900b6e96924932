//! Import of hash dumps written by other MinHash tools.
//!
//! Each row is `hash_function,seed,ksize,name,hashes`, where `hashes` is a
//! space-separated list of 64-bit values. A leading header row is skipped.
//! Every row becomes a single-sketch DNA signature.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::core::errors::{Result, SketchError};
use crate::sketch::hashing::{is_supported_hash_function, HASH_FUNCTION};
use crate::sketch::{MinHashSketch, MoleculeType, Signature};

use super::persistence::{LoadFailure, LoadedFile};

const COLUMNS: usize = 5;

/// Import every row of the CSV file at `path`
pub fn import_csv_file(path: impl AsRef<Path>) -> Result<LoadedFile> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        SketchError::io(format!("Failed to open CSV file: {}", path.display()), e)
    })?;
    import_csv(file, path)
}

/// Import rows from any reader; `path` names the source in diagnostics
pub fn import_csv<R: Read>(reader: R, path: &Path) -> Result<LoadedFile> {
    let source = path.display().to_string();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut loaded = LoadedFile::default();
    for (index, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(error) if error.is_io_error() => return Err(error.into()),
            Err(error) => {
                loaded.failures.push(LoadFailure {
                    path: path.to_path_buf(),
                    record: Some(index),
                    error: SketchError::malformed_record(
                        error.to_string(),
                        source.as_str(),
                        Some(index),
                    ),
                });
                continue;
            }
        };
        if index == 0 && is_header(&row) {
            continue;
        }
        if row.iter().all(str::is_empty) {
            continue;
        }

        match signature_from_row(&row, &source) {
            Ok(signature) => loaded.signatures.push(signature),
            Err(error) => loaded.failures.push(LoadFailure {
                path: path.to_path_buf(),
                record: Some(index),
                error: match error {
                    SketchError::MalformedInput { message, .. } => {
                        SketchError::malformed_record(message, source.as_str(), Some(index))
                    }
                    other => other,
                },
            }),
        }
    }

    debug!(
        "Imported {} signatures from {} ({} rows failed)",
        loaded.signatures.len(),
        source,
        loaded.failures.len()
    );
    Ok(loaded)
}

fn is_header(row: &StringRecord) -> bool {
    row.get(1).is_some_and(|seed| seed.eq_ignore_ascii_case("seed"))
}

fn signature_from_row(row: &StringRecord, source: &str) -> Result<Signature> {
    if row.len() != COLUMNS {
        return Err(SketchError::malformed(format!(
            "expected {COLUMNS} columns (hash_function,seed,ksize,name,hashes), found {}",
            row.len()
        )));
    }

    let hash_function = &row[0];
    if !is_supported_hash_function(hash_function) {
        return Err(SketchError::malformed(format!(
            "hash function '{hash_function}' is not {HASH_FUNCTION}; hashes would not be comparable"
        )));
    }

    let seed: u64 = row[1].parse()?;
    let ksize: u32 = row[2].parse()?;
    let name = &row[3];

    let mut hashes = row[4]
        .split_whitespace()
        .map(str::parse::<u64>)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    hashes.sort_unstable();
    hashes.dedup();

    let mut sketch = MinHashSketch::new(hashes.len(), ksize, MoleculeType::Dna, seed);
    for hash in hashes {
        sketch.add_hash(hash);
    }

    Signature::new(name, source, vec![sketch])
}
