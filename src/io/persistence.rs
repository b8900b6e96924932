//! Signature files: JSON arrays of signature records.
//!
//! Loading is tolerant per record: a corrupt record is reported as a
//! [`LoadFailure`] while its siblings in the same file still load.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::errors::{Result, SketchError};
use crate::sketch::{Signature, SignatureCatalog};

/// A file or record that could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    /// File the failure came from
    pub path: PathBuf,
    /// Record index inside the file, when the file itself parsed
    pub record: Option<usize>,
    /// What went wrong
    pub error: SketchError,
}

/// Signatures parsed from one file plus the records that failed.
#[derive(Debug, Default)]
pub struct LoadedFile {
    /// Successfully parsed signatures, in file order
    pub signatures: Vec<Signature>,
    /// Per-record failures
    pub failures: Vec<LoadFailure>,
}

/// A catalog and every failure met while building it.
#[derive(Debug, Default)]
pub struct CatalogLoad {
    /// Loaded signatures, in argument then file order
    pub catalog: SignatureCatalog,
    /// Per-file and per-record failures
    pub failures: Vec<LoadFailure>,
}

/// Write signatures to `path` as a JSON array
pub fn save_signatures(path: impl AsRef<Path>, signatures: &[Signature]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        SketchError::io(format!("Failed to create signature file: {}", path.display()), e)
    })?;

    let mut writer = BufWriter::new(file);
    write_signatures(&mut writer, signatures)?;
    writer.flush().map_err(|e| {
        SketchError::io(format!("Failed to write signature file: {}", path.display()), e)
    })
}

/// Serialize signatures as a JSON array followed by a newline
pub fn write_signatures<W: Write>(mut writer: W, signatures: &[Signature]) -> Result<()> {
    serde_json::to_writer(&mut writer, signatures)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Parse signature records from JSON text.
///
/// Accepts an array of records or a single record object.
pub fn parse_signatures(json: &str, source: &str) -> Result<LoadedFile> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SketchError::malformed_record(e.to_string(), source, None))?;
    Ok(split_records(value, Path::new(source)))
}

/// Read every signature record in `path`
pub fn load_signature_file(path: impl AsRef<Path>) -> Result<LoadedFile> {
    let path = path.as_ref();
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| {
        SketchError::io(format!("Failed to open signature file: {source}"), e)
    })?;

    let value: Value = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| SketchError::malformed_record(e.to_string(), source.as_str(), None))?;
    Ok(split_records(value, path))
}

fn split_records(value: Value, path: &Path) -> LoadedFile {
    let records = match value {
        Value::Array(records) => records,
        record @ Value::Object(_) => vec![record],
        other => {
            return LoadedFile {
                signatures: Vec::new(),
                failures: vec![LoadFailure {
                    path: path.to_path_buf(),
                    record: None,
                    error: SketchError::malformed_record(
                        format!("expected an array of signatures, found {}", json_kind(&other)),
                        path.display().to_string(),
                        None,
                    ),
                }],
            };
        }
    };

    let mut loaded = LoadedFile::default();
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Signature>(record) {
            Ok(signature) => loaded.signatures.push(signature),
            Err(e) => loaded.failures.push(LoadFailure {
                path: path.to_path_buf(),
                record: Some(index),
                error: SketchError::malformed_record(
                    e.to_string(),
                    path.display().to_string(),
                    Some(index),
                ),
            }),
        }
    }
    loaded
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Expand glob patterns; plain paths pass through untouched
pub fn expand_paths<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let entries = glob::glob(pattern).map_err(|e| {
            SketchError::config_field(format!("Invalid glob pattern '{pattern}': {e}"), "paths")
        })?;
        let before = paths.len();
        for entry in entries {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => warn!("Skipping unreadable path: {e}"),
            }
        }
        if paths.len() == before {
            warn!("Pattern '{pattern}' matched no files");
        }
    }
    Ok(paths)
}

/// Load all files in parallel, merging them in argument order
pub fn load_catalog(paths: &[PathBuf]) -> CatalogLoad {
    let start = Instant::now();

    let per_file: Vec<(PathBuf, Result<LoadedFile>)> = paths
        .par_iter()
        .map(|path| (path.clone(), load_signature_file(path)))
        .collect();

    let mut load = CatalogLoad::default();
    for (path, result) in per_file {
        match result {
            Ok(file) => {
                load.catalog.extend(file.signatures);
                load.failures.extend(file.failures);
            }
            Err(error) => load.failures.push(LoadFailure {
                path,
                record: None,
                error,
            }),
        }
    }

    for failure in &load.failures {
        warn!("Failed to load {}: {}", failure.path.display(), failure.error);
    }
    debug!(
        "Loaded {} signatures from {} files in {:?}",
        load.catalog.len(),
        paths.len(),
        start.elapsed()
    );

    load
}
