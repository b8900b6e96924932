//! FASTA/FASTQ reading with transparent decompression.

use std::path::Path;

use needletail::parse_fastx_file;
use tracing::warn;

use crate::core::errors::{Result, SketchError};

/// Call `callback` with `(id, sequence)` for every record in `path`.
///
/// Returns the number of records read. An unparseable first record fails the
/// file; a later one ends the read with a warning, keeping the records before
/// it. Errors returned by the callback stop the read immediately.
pub fn for_each_sequence<P, F>(path: P, mut callback: F) -> Result<usize>
where
    P: AsRef<Path>,
    F: FnMut(&[u8], &[u8]) -> Result<()>,
{
    let path = path.as_ref();
    let source = path.display().to_string();

    std::fs::metadata(path).map_err(|e| {
        SketchError::io(format!("Failed to open sequence file: {source}"), e)
    })?;

    let mut reader = parse_fastx_file(path)
        .map_err(|e| SketchError::malformed_record(e.to_string(), source.as_str(), None))?;

    let mut records = 0;
    while let Some(record) = reader.next() {
        let record = match record {
            Ok(record) => record,
            Err(e) if records == 0 => {
                return Err(SketchError::malformed_record(
                    e.to_string(),
                    source.as_str(),
                    Some(records),
                ));
            }
            // the parser cannot resynchronise past a broken record
            Err(e) => {
                warn!(
                    "{source}: record {records} is unreadable, keeping the {records} before it: {e}"
                );
                break;
            }
        };

        let seq = record.seq();
        callback(record.id(), &seq).map_err(|e| e.with_source_name(source.as_str()))?;
        records += 1;
    }

    Ok(records)
}

/// Identifier up to the first whitespace
pub fn record_name(id: &[u8]) -> String {
    let id = String::from_utf8_lossy(id);
    id.split_whitespace().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fasta(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write fasta");
        file
    }

    #[test]
    fn reads_multiline_fasta() {
        let file = fasta(">first desc\nACGT\nACGT\n>second\nTTTT\n");
        let mut seen = Vec::new();
        let count = for_each_sequence(file.path(), |id, seq| {
            seen.push((record_name(id), seq.to_vec()));
            Ok(())
        })
        .expect("read fasta");

        assert_eq!(count, 2);
        assert_eq!(seen[0], ("first".to_string(), b"ACGTACGT".to_vec()));
        assert_eq!(seen[1].0, "second");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = for_each_sequence("/nonexistent/reads.fa", |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, SketchError::Io { .. }));
    }

    #[test]
    fn garbage_is_malformed() {
        let file = fasta("this is not a sequence file\n");
        let err = for_each_sequence(file.path(), |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, SketchError::MalformedInput { .. }));
    }

    #[test]
    fn unreadable_record_keeps_the_records_before_it() {
        let file = fasta("@a\nACGT\n+\nIIII\n@b\nACGTACGT\n+\nII\n");
        let mut seen = Vec::new();
        let count = for_each_sequence(file.path(), |id, _| {
            seen.push(record_name(id));
            Ok(())
        })
        .expect("first record is readable");

        assert_eq!(count, 1);
        assert_eq!(seen, vec!["a"]);
    }

    #[test]
    fn callback_errors_carry_the_file_name() {
        let file = fasta(">a\nACGT\n");
        let err = for_each_sequence(file.path(), |_, _| Err(SketchError::malformed("bad base")))
            .unwrap_err();
        assert!(err.to_string().contains("bad base"));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
