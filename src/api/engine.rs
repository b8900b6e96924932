//! Main sketching engine implementation.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use crate::core::config::SketchConfig;
use crate::core::errors::{Result, SketchError};
use crate::io::csv_import::import_csv_file;
use crate::io::persistence::{expand_paths, load_catalog, CatalogLoad, LoadedFile};
use crate::io::sequences::{for_each_sequence, record_name};
use crate::sketch::{
    Comparator, SearchEngine, SearchHit, SearchParams, Signature, SignatureBuilder,
    SignatureCatalog, SimilarityMatrix, SketchKey, SketchMetrics, TokenStats,
};

/// Signature computed from one sequence file.
#[derive(Debug)]
pub struct ComputedFile {
    /// Input path
    pub path: PathBuf,
    /// Signature holding every requested sketch
    pub signature: Signature,
    /// Records read
    pub sequences: usize,
    /// Tokenizer totals over all sketches
    pub stats: TokenStats,
    /// Wall-clock time spent on the file
    pub elapsed: Duration,
}

/// Per-file result of a compute run.
pub type FileOutcome = (PathBuf, Result<ComputedFile>);

/// Search results for one query signature.
#[derive(Debug)]
pub struct QueryResult<'a> {
    /// The query
    pub query: &'a Signature,
    /// Matches, best first, or why the query could not run
    pub hits: Result<Vec<SearchHit<'a>>>,
}

/// Main sketching engine
pub struct SketchEngine {
    /// Engine configuration
    config: Arc<SketchConfig>,

    /// Worker pool for per-file, per-pair and per-query parallelism
    pool: ThreadPool,

    /// Counters accumulated across calls
    metrics: Mutex<SketchMetrics>,
}

impl SketchEngine {
    /// Create a new engine, validating the configuration
    pub fn new(config: SketchConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = ThreadPoolBuilder::new();
        if let Some(threads) = config.performance.max_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build().map_err(|e| {
            SketchError::config_field(
                format!("Failed to start worker pool: {e}"),
                "performance.max_threads",
            )
        })?;

        debug!(
            "Sketch engine ready: {} worker threads",
            pool.current_num_threads()
        );

        Ok(Self {
            config: Arc::new(config),
            pool,
            metrics: Mutex::new(SketchMetrics::new()),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// Snapshot of the accumulated metrics
    pub fn metrics(&self) -> SketchMetrics {
        self.metrics
            .lock()
            .map(|metrics| metrics.clone())
            .unwrap_or_default()
    }

    fn with_metrics(&self, update: impl FnOnce(&mut SketchMetrics)) {
        if let Ok(mut metrics) = self.metrics.lock() {
            update(&mut metrics);
        }
    }

    /// Sketch one sequence file.
    ///
    /// The per-file deadline is checked before each record, never inside one.
    pub fn compute_file(&self, path: impl AsRef<Path>) -> Result<ComputedFile> {
        let deadline = self
            .config
            .performance
            .timeout()
            .map(|limit| Instant::now() + limit);
        self.compute_file_until(path.as_ref(), deadline)
    }

    fn compute_file_until(&self, path: &Path, deadline: Option<Instant>) -> Result<ComputedFile> {
        let start = Instant::now();
        let source = path.display().to_string();
        let compute = &self.config.compute;

        let mut builder =
            SignatureBuilder::new(source.as_str(), source.as_str(), compute, &self.config.tokenizer)?;

        let sequences = for_each_sequence(path, |id, seq| {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(SketchError::timeout(format!(
                    "{source}: gave up after {} sequences",
                    builder.sequences()
                )));
            }
            if compute.name_from_first && builder.sequences() == 0 {
                builder.set_name(record_name(id));
            }
            builder.add_sequence(seq).map(|_| ())
        })?;

        if sequences == 0 {
            warn!("{source}: no sequences found; writing empty sketches");
        }

        let stats = builder.stats();
        let signature = builder.finish();
        let elapsed = start.elapsed();
        self.with_metrics(|metrics| metrics.record_file(elapsed, sequences, stats));

        debug!(
            "{source}: {sequences} sequences, {} k-mers, {} skipped windows in {:?}",
            stats.kmers, stats.skipped_windows, elapsed
        );

        Ok(ComputedFile {
            path: path.to_path_buf(),
            signature,
            sequences,
            stats,
            elapsed,
        })
    }

    /// Sketch many files in parallel; outcomes keep the input order.
    ///
    /// `on_done` runs once per file as it completes, from a worker thread.
    pub fn compute_files<F>(&self, paths: &[PathBuf], on_done: F) -> Vec<FileOutcome>
    where
        F: Fn(&Path) + Sync,
    {
        info!("Computing signatures for {} files", paths.len());

        self.pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let outcome = self.compute_file(path);
                    on_done(path);
                    (path.clone(), outcome)
                })
                .collect()
        })
    }

    /// Expand patterns and load every signature file into one catalog
    pub fn load_catalog<S: AsRef<str>>(&self, patterns: &[S]) -> Result<CatalogLoad> {
        let start = Instant::now();
        let paths = expand_paths(patterns)?;
        let load = self.pool.install(|| load_catalog(&paths));
        self.with_metrics(|metrics| metrics.record_load(start.elapsed()));
        Ok(load)
    }

    /// Similarity matrix over `catalog` for the configured or given key
    pub fn compare(&self, catalog: &SignatureCatalog, key: SketchKey) -> Result<SimilarityMatrix> {
        let start = Instant::now();
        let comparator = Comparator::from_config(&self.config.comparison);
        let matrix = self.pool.install(|| comparator.matrix(catalog, key))?;

        let n = matrix.len();
        self.with_metrics(|metrics| metrics.record_comparisons(start.elapsed(), n * (n + 1) / 2));
        info!(
            "Compared {} signatures ({} excluded) for {key}",
            n,
            matrix.excluded.len()
        );
        Ok(matrix)
    }

    /// Search every query against one loaded catalog
    pub fn search<'a>(
        &self,
        queries: &'a [Signature],
        catalog: &'a SignatureCatalog,
        params: &SearchParams,
    ) -> Vec<QueryResult<'a>> {
        let start = Instant::now();
        let comparator = Comparator::from_config(&self.config.comparison);
        let engine = SearchEngine::with_comparator(catalog, comparator);
        let results = self.pool.install(|| engine.search_many(queries, params));

        let comparisons = queries.len() * catalog.positions_with(&params.key()).len();
        self.with_metrics(|metrics| metrics.record_comparisons(start.elapsed(), comparisons));

        queries
            .iter()
            .zip(results)
            .map(|(query, hits)| QueryResult { query, hits })
            .collect()
    }

    /// Translate a CSV hash dump into signatures
    pub fn import_csv(&self, path: impl AsRef<Path>) -> Result<LoadedFile> {
        import_csv_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::MoleculeType;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    const SEQ: &str = "ATGCGTACGTTAGCCGATCGATCGGCTAGCTAGCTAGCATCGATCGACTGACTAGCTAGCATCGGATCCA";

    fn fasta(records: &[(&str, &str)]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        for (id, seq) in records {
            writeln!(file, ">{id}\n{seq}").expect("write record");
        }
        file
    }

    fn engine(config: SketchConfig) -> SketchEngine {
        SketchEngine::new(config).expect("valid config")
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = SketchConfig::default();
        config.compute.dna = false;
        assert!(matches!(
            SketchEngine::new(config),
            Err(SketchError::Config { .. })
        ));
    }

    #[test]
    fn computes_requested_sketches_and_names() {
        let file = fasta(&[("read1 sample", SEQ), ("read2", SEQ)]);
        let mut config = SketchConfig::default();
        config.compute.ksizes = vec![21, 31];
        config.compute.name_from_first = true;

        let computed = engine(config).compute_file(file.path()).expect("compute");
        assert_eq!(computed.sequences, 2);
        assert_eq!(computed.signature.name(), "read1");
        assert_eq!(computed.signature.len(), 2);
        assert_eq!(
            computed.signature.filename(),
            file.path().display().to_string()
        );
    }

    #[test]
    fn outcomes_follow_input_order() {
        let first = fasta(&[("a", SEQ)]);
        let second = fasta(&[("b", SEQ)]);
        let engine = engine(SketchConfig::default());
        let paths = vec![
            first.path().to_path_buf(),
            PathBuf::from("/nonexistent/missing.fa"),
            second.path().to_path_buf(),
        ];

        let done = std::sync::atomic::AtomicUsize::new(0);
        let outcomes = engine.compute_files(&paths, |_| {
            done.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        });

        assert_eq!(done.into_inner(), 3);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].0, paths[0]);
        assert!(outcomes[0].1.is_ok());
        assert!(outcomes[1].1.is_err());
        assert!(outcomes[2].1.is_ok());
        assert_eq!(engine.metrics().files_sketched, 2);
    }

    #[test]
    fn catalog_compare_and_search() {
        let dir = tempdir().expect("tempdir");
        let file = fasta(&[("a", SEQ)]);
        let engine = engine(SketchConfig::default());

        let computed = engine.compute_file(file.path()).expect("compute");
        let sig_path = dir.path().join("a.sig");
        crate::io::persistence::save_signatures(&sig_path, &computed.signature.split())
            .expect("save");

        let pattern = format!("{}/*.sig", dir.path().display());
        let load = engine.load_catalog(&[pattern]).expect("load");
        assert!(load.failures.is_empty());
        assert_eq!(load.catalog.len(), 1);

        let key = SketchKey::new(31, MoleculeType::Dna);
        let matrix = engine.compare(&load.catalog, key).expect("compare");
        assert_eq!(matrix.get(0, 0), Some(1.0));

        let queries = vec![computed.signature];
        let params = SearchParams::from(&engine.config().comparison);
        let results = engine.search(&queries, &load.catalog, &params);
        let hits = results[0].hits.as_ref().expect("hits");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 1.0);
    }

    #[test]
    fn expired_deadline_times_out_between_sequences() {
        let file = fasta(&[("a", SEQ), ("b", SEQ)]);
        let engine = engine(SketchConfig::default());

        let err = engine
            .compute_file_until(file.path(), Some(Instant::now()))
            .unwrap_err();
        assert!(matches!(err, SketchError::Timeout { .. }));

        let generous = Instant::now() + Duration::from_secs(60);
        let computed = engine
            .compute_file_until(file.path(), Some(generous))
            .expect("within deadline");
        assert_eq!(computed.sequences, 2);
    }
}
