//! Sketching and comparison timings.

use std::time::Duration;

use tracing::debug;

use super::tokenizer::TokenStats;

/// Counters accumulated over a run
#[derive(Debug, Default, Clone)]
pub struct SketchMetrics {
    /// Time spent reading and sketching input files
    pub sketch_time: Duration,
    /// Time spent loading signature files
    pub load_time: Duration,
    /// Time spent on similarity comparisons
    pub comparison_time: Duration,
    /// Input files sketched successfully
    pub files_sketched: usize,
    /// Sequences consumed
    pub sequences: usize,
    /// K-mers hashed across all sketches
    pub kmers_hashed: usize,
    /// Windows skipped for non-ACGT characters
    pub windows_skipped: usize,
    /// Pairwise comparisons performed
    pub comparisons_performed: usize,
}

impl SketchMetrics {
    /// Create empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sketched file
    pub fn record_file(&mut self, elapsed: Duration, sequences: usize, stats: TokenStats) {
        self.sketch_time += elapsed;
        self.files_sketched += 1;
        self.sequences += sequences;
        self.kmers_hashed += stats.kmers;
        self.windows_skipped += stats.skipped_windows;
    }

    /// Record a batch of comparisons
    pub fn record_comparisons(&mut self, elapsed: Duration, count: usize) {
        self.comparison_time += elapsed;
        self.comparisons_performed += count;
    }

    /// Record catalog loading
    pub fn record_load(&mut self, elapsed: Duration) {
        self.load_time += elapsed;
    }

    /// Log performance summary
    pub fn log_summary(&self) {
        debug!("Sketch performance summary:");
        debug!("  Sketching: {:?}", self.sketch_time);
        debug!("  Loading: {:?}", self.load_time);
        debug!("  Comparison: {:?}", self.comparison_time);
        debug!(
            "  Files: {}, sequences: {}, k-mers: {}",
            self.files_sketched, self.sequences, self.kmers_hashed
        );
        if self.windows_skipped > 0 {
            debug!("  Skipped windows: {}", self.windows_skipped);
        }

        if self.files_sketched > 0 {
            debug!(
                "  Average per file: {:?}",
                self.sketch_time / self.files_sketched as u32
            );
        }
        if self.comparisons_performed > 0 {
            debug!(
                "  Average per comparison: {:?}",
                self.comparison_time / self.comparisons_performed as u32
            );
        }
    }
}
