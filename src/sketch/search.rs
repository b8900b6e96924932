//! Ranked search of query signatures against a catalog.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::config::validate_unit_range;
use crate::core::errors::{Result, SketchError};

use super::catalog::SignatureCatalog;
use super::comparison::{Comparator, Similarity};
use super::config::ComparisonConfig;
use super::signature::Signature;
use super::types::{MoleculeType, SketchKey};

/// Sketch selection and score cutoff for a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// K-mer size of the compared sketches
    pub ksize: u32,
    /// Molecule type of the compared sketches
    pub moltype: MoleculeType,
    /// Minimum score for a hit
    pub threshold: f64,
}

impl SearchParams {
    /// Key of the compared sketches
    pub fn key(&self) -> SketchKey {
        SketchKey::new(self.ksize, self.moltype)
    }
}

impl From<&ComparisonConfig> for SearchParams {
    fn from(config: &ComparisonConfig) -> Self {
        Self {
            ksize: config.ksize,
            moltype: config.moltype,
            threshold: config.threshold,
        }
    }
}

/// One catalog entry scoring at or above the threshold.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<'a> {
    /// Catalog position
    pub position: usize,
    /// Matched signature
    #[serde(skip)]
    pub signature: &'a Signature,
    /// Estimated similarity
    pub score: f64,
    /// Full comparison details
    pub similarity: Similarity,
}

impl SearchHit<'_> {
    /// Name of the matched signature
    pub fn name(&self) -> &str {
        self.signature.name()
    }
}

/// Query evaluator over a borrowed catalog.
///
/// The catalog is loaded once and shared by every query.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    catalog: &'a SignatureCatalog,
    comparator: Comparator,
}

impl<'a> SearchEngine<'a> {
    /// Search engine requiring matching k-mer sizes
    pub fn new(catalog: &'a SignatureCatalog) -> Self {
        Self::with_comparator(catalog, Comparator::new())
    }

    /// Search engine using a specific comparator
    pub fn with_comparator(catalog: &'a SignatureCatalog, comparator: Comparator) -> Self {
        Self {
            catalog,
            comparator,
        }
    }

    /// Catalog being searched
    pub fn catalog(&self) -> &'a SignatureCatalog {
        self.catalog
    }

    /// Matches for one query, best first.
    ///
    /// Ties keep catalog order. Degenerate comparisons never match. Entries
    /// whose sketch cannot be compared with the query are logged and skipped.
    pub fn search(&self, query: &Signature, params: &SearchParams) -> Result<Vec<SearchHit<'a>>> {
        validate_unit_range(params.threshold, "threshold")?;

        let key = params.key();
        let query_sketch = query.sketch(&key).ok_or_else(|| {
            SketchError::incompatible_query(
                format!("query '{}' has no sketch for {key}", query.name()),
                params.ksize,
                params.moltype,
            )
        })?;

        let candidates = self.comparator.candidates(self.catalog, key);
        let considered = candidates.len();
        let mut skipped = 0usize;
        let mut hits = Vec::new();
        for (position, signature, sketch) in candidates {
            let similarity = match self.comparator.similarity(query_sketch, sketch) {
                Ok(Some(similarity)) => similarity,
                Ok(None) => {
                    skipped += 1;
                    continue;
                }
                Err(err) => {
                    warn!("Skipping '{}' (entry {position}): {err}", signature.name());
                    continue;
                }
            };

            if similarity.degenerate || similarity.value < params.threshold {
                continue;
            }

            hits.push(SearchHit {
                position,
                signature,
                score: similarity.value,
                similarity,
            });
        }

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });

        if skipped > 0 {
            debug!(
                "Query '{}': skipped {skipped} entries with a different k-mer size",
                query.name()
            );
        }
        debug!(
            "Query '{}' matched {} of {considered} catalog entries for {key}",
            query.name(),
            hits.len()
        );

        Ok(hits)
    }

    /// Matches for every query, in query order
    pub fn search_many(
        &self,
        queries: &[Signature],
        params: &SearchParams,
    ) -> Vec<Result<Vec<SearchHit<'a>>>> {
        queries
            .par_iter()
            .map(|query| self.search(query, params))
            .collect()
    }
}
