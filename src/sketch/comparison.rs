//! Pairwise similarity between sketches and all-pairs similarity matrices.
//!
//! Similarity is estimated on a common-size prefix of the two sketches'
//! union: with `n = min(|A|, |B|)`, the `n` smallest values of `A ∪ B` stand
//! in for the bottom-n sketch of the true union, and the fraction of them
//! present in both sketches estimates the Jaccard index. Sketches of unequal
//! size are never intersected directly.

use std::time::Instant;

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::errors::{Result, SketchError};

use super::catalog::SignatureCatalog;
use super::config::ComparisonConfig;
use super::minhash::MinHashSketch;
use super::signature::Signature;
use super::types::{MoleculeType, SketchKey};

/// Result of comparing two sketches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    /// Estimated Jaccard index in `[0, 1]`
    pub value: f64,
    /// Union-prefix values present in both sketches
    pub shared: usize,
    /// Size of the union prefix, `min(|A|, |B|)`
    pub compared: usize,
    /// Both sketches were empty; `value` is 0 by convention
    pub degenerate: bool,
}

impl Similarity {
    fn degenerate() -> Self {
        Self {
            value: 0.0,
            shared: 0,
            compared: 0,
            degenerate: true,
        }
    }

    /// Fail with `DegenerateComparison` instead of returning a flagged zero
    pub fn require_non_degenerate(self) -> Result<Self> {
        if self.degenerate {
            return Err(SketchError::degenerate(
                "at least one sketch is empty; no similarity can be estimated",
            ));
        }
        Ok(self)
    }
}

/// Truncated-union Jaccard estimate without any parameter checks.
pub fn truncated_jaccard(a: &MinHashSketch, b: &MinHashSketch) -> Similarity {
    let n = a.len().min(b.len());
    if n == 0 {
        return Similarity::degenerate();
    }

    let mut left = a.mins().peekable();
    let mut right = b.mins().peekable();
    let mut shared = 0;

    for _ in 0..n {
        match (left.peek().copied(), right.peek().copied()) {
            (Some(x), Some(y)) if x == y => {
                shared += 1;
                left.next();
                right.next();
            }
            (Some(x), Some(y)) if x < y => {
                left.next();
            }
            (Some(_), Some(_)) | (None, Some(_)) => {
                right.next();
            }
            (Some(_), None) => {
                left.next();
            }
            (None, None) => break,
        }
    }

    Similarity {
        value: shared as f64 / n as f64,
        shared,
        compared: n,
        degenerate: false,
    }
}

/// Handling of sketches built with different k-mer sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KsizePolicy {
    /// Mismatched k is an `IncompatibleSketch` error
    #[default]
    Require,
    /// Mismatched pairs are skipped
    Ignore,
}

/// Similarity calculator enforcing sketch compatibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct Comparator {
    ksize_policy: KsizePolicy,
}

impl Comparator {
    /// Comparator requiring matching k-mer sizes
    pub fn new() -> Self {
        Self::default()
    }

    /// Comparator with an explicit k-mer size policy
    pub fn with_ksize_policy(ksize_policy: KsizePolicy) -> Self {
        Self { ksize_policy }
    }

    /// Comparator configured from the comparison section
    pub fn from_config(config: &ComparisonConfig) -> Self {
        let policy = if config.ignore_ksize {
            KsizePolicy::Ignore
        } else {
            KsizePolicy::Require
        };
        Self::with_ksize_policy(policy)
    }

    /// Active k-mer size policy
    pub fn ksize_policy(&self) -> KsizePolicy {
        self.ksize_policy
    }

    /// Fail on seed, molecule type or `max_hash` mismatches.
    ///
    /// Returns `Ok(false)` when the k-mer sizes differ under
    /// [`KsizePolicy::Ignore`], meaning the pair is skipped.
    pub fn check(&self, a: &MinHashSketch, b: &MinHashSketch) -> Result<bool> {
        let (left, right) = (a.params(), b.params());

        if left.seed != right.seed {
            return Err(SketchError::incompatible(
                "sketches were built with different seeds",
                left.to_string(),
                right.to_string(),
            ));
        }
        if left.moltype != right.moltype {
            return Err(SketchError::incompatible(
                "sketches have different molecule types",
                left.to_string(),
                right.to_string(),
            ));
        }
        if left.max_hash != right.max_hash {
            return Err(SketchError::incompatible(
                "sketches have different max_hash cutoffs",
                left.to_string(),
                right.to_string(),
            ));
        }
        if left.ksize != right.ksize {
            return match self.ksize_policy {
                KsizePolicy::Require => Err(SketchError::incompatible(
                    "sketches have different k-mer sizes",
                    left.to_string(),
                    right.to_string(),
                )),
                KsizePolicy::Ignore => {
                    debug!("Skipping comparison between {left} and {right}");
                    Ok(false)
                }
            };
        }
        Ok(true)
    }

    /// Compare two sketches.
    ///
    /// Returns `Ok(None)` when the pair is skipped because of a k-mer size
    /// mismatch under [`KsizePolicy::Ignore`].
    pub fn similarity(&self, a: &MinHashSketch, b: &MinHashSketch) -> Result<Option<Similarity>> {
        if !self.check(a, b)? {
            return Ok(None);
        }
        Ok(Some(truncated_jaccard(a, b)))
    }

    /// Catalog entries considered for a comparison at `key`.
    ///
    /// [`KsizePolicy::Require`] takes entries carrying exactly `key`;
    /// [`KsizePolicy::Ignore`] takes any entry with a sketch of the same
    /// molecule type, preferring the `key` sketch.
    pub fn candidates<'a>(
        &self,
        catalog: &'a SignatureCatalog,
        key: SketchKey,
    ) -> Vec<CatalogEntry<'a>> {
        match self.ksize_policy {
            KsizePolicy::Require => catalog.with_sketch(&key).collect(),
            KsizePolicy::Ignore => catalog.with_moltype(&key).collect(),
        }
    }

    /// All-pairs similarity over the catalog entries selected for `key`.
    ///
    /// Entries without a usable sketch, and entries whose seed or cutoff
    /// disagrees with the first selected entry, are excluded and listed in
    /// the result. Pairs skipped for a k-mer size mismatch score 0.
    pub fn matrix(&self, catalog: &SignatureCatalog, key: SketchKey) -> Result<SimilarityMatrix> {
        let start = Instant::now();
        let candidates = self.candidates(catalog, key);

        let missing_reason = match self.ksize_policy {
            KsizePolicy::Require => format!("no sketch for {key}"),
            KsizePolicy::Ignore => format!("no {} sketch", key.moltype),
        };
        let mut selected: Vec<usize> = candidates
            .iter()
            .map(|(position, _, _)| *position)
            .collect();
        selected.sort_unstable();
        let mut excluded: Vec<ExcludedEntry> = catalog
            .iter()
            .enumerate()
            .filter(|(position, _)| selected.binary_search(position).is_err())
            .map(|(position, signature)| ExcludedEntry {
                position,
                name: signature.name().to_string(),
                reason: missing_reason.clone(),
            })
            .collect();

        let mut entries: Vec<CatalogEntry<'_>> = Vec::with_capacity(candidates.len());
        let reference = candidates.first().map(|entry| entry.2);
        if let Some(reference) = reference {
            for entry in candidates {
                match self.check(reference, entry.2) {
                    Ok(_) => entries.push(entry),
                    Err(err) => excluded.push(ExcludedEntry {
                        position: entry.0,
                        name: entry.1.name().to_string(),
                        reason: err.to_string(),
                    }),
                }
            }
        }
        excluded.sort_by_key(|entry| entry.position);
        for entry in &excluded {
            warn!(
                "Excluding '{}' (entry {}): {}",
                entry.name, entry.position, entry.reason
            );
        }

        if entries.is_empty() {
            return Err(SketchError::NoCompatibleSketches {
                ksize: key.ksize,
                moltype: key.moltype,
            });
        }

        let n = entries.len();
        let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();

        // Every entry agrees with the reference on seed, moltype and cutoff,
        // so only a k-mer size mismatch can leave a pair unscored.
        let scores: Vec<(usize, usize, Option<Similarity>)> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let similarity = self.similarity(entries[i].2, entries[j].2).ok().flatten();
                (i, j, similarity)
            })
            .collect();

        let mut values = Array2::<f64>::zeros((n, n));
        let mut degenerate_pairs = 0;
        let mut skipped_pairs = 0;
        for (i, j, similarity) in scores {
            let value = match similarity {
                Some(similarity) => {
                    if similarity.degenerate {
                        degenerate_pairs += 1;
                    }
                    similarity.value
                }
                None => {
                    skipped_pairs += 1;
                    0.0
                }
            };
            values[[i, j]] = value;
            values[[j, i]] = value;
        }

        debug!(
            "Computed {}x{} similarity matrix for {key} in {:?} ({} degenerate, {} skipped pairs)",
            n,
            n,
            start.elapsed(),
            degenerate_pairs,
            skipped_pairs
        );

        Ok(SimilarityMatrix {
            ksize: key.ksize,
            moltype: key.moltype,
            labels: entries.iter().map(|(_, sig, _)| sig.name().to_string()).collect(),
            positions: entries.iter().map(|(position, _, _)| *position).collect(),
            values,
            excluded,
            degenerate_pairs,
            skipped_pairs,
        })
    }
}

/// `(position, signature, sketch)` selected from a catalog
pub type CatalogEntry<'a> = (usize, &'a Signature, &'a MinHashSketch);

/// Catalog entry left out of a matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedEntry {
    /// Catalog position
    pub position: usize,
    /// Signature name
    pub name: String,
    /// Why the entry was left out
    #[serde(default)]
    pub reason: String,
}

/// Symmetric similarity matrix with labels in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    /// K-mer size compared
    pub ksize: u32,
    /// Molecule type compared
    pub moltype: MoleculeType,
    /// Row/column labels
    pub labels: Vec<String>,
    /// Catalog position of each row
    pub positions: Vec<usize>,
    /// Similarity values
    pub values: Array2<f64>,
    /// Catalog entries without a matching sketch
    #[serde(default)]
    pub excluded: Vec<ExcludedEntry>,
    /// Pairs in which a sketch was empty
    #[serde(default)]
    pub degenerate_pairs: usize,
    /// Pairs skipped for a k-mer size mismatch
    #[serde(default)]
    pub skipped_pairs: usize,
}

impl SimilarityMatrix {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the matrix has no rows
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Similarity between rows `i` and `j`
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get([i, j]).copied()
    }

    /// `1 - similarity`, the form consumed by clustering renderers
    pub fn distances(&self) -> Array2<f64> {
        self.values.mapv(|v| 1.0 - v)
    }

    /// Check shape, symmetry and value range
    pub fn validate(&self) -> Result<()> {
        let n = self.labels.len();
        if self.values.dim() != (n, n) {
            return Err(SketchError::malformed(format!(
                "matrix is {:?} but there are {n} labels",
                self.values.dim()
            )));
        }
        if self.positions.len() != n {
            return Err(SketchError::malformed("positions do not match labels"));
        }

        for ((i, j), &value) in self.values.indexed_iter() {
            if !(0.0..=1.0).contains(&value) {
                return Err(SketchError::malformed(format!(
                    "value {value} at ({i}, {j}) is outside [0, 1]"
                )));
            }
            if (value - self.values[[j, i]]).abs() > 1e-12 {
                return Err(SketchError::malformed(format!(
                    "matrix is not symmetric at ({i}, {j})"
                )));
            }
        }
        Ok(())
    }
}
