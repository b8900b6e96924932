//! Bounded bottom-n MinHash sketch.
//!
//! A sketch keeps the `capacity` smallest hash values it has seen. When a
//! `max_hash` is set the sketch is "scaled" instead: every value at or below
//! the cutoff is kept and the capacity is advisory.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SketchError};

use super::hashing::hash_kmer;
use super::tokenizer::{TokenStats, Tokenizer};
use super::types::{MoleculeType, SketchKey};

/// Parameters that must agree for two sketches to be merged or compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SketchParams {
    /// K-mer length
    pub ksize: u32,
    /// Molecule type
    pub moltype: MoleculeType,
    /// Hash seed
    pub seed: u64,
    /// Scaled-sketch cutoff
    pub max_hash: Option<u64>,
}

impl SketchParams {
    /// Lookup key for these parameters
    pub fn key(&self) -> SketchKey {
        SketchKey::new(self.ksize, self.moltype)
    }
}

impl fmt::Display for SketchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k={} {} seed={}", self.ksize, self.moltype, self.seed)?;
        if let Some(max_hash) = self.max_hash {
            write!(f, " max_hash={max_hash}")?;
        }
        Ok(())
    }
}

/// Bottom-n MinHash sketch over k-mer hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SketchRecord", into = "SketchRecord")]
pub struct MinHashSketch {
    params: SketchParams,
    capacity: usize,
    mins: BTreeSet<u64>,
}

impl MinHashSketch {
    /// Create an empty sketch retaining at most `capacity` values
    pub fn new(capacity: usize, ksize: u32, moltype: MoleculeType, seed: u64) -> Self {
        Self {
            params: SketchParams {
                ksize,
                moltype,
                seed,
                max_hash: None,
            },
            capacity,
            mins: BTreeSet::new(),
        }
    }

    /// Restrict retained values to those `<= max_hash`
    pub fn with_max_hash(mut self, max_hash: Option<u64>) -> Self {
        self.params.max_hash = max_hash;
        if let Some(cutoff) = max_hash {
            self.mins.retain(|&h| h <= cutoff);
        }
        self
    }

    /// Rebuild a sketch from stored parts, checking every invariant
    pub fn from_parts(params: SketchParams, capacity: usize, mins: Vec<u64>) -> Result<Self> {
        if mins.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(SketchError::malformed(format!(
                "mins for {params} are not strictly ascending"
            )));
        }

        match params.max_hash {
            Some(cutoff) => {
                if mins.last().is_some_and(|&h| h > cutoff) {
                    return Err(SketchError::malformed(format!(
                        "mins for {params} exceed max_hash"
                    )));
                }
            }
            None => {
                if mins.len() > capacity {
                    return Err(SketchError::malformed(format!(
                        "{} mins for {params} exceed capacity {capacity}",
                        mins.len()
                    )));
                }
            }
        }

        Ok(Self {
            params,
            capacity,
            mins: mins.into_iter().collect(),
        })
    }

    /// Comparability parameters
    pub fn params(&self) -> SketchParams {
        self.params
    }

    /// `(ksize, moltype)` lookup key
    pub fn key(&self) -> SketchKey {
        self.params.key()
    }

    /// K-mer length
    pub fn ksize(&self) -> u32 {
        self.params.ksize
    }

    /// Molecule type
    pub fn moltype(&self) -> MoleculeType {
        self.params.moltype
    }

    /// Hash seed
    pub fn seed(&self) -> u64 {
        self.params.seed
    }

    /// Scaled-sketch cutoff, if any
    pub fn max_hash(&self) -> Option<u64> {
        self.params.max_hash
    }

    /// Maximum number of retained values (advisory for scaled sketches)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained values
    pub fn len(&self) -> usize {
        self.mins.len()
    }

    /// Whether no value has been retained
    pub fn is_empty(&self) -> bool {
        self.mins.is_empty()
    }

    /// Retained values in ascending order
    pub fn mins(&self) -> impl ExactSizeIterator<Item = u64> + DoubleEndedIterator + '_ {
        self.mins.iter().copied()
    }

    /// Whether `hash` is retained
    pub fn contains(&self, hash: u64) -> bool {
        self.mins.contains(&hash)
    }

    /// Insert one hash value; returns whether it was retained
    pub fn add_hash(&mut self, hash: u64) -> bool {
        if let Some(cutoff) = self.params.max_hash {
            return hash <= cutoff && self.mins.insert(hash);
        }

        if self.mins.len() < self.capacity {
            return self.mins.insert(hash);
        }

        match self.mins.last() {
            Some(&largest) if hash < largest => {
                if self.mins.insert(hash) {
                    self.mins.pop_last();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Tokenize nucleotide sequence with this sketch's k and molecule type.
    ///
    /// Protein sketches translate the sequence in six frames.
    pub fn add_sequence(&mut self, seq: &[u8]) -> Result<TokenStats> {
        let tokenizer = Tokenizer::new(self.params.ksize, self.params.moltype);
        self.add_tokens(&tokenizer, seq)
    }

    /// Add the k-mers produced by `tokenizer`, which must match this sketch
    pub fn add_tokens(&mut self, tokenizer: &Tokenizer, seq: &[u8]) -> Result<TokenStats> {
        if tokenizer.ksize() != self.params.ksize || tokenizer.moltype() != self.params.moltype {
            return Err(SketchError::incompatible(
                "tokenizer does not match sketch",
                format!("k={} {}", tokenizer.ksize(), tokenizer.moltype()),
                self.params.to_string(),
            ));
        }

        let seed = self.params.seed;
        tokenizer.for_each_kmer(seq, |kmer| {
            self.add_hash(hash_kmer(kmer, seed));
        })
    }

    /// Fail unless `other` has the same comparability parameters
    pub fn check_compatible(&self, other: &MinHashSketch) -> Result<()> {
        if self.params != other.params {
            return Err(SketchError::incompatible(
                "sketch parameters differ",
                self.params.to_string(),
                other.params.to_string(),
            ));
        }
        Ok(())
    }

    /// Merge `other` into this sketch, then re-apply the bounding policy
    pub fn merge(&mut self, other: &MinHashSketch) -> Result<()> {
        self.check_compatible(other)?;

        self.mins.extend(other.mins.iter().copied());
        if self.params.max_hash.is_none() {
            while self.mins.len() > self.capacity {
                self.mins.pop_last();
            }
        }
        Ok(())
    }

    /// Copy holding only the `new_capacity` smallest values
    pub fn downsample(&self, new_capacity: usize) -> Result<MinHashSketch> {
        if new_capacity > self.capacity {
            return Err(SketchError::incompatible(
                format!("cannot downsample to {new_capacity} hashes"),
                format!("capacity={}", self.capacity),
                format!("capacity={new_capacity}"),
            ));
        }

        Ok(Self {
            params: self.params,
            capacity: new_capacity,
            mins: self.mins.iter().take(new_capacity).copied().collect(),
        })
    }
}

/// Serialized form of a sketch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SketchRecord {
    /// K-mer length
    pub ksize: u32,
    /// Molecule type (`dna` or `protein`)
    pub moltype: MoleculeType,
    /// Hash seed
    pub seed: u64,
    /// Scaled-sketch cutoff
    #[serde(default)]
    pub max_hash: Option<u64>,
    /// Capacity
    pub num: usize,
    /// Retained hash values, ascending
    pub mins: Vec<u64>,
}

impl From<MinHashSketch> for SketchRecord {
    fn from(sketch: MinHashSketch) -> Self {
        Self {
            ksize: sketch.params.ksize,
            moltype: sketch.params.moltype,
            seed: sketch.params.seed,
            max_hash: sketch.params.max_hash,
            num: sketch.capacity,
            mins: sketch.mins.into_iter().collect(),
        }
    }
}

impl TryFrom<SketchRecord> for MinHashSketch {
    type Error = SketchError;

    fn try_from(record: SketchRecord) -> Result<Self> {
        let params = SketchParams {
            ksize: record.ksize,
            moltype: record.moltype,
            seed: record.seed,
            max_hash: record.max_hash,
        };
        MinHashSketch::from_parts(params, record.num, record.mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sketch(capacity: usize) -> MinHashSketch {
        MinHashSketch::new(capacity, 21, MoleculeType::Dna, 42)
    }

    #[test]
    fn keeps_the_smallest_values() {
        let mut mh = sketch(3);
        for h in [50, 10, 40, 30, 20, 60] {
            mh.add_hash(h);
        }
        assert_eq!(mh.mins().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn duplicates_do_not_evict() {
        let mut mh = sketch(2);
        assert!(mh.add_hash(5));
        assert!(mh.add_hash(9));
        assert!(!mh.add_hash(5));
        assert_eq!(mh.mins().collect::<Vec<_>>(), vec![5, 9]);
    }

    #[test]
    fn max_hash_filters_and_ignores_capacity() {
        let mut mh = sketch(2).with_max_hash(Some(100));
        for h in [1, 2, 3, 101, 99] {
            mh.add_hash(h);
        }
        assert_eq!(mh.mins().collect::<Vec<_>>(), vec![1, 2, 3, 99]);
    }

    #[test]
    fn merge_requires_matching_parameters() {
        let mut a = sketch(10);
        let b = MinHashSketch::new(10, 31, MoleculeType::Dna, 42);
        let err = a.merge(&b).unwrap_err();
        assert!(matches!(err, SketchError::IncompatibleSketch { .. }));

        let c = MinHashSketch::new(10, 21, MoleculeType::Dna, 7);
        assert!(a.merge(&c).is_err());

        let d = sketch(10).with_max_hash(Some(1000));
        assert!(a.merge(&d).is_err());
    }

    #[test]
    fn merge_rebounds_the_union() {
        let mut a = sketch(3);
        let mut b = sketch(3);
        for h in [1, 5, 9] {
            a.add_hash(h);
        }
        for h in [2, 5, 7] {
            b.add_hash(h);
        }
        a.merge(&b).expect("compatible merge");
        assert_eq!(a.mins().collect::<Vec<_>>(), vec![1, 2, 5]);
    }

    #[test]
    fn downsample_takes_prefix() {
        let mut mh = sketch(5);
        for h in [5, 4, 3, 2, 1] {
            mh.add_hash(h);
        }
        let small = mh.downsample(2).expect("smaller capacity");
        assert_eq!(small.capacity(), 2);
        assert_eq!(small.mins().collect::<Vec<_>>(), vec![1, 2]);
        assert!(mh.downsample(6).is_err());
    }

    #[test]
    fn add_sequence_hashes_canonical_kmers() {
        let mut forward = sketch(100);
        let mut reverse = sketch(100);
        let seq = b"ACGTTGCATGCATGCCGTAGCTAGCTAGGATCGATCGA";
        let rc = crate::sketch::tokenizer::reverse_complement(seq);

        let stats = forward.add_sequence(seq).expect("tokenize forward");
        reverse.add_sequence(&rc).expect("tokenize reverse");

        assert_eq!(stats.kmers, seq.len() - 20);
        assert_eq!(forward, reverse);
    }

    #[test]
    fn tokenizer_must_match_sketch() {
        let mut mh = sketch(10);
        let tokenizer = Tokenizer::new(31, MoleculeType::Dna);
        assert!(mh.add_tokens(&tokenizer, b"ACGT").is_err());
    }

    #[test]
    fn from_parts_rejects_unsorted_or_oversized_mins() {
        let params = sketch(2).params();
        assert!(MinHashSketch::from_parts(params, 2, vec![3, 1]).is_err());
        assert!(MinHashSketch::from_parts(params, 2, vec![1, 1]).is_err());
        assert!(MinHashSketch::from_parts(params, 2, vec![1, 2, 3]).is_err());
        assert!(MinHashSketch::from_parts(params, 2, vec![1, 2]).is_ok());
    }

    #[test]
    fn serde_uses_record_layout() {
        let mut mh = sketch(4);
        mh.add_hash(11);
        mh.add_hash(3);
        let json = serde_json::to_value(&mh).expect("serialize");
        assert_eq!(json["ksize"], 21);
        assert_eq!(json["moltype"], "dna");
        assert_eq!(json["num"], 4);
        assert!(json["max_hash"].is_null());
        assert_eq!(json["mins"], serde_json::json!([3, 11]));

        let back: MinHashSketch = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, mh);
    }

    proptest! {
        #[test]
        fn bounded_after_any_inserts(capacity in 1usize..64, hashes in prop::collection::vec(any::<u64>(), 0..512)) {
            let mut mh = sketch(capacity);
            for &h in &hashes {
                mh.add_hash(h);
            }
            prop_assert!(mh.len() <= capacity);

            let mut expected: Vec<u64> = hashes.clone();
            expected.sort_unstable();
            expected.dedup();
            expected.truncate(capacity);
            prop_assert_eq!(mh.mins().collect::<Vec<_>>(), expected);
        }

        #[test]
        fn bounded_after_merges(
            capacity in 1usize..32,
            left in prop::collection::vec(any::<u64>(), 0..128),
            right in prop::collection::vec(any::<u64>(), 0..128),
        ) {
            let mut a = sketch(capacity);
            let mut b = sketch(capacity);
            left.iter().for_each(|&h| { a.add_hash(h); });
            right.iter().for_each(|&h| { b.add_hash(h); });
            a.merge(&b).expect("same parameters");
            prop_assert!(a.len() <= capacity);
        }

        #[test]
        fn scaled_values_never_exceed_cutoff(cutoff in any::<u64>(), hashes in prop::collection::vec(any::<u64>(), 0..256)) {
            let mut mh = sketch(1).with_max_hash(Some(cutoff));
            for &h in &hashes {
                mh.add_hash(h);
            }
            prop_assert!(mh.mins().all(|h| h <= cutoff));
        }
    }
}
