//! Signatures: named bundles of sketches for one sequence source.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::errors::{Result, SketchError};

use super::config::{ComputeConfig, KmerPolicy};
use super::minhash::{MinHashSketch, SketchRecord};
use super::tokenizer::{TokenStats, Tokenizer};
use super::types::SketchKey;

/// Named set of sketches, at most one per `(ksize, moltype)`.
///
/// Immutable once built; equality is decided by the checksum over the name,
/// filename and every sketch payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SignatureRecord", into = "SignatureRecord")]
pub struct Signature {
    name: String,
    filename: String,
    sketches: IndexMap<SketchKey, MinHashSketch>,
    checksum: String,
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for Signature {}

impl Signature {
    /// Bundle already-built sketches; keys must be unique
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        sketches: impl IntoIterator<Item = MinHashSketch>,
    ) -> Result<Self> {
        let mut map = IndexMap::new();
        for sketch in sketches {
            let key = sketch.key();
            if map.insert(key, sketch).is_some() {
                return Err(SketchError::malformed(format!(
                    "duplicate sketch for {key}"
                )));
            }
        }
        Ok(Self::from_map(name.into(), filename.into(), map))
    }

    fn from_map(name: String, filename: String, sketches: IndexMap<SketchKey, MinHashSketch>) -> Self {
        let checksum = compute_checksum(&name, &filename, sketches.values());
        Self {
            name,
            filename,
            sketches,
            checksum,
        }
    }

    /// Build every configured sketch from one sequence
    pub fn build(
        name: impl Into<String>,
        filename: impl Into<String>,
        sequence: &[u8],
        config: &ComputeConfig,
        policy: &KmerPolicy,
    ) -> Result<Self> {
        let mut builder = SignatureBuilder::new(name, filename, config, policy)?;
        builder.add_sequence(sequence)?;
        Ok(builder.finish())
    }

    /// Source name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source file
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Hex SHA-256 of the signature content
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Sketch for a `(ksize, moltype)` key
    pub fn sketch(&self, key: &SketchKey) -> Option<&MinHashSketch> {
        self.sketches.get(key)
    }

    /// All sketches in insertion order
    pub fn sketches(&self) -> impl Iterator<Item = &MinHashSketch> {
        self.sketches.values()
    }

    /// Keys of all sketches in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &SketchKey> {
        self.sketches.keys()
    }

    /// Number of sketches
    pub fn len(&self) -> usize {
        self.sketches.len()
    }

    /// Whether the signature holds no sketch
    pub fn is_empty(&self) -> bool {
        self.sketches.is_empty()
    }

    /// One single-sketch signature per key, sharing name and filename
    pub fn split(&self) -> Vec<Signature> {
        self.sketches
            .iter()
            .map(|(key, sketch)| {
                let mut map = IndexMap::with_capacity(1);
                map.insert(*key, sketch.clone());
                Self::from_map(self.name.clone(), self.filename.clone(), map)
            })
            .collect()
    }
}

fn compute_checksum<'a>(
    name: &str,
    filename: &str,
    sketches: impl Iterator<Item = &'a MinHashSketch>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update([0u8]);
    hasher.update(filename.as_bytes());
    hasher.update([0u8]);

    for sketch in sketches {
        hasher.update(sketch.ksize().to_le_bytes());
        hasher.update(sketch.moltype().as_str().as_bytes());
        hasher.update(sketch.seed().to_le_bytes());
        match sketch.max_hash() {
            Some(max_hash) => {
                hasher.update([1u8]);
                hasher.update(max_hash.to_le_bytes());
            }
            None => hasher.update([0u8]),
        }
        hasher.update((sketch.capacity() as u64).to_le_bytes());
        hasher.update((sketch.len() as u64).to_le_bytes());
        for hash in sketch.mins() {
            hasher.update(hash.to_le_bytes());
        }
    }

    format!("{:x}", hasher.finalize())
}

/// Streaming construction of a signature from the records of one file.
///
/// Owned by a single thread; every sequence is fed through every sketch.
#[derive(Debug)]
pub struct SignatureBuilder {
    name: String,
    filename: String,
    sketches: Vec<(Tokenizer, MinHashSketch)>,
    stats: TokenStats,
    sequences: usize,
}

impl SignatureBuilder {
    /// Validate `config` and prepare one empty sketch per requested key
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        config: &ComputeConfig,
        policy: &KmerPolicy,
    ) -> Result<Self> {
        config.validate(policy)?;

        let sketches = config
            .keys()
            .into_iter()
            .map(|key| {
                let tokenizer = Tokenizer::new(key.ksize, key.moltype)
                    .with_protein_input(config.input_is_protein)
                    .with_ambiguous_bases(policy.ambiguous_bases);
                let sketch =
                    MinHashSketch::new(config.num_hashes, key.ksize, key.moltype, config.seed)
                        .with_max_hash(config.max_hash);
                (tokenizer, sketch)
            })
            .collect();

        Ok(Self {
            name: name.into(),
            filename: filename.into(),
            sketches,
            stats: TokenStats::default(),
            sequences: 0,
        })
    }

    /// Replace the signature name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Feed one sequence through every sketch
    pub fn add_sequence(&mut self, sequence: &[u8]) -> Result<TokenStats> {
        let mut stats = TokenStats::default();
        for (tokenizer, sketch) in &mut self.sketches {
            stats.absorb(sketch.add_tokens(tokenizer, sequence)?);
        }
        self.stats.absorb(stats);
        self.sequences += 1;
        Ok(stats)
    }

    /// Sequences consumed so far
    pub fn sequences(&self) -> usize {
        self.sequences
    }

    /// Totals over every sequence and sketch
    pub fn stats(&self) -> TokenStats {
        self.stats
    }

    /// Seal the signature
    pub fn finish(self) -> Signature {
        if self.stats.skipped_windows > 0 {
            debug!(
                "{}: skipped {} windows containing non-ACGT characters",
                self.filename, self.stats.skipped_windows
            );
        }

        let map = self
            .sketches
            .into_iter()
            .map(|(_, sketch)| (sketch.key(), sketch))
            .collect();
        Signature::from_map(self.name, self.filename, map)
    }
}

/// Serialized form of a signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Source name
    pub name: String,
    /// Source file
    #[serde(default)]
    pub filename: String,
    /// Sketches, one per `(ksize, moltype)`
    pub sketches: Vec<SketchRecord>,
    /// Hex SHA-256 of the content; recomputed when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl From<Signature> for SignatureRecord {
    fn from(signature: Signature) -> Self {
        Self {
            name: signature.name,
            filename: signature.filename,
            sketches: signature.sketches.into_values().map(Into::into).collect(),
            checksum: Some(signature.checksum),
        }
    }
}

impl TryFrom<SignatureRecord> for Signature {
    type Error = SketchError;

    fn try_from(record: SignatureRecord) -> Result<Self> {
        let sketches = record
            .sketches
            .into_iter()
            .map(MinHashSketch::try_from)
            .collect::<Result<Vec<_>>>()?;
        let signature = Signature::new(record.name, record.filename, sketches)?;

        if let Some(stored) = record.checksum {
            if stored != signature.checksum {
                return Err(SketchError::malformed(format!(
                    "checksum mismatch for signature '{}'",
                    signature.name
                )));
            }
        }

        Ok(signature)
    }
}
