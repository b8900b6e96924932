//! Configuration types for sketch construction and comparison.
//!
//! These structures hold the user-facing knobs for computing signatures
//! (k-mer sizes, molecule types, sketch size, seed) and for comparing them
//! (k-mer size, molecule type, score threshold), plus the tokenizer policy
//! for k-mer size limits and ambiguous bases.

use serde::{Deserialize, Serialize};

use crate::core::config::{validate_positive_u64, validate_unit_range};
use crate::core::errors::{Result, SketchError};

use super::hashing::DEFAULT_SEED;
use super::types::{MoleculeType, SketchKey};

/// What to do with DNA windows that contain characters outside `ACGT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguousBasePolicy {
    /// Drop the window and count it as skipped
    #[default]
    Skip,
    /// Reject the whole sequence as malformed input
    Reject,
}

/// Tokenizer limits on k-mer sizes and handling of ambiguous bases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmerPolicy {
    /// Smallest k accepted for DNA sketches
    #[serde(default = "KmerPolicy::default_min_ksize")]
    pub min_dna_ksize: u32,

    /// Smallest k accepted for protein sketches
    #[serde(default = "KmerPolicy::default_min_ksize")]
    pub min_protein_ksize: u32,

    /// Largest k accepted for any sketch
    #[serde(default = "KmerPolicy::default_max_ksize")]
    pub max_ksize: u32,

    /// Handling of windows containing non-ACGT characters
    #[serde(default)]
    pub ambiguous_bases: AmbiguousBasePolicy,
}

impl Default for KmerPolicy {
    fn default() -> Self {
        Self {
            min_dna_ksize: Self::default_min_ksize(),
            min_protein_ksize: Self::default_min_ksize(),
            max_ksize: Self::default_max_ksize(),
            ambiguous_bases: AmbiguousBasePolicy::Skip,
        }
    }
}

impl KmerPolicy {
    const fn default_min_ksize() -> u32 {
        1
    }

    const fn default_max_ksize() -> u32 {
        256
    }

    /// Validate the policy itself
    pub fn validate(&self) -> Result<()> {
        if self.min_dna_ksize == 0 || self.min_protein_ksize == 0 {
            return Err(SketchError::config_field(
                "minimum k-mer sizes must be greater than 0",
                "tokenizer.min_dna_ksize",
            ));
        }
        if self.min_dna_ksize > self.max_ksize || self.min_protein_ksize > self.max_ksize {
            return Err(SketchError::config_field(
                "minimum k-mer sizes must not exceed max_ksize",
                "tokenizer.max_ksize",
            ));
        }
        Ok(())
    }

    /// Check that `ksize` is valid for `moltype`
    pub fn check_ksize(&self, ksize: u32, moltype: MoleculeType) -> Result<()> {
        let min = match moltype {
            MoleculeType::Dna => self.min_dna_ksize,
            MoleculeType::Protein => self.min_protein_ksize,
        };
        if ksize < min || ksize > self.max_ksize {
            return Err(SketchError::config_field(
                format!(
                    "k={ksize} is outside the valid range {min}..={} for {moltype}",
                    self.max_ksize
                ),
                "compute.ksizes",
            ));
        }
        Ok(())
    }
}

/// Parameters for computing signatures from sequence files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeConfig {
    /// K-mer sizes to sketch
    #[serde(default = "ComputeConfig::default_ksizes")]
    pub ksizes: Vec<u32>,

    /// Sketch capacity (number of retained hashes)
    #[serde(default = "ComputeConfig::default_num_hashes")]
    pub num_hashes: usize,

    /// Hash seed
    #[serde(default = "ComputeConfig::default_seed")]
    pub seed: u64,

    /// Keep only hashes <= max_hash (scaled sketches); capacity becomes advisory
    #[serde(default)]
    pub max_hash: Option<u64>,

    /// Build DNA sketches
    #[serde(default = "ComputeConfig::default_true")]
    pub dna: bool,

    /// Build protein sketches
    #[serde(default)]
    pub protein: bool,

    /// Input files already contain amino-acid sequence
    #[serde(default)]
    pub input_is_protein: bool,

    /// Name signatures after the first record instead of the file
    #[serde(default)]
    pub name_from_first: bool,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            ksizes: Self::default_ksizes(),
            num_hashes: Self::default_num_hashes(),
            seed: DEFAULT_SEED,
            max_hash: None,
            dna: true,
            protein: false,
            input_is_protein: false,
            name_from_first: false,
        }
    }
}

impl ComputeConfig {
    fn default_ksizes() -> Vec<u32> {
        vec![31]
    }

    const fn default_num_hashes() -> usize {
        500
    }

    const fn default_seed() -> u64 {
        DEFAULT_SEED
    }

    const fn default_true() -> bool {
        true
    }

    /// Requested molecule types in a fixed order (DNA first)
    pub fn moltypes(&self) -> Vec<MoleculeType> {
        let mut moltypes = Vec::with_capacity(2);
        if self.dna {
            moltypes.push(MoleculeType::Dna);
        }
        if self.protein {
            moltypes.push(MoleculeType::Protein);
        }
        moltypes
    }

    /// Every requested `(ksize, moltype)` combination, ksizes in request order
    pub fn keys(&self) -> Vec<SketchKey> {
        let mut ksizes = self.ksizes.clone();
        let mut seen = std::collections::HashSet::new();
        ksizes.retain(|k| seen.insert(*k));

        let moltypes = self.moltypes();
        ksizes
            .iter()
            .flat_map(|&k| moltypes.iter().map(move |&m| SketchKey::new(k, m)))
            .collect()
    }

    /// Validate against the tokenizer policy
    pub fn validate(&self, policy: &KmerPolicy) -> Result<()> {
        if !self.dna && !self.protein {
            return Err(SketchError::config_field(
                "nothing to compute: both DNA and protein sketches are disabled",
                "compute.moltypes",
            ));
        }

        if self.input_is_protein && self.dna {
            return Err(SketchError::config_field(
                "DNA sketches cannot be built from protein input",
                "compute.input_is_protein",
            ));
        }

        if self.ksizes.is_empty() {
            return Err(SketchError::config_field(
                "at least one k-mer size is required",
                "compute.ksizes",
            ));
        }

        for moltype in self.moltypes() {
            for &ksize in &self.ksizes {
                policy.check_ksize(ksize, moltype)?;
            }
        }

        match self.max_hash {
            Some(max_hash) => validate_positive_u64(max_hash, "compute.max_hash")?,
            None => {
                if self.num_hashes == 0 {
                    return Err(SketchError::config_field(
                        "num_hashes must be greater than 0 unless max_hash is set",
                        "compute.num_hashes",
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Parameters for comparing and searching signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// K-mer size of the sketches to compare
    #[serde(default = "ComparisonConfig::default_ksize")]
    pub ksize: u32,

    /// Molecule type of the sketches to compare
    #[serde(default = "ComparisonConfig::default_moltype")]
    pub moltype: MoleculeType,

    /// Minimum score reported by search
    #[serde(default = "ComparisonConfig::default_threshold")]
    pub threshold: f64,

    /// Skip pairs with mismatched k instead of failing
    #[serde(default)]
    pub ignore_ksize: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            ksize: Self::default_ksize(),
            moltype: Self::default_moltype(),
            threshold: Self::default_threshold(),
            ignore_ksize: false,
        }
    }
}

impl ComparisonConfig {
    const fn default_ksize() -> u32 {
        31
    }

    const fn default_moltype() -> MoleculeType {
        MoleculeType::Dna
    }

    const fn default_threshold() -> f64 {
        0.08
    }

    /// Key of the sketches this configuration selects
    pub fn key(&self) -> SketchKey {
        SketchKey::new(self.ksize, self.moltype)
    }

    /// Validate comparison configuration
    pub fn validate(&self) -> Result<()> {
        if self.ksize == 0 {
            return Err(SketchError::config_field(
                "ksize must be greater than 0",
                "comparison.ksize",
            ));
        }
        validate_unit_range(self.threshold, "comparison.threshold")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_tool() {
        let config = ComputeConfig::default();
        assert_eq!(config.ksizes, vec![31]);
        assert_eq!(config.num_hashes, 500);
        assert_eq!(config.seed, 42);
        assert_eq!(config.moltypes(), vec![MoleculeType::Dna]);
        assert!(config.validate(&KmerPolicy::default()).is_ok());

        let comparison = ComparisonConfig::default();
        assert_eq!(comparison.key(), SketchKey::new(31, MoleculeType::Dna));
        assert!((comparison.threshold - 0.08).abs() < f64::EPSILON);
    }

    #[test]
    fn no_moltypes_is_a_configuration_error() {
        let config = ComputeConfig {
            dna: false,
            protein: false,
            ..ComputeConfig::default()
        };
        let err = config.validate(&KmerPolicy::default()).unwrap_err();
        assert!(matches!(err, SketchError::Config { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn protein_input_forbids_dna() {
        let config = ComputeConfig {
            input_is_protein: true,
            protein: true,
            ..ComputeConfig::default()
        };
        assert!(config.validate(&KmerPolicy::default()).is_err());

        let config = ComputeConfig {
            dna: false,
            ..config
        };
        assert!(config.validate(&KmerPolicy::default()).is_ok());
    }

    #[test]
    fn keys_cover_every_combination_once() {
        let config = ComputeConfig {
            ksizes: vec![21, 31, 21],
            protein: true,
            ..ComputeConfig::default()
        };
        let keys = config.keys();
        assert_eq!(keys.len(), 4);
        assert_eq!(keys[0], SketchKey::new(21, MoleculeType::Dna));
        assert_eq!(keys[1], SketchKey::new(21, MoleculeType::Protein));
        assert_eq!(keys[3], SketchKey::new(31, MoleculeType::Protein));
    }

    #[test]
    fn ksize_policy_is_per_moltype() {
        let policy = KmerPolicy {
            min_dna_ksize: 11,
            min_protein_ksize: 3,
            ..KmerPolicy::default()
        };
        assert!(policy.check_ksize(7, MoleculeType::Dna).is_err());
        assert!(policy.check_ksize(7, MoleculeType::Protein).is_ok());
        assert!(policy.check_ksize(300, MoleculeType::Protein).is_err());
    }

    #[test]
    fn zero_capacity_needs_max_hash() {
        let mut config = ComputeConfig {
            num_hashes: 0,
            ..ComputeConfig::default()
        };
        assert!(config.validate(&KmerPolicy::default()).is_err());
        config.max_hash = Some(u64::MAX / 1000);
        assert!(config.validate(&KmerPolicy::default()).is_ok());
    }

    #[test]
    fn threshold_is_bounded() {
        let config = ComparisonConfig {
            threshold: 1.5,
            ..ComparisonConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
