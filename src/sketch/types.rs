//! Shared value types for sketches: molecule type and sketch keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::SketchError;

/// Molecule type of a sketch; decides the tokenizer strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoleculeType {
    /// Nucleotide k-mers, canonicalized against the reverse complement
    Dna,
    /// Amino-acid k-mers, used as-is
    Protein,
}

impl MoleculeType {
    /// Lowercase name used in records and on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dna => "dna",
            Self::Protein => "protein",
        }
    }

    /// Check the molecule type by name (`"dna"` / `"protein"`, case-insensitive)
    pub fn is_molecule_type(self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoleculeType {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dna" => Ok(Self::Dna),
            "protein" => Ok(Self::Protein),
            other => Err(SketchError::config_field(
                format!("unknown molecule type '{other}' (expected dna or protein)"),
                "moltype",
            )),
        }
    }
}

/// Lookup key of a sketch inside a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SketchKey {
    /// K-mer length
    pub ksize: u32,
    /// Molecule type
    pub moltype: MoleculeType,
}

impl SketchKey {
    /// Create a new key
    pub fn new(ksize: u32, moltype: MoleculeType) -> Self {
        Self { ksize, moltype }
    }
}

impl fmt::Display for SketchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k={} {}", self.ksize, self.moltype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moltype_parses_case_insensitively() {
        assert_eq!("DNA".parse::<MoleculeType>().unwrap(), MoleculeType::Dna);
        assert_eq!("protein".parse::<MoleculeType>().unwrap(), MoleculeType::Protein);
        assert!("rna".parse::<MoleculeType>().is_err());
    }

    #[test]
    fn moltype_serializes_lowercase() {
        let json = serde_json::to_string(&MoleculeType::Protein).unwrap();
        assert_eq!(json, "\"protein\"");
        assert!(MoleculeType::Protein.is_molecule_type("Protein"));
        assert!(!MoleculeType::Dna.is_molecule_type("protein"));
    }

    #[test]
    fn keys_order_by_ksize_then_moltype() {
        let mut keys = vec![
            SketchKey::new(31, MoleculeType::Protein),
            SketchKey::new(21, MoleculeType::Protein),
            SketchKey::new(31, MoleculeType::Dna),
        ];
        keys.sort();
        assert_eq!(keys[0], SketchKey::new(21, MoleculeType::Protein));
        assert_eq!(keys[1], SketchKey::new(31, MoleculeType::Dna));
        assert_eq!(format!("{}", keys[2]), "k=31 protein");
    }
}
