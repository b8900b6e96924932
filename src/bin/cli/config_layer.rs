//! Configuration Layer Management
//!
//! Defaults, then the discovered YAML file, then command-line flags. Flags
//! only override what they were explicitly given.

use std::path::Path;

use anyhow::Context;
use seqsketch_rs::core::config::{ComparisonConfig, ComputeConfig, SketchConfig};
use seqsketch_rs::MoleculeType;

use crate::cli::args::{ComputeArgs, SelectionArgs};

/// Trait for merging configuration layers
pub trait ConfigMerge<T> {
    /// Merge another configuration into this one, with the other taking priority
    fn merge_with(&mut self, other: T);
}

impl ConfigMerge<&ComputeArgs> for ComputeConfig {
    fn merge_with(&mut self, args: &ComputeArgs) {
        if let Some(ksizes) = &args.ksizes {
            self.ksizes = ksizes.clone();
        }
        if let Some(num_hashes) = args.num_hashes {
            self.num_hashes = num_hashes;
        }
        if let Some(seed) = args.seed {
            self.seed = seed;
        }
        if args.max_hash.is_some() {
            self.max_hash = args.max_hash;
        }
        if args.name_from_first {
            self.name_from_first = true;
        }

        let molecules = &args.molecules;
        if molecules.input_is_protein {
            self.input_is_protein = true;
            self.protein = true;
            self.dna = false;
        }
        if let Some(protein) = molecules.protein() {
            self.protein = protein;
        }
        if let Some(dna) = molecules.dna() {
            self.dna = dna;
        }
    }
}

impl ConfigMerge<&SelectionArgs> for ComparisonConfig {
    fn merge_with(&mut self, args: &SelectionArgs) {
        if let Some(ksize) = args.ksize {
            self.ksize = ksize;
        }
        if args.protein {
            self.moltype = MoleculeType::Protein;
        }
        if args.ignore_ksize {
            self.ignore_ksize = true;
        }
    }
}

/// Load the configuration file named on the command line, or the one
/// discovered from the working directory, or defaults.
pub fn load_configuration(explicit: Option<&Path>) -> anyhow::Result<SketchConfig> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let config = SketchConfig::load(explicit, &cwd).map_err(|e| match explicit {
        Some(path) => anyhow::anyhow!(
            "Failed to load configuration from {}: {}",
            path.display(),
            e
        ),
        None => anyhow::anyhow!("Failed to load configuration: {}", e),
    })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Commands};
    use clap::Parser;

    fn compute_args(argv: &[&str]) -> ComputeArgs {
        let mut full = vec!["seqsketch", "compute"];
        full.extend_from_slice(argv);
        full.push("in.fa");
        match Cli::parse_from(full).command {
            Commands::Compute(args) => args,
            _ => panic!("expected compute"),
        }
    }

    #[test]
    fn flags_override_only_what_they_name() {
        let mut config = ComputeConfig {
            num_hashes: 1000,
            ..ComputeConfig::default()
        };
        config.merge_with(&compute_args(&["-k", "21"]));
        assert_eq!(config.ksizes, vec![21]);
        assert_eq!(config.num_hashes, 1000);
        assert!(config.dna);
        assert!(!config.protein);
    }

    #[test]
    fn input_is_protein_switches_molecules() {
        let mut config = ComputeConfig::default();
        config.merge_with(&compute_args(&["--input-is-protein"]));
        assert!(config.input_is_protein);
        assert!(config.protein);
        assert!(!config.dna);
    }

    #[test]
    fn explicit_dna_with_protein_input_stays_contradictory() {
        let mut config = ComputeConfig::default();
        config.merge_with(&compute_args(&["--input-is-protein", "--dna"]));
        assert!(config.dna);
        assert!(config
            .validate(&seqsketch_rs::core::config::KmerPolicy::default())
            .is_err());
    }

    #[test]
    fn selection_sets_protein_and_ksize() {
        let mut config = ComparisonConfig::default();
        config.merge_with(&SelectionArgs {
            ksize: Some(21),
            protein: true,
            ignore_ksize: false,
        });
        assert_eq!(config.ksize, 21);
        assert_eq!(config.moltype, MoleculeType::Protein);
        assert!(!config.ignore_ksize);
    }
}
