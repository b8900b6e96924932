//! CLI Argument Structures
//!
//! This module contains all CLI argument definitions and command structures
//! used by the seqsketch binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// MinHash sketches of DNA and protein sequence collections
#[derive(Parser)]
#[command(name = "seqsketch")]
#[command(version = VERSION)]
#[command(about = "Compute, compare and search MinHash signatures of sequence files")]
#[command(long_about = "
Build compact MinHash signatures from FASTA/FASTQ files (plain or gzipped) and
use them to estimate Jaccard similarity between genomes, metagenomes or proteomes.

Common Usage:

  # Sketch a genome at k=21 and k=31
  seqsketch compute -k 21,31 genome.fa

  # All-pairs similarity matrix, saved for plotting
  seqsketch compare *.sig -o cmp

  # Rank a collection against a query
  seqsketch search query.sig 'collection/*.sig' --threshold 0.1

  # Dendrogram and heatmap through an external renderer
  seqsketch plot cmp --labels
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to .seqsketch.yml in the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute signatures for sequence files
    Compute(ComputeArgs),

    /// Compute the similarity matrix of a set of signatures
    Compare(CompareArgs),

    /// Search a collection of signatures for matches to a query
    Search(SearchArgs),

    /// Render a dendrogram and heatmap from a saved matrix
    Plot(PlotArgs),

    /// Import hash dumps from other MinHash tools
    #[command(name = "import-csv")]
    ImportCsv(ImportCsvArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Initialize a configuration file with defaults
    #[command(name = "init-config")]
    InitConfig(InitConfigArgs),

    /// Validate a seqsketch configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

/// Molecule type toggles shared by compute
#[derive(Args, Debug, Default)]
pub struct MoleculeArgs {
    /// Build protein sketches
    #[arg(long, overrides_with = "no_protein")]
    pub protein: bool,

    /// Do not build protein sketches
    #[arg(long, overrides_with = "protein")]
    pub no_protein: bool,

    /// Build DNA sketches
    #[arg(long, overrides_with = "no_dna")]
    pub dna: bool,

    /// Do not build DNA sketches
    #[arg(long, overrides_with = "dna")]
    pub no_dna: bool,

    /// Input sequences are amino acids (implies --protein --no-dna)
    #[arg(long)]
    pub input_is_protein: bool,
}

impl MoleculeArgs {
    /// Explicit protein choice, if any
    pub fn protein(&self) -> Option<bool> {
        toggle(self.protein, self.no_protein)
    }

    /// Explicit DNA choice, if any
    pub fn dna(&self) -> Option<bool> {
        toggle(self.dna, self.no_dna)
    }
}

fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Args, Debug)]
pub struct ComputeArgs {
    /// Sequence files (FASTA/FASTQ, optionally gzipped)
    #[arg(required = true)]
    pub sequences: Vec<PathBuf>,

    /// Comma-separated k-mer sizes
    #[arg(short = 'k', long = "ksizes", value_delimiter = ',')]
    pub ksizes: Option<Vec<u32>>,

    /// Number of hashes to keep per sketch
    #[arg(short = 'n', long)]
    pub num_hashes: Option<usize>,

    /// Hash seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep every hash at or below this value instead of a fixed number
    #[arg(long)]
    pub max_hash: Option<u64>,

    #[command(flatten)]
    pub molecules: MoleculeArgs,

    /// Name each signature after the first record instead of the file
    #[arg(long)]
    pub name_from_first: bool,

    /// Write every signature to this file instead of <basename>.sig
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Suppress the progress bar and summary
    #[arg(short, long)]
    pub quiet: bool,
}

/// Sketch selection shared by compare and search
#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    /// K-mer size of the sketches to use
    #[arg(short = 'k', long)]
    pub ksize: Option<u32>,

    /// Use protein sketches instead of DNA
    #[arg(long)]
    pub protein: bool,

    /// Skip pairs with different k-mer sizes instead of failing
    #[arg(long)]
    pub ignore_ksize: bool,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Signature files or glob patterns
    #[arg(required = true)]
    pub signatures: Vec<String>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Save the matrix to this file (labels go to <output>.labels.txt)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not print the matrix table
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Signature file holding the query (every compatible record is searched)
    pub query: PathBuf,

    /// Signature files or glob patterns to search
    #[arg(required = true)]
    pub targets: Vec<String>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Minimum similarity to report
    #[arg(long)]
    pub threshold: Option<f64>,
}

#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Matrix file written by `compare -o`
    pub matrix: PathBuf,

    /// Render PDF instead of PNG
    #[arg(long)]
    pub pdf: bool,

    /// Show labels on the dendrogram and heatmap
    #[arg(long)]
    pub labels: bool,
}

#[derive(Args, Debug)]
pub struct ImportCsvArgs {
    /// CSV file with rows of hash_function,seed,ksize,name,hashes
    pub csv: PathBuf,

    /// Output signature file (defaults to <basename>.sig)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Output configuration file name
    #[arg(short, long, default_value = ".seqsketch.yml")]
    pub output: PathBuf,

    /// Overwrite existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ValidateConfigArgs {
    /// Path to configuration file to validate
    #[arg(short, long = "file", required = true)]
    pub file: PathBuf,

    /// Show detailed configuration breakdown
    #[arg(long)]
    pub detailed: bool,
}
