//! # seqsketch-rs: MinHash Sketches for Biological Sequences
//!
//! Compact probabilistic fingerprints of DNA and protein k-mer content, used
//! to estimate Jaccard similarity between very large sequence collections
//! without comparing their full k-mer sets.
//!
//! - **Tokenizer**: canonical DNA k-mers, verbatim protein k-mers, six-frame
//!   translation of nucleotide input
//! - **MinHash sketches**: bounded bottom-n sketches with O(log n) insertion
//! - **Signatures**: named bundles of sketches with a content checksum
//! - **Comparison**: truncated-union Jaccard estimates, all-pairs matrices
//!   and ranked catalog search
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        API Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Core         │  Sketch             │  I/O                  │
//! │ • Config      │ • Tokenizer/Hashing │ • Signature files     │
//! │ • Errors      │ • MinHash/Signature │ • Sequence files      │
//! │               │ • Catalog/Compare   │ • CSV import          │
//! │               │ • Search            │ • Similarity matrices │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seqsketch_rs::{SketchConfig, SketchEngine, SketchKey, MoleculeType};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = SketchEngine::new(SketchConfig::default())?;
//!     let computed = engine.compute_file("genome.fa")?;
//!     println!("{} sketches", computed.signature.len());
//!
//!     let load = engine.load_catalog(&["signatures/*.sig"])?;
//!     let matrix = engine.compare(&load.catalog, SketchKey::new(31, MoleculeType::Dna))?;
//!     println!("{:?}", matrix.values);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Core infrastructure
pub mod core {
    //! Configuration and error handling.

    pub mod config;
    pub mod errors;
}

// Sketching, comparison and search
pub mod sketch;

// Storage formats
pub mod io {
    //! Signature files, sequence files, CSV import and matrix files.

    pub mod csv_import;
    pub mod matrix;
    pub mod persistence;
    pub mod sequences;
}

// Public API and engine interface
pub mod api {
    //! High-level engine interface.

    pub mod engine;
}

// Re-export primary types for convenience
pub use api::engine::{ComputedFile, QueryResult, SketchEngine};
pub use core::config::SketchConfig;
pub use core::errors::{Result, SketchError};
pub use sketch::{
    Comparator, MinHashSketch, MoleculeType, SearchEngine, SearchParams, Signature,
    SignatureCatalog, SimilarityMatrix, SketchKey,
};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
