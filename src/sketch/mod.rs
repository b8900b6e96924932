//! MinHash sketching of DNA and protein k-mer content.
//!
//! Data flows from sequence text through the [`Tokenizer`] and the seeded
//! hash into bounded [`MinHashSketch`]es, which are bundled into
//! [`Signature`]s, collected in a [`SignatureCatalog`] and compared by the
//! [`Comparator`] and [`SearchEngine`].

pub mod catalog;
pub mod comparison;
pub mod config;
pub mod hashing;
pub mod metrics;
pub mod minhash;
pub mod search;
pub mod signature;
pub mod tokenizer;
pub mod types;

pub use catalog::SignatureCatalog;
pub use comparison::{
    truncated_jaccard, CatalogEntry, Comparator, ExcludedEntry, KsizePolicy, Similarity,
    SimilarityMatrix,
};
pub use config::{AmbiguousBasePolicy, ComparisonConfig, ComputeConfig, KmerPolicy};
pub use hashing::{hash_kmer, DEFAULT_SEED, HASH_FUNCTION};
pub use metrics::SketchMetrics;
pub use minhash::{MinHashSketch, SketchParams, SketchRecord};
pub use search::{SearchEngine, SearchHit, SearchParams};
pub use signature::{Signature, SignatureBuilder, SignatureRecord};
pub use tokenizer::{KmerStrategy, Kmers, TokenStats, Tokenizer};
pub use types::{MoleculeType, SketchKey};
