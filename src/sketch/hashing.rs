//! Seeded 64-bit k-mer hashing.

use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Name recorded for the hash function in imported and exported data.
pub const HASH_FUNCTION: &str = "xxh3_64";

/// Hash a k-mer with the given seed.
///
/// Deterministic across runs and platforms; the value depends only on the
/// k-mer bytes and the seed.
#[inline]
pub fn hash_kmer(kmer: &[u8], seed: u64) -> u64 {
    xxh3_64_with_seed(kmer, seed)
}

/// Whether `name` refers to the hash function used by this crate
pub fn is_supported_hash_function(name: &str) -> bool {
    let normalized = name.trim().to_ascii_lowercase().replace(['-', '_'], "");
    normalized == "xxh364" || normalized == "xxh3"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_deterministic() {
        assert_eq!(hash_kmer(b"ACGTACGT", 42), hash_kmer(b"ACGTACGT", 42));
    }

    #[test]
    fn seed_changes_the_hash() {
        assert_ne!(hash_kmer(b"ACGTACGT", 42), hash_kmer(b"ACGTACGT", 43));
    }

    #[test]
    fn different_kmers_hash_differently() {
        assert_ne!(hash_kmer(b"ACGTACGT", 42), hash_kmer(b"ACGTACGA", 42));
    }

    #[test]
    fn hash_function_names() {
        assert!(is_supported_hash_function("xxh3_64"));
        assert!(is_supported_hash_function("XXH3-64"));
        assert!(!is_supported_hash_function("murmur64"));
    }
}
