//! End-to-end library tests: sketch, persist, load, compare and search.

use approx::assert_relative_eq;
use seqsketch_rs::core::config::{ComputeConfig, KmerPolicy};
use seqsketch_rs::io::persistence::{load_catalog, save_signatures};
use seqsketch_rs::sketch::truncated_jaccard;
use seqsketch_rs::{
    Comparator, MinHashSketch, MoleculeType, SearchEngine, SearchParams, Signature, SketchKey,
};
use tempfile::tempdir;

fn random_dna(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            b"ACGT"[(state % 4) as usize]
        })
        .collect()
}

fn build(name: &str, seq: &[u8]) -> Signature {
    let config = ComputeConfig {
        ksizes: vec![21, 31],
        ..ComputeConfig::default()
    };
    Signature::build(name, format!("{name}.fa"), seq, &config, &KmerPolicy::default())
        .expect("signature")
}

#[test]
fn strands_sketch_identically() {
    let forward = random_dna(3, 1500);
    let reverse = seqsketch_rs::sketch::tokenizer::reverse_complement(&forward);

    let a = build("forward", &forward);
    let b = build("reverse", &reverse);
    let key = SketchKey::new(31, MoleculeType::Dna);
    let (a, b) = (a.sketch(&key).unwrap(), b.sketch(&key).unwrap());
    assert_relative_eq!(truncated_jaccard(a, b).value, 1.0);
    assert!(a.mins().eq(b.mins()));
}

#[test]
fn saved_catalog_supports_matrix_and_search() {
    let dir = tempdir().unwrap();
    let genome = random_dna(11, 3000);
    let mut half = genome[..1500].to_vec();
    half.extend(random_dna(12, 1500));
    let unrelated = random_dna(13, 3000);

    let signatures = [
        build("genome", &genome),
        build("half", &half),
        build("unrelated", &unrelated),
    ];
    let mut paths = Vec::new();
    for signature in &signatures {
        let path = dir.path().join(format!("{}.sig", signature.name()));
        save_signatures(&path, &signature.split()).unwrap();
        paths.push(path);
    }

    let load = load_catalog(&paths);
    assert!(load.failures.is_empty());
    // one record per sketch
    assert_eq!(load.catalog.len(), 6);

    let key = SketchKey::new(31, MoleculeType::Dna);
    let matrix = Comparator::new().matrix(&load.catalog, key).unwrap();
    assert_eq!(matrix.labels, vec!["genome", "half", "unrelated"]);
    assert_relative_eq!(matrix.get(0, 0).unwrap(), 1.0);
    let partial = matrix.get(0, 1).unwrap();
    assert!(partial > 0.15 && partial < 0.6, "partial overlap {partial}");
    assert!(matrix.get(0, 2).unwrap() < 0.05);
    assert_eq!(matrix.excluded.len(), 3);

    let engine = SearchEngine::new(&load.catalog);
    let params = SearchParams {
        ksize: 31,
        moltype: MoleculeType::Dna,
        threshold: 0.1,
    };
    let hits = engine.search(&signatures[0], &params).unwrap();
    let names: Vec<_> = hits.iter().map(|hit| hit.name()).collect();
    assert_eq!(names, vec!["genome", "half"]);
}

#[test]
fn downsampled_sketches_still_compare() {
    let seq = random_dna(21, 4000);
    let mut large = MinHashSketch::new(1000, 21, MoleculeType::Dna, 42);
    large.add_sequence(&seq).unwrap();
    let small = large.downsample(200).unwrap();

    assert_eq!(small.len(), 200);
    let similarity = Comparator::new().similarity(&large, &small).unwrap().unwrap();
    assert_relative_eq!(similarity.value, 1.0);
}
