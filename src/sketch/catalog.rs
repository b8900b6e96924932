//! Ordered, indexed collection of loaded signatures.

use ahash::AHashMap;

use super::minhash::MinHashSketch;
use super::signature::Signature;
use super::types::SketchKey;

/// Signatures in insertion order with a `(ksize, moltype)` index.
///
/// Duplicate names are allowed; entries are identified by position.
#[derive(Debug, Clone, Default)]
pub struct SignatureCatalog {
    signatures: Vec<Signature>,
    index: AHashMap<SketchKey, Vec<usize>>,
}

impl SignatureCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog preserving the order of `signatures`
    pub fn from_signatures(signatures: impl IntoIterator<Item = Signature>) -> Self {
        let mut catalog = Self::new();
        catalog.extend(signatures);
        catalog
    }

    /// Append a signature, returning its position
    pub fn push(&mut self, signature: Signature) -> usize {
        let position = self.signatures.len();
        for key in signature.keys() {
            self.index.entry(*key).or_default().push(position);
        }
        self.signatures.push(signature);
        position
    }

    /// Number of signatures
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Signature at `position`
    pub fn get(&self, position: usize) -> Option<&Signature> {
        self.signatures.get(position)
    }

    /// All signatures in order
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Iterate signatures in order
    pub fn iter(&self) -> std::slice::Iter<'_, Signature> {
        self.signatures.iter()
    }

    /// Distinct sketch keys present, sorted
    pub fn keys(&self) -> Vec<SketchKey> {
        let mut keys: Vec<_> = self.index.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Positions of signatures carrying a sketch for `key`, ascending
    pub fn positions_with(&self, key: &SketchKey) -> &[usize] {
        self.index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(position, signature, sketch)` for every entry carrying `key`
    pub fn with_sketch<'a>(
        &'a self,
        key: &SketchKey,
    ) -> impl Iterator<Item = (usize, &'a Signature, &'a MinHashSketch)> + 'a {
        let key = *key;
        self.positions_with(&key).iter().filter_map(move |&position| {
            let signature = &self.signatures[position];
            signature
                .sketch(&key)
                .map(|sketch| (position, signature, sketch))
        })
    }

    /// `(position, signature, sketch)` for every entry with a sketch of
    /// `key.moltype`: the exact `key` sketch when present, otherwise the
    /// entry's first sketch of that molecule type.
    pub fn with_moltype<'a>(
        &'a self,
        key: &SketchKey,
    ) -> impl Iterator<Item = (usize, &'a Signature, &'a MinHashSketch)> + 'a {
        let key = *key;
        self.signatures
            .iter()
            .enumerate()
            .filter_map(move |(position, signature)| {
                signature
                    .sketch(&key)
                    .or_else(|| {
                        signature
                            .sketches()
                            .find(|sketch| sketch.moltype() == key.moltype)
                    })
                    .map(|sketch| (position, signature, sketch))
            })
    }

    /// Positions of signatures lacking a sketch for `key`
    pub fn positions_without(&self, key: &SketchKey) -> Vec<usize> {
        let with = self.positions_with(key);
        (0..self.signatures.len())
            .filter(|position| with.binary_search(position).is_err())
            .collect()
    }
}

impl Extend<Signature> for SignatureCatalog {
    fn extend<T: IntoIterator<Item = Signature>>(&mut self, iter: T) {
        for signature in iter {
            self.push(signature);
        }
    }
}

impl FromIterator<Signature> for SignatureCatalog {
    fn from_iter<T: IntoIterator<Item = Signature>>(iter: T) -> Self {
        Self::from_signatures(iter)
    }
}

impl<'a> IntoIterator for &'a SignatureCatalog {
    type Item = &'a Signature;
    type IntoIter = std::slice::Iter<'a, Signature>;

    fn into_iter(self) -> Self::IntoIter {
        self.signatures.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::types::MoleculeType;

    fn signature(name: &str, keys: &[(u32, MoleculeType)]) -> Signature {
        let sketches = keys
            .iter()
            .map(|&(k, m)| MinHashSketch::new(10, k, m, 42));
        Signature::new(name, format!("{name}.fa"), sketches).expect("unique keys")
    }

    #[test]
    fn preserves_insertion_order_and_duplicates() {
        let catalog = SignatureCatalog::from_signatures(vec![
            signature("b", &[(31, MoleculeType::Dna)]),
            signature("a", &[(31, MoleculeType::Dna)]),
            signature("b", &[(31, MoleculeType::Dna)]),
        ]);
        let names: Vec<_> = catalog.iter().map(Signature::name).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
    }

    #[test]
    fn index_finds_entries_by_key() {
        let dna31 = SketchKey::new(31, MoleculeType::Dna);
        let prot21 = SketchKey::new(21, MoleculeType::Protein);
        let catalog: SignatureCatalog = vec![
            signature("x", &[(31, MoleculeType::Dna)]),
            signature("y", &[(21, MoleculeType::Protein)]),
            signature("z", &[(31, MoleculeType::Dna), (21, MoleculeType::Protein)]),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.positions_with(&dna31), &[0, 2]);
        assert_eq!(catalog.positions_with(&prot21), &[1, 2]);
        assert_eq!(catalog.positions_without(&dna31), vec![1]);
        assert_eq!(catalog.keys(), vec![prot21, dna31]);

        let names: Vec<_> = catalog.with_sketch(&dna31).map(|(_, s, _)| s.name()).collect();
        assert_eq!(names, vec!["x", "z"]);
        assert!(catalog
            .positions_with(&SketchKey::new(11, MoleculeType::Dna))
            .is_empty());
    }

    #[test]
    fn moltype_lookup_prefers_the_exact_key() {
        let catalog = SignatureCatalog::from_signatures(vec![
            signature("k21", &[(21, MoleculeType::Dna)]),
            signature("prot", &[(31, MoleculeType::Protein)]),
            signature("both", &[(21, MoleculeType::Dna), (31, MoleculeType::Dna)]),
        ]);

        let found: Vec<_> = catalog
            .with_moltype(&SketchKey::new(31, MoleculeType::Dna))
            .map(|(position, _, sketch)| (position, sketch.ksize()))
            .collect();
        assert_eq!(found, vec![(0, 21), (2, 31)]);
    }

    #[test]
    fn lookups_outlive_a_temporary_key() {
        let catalog = SignatureCatalog::from_signatures(vec![signature(
            "x",
            &[(31, MoleculeType::Dna)],
        )]);
        let found: Vec<(usize, &Signature, &MinHashSketch)> = {
            let key = SketchKey::new(31, MoleculeType::Dna);
            catalog.with_sketch(&key).collect()
        };
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1.name(), "x");
    }
}
