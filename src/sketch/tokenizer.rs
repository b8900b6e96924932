//! K-mer extraction for DNA and protein sketches.
//!
//! DNA windows are canonicalized against their reverse complement so that a
//! sequence and its opposite strand produce the same k-mers. Protein windows
//! are used verbatim. Nucleotide input destined for a protein sketch is first
//! translated in all six reading frames.

use crate::core::errors::{Result, SketchError};

use super::config::AmbiguousBasePolicy;
use super::types::MoleculeType;

/// Standard genetic code, codons ordered by `TCAG` at each position.
const CODON_TABLE: &[u8; 64] = b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// How each window is turned into a k-mer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KmerStrategy {
    /// Smaller of the window and its reverse complement; non-ACGT windows skipped
    Canonical,
    /// The window itself, uppercased
    Raw,
}

impl KmerStrategy {
    /// Strategy used for k-mers of the given molecule type
    pub fn for_moltype(moltype: MoleculeType) -> Self {
        match moltype {
            MoleculeType::Dna => Self::Canonical,
            MoleculeType::Protein => Self::Raw,
        }
    }
}

/// Counts reported after tokenizing a sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenStats {
    /// K-mers produced
    pub kmers: usize,
    /// Windows dropped because they contained non-ACGT characters
    pub skipped_windows: usize,
}

impl TokenStats {
    /// Accumulate another set of counts
    pub fn absorb(&mut self, other: TokenStats) {
        self.kmers += other.kmers;
        self.skipped_windows += other.skipped_windows;
    }
}

/// Lazy iterator over the k-mers of one strand or reading frame.
///
/// Calling [`Tokenizer::kmers`] again restarts the walk from the beginning.
#[derive(Debug, Clone)]
pub struct Kmers<'a> {
    seq: &'a [u8],
    ksize: usize,
    pos: usize,
    strategy: KmerStrategy,
    skipped: usize,
}

impl<'a> Kmers<'a> {
    /// Create an iterator over `seq`
    pub fn new(seq: &'a [u8], ksize: usize, strategy: KmerStrategy) -> Self {
        Self {
            seq,
            ksize,
            pos: 0,
            strategy,
            skipped: 0,
        }
    }

    /// Windows skipped so far
    pub fn skipped_windows(&self) -> usize {
        self.skipped
    }

    fn window_count(&self) -> usize {
        if self.ksize == 0 || self.seq.len() < self.ksize {
            0
        } else {
            self.seq.len() - self.ksize + 1
        }
    }
}

impl Iterator for Kmers<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        let windows = self.window_count();

        while self.pos < windows {
            let window = &self.seq[self.pos..self.pos + self.ksize];

            if self.strategy == KmerStrategy::Raw {
                self.pos += 1;
                return Some(window.to_ascii_uppercase());
            }

            // Every window that still overlaps the last bad base is unusable.
            if let Some(bad) = window.iter().rposition(|&b| !is_acgt(b)) {
                let skip = (bad + 1).min(windows - self.pos);
                self.skipped += skip;
                self.pos += skip;
                continue;
            }

            self.pos += 1;
            return Some(canonical_kmer(window));
        }

        None
    }
}

/// K-mer tokenizer for one `(ksize, moltype)` combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenizer {
    ksize: usize,
    moltype: MoleculeType,
    input_is_protein: bool,
    ambiguous_bases: AmbiguousBasePolicy,
}

impl Tokenizer {
    /// Tokenizer for nucleotide input
    pub fn new(ksize: u32, moltype: MoleculeType) -> Self {
        Self {
            ksize: ksize as usize,
            moltype,
            input_is_protein: false,
            ambiguous_bases: AmbiguousBasePolicy::Skip,
        }
    }

    /// Treat input as amino-acid sequence (no translation)
    pub fn with_protein_input(mut self, input_is_protein: bool) -> Self {
        self.input_is_protein = input_is_protein;
        self
    }

    /// Set the ambiguous-base policy
    pub fn with_ambiguous_bases(mut self, policy: AmbiguousBasePolicy) -> Self {
        self.ambiguous_bases = policy;
        self
    }

    /// K-mer size
    pub fn ksize(&self) -> u32 {
        self.ksize as u32
    }

    /// Molecule type of the produced k-mers
    pub fn moltype(&self) -> MoleculeType {
        self.moltype
    }

    /// K-mers of `seq` read as a single strand, without translation
    pub fn kmers<'a>(&self, seq: &'a [u8]) -> Kmers<'a> {
        Kmers::new(seq, self.ksize, KmerStrategy::for_moltype(self.moltype))
    }

    /// Feed every k-mer of `seq` to `sink`.
    ///
    /// Sequences shorter than `ksize` produce nothing. Protein k-mers from
    /// nucleotide input come from the six-frame translation.
    pub fn for_each_kmer<F>(&self, seq: &[u8], mut sink: F) -> Result<TokenStats>
    where
        F: FnMut(&[u8]),
    {
        if self.input_is_protein && self.moltype == MoleculeType::Dna {
            return Err(SketchError::config_field(
                "DNA k-mers cannot be extracted from protein input",
                "compute.input_is_protein",
            ));
        }

        if !self.input_is_protein && self.ambiguous_bases == AmbiguousBasePolicy::Reject {
            if let Some(pos) = seq.iter().position(|&b| !is_acgt(b)) {
                return Err(SketchError::malformed(format!(
                    "non-ACGT character '{}' at position {pos}",
                    char::from(seq[pos]).escape_default()
                )));
            }
        }

        let mut stats = TokenStats::default();
        let mut drain = |kmers: &mut Kmers<'_>| {
            for kmer in kmers.by_ref() {
                sink(&kmer);
                stats.kmers += 1;
            }
            stats.skipped_windows += kmers.skipped_windows();
        };

        match (self.moltype, self.input_is_protein) {
            (MoleculeType::Protein, false) => {
                for frame in six_frame_translation(seq) {
                    drain(&mut Kmers::new(&frame, self.ksize, KmerStrategy::Raw));
                }
            }
            _ => drain(&mut self.kmers(seq)),
        }

        Ok(stats)
    }
}

#[inline]
fn is_acgt(base: u8) -> bool {
    matches!(base, b'A' | b'C' | b'G' | b'T' | b'a' | b'c' | b'g' | b't')
}

#[inline]
fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        _ => b'N',
    }
}

/// Reverse complement of a nucleotide sequence (non-ACGT becomes `N`)
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// Lexicographically smaller of the uppercased k-mer and its reverse complement
pub fn canonical_kmer(kmer: &[u8]) -> Vec<u8> {
    let forward = kmer.to_ascii_uppercase();
    let reverse = reverse_complement(kmer);
    if reverse < forward {
        reverse
    } else {
        forward
    }
}

fn base_index(base: u8) -> Option<usize> {
    match base.to_ascii_uppercase() {
        b'T' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

/// Translate one codon with the standard genetic code (`X` when unknown)
pub fn translate_codon(codon: &[u8]) -> u8 {
    match codon {
        [a, b, c] => match (base_index(*a), base_index(*b), base_index(*c)) {
            (Some(a), Some(b), Some(c)) => CODON_TABLE[a * 16 + b * 4 + c],
            _ => b'X',
        },
        _ => b'X',
    }
}

/// Translate `seq` starting at `frame`, dropping a trailing partial codon
pub fn translate(seq: &[u8], frame: usize) -> Vec<u8> {
    seq.get(frame..)
        .unwrap_or_default()
        .chunks_exact(3)
        .map(translate_codon)
        .collect()
}

/// Three forward and three reverse-complement translations
pub fn six_frame_translation(seq: &[u8]) -> Vec<Vec<u8>> {
    let reverse = reverse_complement(seq);
    (0..3)
        .map(|frame| translate(seq, frame))
        .chain((0..3).map(|frame| translate(&reverse, frame)))
        .collect()
}
