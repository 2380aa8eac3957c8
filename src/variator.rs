use crate::dictionary::Dictionary;
use crate::entropy::EntropySource;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Effective number of variants `variate` can produce per dictionary word.
/// Used by the scorer's entropy model: a word slot is worth
/// `log2(dictionary_len * VARIATION_SPACE)` bits, not one bit per letter.
pub const VARIATION_SPACE: f64 = 16.0;

const NGRAM_MIN: usize = 2;
const NGRAM_MAX: usize = 4;

/// Leetspeak substitution table, lowercase letter to digit/symbol.
const LEET_TABLE: &[(char, char)] = &[
    ('a', '4'),
    ('b', '8'),
    ('e', '3'),
    ('g', '9'),
    ('i', '1'),
    ('o', '0'),
    ('s', '5'),
    ('t', '7'),
];

/// Feature ids ascending, weights L2-normalized.
type SparseVector = Vec<(u32, f32)>;

/// TF-IDF character-n-gram vectors over a dictionary, one per word.
///
/// Vocabulary ids are assigned in dictionary and positional order, so two
/// builds over the same word sequence produce identical vectors and
/// identical similarity rankings.
pub struct VectorIndex {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f32>,
    vectors: Vec<SparseVector>,
}

impl VectorIndex {
    fn build(words: &[String]) -> Self {
        let mut vocabulary: HashMap<String, u32> = HashMap::new();
        let mut document_frequency: Vec<u32> = Vec::new();

        for word in words {
            let mut seen_in_word: Vec<bool> = vec![false; document_frequency.len()];
            for gram in ngrams(word) {
                let next_id = vocabulary.len() as u32;
                let id = *vocabulary.entry(gram).or_insert(next_id) as usize;
                if id == document_frequency.len() {
                    document_frequency.push(0);
                    seen_in_word.push(false);
                }
                if !seen_in_word[id] {
                    seen_in_word[id] = true;
                    document_frequency[id] += 1;
                }
            }
        }

        // Smoothed idf, the same formula scikit-style vectorizers use.
        let corpus_len = words.len() as f32;
        let idf: Vec<f32> = document_frequency
            .iter()
            .map(|&df| ((1.0 + corpus_len) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let mut index = Self {
            vocabulary,
            idf,
            vectors: Vec::with_capacity(words.len()),
        };
        let vectors: Vec<SparseVector> = words.iter().map(|word| index.vectorize(word)).collect();
        index.vectors = vectors;
        debug_assert_eq!(index.vectors.len(), words.len());

        index
    }

    /// Projects an arbitrary word into the index's feature space.
    /// N-grams outside the vocabulary are dropped.
    fn vectorize(&self, word: &str) -> SparseVector {
        let mut term_frequency: HashMap<u32, f32> = HashMap::new();
        for gram in ngrams(&word.to_lowercase()) {
            if let Some(&id) = self.vocabulary.get(&gram) {
                *term_frequency.entry(id).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = term_frequency
            .into_iter()
            .map(|(id, tf)| (id, tf * self.idf[id as usize]))
            .collect();
        vector.sort_by_key(|&(id, _)| id);
        l2_normalize(&mut vector);
        vector
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Character n-grams (sizes 2..=4) of a word; the whole word when it is
/// too short to shingle.
fn ngrams(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut grams = Vec::new();

    for size in NGRAM_MIN..=NGRAM_MAX.min(chars.len()) {
        for window in chars.windows(size) {
            grams.push(window.iter().collect());
        }
    }

    if grams.is_empty() && !chars.is_empty() {
        grams.push(word.to_string());
    }
    grams
}

fn l2_normalize(vector: &mut SparseVector) {
    let norm = vector
        .iter()
        .map(|&(_, weight)| weight * weight)
        .sum::<f32>()
        .sqrt();
    if norm > f32::EPSILON {
        for (_, weight) in vector.iter_mut() {
            *weight /= norm;
        }
    }
}

/// Dot product of two sorted sparse vectors. Both sides are L2-normalized,
/// so this is their cosine similarity.
fn sparse_dot(a: &SparseVector, b: &SparseVector) -> f32 {
    let mut dot = 0.0f32;
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    dot
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transform {
    Leet,
    CaseShuffle,
    NeighborSplice,
}

const ALL_TRANSFORMS: &[Transform] = &[
    Transform::Leet,
    Transform::CaseShuffle,
    Transform::NeighborSplice,
];

// Neighbor splice needs a second word to splice with.
const SOLO_TRANSFORMS: &[Transform] = &[Transform::Leet, Transform::CaseShuffle];

/// Perturbs dictionary words into password-like tokens.
///
/// Similarity search keeps the output linguistically plausible while making
/// sure no emitted token is a straight copy of a single dictionary entry,
/// which dictionary-attack tools enumerate trivially.
pub struct LexicalVariator {
    dictionary: Dictionary,
    index: VectorIndex,
}

impl LexicalVariator {
    /// Consumes the dictionary and builds the vector index over it.
    pub fn build(dictionary: Dictionary) -> Result<Self> {
        if dictionary.is_empty() {
            return Err(Error::EmptyDictionary);
        }
        let index = VectorIndex::build(dictionary.words());
        Ok(Self { dictionary, index })
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// The `k` nearest dictionary entries to `word` by cosine distance,
    /// closest first. The exact word itself is excluded unless it is the
    /// only entry. Ties break on dictionary order.
    pub fn similar_to(&self, word: &str, k: usize) -> Vec<(String, f32)> {
        let query = self.index.vectorize(word);
        let normalized = word.to_lowercase();
        let exclude_self = self.dictionary.len() > 1;

        let mut scored: Vec<(usize, f32)> = self
            .index
            .vectors
            .iter()
            .enumerate()
            .filter(|&(i, _)| !(exclude_self && self.dictionary.words()[i] == normalized))
            .map(|(i, vector)| (i, 1.0 - sparse_dot(&query, vector)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, distance)| (self.dictionary.words()[i].clone(), distance))
            .collect()
    }

    /// Produces a password-safe mutation of `word`, with the transform and
    /// its inner choices drawn from `entropy`. Never returns the input
    /// unchanged when the dictionary has two or more entries.
    pub fn variate<E: EntropySource>(&self, word: &str, entropy: &mut E) -> Result<String> {
        let transforms = if self.dictionary.len() < 2 {
            SOLO_TRANSFORMS
        } else {
            ALL_TRANSFORMS
        };

        let mut output = match *entropy.choice(transforms)? {
            Transform::Leet => self.leet(word, entropy)?,
            Transform::CaseShuffle => self.case_shuffle(word, entropy)?,
            Transform::NeighborSplice => self.neighbor_splice(word, entropy)?,
        };

        if output == word && self.dictionary.len() >= 2 {
            output = force_mutation(&output);
        }
        Ok(output)
    }

    /// Title-case the word, then substitute one entropy-chosen eligible
    /// character from the leet table.
    fn leet<E: EntropySource>(&self, word: &str, entropy: &mut E) -> Result<String> {
        let mut chars: Vec<char> = title_case(word).chars().collect();

        let eligible: Vec<usize> = chars
            .iter()
            .enumerate()
            .filter(|(_, c)| LEET_TABLE.iter().any(|&(from, _)| **c == from))
            .map(|(i, _)| i)
            .collect();

        if eligible.is_empty() {
            // Nothing to substitute; reverse the case of every letter instead.
            return Ok(word
                .chars()
                .map(|c| {
                    if c.is_lowercase() {
                        c.to_ascii_uppercase()
                    } else {
                        c.to_ascii_lowercase()
                    }
                })
                .collect());
        }

        let position = *entropy.choice(&eligible)?;
        let replacement = LEET_TABLE
            .iter()
            .find(|&&(from, _)| chars[position] == from)
            .map(|&(_, to)| to)
            .unwrap_or(chars[position]);
        chars[position] = replacement;

        Ok(chars.into_iter().collect())
    }

    /// One coin flip per alphabetic character; a forced flip of the first
    /// letter keeps the output distinct from the input.
    fn case_shuffle<E: EntropySource>(&self, word: &str, entropy: &mut E) -> Result<String> {
        let mut output = String::with_capacity(word.len());
        for c in word.chars() {
            if c.is_alphabetic() && entropy.next_int(0, 1)? == 1 {
                output.extend(c.to_uppercase());
            } else {
                output.push(c);
            }
        }

        if output == word {
            output = flip_first_alpha(&output);
        }
        Ok(output)
    }

    /// Front half of the word spliced onto the back half of an
    /// entropy-chosen near neighbor, capitalized.
    fn neighbor_splice<E: EntropySource>(&self, word: &str, entropy: &mut E) -> Result<String> {
        let neighbors = self.similar_to(word, 3);
        if neighbors.is_empty() {
            return self.leet(word, entropy);
        }

        let neighbor = &entropy.choice(&neighbors)?.0;
        let head: Vec<char> = word.chars().collect();
        let tail: Vec<char> = neighbor.chars().collect();

        let spliced: String = head[..head.len().div_ceil(2)]
            .iter()
            .chain(tail[tail.len() / 2..].iter())
            .collect();
        let mut output = title_case(&spliced);

        if output == word {
            output = flip_first_alpha(&output);
        }
        Ok(output)
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Last-resort mutation for a word the chosen transform left unchanged.
/// Tries a case flip first, then undoes one leet substitution, and for
/// entries with neither letters nor mapped digits appends a separator,
/// so the output differs from the input for any word.
fn force_mutation(word: &str) -> String {
    let flipped = flip_first_alpha(word);
    if flipped != word {
        return flipped;
    }
    let mut chars: Vec<char> = word.chars().collect();
    for c in chars.iter_mut() {
        if let Some(&(from, _)) = LEET_TABLE.iter().find(|&&(_, to)| to == *c) {
            *c = from.to_ascii_uppercase();
            return chars.into_iter().collect();
        }
    }
    let mut padded = String::from(word);
    padded.push('-');
    padded
}

fn flip_first_alpha(word: &str) -> String {
    let mut flipped = false;
    word.chars()
        .map(|c| {
            if !flipped && c.is_alphabetic() {
                flipped = true;
                if c.is_lowercase() {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            } else {
                c
            }
        })
        .collect()
}
