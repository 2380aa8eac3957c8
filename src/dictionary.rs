use crate::error::{Error, Result};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// An ordered, normalized word list.
///
/// Words are trimmed, NFC-normalized and lowercased on the way in;
/// duplicates keep their first occurrence so that rankings derived from the
/// dictionary are stable for a given input order. Immutable once built.
#[derive(Debug, Clone)]
pub struct Dictionary {
    words: Vec<String>,
}

impl Dictionary {
    /// Builds a dictionary from raw lines (one word per line).
    ///
    /// Returns [`Error::EmptyDictionary`] when no usable word remains after
    /// normalization, so a misconfigured word file is reported immediately
    /// rather than producing degenerate passwords.
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut words = Vec::new();

        for line in lines {
            let normalized: String = line.as_ref().trim().nfc().collect();
            let normalized = normalized.to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            if seen.insert(normalized.clone()) {
                words.push(normalized);
            }
        }

        if words.is_empty() {
            return Err(Error::EmptyDictionary);
        }

        Ok(Self { words })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
