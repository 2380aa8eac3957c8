use crate::dictionary::Dictionary;
use std::sync::OnceLock;

const WORDLIST_DATA: &str = include_str!("../assets/default_wordlist.txt");

#[cfg(test)]
const EXPECTED_SHA256: &str = "1a573e229718e5e6a28c69b4cc565bb54162eb2e73634157d5eeaf8b37962abb";

static WORDLIST: OnceLock<Vec<&'static str>> = OnceLock::new();

/// The embedded fallback word list, used when no dictionary file is given.
pub fn get_wordlist() -> &'static [&'static str] {
    WORDLIST.get_or_init(|| {
        let words: Vec<&'static str> = WORDLIST_DATA
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        assert_eq!(words.len(), 256, "Wordlist must contain exactly 256 words");
        words
    })
}

pub const fn wordlist_size() -> usize {
    256
}

/// Builds a [`Dictionary`] from the embedded word list.
pub fn default_dictionary() -> Dictionary {
    Dictionary::from_lines(get_wordlist().iter().copied())
        .expect("embedded wordlist is non-empty")
}
