use crate::entropy::EntropySource;
use crate::error::Result;
use crate::variator::LexicalVariator;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;
use zeroize::Zeroizing;

pub const DIGITS: &[u8] = b"0123456789";
pub const SYMBOLS: &[u8] = b"!@#$%^&*";
pub const SEPARATORS: &[u8] = b"-_.~";

/// One positional unit of a password structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// An entropy-chosen dictionary word passed through the variator.
    Word,
    /// `n` uniform draws from [`DIGITS`].
    Digits(usize),
    /// `n` uniform draws from [`SYMBOLS`].
    Symbol(usize),
    /// One uniform draw from [`SEPARATORS`].
    Separator,
}

impl Slot {
    pub fn kind(&self) -> SlotKind {
        match self {
            Slot::Word => SlotKind::Word,
            Slot::Digits(_) => SlotKind::Digits,
            Slot::Symbol(_) => SlotKind::Symbol,
            Slot::Separator => SlotKind::Separator,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    Word,
    Digits,
    Symbol,
    Separator,
}

/// Ordered slot sequence describing how a candidate is assembled.
/// Immutable configuration; slot order is the output order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureSpec {
    slots: Vec<Slot>,
}

impl StructureSpec {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

impl Default for StructureSpec {
    /// Three varied words with separators, a digit pair and a symbol,
    /// e.g. `Dr4gon-Castl3~Wint3r_47!`.
    fn default() -> Self {
        Self::new(vec![
            Slot::Word,
            Slot::Separator,
            Slot::Word,
            Slot::Separator,
            Slot::Word,
            Slot::Separator,
            Slot::Digits(2),
            Slot::Symbol(1),
        ])
    }
}

#[derive(Debug, Error)]
#[error("invalid structure spec: {0}")]
pub struct ParseStructureError(String);

impl FromStr for StructureSpec {
    type Err = ParseStructureError;

    /// Parses a compact comma-separated slot list, e.g.
    /// `word,sep,word,sep,digits:2,symbol`. `digits` and `symbol` take an
    /// optional `:count` suffix (defaults 2 and 1).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut slots = Vec::new();
        for token in s.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            slots.push(parse_slot(token)?);
        }

        if slots.is_empty() {
            return Err(ParseStructureError("no slots given".to_string()));
        }
        Ok(Self::new(slots))
    }
}

fn parse_slot(token: &str) -> std::result::Result<Slot, ParseStructureError> {
    let (name, count) = match token.split_once(':') {
        Some((name, raw)) => {
            let count: usize = raw
                .parse()
                .map_err(|_| ParseStructureError(format!("bad count in {token:?}")))?;
            if count == 0 {
                return Err(ParseStructureError(format!("zero count in {token:?}")));
            }
            (name, Some(count))
        }
        None => (token, None),
    };

    match (name, count) {
        ("word", None) => Ok(Slot::Word),
        ("sep" | "separator", None) => Ok(Slot::Separator),
        ("digits", count) => Ok(Slot::Digits(count.unwrap_or(2))),
        ("symbol", count) => Ok(Slot::Symbol(count.unwrap_or(1))),
        _ => Err(ParseStructureError(format!("unknown slot {token:?}"))),
    }
}

/// Which slot produced which byte range of the candidate text.
#[derive(Clone, Debug)]
pub struct SlotSpan {
    pub kind: SlotKind,
    pub range: Range<usize>,
}

/// A generated password string plus slot provenance.
///
/// The text is zeroized on drop; candidates rejected by the scorer leak
/// nothing once discarded. No `Debug` impl, so the text cannot end up in
/// log output by accident.
#[derive(Clone)]
pub struct Candidate {
    text: Zeroizing<String>,
    spans: Vec<SlotSpan>,
}

impl Candidate {
    pub(crate) fn from_parts(text: String, spans: Vec<SlotSpan>) -> Self {
        Self {
            text: Zeroizing::new(text),
            spans,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[SlotSpan] {
        &self.spans
    }
}

/// Assembles one candidate by walking the spec's slots in order.
///
/// Draw order is fixed: a word slot draws the dictionary index, then the
/// variator's transform choices; digit and symbol slots draw once per
/// character; a separator slot draws once. A scripted entropy source
/// therefore reproduces the same candidate on every call.
pub fn assemble<E: EntropySource>(
    spec: &StructureSpec,
    variator: &LexicalVariator,
    entropy: &mut E,
) -> Result<Candidate> {
    let mut text = String::new();
    let mut spans = Vec::with_capacity(spec.slots().len());

    for slot in spec.slots() {
        let start = text.len();
        match *slot {
            Slot::Word => {
                let word = entropy.choice(variator.dictionary().words())?;
                let varied = variator.variate(word, entropy)?;
                text.push_str(&varied);
            }
            Slot::Digits(count) => {
                for _ in 0..count {
                    text.push(*entropy.choice(DIGITS)? as char);
                }
            }
            Slot::Symbol(count) => {
                for _ in 0..count {
                    text.push(*entropy.choice(SYMBOLS)? as char);
                }
            }
            Slot::Separator => {
                text.push(*entropy.choice(SEPARATORS)? as char);
            }
        }
        spans.push(SlotSpan {
            kind: slot.kind(),
            range: start..text.len(),
        });
    }

    Ok(Candidate::from_parts(text, spans))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::entropy::ScriptedEntropy;

    fn variator(words: &[&str]) -> LexicalVariator {
        let dict = Dictionary::from_lines(words.iter().copied()).unwrap();
        LexicalVariator::build(dict).unwrap()
    }

    #[test]
    fn test_alphabets_distinct() {
        use std::collections::HashSet;
        for alphabet in [DIGITS, SYMBOLS, SEPARATORS] {
            let unique: HashSet<_> = alphabet.iter().collect();
            assert_eq!(unique.len(), alphabet.len(), "alphabet has duplicates");
        }
    }

    #[test]
    fn test_parse_structure_spec() {
        let spec: StructureSpec = "word, sep, digits:2, symbol".parse().unwrap();
        assert_eq!(
            spec.slots(),
            [Slot::Word, Slot::Separator, Slot::Digits(2), Slot::Symbol(1)]
        );
    }

    #[test]
    fn test_parse_default_counts() {
        let spec: StructureSpec = "digits,symbol".parse().unwrap();
        assert_eq!(spec.slots(), [Slot::Digits(2), Slot::Symbol(1)]);
    }

    #[test]
    fn test_parse_rejects_unknown_slot() {
        assert!("word,letters".parse::<StructureSpec>().is_err());
    }

    #[test]
    fn test_parse_rejects_zero_count() {
        assert!("digits:0".parse::<StructureSpec>().is_err());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!("".parse::<StructureSpec>().is_err());
        assert!(" , ,".parse::<StructureSpec>().is_err());
    }

    #[test]
    fn test_assemble_scripted_scenario() {
        let v = variator(&["dragon", "castle", "shadow"]);
        let spec = StructureSpec::new(vec![Slot::Word, Slot::Separator, Slot::Digits(2)]);

        // word index 0 ("dragon"), leet transform, first eligible letter,
        // separator '-', digits '4' and '7'.
        let mut entropy = ScriptedEntropy::new([0, 0, 0, 0, 4, 7]);
        let candidate = assemble(&spec, &v, &mut entropy).unwrap();

        assert_eq!(candidate.text(), "Dr4gon-47");
    }

    #[test]
    fn test_assemble_deterministic_under_script() {
        let v = variator(&["dragon", "castle", "shadow"]);
        let spec = StructureSpec::default();
        let script = [1, 0, 1, 2, 2, 1, 3, 0, 1, 0, 1, 2, 9, 3, 5];

        let first = assemble(&spec, &v, &mut ScriptedEntropy::new(script)).unwrap();
        let second = assemble(&spec, &v, &mut ScriptedEntropy::new(script)).unwrap();
        assert_eq!(first.text(), second.text());
    }

    #[test]
    fn test_assemble_spans_cover_text_in_order() {
        let v = variator(&["dragon", "castle", "shadow"]);
        let spec = StructureSpec::new(vec![Slot::Word, Slot::Separator, Slot::Digits(3)]);
        let candidate = assemble(&spec, &v, &mut ScriptedEntropy::new([0, 0, 0, 1, 5, 6, 7])).unwrap();

        let spans = candidate.spans();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].kind, SlotKind::Word);
        assert_eq!(spans[1].kind, SlotKind::Separator);
        assert_eq!(spans[2].kind, SlotKind::Digits);

        assert_eq!(spans[0].range.start, 0);
        for pair in spans.windows(2) {
            assert_eq!(pair[0].range.end, pair[1].range.start);
        }
        assert_eq!(spans[2].range.end, candidate.text().len());
        assert_eq!(&candidate.text()[spans[2].range.clone()], "567");
    }

    #[test]
    fn test_assemble_separator_alphabet() {
        let v = variator(&["dragon", "castle"]);
        let spec = StructureSpec::new(vec![Slot::Separator]);
        for value in 0..8 {
            let candidate = assemble(&spec, &v, &mut ScriptedEntropy::new([value])).unwrap();
            let byte = candidate.text().as_bytes()[0];
            assert!(SEPARATORS.contains(&byte));
        }
    }
}
