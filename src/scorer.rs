use crate::assembler::{Candidate, DIGITS, SEPARATORS, SYMBOLS, SlotKind};
use crate::dictionary::Dictionary;
use crate::variator::VARIATION_SPACE;

/// QWERTY rows scanned by the keyboard-walk detector.
const KEYBOARD_ROWS: &[&str] = &["qwertyuiop", "asdfghjkl", "zxcvbnm", "1234567890"];

const KEYBOARD_WINDOW: usize = 4;
const RUN_MIN: usize = 3;
const LEAK_MIN_CHARS: usize = 4;

const SEVERITY_SEQUENTIAL: f64 = 1.0;
const SEVERITY_REPEATED: f64 = 1.0;
const SEVERITY_KEYBOARD: f64 = 1.5;
const SEVERITY_LEAK: f64 = 2.0;

/// Scoring thresholds. The numeric defaults are a policy choice, not a
/// compatibility contract; callers are expected to tune them.
#[derive(Clone, Copy, Debug)]
pub struct ScorerConfig {
    pub min_entropy_bits: f64,
    pub max_risk_budget: f64,
    pub min_length: usize,
    /// Effective variant multiplier per word slot; see
    /// [`crate::variator::VARIATION_SPACE`].
    pub variation_space: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            min_entropy_bits: 50.0,
            max_risk_budget: 0.0,
            min_length: 8,
            variation_space: VARIATION_SPACE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RiskPenalty {
    pub pattern: &'static str,
    pub severity: f64,
}

/// Verdict for one candidate. Immutable; `too_short` and rejection are
/// data, not errors.
#[derive(Clone, Debug)]
pub struct ScoreReport {
    pub entropy_bits: f64,
    pub penalties: Vec<RiskPenalty>,
    pub accepted: bool,
    pub too_short: bool,
}

impl ScoreReport {
    pub fn total_severity(&self) -> f64 {
        self.penalties.iter().map(|p| p.severity).sum()
    }

    fn rejected_too_short() -> Self {
        Self {
            entropy_bits: 0.0,
            penalties: Vec::new(),
            accepted: false,
            too_short: true,
        }
    }
}

/// Estimates candidate entropy from slot provenance and scans for known
/// weak patterns.
///
/// The entropy model is per-slot, not per-character: a dictionary word is
/// one draw from `dictionary_len * variation_space` possibilities, however
/// many letters it has. Raw string-length entropy would flatter word slots
/// enormously.
pub struct PatternRiskScorer {
    config: ScorerConfig,
    dictionary_len: usize,
    leak_words: Vec<String>,
}

impl PatternRiskScorer {
    pub fn new(dictionary: &Dictionary, config: ScorerConfig) -> Self {
        let leak_words = dictionary
            .words()
            .iter()
            .filter(|word| word.chars().count() >= LEAK_MIN_CHARS)
            .cloned()
            .collect();

        Self {
            config,
            dictionary_len: dictionary.len(),
            leak_words,
        }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn score(&self, candidate: &Candidate) -> ScoreReport {
        let text = candidate.text();
        if text.is_empty() || text.chars().count() < self.config.min_length {
            return ScoreReport::rejected_too_short();
        }

        let entropy_bits = self.estimate_entropy(candidate);
        let penalties = self.detect_risks(text);
        let total_severity: f64 = penalties.iter().map(|p| p.severity).sum();

        let accepted = entropy_bits >= self.config.min_entropy_bits
            && total_severity <= self.config.max_risk_budget;

        ScoreReport {
            entropy_bits,
            penalties,
            accepted,
            too_short: false,
        }
    }

    fn estimate_entropy(&self, candidate: &Candidate) -> f64 {
        let mut bits = 0.0;
        for span in candidate.spans() {
            let chars = candidate.text()[span.range.clone()].chars().count() as f64;
            bits += match span.kind {
                SlotKind::Word => (self.dictionary_len as f64 * self.config.variation_space).log2(),
                SlotKind::Digits => chars * (DIGITS.len() as f64).log2(),
                SlotKind::Symbol => chars * (SYMBOLS.len() as f64).log2(),
                SlotKind::Separator => (SEPARATORS.len() as f64).log2(),
            };
        }
        bits
    }

    fn detect_risks(&self, text: &str) -> Vec<RiskPenalty> {
        let mut penalties = Vec::new();
        let lowered: Vec<char> = text.to_lowercase().chars().collect();

        for _ in sequential_runs(&lowered) {
            penalties.push(RiskPenalty {
                pattern: "sequential_run",
                severity: SEVERITY_SEQUENTIAL,
            });
        }

        for _ in repeated_runs(text) {
            penalties.push(RiskPenalty {
                pattern: "repeated_run",
                severity: SEVERITY_REPEATED,
            });
        }

        if has_keyboard_walk(&lowered) {
            penalties.push(RiskPenalty {
                pattern: "keyboard_walk",
                severity: SEVERITY_KEYBOARD,
            });
        }

        // Case-sensitive: dictionary entries are lowercase, any case change
        // counts as mutation.
        for word in &self.leak_words {
            if text.contains(word.as_str()) {
                penalties.push(RiskPenalty {
                    pattern: "dictionary_leak",
                    severity: SEVERITY_LEAK,
                });
            }
        }

        penalties
    }
}

/// Maximal runs of >= RUN_MIN consecutive ascending or descending ASCII
/// alphanumerics (`abc`, `321`). Returns one entry per run.
fn sequential_runs(chars: &[char]) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut start = 0;

    while start + RUN_MIN <= chars.len() {
        let mut end = start;
        let direction = step(chars[start], chars.get(start + 1).copied());
        if direction == 0 {
            start += 1;
            continue;
        }
        while end + 1 < chars.len() && step(chars[end], Some(chars[end + 1])) == direction {
            end += 1;
        }
        if end - start + 1 >= RUN_MIN {
            runs.push(start);
        }
        start = end.max(start + 1);
    }
    runs
}

fn step(a: char, b: Option<char>) -> i64 {
    let Some(b) = b else { return 0 };
    if !a.is_ascii_alphanumeric() || !b.is_ascii_alphanumeric() {
        return 0;
    }
    match b as i64 - a as i64 {
        1 => 1,
        -1 => -1,
        _ => 0,
    }
}

/// Maximal runs of >= RUN_MIN identical characters, case-sensitive.
fn repeated_runs(text: &str) -> Vec<usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut runs = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = start;
        while end + 1 < chars.len() && chars[end + 1] == chars[start] {
            end += 1;
        }
        if end - start + 1 >= RUN_MIN {
            runs.push(start);
        }
        start = end + 1;
    }
    runs
}

/// True when any window of KEYBOARD_WINDOW characters appears inside a
/// QWERTY row, forward or reversed.
fn has_keyboard_walk(lowered: &[char]) -> bool {
    if lowered.len() < KEYBOARD_WINDOW {
        return false;
    }

    for window in lowered.windows(KEYBOARD_WINDOW) {
        let fragment: String = window.iter().collect();
        let reversed: String = window.iter().rev().collect();
        for row in KEYBOARD_ROWS {
            if row.contains(&fragment) || row.contains(&reversed) {
                return true;
            }
        }
    }
    false
}
