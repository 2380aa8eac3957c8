use crate::assembler::{Candidate, StructureSpec, assemble};
use crate::entropy::EntropySource;
use crate::error::Result;
use crate::scorer::{PatternRiskScorer, ScoreReport};
use crate::variator::LexicalVariator;

/// Retry policy for one generation session.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub retry_cap: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { retry_cap: 50 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Generating,
    Accepted,
    Exhausted,
}

/// Result of a session run.
///
/// `low_confidence` is set when the retry cap ran out before any candidate
/// was accepted; the candidate is then the best seen by entropy. That is a
/// reported condition, not an error. The caller decides whether to show it
/// or retry with relaxed thresholds.
pub struct SessionOutcome {
    pub candidate: Candidate,
    pub report: ScoreReport,
    pub attempts: usize,
    pub low_confidence: bool,
}

/// Drives assemble-and-score attempts until a candidate is accepted or the
/// retry budget runs out.
pub struct GenerationSession<'a, E: EntropySource> {
    spec: &'a StructureSpec,
    variator: &'a LexicalVariator,
    scorer: &'a PatternRiskScorer,
    entropy: E,
    config: SessionConfig,
    phase: SessionPhase,
}

impl<'a, E: EntropySource> GenerationSession<'a, E> {
    pub fn new(
        spec: &'a StructureSpec,
        variator: &'a LexicalVariator,
        scorer: &'a PatternRiskScorer,
        entropy: E,
        config: SessionConfig,
    ) -> Self {
        Self {
            spec,
            variator,
            scorer,
            entropy,
            config,
            phase: SessionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Runs one full generation cycle. Each call starts fresh; fatal errors
    /// (an unreadable entropy source) abort immediately.
    pub fn run(&mut self) -> Result<SessionOutcome> {
        let retry_cap = self.config.retry_cap.max(1);
        self.phase = SessionPhase::Generating;

        let mut attempts = 0;
        let mut best: Option<(Candidate, ScoreReport)> = None;

        while attempts < retry_cap {
            let candidate = assemble(self.spec, self.variator, &mut self.entropy)?;
            attempts += 1;

            let report = self.scorer.score(&candidate);
            if report.accepted {
                self.phase = SessionPhase::Accepted;
                return Ok(SessionOutcome {
                    candidate,
                    report,
                    attempts,
                    low_confidence: false,
                });
            }

            let improves = best
                .as_ref()
                .is_none_or(|(_, best_report)| report.entropy_bits > best_report.entropy_bits);
            if improves {
                best = Some((candidate, report));
            }
        }

        self.phase = SessionPhase::Exhausted;
        let (candidate, report) = best.expect("retry cap >= 1 guarantees one attempt");
        Ok(SessionOutcome {
            candidate,
            report,
            attempts,
            low_confidence: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::Slot;
    use crate::dictionary::Dictionary;
    use crate::entropy::{OsEntropy, ScriptedEntropy};
    use crate::scorer::ScorerConfig;
    use crate::wordlist::default_dictionary;

    fn variator(words: &[&str]) -> LexicalVariator {
        let dict = Dictionary::from_lines(words.iter().copied()).unwrap();
        LexicalVariator::build(dict).unwrap()
    }

    #[test]
    fn test_accepts_on_first_good_candidate() {
        let v = variator(&["dragon", "castle", "shadow"]);
        let scorer = PatternRiskScorer::new(
            v.dictionary(),
            ScorerConfig {
                min_entropy_bits: 0.0,
                max_risk_budget: 100.0,
                min_length: 1,
                ..ScorerConfig::default()
            },
        );
        let spec = StructureSpec::new(vec![Slot::Word, Slot::Separator, Slot::Digits(2)]);

        let entropy = ScriptedEntropy::new([0, 0, 0, 0, 4, 7]);
        let mut session =
            GenerationSession::new(&spec, &v, &scorer, entropy, SessionConfig::default());

        let outcome = session.run().unwrap();
        assert_eq!(outcome.candidate.text(), "Dr4gon-47");
        assert_eq!(outcome.attempts, 1);
        assert!(!outcome.low_confidence);
        assert!(outcome.report.accepted);
        assert_eq!(session.phase(), SessionPhase::Accepted);
    }

    #[test]
    fn test_exhaustion_returns_best_seen() {
        let v = variator(&["dragon", "castle", "shadow"]);
        // Impossible threshold: every attempt is rejected.
        let scorer = PatternRiskScorer::new(
            v.dictionary(),
            ScorerConfig {
                min_entropy_bits: 10_000.0,
                ..ScorerConfig::default()
            },
        );
        let spec = StructureSpec::default();
        let config = SessionConfig { retry_cap: 7 };

        let mut session =
            GenerationSession::new(&spec, &v, &scorer, OsEntropy::new().unwrap(), config);

        let outcome = session.run().unwrap();
        assert_eq!(outcome.attempts, 7);
        assert!(outcome.low_confidence);
        assert!(!outcome.report.accepted);
        assert!(outcome.report.entropy_bits > 0.0);
        assert!(!outcome.candidate.text().is_empty());
        assert_eq!(session.phase(), SessionPhase::Exhausted);
    }

    #[test]
    fn test_zero_retry_cap_still_attempts_once() {
        let v = variator(&["dragon", "castle", "shadow"]);
        let scorer = PatternRiskScorer::new(
            v.dictionary(),
            ScorerConfig {
                min_entropy_bits: 10_000.0,
                ..ScorerConfig::default()
            },
        );
        let spec = StructureSpec::default();
        let mut session = GenerationSession::new(
            &spec,
            &v,
            &scorer,
            OsEntropy::new().unwrap(),
            SessionConfig { retry_cap: 0 },
        );

        let outcome = session.run().unwrap();
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.low_confidence);
    }

    #[test]
    fn test_accepted_outcome_satisfies_thresholds() {
        let v = LexicalVariator::build(default_dictionary()).unwrap();
        let scorer = PatternRiskScorer::new(v.dictionary(), ScorerConfig::default());
        let spec = StructureSpec::default();

        for _ in 0..10 {
            let mut session = GenerationSession::new(
                &spec,
                &v,
                &scorer,
                OsEntropy::new().unwrap(),
                SessionConfig::default(),
            );
            let outcome = session.run().unwrap();

            // Either way the invariant holds: acceptance implies both
            // thresholds, exhaustion implies the low-confidence flag.
            assert_eq!(outcome.low_confidence, !outcome.report.accepted);
            if outcome.report.accepted {
                assert!(outcome.report.entropy_bits >= scorer.config().min_entropy_bits);
                assert!(outcome.report.total_severity() <= scorer.config().max_risk_budget);
            }
        }
    }

    #[test]
    fn test_sessions_share_variator() {
        // The index is read-only after build; two sessions over the same
        // variator must not interfere.
        let v = variator(&["dragon", "castle", "shadow", "copper"]);
        let scorer = PatternRiskScorer::new(v.dictionary(), ScorerConfig::default());
        let spec = StructureSpec::default();

        let mut first = GenerationSession::new(
            &spec,
            &v,
            &scorer,
            OsEntropy::new().unwrap(),
            SessionConfig::default(),
        );
        let mut second = GenerationSession::new(
            &spec,
            &v,
            &scorer,
            OsEntropy::new().unwrap(),
            SessionConfig::default(),
        );

        let a = first.run().unwrap();
        let b = second.run().unwrap();
        assert!(!a.candidate.text().is_empty());
        assert!(!b.candidate.text().is_empty());
    }
}
