pub mod assembler;
pub mod dictionary;
pub mod entropy;
pub mod error;
pub mod scorer;
pub mod session;
pub mod variator;
pub mod wordlist;

pub use assembler::{Candidate, Slot, SlotKind, SlotSpan, StructureSpec, assemble};
pub use dictionary::Dictionary;
pub use entropy::{EntropySource, OsEntropy, ScriptedEntropy};
pub use error::{Error, Result};
pub use scorer::{PatternRiskScorer, RiskPenalty, ScoreReport, ScorerConfig};
pub use session::{GenerationSession, SessionConfig, SessionOutcome, SessionPhase};
pub use variator::{LexicalVariator, VARIATION_SPACE, VectorIndex};
pub use wordlist::{default_dictionary, get_wordlist, wordlist_size};
