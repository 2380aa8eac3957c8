use thiserror::Error;

/// Fatal errors surfaced by the generation core.
///
/// Non-fatal outcomes (a too-short candidate, an exhausted retry budget) are
/// data carried in [`crate::scorer::ScoreReport`] and
/// [`crate::session::SessionOutcome`], not errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The operating system's secure random source could not be read.
    /// There is no fallback: a weak generator would silently void the
    /// security contract of every password produced after the failure.
    #[error("secure entropy source unavailable: {0}")]
    EntropyUnavailable(#[from] getrandom::Error),

    /// The dictionary contained no usable words after normalization.
    #[error("dictionary contains no usable words")]
    EmptyDictionary,
}

pub type Result<T> = std::result::Result<T, Error>;
