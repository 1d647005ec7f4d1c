//! Error types for llq.
//!
//! A single `thiserror` enum covering every fallible surface in the crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlqError>;

#[derive(Error, Debug)]
pub enum LlqError {
    /// A line failed to parse as JSON. Recoverable: the Ingestor logs it
    /// and skips the line rather than stopping the tail.
    #[error("failed to parse line as JSON: {line:?}: {source}")]
    ParseLine {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// Two indices could not be merged because their ranges leave a gap.
    /// Fatal — the master index would silently lose lines otherwise.
    #[error("index merge gap: a_end={a_end}, b_start={b_start}")]
    IndexGap { a_end: u64, b_start: u64 },

    /// Failed to open the log file at startup. Fatal.
    #[error("failed to open log file: {0}")]
    IoOpen(#[from] std::io::Error),

    /// A read on the already-open log file failed. Fatal to the Ingestor
    /// thread; kept distinct from `IoOpen` since it can't be `#[from]`
    /// without colliding with it.
    #[error("failed to read log file: {0}")]
    IoRead(std::io::Error),

    /// `--query <expr>` did not parse. Only reachable from the one-shot
    /// CLI path; the live UI never surfaces a parse failure as an error,
    /// it just declines to submit the query.
    #[error("invalid query expression: {0}")]
    InvalidQuery(String),
}

impl From<crate::index::IndexGap> for LlqError {
    fn from(gap: crate::index::IndexGap) -> LlqError {
        LlqError::IndexGap {
            a_end: gap.a_end,
            b_start: gap.b_start,
        }
    }
}
