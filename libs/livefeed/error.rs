use thiserror::Error;

/// Error taxonomy of the ingestion path.
///
/// None of these are fatal: the engine counts them in
/// [`IngestStats`](crate::engine::IngestStats) and keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Tokenizer could not split an item into key/action/payload
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A delta could not be mapped to any event
    #[error("Unresolvable correlation: fixture={fixture} selection={selection}")]
    UnresolvableCorrelation { fixture: String, selection: String },

    /// Odds or line value that failed to parse
    #[error("Malformed numeric value: {0}")]
    MalformedNumeric(String),
}

/// Result type for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;
