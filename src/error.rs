use thiserror::Error;

/// Raised when a zone geometry string cannot be decoded into a polygon.
/// A failed parse never yields a partial polygon.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedGeometryError {
    #[error("polygon ring is empty: {0:?}")]
    EmptyRing(String),

    #[error("invalid coordinate pair {pair:?}: {reason}")]
    InvalidPair { pair: String, reason: &'static str },

    #[error("polygon needs at least 3 coordinates, got {0}")]
    TooFewPoints(usize),
}
