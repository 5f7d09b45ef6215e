use thiserror::Error;

/// Errors that can occur while computing a medial axis transform.
///
/// Only malformed input and broken call contracts end up here. Expected
/// degeneracies (1-prongs, non-converging searches) are reported as
/// outcome values by the solvers instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MatError {
    #[error("no boundary loops in input")]
    NoLoops,

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("3-prong search needs at least 3 boundary pieces, got {0}")]
    TooFewDeltas(usize),

    #[error("no contact points found on the boundary")]
    NoContacts,
}
