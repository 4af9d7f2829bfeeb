//! Error types for sweeper operations

use clearance_domain::CollaboratorError;
use thiserror::Error;

/// Errors that abort a sweeper request as a whole
///
/// Failures of a single product never surface here; they are recorded as
/// an error outcome and the batch continues.
#[derive(Error, Debug)]
pub enum SweeperError {
    /// The candidate list could not be fetched
    #[error("Failed to fetch candidates: {0}")]
    CandidateFetch(#[from] CollaboratorError),

    /// The request itself is unusable
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker error (scheduling or runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}
