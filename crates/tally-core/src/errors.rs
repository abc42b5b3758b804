//! Cross-cutting error types for Tally.
//!
//! Persistence errors (`DatabaseError`) live in `tally-db` and configuration
//! errors in `tally-config`. The binary converges everything into `anyhow`.

use thiserror::Error;

/// Errors raised by the pure core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A string did not match any variant of a closed enum.
    #[error("Invalid {kind} value: '{value}'")]
    InvalidEnum { kind: &'static str, value: String },
}
