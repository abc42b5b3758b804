//! Typed update builders.
//!
//! Each builder records only the fields the caller touched and produces a
//! [`ProposedUpdate`](tally_core::proposed::ProposedUpdate) for the
//! mutation pipeline. The diff engine then drops whatever did not change.

pub mod key_result;
pub mod objective;

pub use key_result::KeyResultUpdateBuilder;
pub use objective::ObjectiveUpdateBuilder;
