//! Entity structs for Tally's mutable records and their audit trail.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! roundtrip and schema export. Mutable entities also implement
//! [`Snapshot`](crate::diff::Snapshot) so the diff engine can read them.

mod audit;
mod key_result;
mod objective;

pub use audit::AuditEvent;
pub use key_result::{KeyResult, NewKeyResult};
pub use objective::{NewObjective, Objective};
