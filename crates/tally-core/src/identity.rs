use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller identity and tenant for one request.
///
/// Produced by the host's auth/membership layer and passed into every
/// mutation and query. This crate never resolves it itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Scope {
    /// The acting user, recorded on audit events.
    pub actor_id: Uuid,
    /// The workspace every read and write is confined to.
    pub tenant_id: Uuid,
}

impl Scope {
    #[must_use]
    pub const fn new(actor_id: Uuid, tenant_id: Uuid) -> Self {
        Self {
            actor_id,
            tenant_id,
        }
    }
}
