//! Repository methods, implemented as `impl TallyService` blocks.
//!
//! Every read and write is scoped to the caller's tenant. A row owned by
//! another tenant is reported as `NotFound`, never as a permission error.

pub mod analytics;
pub mod audit;
pub mod key_result;
pub mod objective;
