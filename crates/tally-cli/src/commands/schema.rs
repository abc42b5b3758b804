use schemars::{JsonSchema, Schema, schema_for};

use tally_core::analytics::AnalyticsResult;
use tally_core::entities::{AuditEvent, KeyResult, Objective};

use crate::cli::GlobalFlags;
use crate::cli::OutputFormat;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Type names accepted by `tally schema`.
pub const SCHEMA_TYPES: [&str; 4] = ["objective", "key-result", "audit-event", "analytics"];

/// Handle `tally schema`. Needs no database.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schema_named(&args.type_name)?;
    // A schema is a nested document; a table view of it says nothing.
    let format = match flags.format {
        OutputFormat::Table => OutputFormat::Json,
        other => other,
    };
    output(&schema, format)
}

fn schema_named(name: &str) -> anyhow::Result<Schema> {
    match name.replace('_', "-").as_str() {
        "objective" => Ok(schema::<Objective>()),
        "key-result" => Ok(schema::<KeyResult>()),
        "audit-event" => Ok(schema::<AuditEvent>()),
        "analytics" => Ok(schema::<AnalyticsResult>()),
        _ => anyhow::bail!(
            "unknown schema type '{name}' (expected one of: {})",
            SCHEMA_TYPES.join(", ")
        ),
    }
}

fn schema<T: JsonSchema>() -> Schema {
    schema_for!(T)
}
