use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::subcommands::{KeyResultCommands, ObjectiveCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Objectives.
    Objective {
        #[command(subcommand)]
        action: ObjectiveCommands,
    },
    /// Key results.
    #[command(name = "key-result", visible_alias = "kr")]
    KeyResult {
        #[command(subcommand)]
        action: KeyResultCommands,
    },
    /// View the audit trail of one entity.
    Audit(AuditArgs),
    /// Compute analytics for an objective.
    Analytics(AnalyticsArgs),
    /// Dump JSON schema for a response type.
    Schema(SchemaArgs),
}

/// Arguments for `tally audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// Objective or key result id.
    pub entity_id: Uuid,
    /// 1-based page number, newest events first.
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Events per page (falls back to --limit, then configuration).
    #[arg(long)]
    pub page_size: Option<u32>,
}

/// Arguments for `tally analytics`.
#[derive(Clone, Debug, Args)]
pub struct AnalyticsArgs {
    pub objective_id: Uuid,
}

/// Arguments for `tally schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// One of: objective, key-result, audit-event, analytics.
    pub type_name: String,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use uuid::Uuid;

    use crate::cli::{Cli, Commands};

    #[test]
    fn audit_defaults_to_first_page() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from(["tally", "audit", &id.to_string()]).expect("cli should parse");
        let Commands::Audit(args) = cli.command else {
            panic!("expected audit command");
        };
        assert_eq!(args.entity_id, id);
        assert_eq!(args.page, 1);
        assert_eq!(args.page_size, None);
    }

    #[test]
    fn key_result_alias_parses() {
        let cli = Cli::try_parse_from(["tally", "kr", "get", &Uuid::new_v4().to_string()])
            .expect("cli should parse");
        assert!(matches!(cli.command, Commands::KeyResult { .. }));
    }

    #[test]
    fn schema_takes_type_name() {
        let cli = Cli::try_parse_from(["tally", "schema", "objective"]).expect("cli should parse");
        let Commands::Schema(args) = cli.command else {
            panic!("expected schema command");
        };
        assert_eq!(args.type_name, "objective");
    }
}
