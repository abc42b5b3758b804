use clap::Parser;
use uuid::Uuid;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `tally` binary.
#[derive(Debug, Parser)]
#[command(name = "tally", version, about = "Tally - objectives, key results and their audit trail")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Tenant the command operates in
    #[arg(long, global = true, env = "TALLY_TENANT")]
    pub tenant: Option<Uuid>,

    /// User performing the command, recorded on audit events
    #[arg(long, global = true, env = "TALLY_ACTOR")]
    pub actor: Option<Uuid>,

    /// Database path, overriding configuration
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            tenant: self.tenant,
            actor: self.actor,
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use uuid::Uuid;

    use super::{Cli, Commands, GlobalFlags, OutputFormat};
    use crate::cli::subcommands::ObjectiveCommands;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "tally",
            "--format",
            "table",
            "--limit",
            "10",
            "--verbose",
            "objective",
            "list",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Objective {
                action: ObjectiveCommands::List
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["tally", "objective", "list", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["tally", "--format", "xml", "objective", "list"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn tenant_must_be_a_uuid() {
        let parsed = Cli::try_parse_from(["tally", "--tenant", "acme", "objective", "list"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let tenant = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "tally",
            "--tenant",
            &tenant.to_string(),
            "--actor",
            &actor.to_string(),
            "--db",
            "/tmp/tally.db",
            "objective",
            "list",
        ])
        .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.tenant, Some(tenant));
        assert_eq!(flags.actor, Some(actor));
        assert_eq!(flags.db.as_deref(), Some("/tmp/tally.db"));
    }
}
