use anyhow::Context;
use clap::ValueEnum;
use uuid::Uuid;

use tally_core::identity::Scope;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Raw,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub limit: Option<u32>,
    pub tenant: Option<Uuid>,
    pub actor: Option<Uuid>,
    pub db: Option<String>,
}

impl GlobalFlags {
    /// Identity every data command runs under.
    pub fn scope(&self) -> anyhow::Result<Scope> {
        let tenant = self
            .tenant
            .context("--tenant (or TALLY_TENANT) is required for this command")?;
        let actor = self
            .actor
            .context("--actor (or TALLY_ACTOR) is required for this command")?;
        Ok(Scope::new(actor, tenant))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{GlobalFlags, OutputFormat};

    fn flags(tenant: Option<Uuid>, actor: Option<Uuid>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            tenant,
            actor,
            db: None,
        }
    }

    #[test]
    fn scope_requires_tenant() {
        let err = flags(None, Some(Uuid::new_v4())).scope().unwrap_err();
        assert!(err.to_string().contains("--tenant"));
    }

    #[test]
    fn scope_requires_actor() {
        let err = flags(Some(Uuid::new_v4()), None).scope().unwrap_err();
        assert!(err.to_string().contains("--actor"));
    }

    #[test]
    fn scope_carries_both_ids() {
        let tenant = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let scope = flags(Some(tenant), Some(actor)).scope().expect("scope");
        assert_eq!(scope.tenant_id, tenant);
        assert_eq!(scope.actor_id, actor);
    }
}
