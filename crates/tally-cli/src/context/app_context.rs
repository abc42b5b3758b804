use anyhow::Context;
use tally_config::TallyConfig;
use tally_db::TallyService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: TallyService,
}

impl AppContext {
    /// Open the database named by the configuration and start the audit
    /// recorder.
    pub async fn init(config: &TallyConfig) -> anyhow::Result<Self> {
        let service = TallyService::open(config)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?;

        tracing::debug!(
            path = %config.database.path,
            audit_enabled = config.audit.enabled,
            "application context ready"
        );

        Ok(Self { service })
    }
}
