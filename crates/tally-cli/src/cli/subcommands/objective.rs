use clap::Subcommand;
use uuid::Uuid;

/// Objective entity commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ObjectiveCommands {
    /// Create an objective.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        lead: Option<Uuid>,
        #[arg(long)]
        team: Option<Uuid>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        target_date: Option<String>,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Update an objective. Reference and date flags accept `none` to clear.
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        lead: Option<String>,
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        target_date: Option<String>,
        /// Raw JSON object of wire field names to values.
        #[arg(long)]
        json: Option<String>,
        /// Attached to the audit events of the changed fields.
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// List objectives in the tenant.
    List,
    /// Get an objective by ID.
    Get { id: Uuid },
    /// Delete an objective and its key results.
    Delete {
        id: Uuid,
        #[arg(long, default_value = "")]
        comment: String,
    },
}
