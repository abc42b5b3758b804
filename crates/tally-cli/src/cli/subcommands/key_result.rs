use clap::Subcommand;
use uuid::Uuid;

/// Key result entity commands.
#[derive(Clone, Debug, Subcommand)]
pub enum KeyResultCommands {
    /// Create a key result under an objective.
    Create {
        #[arg(long)]
        objective: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        start_value: f64,
        #[arg(long, allow_negative_numbers = true)]
        target_value: f64,
        /// Defaults to the start value.
        #[arg(long, allow_negative_numbers = true)]
        current_value: Option<f64>,
        #[arg(long)]
        lead: Option<Uuid>,
        #[arg(long)]
        team: Option<Uuid>,
        #[arg(long)]
        due_date: Option<String>,
        /// Repeat for each contributor.
        #[arg(long = "contributor")]
        contributors: Vec<Uuid>,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Update a key result. Reference and date flags accept `none` to clear.
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        start_value: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        target_value: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        current_value: Option<f64>,
        #[arg(long)]
        lead: Option<String>,
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        due_date: Option<String>,
        /// Replaces the whole contributor set. Repeat for each contributor.
        #[arg(long = "contributor")]
        contributors: Vec<Uuid>,
        /// Replace the contributor set with an empty one.
        #[arg(long, conflicts_with = "contributors")]
        clear_contributors: bool,
        /// Raw JSON object of wire field names to values.
        #[arg(long)]
        json: Option<String>,
        /// Attached to the audit events of the changed fields.
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// List key results of an objective.
    List {
        #[arg(long)]
        objective: Uuid,
    },
    /// Get a key result by ID.
    Get { id: Uuid },
    /// Show the contributor set of a key result.
    Contributors { id: Uuid },
    /// Delete a key result.
    Delete {
        id: Uuid,
        #[arg(long, default_value = "")]
        comment: String,
    },
}
