use uuid::Uuid;

use tally_core::entities::NewKeyResult;
use tally_core::enums::Priority;
use tally_core::identity::Scope;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{parse_datetime, parse_enum};
use crate::context::AppContext;
use crate::output::output;

pub struct Params {
    pub objective: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub unit: Option<String>,
    pub start_value: f64,
    pub target_value: f64,
    pub current_value: Option<f64>,
    pub lead: Option<Uuid>,
    pub team: Option<Uuid>,
    pub due_date: Option<String>,
    pub contributors: Vec<Uuid>,
}

pub async fn run(
    params: Params,
    comment: &str,
    scope: Scope,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let new = build_new(params)?;
    let key_result = ctx.service.create_key_result(scope, new, comment).await?;
    output(&key_result, flags.format)
}

fn build_new(params: Params) -> anyhow::Result<NewKeyResult> {
    Ok(NewKeyResult {
        objective_id: params.objective,
        name: params.name,
        description: params.description.unwrap_or_default(),
        priority: params
            .priority
            .as_deref()
            .map(|raw| parse_enum::<Priority>(raw, "priority"))
            .transpose()?,
        unit: params.unit.unwrap_or_default(),
        start_value: params.start_value,
        target_value: params.target_value,
        current_value: params.current_value,
        lead_id: params.lead,
        team_id: params.team,
        due_date: params
            .due_date
            .as_deref()
            .map(|raw| parse_datetime(raw, "due-date"))
            .transpose()?,
        contributors: params.contributors,
    })
}
