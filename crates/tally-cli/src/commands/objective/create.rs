use tally_core::entities::NewObjective;
use tally_core::enums::ObjectiveStatus;
use tally_core::identity::Scope;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{parse_datetime, parse_enum};
use crate::context::AppContext;
use crate::output::output;

pub struct Params {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub lead: Option<uuid::Uuid>,
    pub team: Option<uuid::Uuid>,
    pub start_date: Option<String>,
    pub target_date: Option<String>,
}

pub async fn run(
    params: Params,
    comment: &str,
    scope: Scope,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let new = build_new(params)?;
    let objective = ctx.service.create_objective(scope, new, comment).await?;
    output(&objective, flags.format)
}

fn build_new(params: Params) -> anyhow::Result<NewObjective> {
    Ok(NewObjective {
        name: params.name,
        description: params.description.unwrap_or_default(),
        status: params
            .status
            .as_deref()
            .map(|raw| parse_enum::<ObjectiveStatus>(raw, "status"))
            .transpose()?,
        lead_id: params.lead,
        team_id: params.team,
        start_date: params
            .start_date
            .as_deref()
            .map(|raw| parse_datetime(raw, "start-date"))
            .transpose()?,
        target_date: params
            .target_date
            .as_deref()
            .map(|raw| parse_datetime(raw, "target-date"))
            .transpose()?,
    })
}
