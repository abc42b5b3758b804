use uuid::Uuid;

use tally_core::enums::{ObjectiveStatus, RelationKind};
use tally_core::identity::Scope;
use tally_core::proposed::ProposedUpdate;
use tally_db::updates::ObjectiveUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{
    parse_clearable_datetime, parse_clearable_uuid, parse_enum, parse_json_object,
};
use crate::context::AppContext;
use crate::output::output;

pub struct Params {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub lead: Option<String>,
    pub team: Option<String>,
    pub start_date: Option<String>,
    pub target_date: Option<String>,
    pub json: Option<String>,
}

pub async fn run(
    params: Params,
    comment: &str,
    scope: Scope,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    validate_update_params(&params)?;
    let proposed = build_update(&params)?;

    let outcome = ctx
        .service
        .update_objective(scope, params.id, &proposed, comment)
        .await?;
    if outcome.is_noop() {
        tracing::info!(id = %params.id, "objective already matches; nothing written");
    }
    output(&outcome, flags.format)
}

fn has_field_flags(params: &Params) -> bool {
    params.name.is_some()
        || params.description.is_some()
        || params.status.is_some()
        || params.lead.is_some()
        || params.team.is_some()
        || params.start_date.is_some()
        || params.target_date.is_some()
}

fn validate_update_params(params: &Params) -> anyhow::Result<()> {
    match (has_field_flags(params), params.json.is_some()) {
        (false, false) => anyhow::bail!(
            "At least one of --name, --description, --status, --lead, --team, --start-date, --target-date or --json must be provided"
        ),
        (true, true) => anyhow::bail!("--json cannot be combined with individual field flags"),
        _ => Ok(()),
    }
}

fn build_update(params: &Params) -> anyhow::Result<ProposedUpdate> {
    if let Some(body) = params.json.as_deref() {
        return Ok(ProposedUpdate::from_json(
            RelationKind::Objective,
            parse_json_object(body)?,
        ));
    }

    let mut builder = ObjectiveUpdateBuilder::new();
    if let Some(name) = params.name.as_deref() {
        builder = builder.name(name);
    }
    if let Some(description) = params.description.as_deref() {
        builder = builder.description(description);
    }
    if let Some(status) = params.status.as_deref() {
        builder = builder.status(parse_enum::<ObjectiveStatus>(status, "status")?);
    }
    if let Some(lead) = params.lead.as_deref() {
        builder = builder.lead_id(parse_clearable_uuid(lead, "lead")?);
    }
    if let Some(team) = params.team.as_deref() {
        builder = builder.team_id(parse_clearable_uuid(team, "team")?);
    }
    if let Some(start) = params.start_date.as_deref() {
        builder = builder.start_date(parse_clearable_datetime(start, "start-date")?);
    }
    if let Some(target) = params.target_date.as_deref() {
        builder = builder.target_date(parse_clearable_datetime(target, "target-date")?);
    }
    Ok(builder.build())
}
