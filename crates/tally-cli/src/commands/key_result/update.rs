use uuid::Uuid;

use tally_core::enums::{Priority, RelationKind};
use tally_core::identity::Scope;
use tally_core::proposed::ProposedUpdate;
use tally_db::updates::KeyResultUpdateBuilder;

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
    pub priority: Option<String>,
    pub unit: Option<String>,
    pub start_value: Option<f64>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub lead: Option<String>,
    pub team: Option<String>,
    pub due_date: Option<String>,
    pub contributors: Vec<Uuid>,
    pub clear_contributors: bool,
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
        .update_key_result(scope, params.id, &proposed, comment)
        .await?;
    if outcome.is_noop() {
        tracing::info!(id = %params.id, "key result already matches; nothing written");
    }
    output(&outcome, flags.format)
}

fn has_field_flags(params: &Params) -> bool {
    params.name.is_some()
        || params.description.is_some()
        || params.priority.is_some()
        || params.unit.is_some()
        || params.start_value.is_some()
        || params.target_value.is_some()
        || params.current_value.is_some()
        || params.lead.is_some()
        || params.team.is_some()
        || params.due_date.is_some()
        || !params.contributors.is_empty()
        || params.clear_contributors
}

fn validate_update_params(params: &Params) -> anyhow::Result<()> {
    match (has_field_flags(params), params.json.is_some()) {
        (false, false) => anyhow::bail!(
            "At least one field flag (--name, --priority, --current-value, --contributor, ...) or --json must be provided"
        ),
        (true, true) => anyhow::bail!("--json cannot be combined with individual field flags"),
        _ => Ok(()),
    }
}

fn build_update(params: &Params) -> anyhow::Result<ProposedUpdate> {
    if let Some(body) = params.json.as_deref() {
        return Ok(ProposedUpdate::from_json(
            RelationKind::KeyResult,
            parse_json_object(body)?,
        ));
    }

    let mut builder = KeyResultUpdateBuilder::new();
    if let Some(name) = params.name.as_deref() {
        builder = builder.name(name);
    }
    if let Some(description) = params.description.as_deref() {
        builder = builder.description(description);
    }
    if let Some(priority) = params.priority.as_deref() {
        builder = builder.priority(parse_enum::<Priority>(priority, "priority")?);
    }
    if let Some(unit) = params.unit.as_deref() {
        builder = builder.unit(unit);
    }
    if let Some(value) = params.start_value {
        builder = builder.start_value(value);
    }
    if let Some(value) = params.target_value {
        builder = builder.target_value(value);
    }
    if let Some(value) = params.current_value {
        builder = builder.current_value(value);
    }
    if let Some(lead) = params.lead.as_deref() {
        builder = builder.lead_id(parse_clearable_uuid(lead, "lead")?);
    }
    if let Some(team) = params.team.as_deref() {
        builder = builder.team_id(parse_clearable_uuid(team, "team")?);
    }
    if let Some(due) = params.due_date.as_deref() {
        builder = builder.due_date(parse_clearable_datetime(due, "due-date")?);
    }
    if params.clear_contributors {
        builder = builder.contributors(Vec::new());
    } else if !params.contributors.is_empty() {
        builder = builder.contributors(params.contributors.clone());
    }
    Ok(builder.build())
}
