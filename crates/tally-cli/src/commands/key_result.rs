#[path = "key_result/create.rs"]
mod create;
#[path = "key_result/update.rs"]
mod update;

use serde::Serialize;
use uuid::Uuid;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::KeyResultCommands;
use crate::context::AppContext;
use crate::output::{Deleted, output};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Contributors {
    key_result_id: Uuid,
    contributors: Vec<Uuid>,
}

/// Handle `tally key-result`.
pub async fn handle(
    action: &KeyResultCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let scope = flags.scope()?;
    match action {
        KeyResultCommands::Create {
            objective,
            name,
            description,
            priority,
            unit,
            start_value,
            target_value,
            current_value,
            lead,
            team,
            due_date,
            contributors,
            comment,
        } => {
            let params = create::Params {
                objective: *objective,
                name: name.clone(),
                description: description.clone(),
                priority: priority.clone(),
                unit: unit.clone(),
                start_value: *start_value,
                target_value: *target_value,
                current_value: *current_value,
                lead: *lead,
                team: *team,
                due_date: due_date.clone(),
                contributors: contributors.clone(),
            };
            create::run(params, comment, scope, ctx, flags).await
        }
        KeyResultCommands::Update {
            id,
            name,
            description,
            priority,
            unit,
            start_value,
            target_value,
            current_value,
            lead,
            team,
            due_date,
            contributors,
            clear_contributors,
            json,
            comment,
        } => {
            let params = update::Params {
                id: *id,
                name: name.clone(),
                description: description.clone(),
                priority: priority.clone(),
                unit: unit.clone(),
                start_value: *start_value,
                target_value: *target_value,
                current_value: *current_value,
                lead: lead.clone(),
                team: team.clone(),
                due_date: due_date.clone(),
                contributors: contributors.clone(),
                clear_contributors: *clear_contributors,
                json: json.clone(),
            };
            update::run(params, comment, scope, ctx, flags).await
        }
        KeyResultCommands::List { objective } => {
            let mut key_results = ctx.service.list_key_results(scope, *objective).await?;
            if let Some(limit) = flags.limit {
                key_results.truncate(usize::try_from(limit)?);
            }
            output(&key_results, flags.format)
        }
        KeyResultCommands::Get { id } => {
            let key_result = ctx.service.get_key_result(scope, *id).await?;
            output(&key_result, flags.format)
        }
        KeyResultCommands::Contributors { id } => {
            let contributors = ctx.service.key_result_contributors(scope, *id).await?;
            output(
                &Contributors {
                    key_result_id: *id,
                    contributors,
                },
                flags.format,
            )
        }
        KeyResultCommands::Delete { id, comment } => {
            ctx.service.delete_key_result(scope, *id, comment).await?;
            output(&Deleted::new(*id), flags.format)
        }
    }
}
