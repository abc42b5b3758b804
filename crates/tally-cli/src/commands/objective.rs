#[path = "objective/create.rs"]
mod create;
#[path = "objective/update.rs"]
mod update;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ObjectiveCommands;
use crate::context::AppContext;
use crate::output::{Deleted, output};

/// Handle `tally objective`.
pub async fn handle(
    action: &ObjectiveCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let scope = flags.scope()?;
    match action {
        ObjectiveCommands::Create {
            name,
            description,
            status,
            lead,
            team,
            start_date,
            target_date,
            comment,
        } => {
            let params = create::Params {
                name: name.clone(),
                description: description.clone(),
                status: status.clone(),
                lead: *lead,
                team: *team,
                start_date: start_date.clone(),
                target_date: target_date.clone(),
            };
            create::run(params, comment, scope, ctx, flags).await
        }
        ObjectiveCommands::Update {
            id,
            name,
            description,
            status,
            lead,
            team,
            start_date,
            target_date,
            json,
            comment,
        } => {
            let params = update::Params {
                id: *id,
                name: name.clone(),
                description: description.clone(),
                status: status.clone(),
                lead: lead.clone(),
                team: team.clone(),
                start_date: start_date.clone(),
                target_date: target_date.clone(),
                json: json.clone(),
            };
            update::run(params, comment, scope, ctx, flags).await
        }
        ObjectiveCommands::List => {
            let mut objectives = ctx.service.list_objectives(scope).await?;
            if let Some(limit) = flags.limit {
                objectives.truncate(usize::try_from(limit)?);
            }
            output(&objectives, flags.format)
        }
        ObjectiveCommands::Get { id } => {
            let objective = ctx.service.get_objective(scope, *id).await?;
            output(&objective, flags.format)
        }
        ObjectiveCommands::Delete { id, comment } => {
            ctx.service.delete_objective(scope, *id, comment).await?;
            output(&Deleted::new(*id), flags.format)
        }
    }
}
