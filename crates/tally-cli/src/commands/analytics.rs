use crate::cli::GlobalFlags;
use crate::cli::root_commands::AnalyticsArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tally analytics`.
pub async fn handle(
    args: &AnalyticsArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let scope = flags.scope()?;
    let result = ctx
        .service
        .objective_analytics(scope, args.objective_id)
        .await?;
    output(&result, flags.format)
}
