use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::effective_page_size;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tally audit`.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let scope = flags.scope()?;
    let page_size = effective_page_size(args.page_size, flags.limit);

    let page = ctx
        .service
        .audit_history(scope, args.entity_id, args.page, page_size)
        .await?;
    output(&page, flags.format)
}
