use anyhow::Context;
use clap::Parser;

use tally_config::TallyConfig;

mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("tally error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();

    if let cli::Commands::Schema(args) = &cli.command {
        return commands::schema::handle(args, &flags);
    }

    let mut config = TallyConfig::load_with_dotenv().context("failed to load configuration")?;
    if let Some(path) = flags.db.as_deref() {
        config.database.path = path.to_string();
    }

    let ctx = context::AppContext::init(&config)
        .await
        .context("failed to initialize tally application context")?;

    let result = commands::dispatch::dispatch(cli.command, &ctx, &flags).await;
    // Audit appends are asynchronous; drain them before the runtime exits.
    ctx.service.audit().flush().await;
    result
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("TALLY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
