use anyhow::{Context as _, Result};
use clap::Parser;
use symflow::app::{EngineConfig, MatchEngine};
use symflow::cli::{self, Cli, Commands};
use symflow::server::http;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "symflow=debug" } else { "symflow=info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = EngineConfig::load(args.config.as_deref())?;
    let engine = MatchEngine::load_from_json(&args.system, config)
        .with_context(|| format!("Failed to load system from {}", args.system.display()))?;

    match args.command {
        Commands::Summary => cli::display_summary(&engine),
        Commands::Match { signal, limit } => cli::display_matches(&engine, &signal, limit),
        Commands::MatchFirst { signal } => cli::display_best_match(&engine, &signal),
        Commands::Upstream {
            signals,
            label,
            entity,
        } => cli::display_upstream(&engine, &signals, label, entity),
        Commands::Serve { listen } => http::serve(engine, listen).await,
    }
}
