use snake_scores::api;
use snake_scores::cli::Cli;
use snake_scores::config::Settings;
use snake_scores::storage::ScoreStore;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::new(&cli)?;

    // RUST_LOG directives, if any, refine the configured level.
    let filter = EnvFilter::builder()
        .with_default_directive(settings.get_trace_level().into())
        .from_env_lossy();
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if cli.config.exists() {
        info!("Loaded local configuration from '{}'.", cli.config.display());
    }

    // Scores live only as long as the process does.
    let store = ScoreStore::with_capacity(settings.max_scores);
    info!(
        "Initialized score store (keeping the {} most recent scores).",
        store.capacity()
    );

    api::serve(&settings, store).await?;

    Ok(())
}
