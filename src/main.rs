// Roster viewer entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config
// 3. Assemble the merged player mapping (cache or fresh fetch)
// 4. Build player records, the lookup index, and the list views
// 5. Serve the web pages until interrupted

use rosterview::config;
use rosterview::server;
use rosterview::sources;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("roster viewer starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "config loaded: {} teams, stats season {}, projection season {}",
        config.teams.len(),
        config.sources.stats_season,
        config.sources.projection_season
    );

    // 3. Assemble the merged player mapping
    let assembler =
        sources::Assembler::from_config(&config).context("failed to build assembler")?;
    let entries = assembler
        .load()
        .await
        .context("failed to load player data")?;
    info!("assembled {} merged player entries", entries.len());

    // 4. Build records, index, and list views (the index is read-only from
    //    here on; handlers only search it)
    let state = Arc::new(server::build_state(&entries, config.teams.clone()));
    info!(
        "lookup index built: {} records, height {}",
        state.index.len(),
        state.index.height()
    );

    // 5. Serve until interrupted
    server::serve(state, &config.server.bind, config.server.port)
        .await
        .context("server error")?;

    info!("roster viewer shut down cleanly");
    Ok(())
}

/// Initialize tracing to stderr, filtered by RUST_LOG when set.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rosterview=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
