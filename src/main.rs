//! Galaxy task service
//!
//! REST API over tasks, scheduling records and task configuration stored
//! in SQLite.

use anyhow::{Context, Result};
use clap::Parser;
use galaxy::cli::{Cli, Command};
use galaxy::config::{AppInfo, Config};
use galaxy::db::Database;
use galaxy::logging::{self, LogTarget};
use galaxy::server::{AppState, start_server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    logging::init(&LogTarget::parse(&cli.log), config.log.level.to_tracing())?;

    config.report();

    let db = Database::open(&config.server.db_path)
        .with_context(|| format!("failed to open database {}", config.server.db_path.display()))?;

    match cli.command() {
        Command::Migrate => {
            let version = db.schema_version()?;
            match version {
                Some(v) => println!("Schema version: {}", v),
                None => println!("No migrations applied"),
            }
        }
        Command::Serve => {
            let app = AppInfo::new(&config.app);
            info!(node_id = %app.node_id, version = %app.version, "Starting {}", app.app);

            let state = AppState::new(db, app);
            let server = start_server(state, &config.server.host, config.server.port).await?;

            tokio::signal::ctrl_c().await?;
            info!("Received Ctrl-C");
            server.shutdown().await;
        }
    }

    Ok(())
}
