//! MealPrep Agent
//!
//! An MCP server for recipes with metric/imperial display conversion.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use mealprep::build_info;
use mealprep::config::{Config, DEFAULT_LOG_DIRECTIVE};
use mealprep::db::{migrations, Database};
use mealprep::mcp::MealPrepService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interfere with MCP stdio
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(DEFAULT_LOG_DIRECTIVE.parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::log_startup_banner();

    let config = Config::from_env();
    tracing::info!(
        path = %config.database_path.display(),
        default_system = %config.default_system,
        "starting MCP server on stdio"
    );

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path)?;

    database.with_conn(|conn| {
        migrations::run_migrations(conn)?;
        let version = migrations::get_schema_version(conn)?;
        tracing::info!(version, "database ready");
        Ok(())
    })?;

    let service = MealPrepService::new(config.database_path, database, config.default_system);

    let server = service.serve((stdin(), stdout())).await?;
    server.waiting().await?;

    Ok(())
}
