//! Utility to set the display measurement system in the database
//!
//! Usage: set_measurement_system <metric|imperial>

use mealprep::config::Config;
use mealprep::db::{migrations, Database};
use mealprep::measurement::MeasurementSystem;
use mealprep::models::UserPreferences;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let arg = std::env::args()
        .nth(1)
        .ok_or("usage: set_measurement_system <metric|imperial>")?;
    let system = MeasurementSystem::from_str(&arg)
        .ok_or_else(|| format!("unknown measurement system '{}': expected metric or imperial", arg))?;

    let config = Config::from_env();
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    println!("Database path: {}", config.database_path.display());

    let database = Database::new(&config.database_path)?;
    database.with_conn(migrations::run_migrations)?;

    database.with_conn(|conn| {
        let prefs = UserPreferences::set_measurement_system(conn, system)?;
        println!("Measurement system set:");
        println!("  System: {}", prefs.measurement_system);
        println!("  Updated: {}", prefs.updated_at);
        Ok(())
    })?;

    Ok(())
}
