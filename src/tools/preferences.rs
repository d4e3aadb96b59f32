//! Preference MCP Tools
//!
//! Read and change the reader's display preferences.

use crate::db::Database;
use crate::measurement::MeasurementSystem;
use crate::models::UserPreferences;

/// Get preferences, seeding defaults on first use
pub fn get_preferences(
    db: &Database,
    default_system: MeasurementSystem,
) -> Result<UserPreferences, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    UserPreferences::get_or_init(&conn, default_system)
        .map_err(|e| format!("Failed to read preferences: {}", e))
}

/// Set the measurement system ("metric" or "imperial")
pub fn set_measurement_system(db: &Database, system: &str) -> Result<UserPreferences, String> {
    let system = MeasurementSystem::from_str(system).ok_or_else(|| {
        format!(
            "Invalid measurement system '{}': expected 'metric' or 'imperial'",
            system
        )
    })?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    UserPreferences::set_measurement_system(&conn, system)
        .map_err(|e| format!("Failed to save preferences: {}", e))
}

/// Replace the dietary restriction list
pub fn set_dietary_restrictions(
    db: &Database,
    restrictions: &[String],
    default_system: MeasurementSystem,
) -> Result<UserPreferences, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    UserPreferences::set_dietary_restrictions(&conn, restrictions, default_system)
        .map_err(|e| format!("Failed to save preferences: {}", e))
}
