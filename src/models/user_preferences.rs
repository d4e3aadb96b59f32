//! User preferences model
//!
//! Single-row table holding the reader's display preferences.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::measurement::MeasurementSystem;

/// Display preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub measurement_system: MeasurementSystem,
    pub dietary_restrictions: Vec<String>,
    pub updated_at: String,
}

impl UserPreferences {
    /// Read the stored preferences, if any have been saved
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let row = conn
            .query_row(
                "SELECT measurement_system, dietary_restrictions, updated_at FROM user_preferences WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((system, restrictions, updated_at)) = row else {
            return Ok(None);
        };

        let measurement_system =
            MeasurementSystem::from_str(&system).ok_or_else(|| DbError::Invalid {
                field: "measurement_system",
                reason: format!("unknown system '{}'", system),
            })?;

        Ok(Some(Self {
            measurement_system,
            dietary_restrictions: serde_json::from_str(&restrictions)?,
            updated_at,
        }))
    }

    /// Read the stored preferences, seeding the row with `default_system` first if needed
    pub fn get_or_init(conn: &Connection, default_system: MeasurementSystem) -> DbResult<Self> {
        conn.execute(
            "INSERT OR IGNORE INTO user_preferences (id, measurement_system) VALUES (1, ?1)",
            [default_system.to_db_str()],
        )?;

        Self::get(conn)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn set_measurement_system(conn: &Connection, system: MeasurementSystem) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO user_preferences (id, measurement_system) VALUES (1, ?1)
            ON CONFLICT(id) DO UPDATE SET
                measurement_system = excluded.measurement_system,
                updated_at = datetime('now')
            "#,
            [system.to_db_str()],
        )?;

        tracing::info!(%system, "measurement system preference updated");
        Self::get_or_init(conn, system)
    }

    pub fn set_dietary_restrictions(
        conn: &Connection,
        restrictions: &[String],
        default_system: MeasurementSystem,
    ) -> DbResult<Self> {
        let cleaned: Vec<String> = restrictions
            .iter()
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .collect();

        conn.execute(
            r#"
            INSERT INTO user_preferences (id, measurement_system, dietary_restrictions) VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                dietary_restrictions = excluded.dietary_restrictions,
                updated_at = datetime('now')
            "#,
            params![default_system.to_db_str(), serde_json::to_string(&cleaned)?],
        )?;

        Self::get_or_init(conn, default_system)
    }
}
