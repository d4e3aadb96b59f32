//! Runtime configuration
//!
//! Read from environment variables at startup.

use std::path::PathBuf;

use crate::measurement::MeasurementSystem;

pub const DATABASE_PATH_ENV: &str = "MEALPREP_DATABASE_PATH";
pub const DEFAULT_SYSTEM_ENV: &str = "MEALPREP_DEFAULT_SYSTEM";

/// Log directive applied on top of `RUST_LOG`
pub const DEFAULT_LOG_DIRECTIVE: &str = "mealprep=info";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    /// Seeded into the preferences row the first time it is read
    pub default_system: MeasurementSystem,
}

impl Config {
    pub fn from_env() -> Self {
        let database_path = std::env::var(DATABASE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let default_system = std::env::var(DEFAULT_SYSTEM_ENV)
            .ok()
            .and_then(|s| parse_default_system(&s))
            .unwrap_or_default();

        Self {
            database_path,
            default_system,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            default_system: MeasurementSystem::default(),
        }
    }
}

fn parse_default_system(value: &str) -> Option<MeasurementSystem> {
    let parsed = MeasurementSystem::from_str(value);
    if parsed.is_none() {
        tracing::warn!(value, "ignoring invalid {}", DEFAULT_SYSTEM_ENV);
    }
    parsed
}

/// `<project root>/data/mealprep.db`, where the project root is found by
/// walking up out of `target/{debug,release}` when run via cargo
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("mealprep.db");
    path
}
