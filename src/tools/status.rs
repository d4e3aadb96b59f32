//! MealPrep Status Tool
//!
//! Runtime status and the usage guide for assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};
use crate::models::Recipe;

/// Usage guide returned by the `usage_instructions` tool
pub const USAGE_INSTRUCTIONS: &str = r#"
# MealPrep Usage

## Storing recipes

Always store ingredient amounts exactly as the author wrote them. Never
pre-convert: conversion happens when a recipe is read.

Canonical unit symbols:

| Family | Units |
|--------|-------|
| Weight | g, kg, oz, lb |
| Volume | ml, l, fl oz, cup, tbsp, tsp |
| Temperature | C, F |
| Length | cm, m, in, ft |
| Countable | piece, whole, slice, clove, head, bunch, can, package |

Other units ("pinch", "scoop") are stored and shown unchanged.

## Importing

`import_recipe` accepts the raw text of a generated recipe. The JSON may be
inside a ```json fence or inline. Ingredients may be objects
(`{"name", "amount", "unit"}`) or lines like "1 1/2 cups flour".

## Reading

`get_recipe` converts ingredients into the saved measurement system
(`set_measurement_system`), or into `measurement_system` if passed.
Large values are rescaled: 16 oz -> 1 lb, 8 fl oz -> 1 cup,
1000 ml -> 1 l, 1000 g -> 1 kg.

## Instructions

Use `reorder_instruction` with zero-based `from` and `to` to move a step.
"#;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct MealPrepStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: Option<i32>,
    pub recipe_count: Option<i64>,

    pub started_at: String,
    pub as_of: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Collects runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: DateTime<Utc>,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            database_path,
        }
    }

    /// Current status. Database figures are `None` if the database can't be read.
    pub fn get_status(&self, db: &Database) -> MealPrepStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let (schema_version, recipe_count) = match db.with_conn(|conn| {
            Ok((
                migrations::get_schema_version(conn)?,
                Recipe::count(conn, None, false)?,
            ))
        }) {
            Ok((version, count)) => (Some(version), Some(count)),
            Err(e) => {
                tracing::warn!(error = %e, "status could not read database");
                (None, None)
            }
        };

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        MealPrepStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            recipe_count,
            started_at: self.started_at.format(TIMESTAMP_FORMAT).to_string(),
            as_of: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_database;

    #[test]
    fn test_status_reports_database() {
        let (dir, db) = test_database();
        let tracker = StatusTracker::new(dir.path().join("test.db"));

        let status = tracker.get_status(&db);
        assert_eq!(status.schema_version, Some(1));
        assert_eq!(status.recipe_count, Some(0));
        assert!(status.database_size_bytes.is_some());
        assert_eq!(status.process_id, std::process::id());

        let started = chrono::NaiveDateTime::parse_from_str(&status.started_at, TIMESTAMP_FORMAT).unwrap();
        let as_of = chrono::NaiveDateTime::parse_from_str(&status.as_of, TIMESTAMP_FORMAT).unwrap();
        assert!(as_of >= started);
    }
}
