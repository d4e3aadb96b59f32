//! MealPrep Tools module
//!
//! Tool implementations behind the MCP server. Each function takes the
//! database handle and returns a serializable response or an error message.

pub mod conversions;
pub mod preferences;
pub mod recipes;
pub mod status;

/// Fresh migrated database in a temporary directory. Keep the `TempDir`
/// alive for as long as the database is used.
#[cfg(test)]
pub(crate) fn test_database() -> (tempfile::TempDir, crate::db::Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = crate::db::Database::new(dir.path().join("test.db")).unwrap();
    db.with_conn(crate::db::migrations::run_migrations).unwrap();
    (dir, db)
}
