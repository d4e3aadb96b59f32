//! Recipe Ingredient model
//!
//! Ingredients are stored exactly as the author entered them. Conversion to
//! the reader's measurement system happens at display time.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::measurement::{Unit, UnitFamily};

/// An ingredient line in a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub position: i64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for adding an ingredient to a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredientCreate {
    pub recipe_id: i64,
    pub name: String,
    pub amount: f64,
    pub unit: String,
    /// Appended after the last ingredient when absent
    pub position: Option<i64>,
    pub notes: Option<String>,
}

/// Data for updating an ingredient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeIngredientUpdate {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub position: Option<i64>,
    pub notes: Option<String>,
}

/// Canonical symbol for a recognized unit ("cups" -> "cup"); anything else is kept as written
pub fn canonical_unit(unit: &str) -> String {
    let unit = unit.trim();
    Unit::parse_alias(unit)
        .map(|u| u.symbol().to_string())
        .unwrap_or_else(|| unit.to_string())
}

/// Reject amounts that can't describe a physical quantity.
/// Temperatures may be zero or negative; everything else must be >= 0.
pub fn validate_amount(amount: f64, unit: &str) -> DbResult<()> {
    if !amount.is_finite() {
        return Err(DbError::Invalid {
            field: "amount",
            reason: "must be a finite number".to_string(),
        });
    }

    let is_temperature = Unit::parse(unit).map(|u| u.family()) == Some(UnitFamily::Temperature);
    if amount < 0.0 && !is_temperature {
        return Err(DbError::Invalid {
            field: "amount",
            reason: format!("{} {} is negative", amount, unit),
        });
    }

    Ok(())
}

impl RecipeIngredient {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            recipe_id: row.get("recipe_id")?,
            name: row.get("name")?,
            amount: row.get("amount")?,
            unit: row.get("unit")?,
            position: row.get("position")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Add an ingredient to a recipe
    pub fn create(conn: &Connection, data: &RecipeIngredientCreate) -> DbResult<Self> {
        let unit = canonical_unit(&data.unit);
        validate_amount(data.amount, &unit)?;

        let position = match data.position {
            Some(p) => p,
            None => conn.query_row(
                "SELECT COALESCE(MAX(position), -1) + 1 FROM recipe_ingredients WHERE recipe_id = ?1",
                [data.recipe_id],
                |row| row.get(0),
            )?,
        };

        conn.execute(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, name, amount, unit, position, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.recipe_id,
                data.name.trim(),
                data.amount,
                unit,
                position,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get an ingredient by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipe_ingredients WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All ingredients for a recipe in display order
    pub fn get_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM recipe_ingredients WHERE recipe_id = ?1 ORDER BY position, id",
        )?;

        let ingredients = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    /// Update an ingredient
    pub fn update(conn: &Connection, id: i64, data: &RecipeIngredientUpdate) -> DbResult<Option<Self>> {
        let Some(existing) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        let amount = data.amount.unwrap_or(existing.amount);
        let unit = canonical_unit(data.unit.as_deref().unwrap_or(&existing.unit));
        validate_amount(amount, &unit)?;

        let name = data.name.as_deref().unwrap_or(&existing.name).trim().to_string();
        let position = data.position.unwrap_or(existing.position);
        // an empty string clears the note
        let notes = match data.notes.as_deref().map(str::trim) {
            Some("") => None,
            Some(n) => Some(n.to_string()),
            None => existing.notes,
        };

        conn.execute(
            r#"
            UPDATE recipe_ingredients
            SET name = ?1, amount = ?2, unit = ?3, position = ?4, notes = ?5,
                updated_at = datetime('now')
            WHERE id = ?6
            "#,
            params![name, amount, unit, position, notes, id],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Remove an ingredient. Returns Ok(false) if not found.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM recipe_ingredients WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
