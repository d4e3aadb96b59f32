//! Recipe model
//!
//! A recipe with ordered instruction steps and free-form tags.

use std::collections::HashMap;

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// A stored recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub servings: f64,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_servings")]
    pub servings: f64,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub notes: Option<String>,
}

fn default_servings() -> f64 {
    1.0
}

/// Data for updating a recipe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub servings: Option<f64>,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub instructions: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
    pub notes: Option<String>,
}

/// A recipe with its text-search score
#[derive(Debug, Clone, Serialize)]
pub struct RankedRecipe {
    pub recipe: Recipe,
    pub score: f64,
}

/// Read a JSON string-array column
fn json_list(row: &Row, column: &str) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|e| {
        let idx = row.as_ref().column_index(column).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

/// Move one step from `from` to `to`, shifting the steps in between.
/// Returns false and leaves `steps` untouched if either index is out of range.
pub fn move_step(steps: &mut Vec<String>, from: usize, to: usize) -> bool {
    if from >= steps.len() || to >= steps.len() {
        return false;
    }
    let step = steps.remove(from);
    steps.insert(to, step);
    true
}

/// Weighted occurrence count of `terms` across a recipe's searchable text
pub fn score_recipe(recipe: &Recipe, ingredient_names: &[String], terms: &[String]) -> f64 {
    let name = recipe.name.to_lowercase();
    let description = recipe.description.as_deref().unwrap_or("").to_lowercase();
    let tags = recipe.tags.join(" ").to_lowercase();
    let ingredients = ingredient_names.join(" ").to_lowercase();

    terms
        .iter()
        .map(|term| {
            let t = term.as_str();
            3.0 * name.matches(t).count() as f64
                + 2.0 * tags.matches(t).count() as f64
                + 2.0 * ingredients.matches(t).count() as f64
                + description.matches(t).count() as f64
        })
        .sum()
}

/// WHERE clause and parameters shared by `list` and `count`
fn filter_clause(query: Option<&str>, favorites_only: bool) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut conditions = Vec::new();
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(q) = query.filter(|q| !q.trim().is_empty()) {
        params_vec.push(Box::new(format!("%{}%", q.trim())));
        conditions.push(format!("name LIKE ?{}", params_vec.len()));
    }
    if favorites_only {
        conditions.push("is_favorite = 1".to_string());
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, params_vec)
}

/// Empty text clears an optional column
fn clearable(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Recipe {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            servings: row.get("servings")?,
            prep_time_minutes: row.get("prep_time_minutes")?,
            cook_time_minutes: row.get("cook_time_minutes")?,
            instructions: json_list(row, "instructions")?,
            tags: json_list(row, "tags")?,
            is_favorite: row.get::<_, i32>("is_favorite")? != 0,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new recipe
    pub fn create(conn: &Connection, data: &RecipeCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO recipes (name, description, servings, prep_time_minutes,
                                 cook_time_minutes, instructions, tags, is_favorite, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                data.name.trim(),
                data.description,
                data.servings,
                data.prep_time_minutes,
                data.cook_time_minutes,
                serde_json::to_string(&data.instructions)?,
                serde_json::to_string(&data.tags)?,
                data.is_favorite as i32,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List recipes with optional name filter
    pub fn list(
        conn: &Connection,
        query: Option<&str>,
        favorites_only: bool,
        sort_by: &str,
        sort_order: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let order = if sort_order.eq_ignore_ascii_case("desc") { "DESC" } else { "ASC" };
        let sort_col = match sort_by.to_lowercase().as_str() {
            "created_at" => "created_at",
            "updated_at" => "updated_at",
            _ => "name",
        };

        let (where_clause, mut params_vec) = filter_clause(query, favorites_only);

        params_vec.push(Box::new(limit));
        params_vec.push(Box::new(offset));

        let sql = format!(
            "SELECT * FROM recipes {} ORDER BY {} {} LIMIT ?{} OFFSET ?{}",
            where_clause,
            sort_col,
            order,
            params_vec.len() - 1,
            params_vec.len()
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let recipes = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(recipes)
    }

    /// Count recipes matching the same filters as `list`
    pub fn count(conn: &Connection, query: Option<&str>, favorites_only: bool) -> DbResult<i64> {
        let (where_clause, params_vec) = filter_clause(query, favorites_only);
        let sql = format!("SELECT COUNT(*) FROM recipes {}", where_clause);

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        Ok(conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?)
    }

    /// Partially update a recipe. Returns None if it does not exist.
    pub fn update(conn: &Connection, id: i64, data: &RecipeUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            params_vec.push(Box::new(name.trim().to_string()));
            updates.push(format!("name = ?{}", params_vec.len()));
        }
        if let Some(ref description) = data.description {
            params_vec.push(Box::new(clearable(description)));
            updates.push(format!("description = ?{}", params_vec.len()));
        }
        if let Some(servings) = data.servings {
            params_vec.push(Box::new(servings));
            updates.push(format!("servings = ?{}", params_vec.len()));
        }
        if let Some(prep) = data.prep_time_minutes {
            params_vec.push(Box::new(prep));
            updates.push(format!("prep_time_minutes = ?{}", params_vec.len()));
        }
        if let Some(cook) = data.cook_time_minutes {
            params_vec.push(Box::new(cook));
            updates.push(format!("cook_time_minutes = ?{}", params_vec.len()));
        }
        if let Some(ref instructions) = data.instructions {
            params_vec.push(Box::new(serde_json::to_string(instructions)?));
            updates.push(format!("instructions = ?{}", params_vec.len()));
        }
        if let Some(ref tags) = data.tags {
            params_vec.push(Box::new(serde_json::to_string(tags)?));
            updates.push(format!("tags = ?{}", params_vec.len()));
        }
        if let Some(is_fav) = data.is_favorite {
            params_vec.push(Box::new(is_fav as i32));
            updates.push(format!("is_favorite = ?{}", params_vec.len()));
        }
        if let Some(ref notes) = data.notes {
            params_vec.push(Box::new(clearable(notes)));
            updates.push(format!("notes = ?{}", params_vec.len()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());
        params_vec.push(Box::new(id));

        let sql = format!(
            "UPDATE recipes SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len()
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Reorder one instruction step. Returns None if the recipe does not exist.
    pub fn move_instruction(
        conn: &Connection,
        id: i64,
        from: usize,
        to: usize,
    ) -> DbResult<Option<Self>> {
        let Some(recipe) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        let mut steps = recipe.instructions;
        let step_count = steps.len();
        if !move_step(&mut steps, from, to) {
            return Err(DbError::Invalid {
                field: "instruction index",
                reason: format!(
                    "move {} -> {} is out of range for {} step(s)",
                    from, to, step_count
                ),
            });
        }

        let update = RecipeUpdate {
            instructions: Some(steps),
            ..Default::default()
        };
        Self::update(conn, id, &update)
    }

    /// Delete a recipe (cascades to its ingredients).
    /// Returns Ok(false) if not found.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Ranked text search over name, tags, ingredient names and description
    pub fn search(conn: &Connection, query: &str, limit: usize) -> DbResult<Vec<RankedRecipe>> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut ingredient_names: HashMap<i64, Vec<String>> = HashMap::new();
        {
            let mut stmt = conn.prepare("SELECT recipe_id, name FROM recipe_ingredients")?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
            for row in rows {
                let (recipe_id, name) = row?;
                ingredient_names.entry(recipe_id).or_default().push(name);
            }
        }

        let mut stmt = conn.prepare("SELECT * FROM recipes")?;
        let recipes = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut ranked: Vec<RankedRecipe> = recipes
            .into_iter()
            .filter_map(|recipe| {
                let names = ingredient_names.get(&recipe.id).map(Vec::as_slice).unwrap_or(&[]);
                let score = score_recipe(&recipe, names, &terms);
                (score > 0.0).then_some(RankedRecipe { recipe, score })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.recipe.name.cmp(&b.recipe.name))
        });
        ranked.truncate(limit);

        tracing::debug!(query, results = ranked.len(), "recipe search");
        Ok(ranked)
    }
}
