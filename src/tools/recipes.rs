//! Recipe MCP Tools
//!
//! Tools for managing recipes and their ingredients. Ingredient amounts are
//! converted into the reader's measurement system when a recipe is read.

use serde::Serialize;

use crate::db::Database;
use crate::import::{extract_recipe_json, ParsedIngredient};
use crate::measurement::{convert_ingredient, format_converted_value, MeasurementSystem};
use crate::models::{
    Recipe, RecipeCreate, RecipeIngredient, RecipeIngredientCreate, RecipeIngredientUpdate,
    RecipeUpdate, UserPreferences,
};

/// Response for create_recipe
#[derive(Debug, Serialize)]
pub struct CreateRecipeResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// An ingredient as shown to the reader
#[derive(Debug, Clone, Serialize)]
pub struct IngredientView {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub display: String,
    pub original_amount: f64,
    pub original_unit: String,
    pub position: i64,
    pub notes: Option<String>,
}

/// Full recipe detail with converted ingredients
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub servings: f64,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub total_time_minutes: Option<i64>,
    pub measurement_system: MeasurementSystem,
    pub ingredients: Vec<IngredientView>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Recipe summary for listing
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub servings: f64,
    pub is_favorite: bool,
    pub tags: Vec<String>,
    pub ingredient_count: usize,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: i64,
    pub name: String,
    pub score: f64,
    pub tags: Vec<String>,
}

/// Response for search_recipes
#[derive(Debug, Serialize)]
pub struct SearchRecipesResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub count: usize,
}

/// Response for successful delete
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for reorder_instruction
#[derive(Debug, Serialize)]
pub struct ReorderInstructionResponse {
    pub recipe_id: i64,
    pub instructions: Vec<String>,
    pub updated_at: String,
}

/// Response for import_recipe
#[derive(Debug, Serialize)]
pub struct ImportRecipeResponse {
    pub id: i64,
    pub name: String,
    pub servings: f64,
    pub ingredients: Vec<ParsedIngredient>,
    pub instruction_count: usize,
}

/// Render a stored ingredient in `system`
pub fn render_ingredient(ingredient: &RecipeIngredient, system: MeasurementSystem) -> IngredientView {
    let converted = convert_ingredient(ingredient.amount, &ingredient.unit, system);
    IngredientView {
        id: ingredient.id,
        name: ingredient.name.clone(),
        display: format_converted_value(converted.amount, &converted.unit),
        amount: converted.amount,
        unit: converted.unit,
        original_amount: ingredient.amount,
        original_unit: ingredient.unit.clone(),
        position: ingredient.position,
        notes: ingredient.notes.clone(),
    }
}

fn validate_servings(servings: f64) -> Result<(), String> {
    if !servings.is_finite() || servings <= 0.0 {
        return Err("servings must be greater than 0".to_string());
    }
    Ok(())
}

// ============================================================================
// Recipe Tools
// ============================================================================

/// Create a new recipe
pub fn create_recipe(db: &Database, data: RecipeCreate) -> Result<CreateRecipeResponse, String> {
    if data.name.trim().is_empty() {
        return Err("Recipe name cannot be empty".to_string());
    }
    validate_servings(data.servings)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::create(&conn, &data)
        .map_err(|e| format!("Failed to create recipe: {}", e))?;

    tracing::info!(id = recipe.id, name = %recipe.name, "recipe created");
    Ok(CreateRecipeResponse {
        id: recipe.id,
        name: recipe.name,
        created_at: recipe.created_at,
    })
}

/// Get a recipe with ingredients converted for display.
///
/// `system` overrides the stored preference for this call only.
pub fn get_recipe(
    db: &Database,
    id: i64,
    system: Option<MeasurementSystem>,
    default_system: MeasurementSystem,
) -> Result<Option<RecipeDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let Some(recipe) = Recipe::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?
    else {
        return Ok(None);
    };

    let system = match system {
        Some(s) => s,
        None => {
            UserPreferences::get_or_init(&conn, default_system)
                .map_err(|e| format!("Failed to read preferences: {}", e))?
                .measurement_system
        }
    };

    let ingredients = RecipeIngredient::get_for_recipe(&conn, id)
        .map_err(|e| format!("Failed to get ingredients: {}", e))?
        .iter()
        .map(|i| render_ingredient(i, system))
        .collect();

    let total_time_minutes = match (recipe.prep_time_minutes, recipe.cook_time_minutes) {
        (None, None) => None,
        (prep, cook) => Some(prep.unwrap_or(0) + cook.unwrap_or(0)),
    };

    Ok(Some(RecipeDetail {
        id: recipe.id,
        name: recipe.name,
        description: recipe.description,
        servings: recipe.servings,
        prep_time_minutes: recipe.prep_time_minutes,
        cook_time_minutes: recipe.cook_time_minutes,
        total_time_minutes,
        measurement_system: system,
        ingredients,
        instructions: recipe.instructions,
        tags: recipe.tags,
        is_favorite: recipe.is_favorite,
        notes: recipe.notes,
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    }))
}

/// List recipes with filtering
pub fn list_recipes(
    db: &Database,
    query: Option<&str>,
    favorites_only: bool,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListRecipesResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipes = Recipe::list(&conn, query, favorites_only, sort_by, sort_order, limit, offset)
        .map_err(|e| format!("Failed to list recipes: {}", e))?;

    let total = Recipe::count(&conn, query, favorites_only)
        .map_err(|e| format!("Failed to count recipes: {}", e))?;

    let mut summaries = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        let ingredients = RecipeIngredient::get_for_recipe(&conn, recipe.id)
            .map_err(|e| format!("Failed to get ingredients: {}", e))?;

        summaries.push(RecipeSummary {
            id: recipe.id,
            name: recipe.name,
            servings: recipe.servings,
            is_favorite: recipe.is_favorite,
            tags: recipe.tags,
            ingredient_count: ingredients.len(),
        });
    }

    Ok(ListRecipesResponse {
        recipes: summaries,
        total,
        limit,
        offset,
    })
}

/// Ranked text search across recipes
pub fn search_recipes(db: &Database, query: &str, limit: i64) -> Result<SearchRecipesResponse, String> {
    let query = query.trim();
    if query.is_empty() {
        return Err("Search query cannot be empty".to_string());
    }
    let limit = limit.clamp(1, 100) as usize;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let ranked = Recipe::search(&conn, query, limit)
        .map_err(|e| format!("Failed to search recipes: {}", e))?;

    let results: Vec<SearchHit> = ranked
        .into_iter()
        .map(|r| SearchHit {
            id: r.recipe.id,
            name: r.recipe.name,
            score: r.score,
            tags: r.recipe.tags,
        })
        .collect();

    Ok(SearchRecipesResponse {
        query: query.to_string(),
        count: results.len(),
        results,
    })
}

/// Update recipe metadata
pub fn update_recipe(db: &Database, id: i64, data: RecipeUpdate) -> Result<Recipe, String> {
    if let Some(ref name) = data.name {
        if name.trim().is_empty() {
            return Err("Recipe name cannot be empty".to_string());
        }
    }
    if let Some(servings) = data.servings {
        validate_servings(servings)?;
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Recipe::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update recipe: {}", e))?
        .ok_or_else(|| format!("Recipe not found with id: {}", id))
}

/// Delete a recipe and its ingredients
pub fn delete_recipe(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Recipe::delete(&conn, id)
        .map_err(|e| format!("Failed to delete recipe: {}", e))?;
    if !deleted {
        return Err(format!("Recipe not found with id: {}", id));
    }

    tracing::info!(id, "recipe deleted");
    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

/// Move one instruction step to a new position
pub fn reorder_instruction(
    db: &Database,
    recipe_id: i64,
    from: usize,
    to: usize,
) -> Result<ReorderInstructionResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::move_instruction(&conn, recipe_id, from, to)
        .map_err(|e| format!("Failed to reorder instructions: {}", e))?
        .ok_or_else(|| format!("Recipe not found with id: {}", recipe_id))?;

    Ok(ReorderInstructionResponse {
        recipe_id,
        instructions: recipe.instructions,
        updated_at: recipe.updated_at,
    })
}

// ============================================================================
// Ingredient Tools
// ============================================================================

/// Add an ingredient to a recipe
pub fn add_recipe_ingredient(
    db: &Database,
    data: RecipeIngredientCreate,
) -> Result<RecipeIngredient, String> {
    if data.name.trim().is_empty() {
        return Err("Ingredient name cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Recipe::get_by_id(&conn, data.recipe_id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Err(format!("Recipe not found with id: {}", data.recipe_id));
    }

    RecipeIngredient::create(&conn, &data).map_err(|e| format!("Failed to add ingredient: {}", e))
}

/// Update an ingredient's amount, unit, name, position or notes
pub fn update_recipe_ingredient(
    db: &Database,
    id: i64,
    data: RecipeIngredientUpdate,
) -> Result<RecipeIngredient, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    RecipeIngredient::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update ingredient: {}", e))?
        .ok_or_else(|| format!("Ingredient not found with id: {}", id))
}

/// Remove an ingredient from its recipe
pub fn remove_recipe_ingredient(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = RecipeIngredient::delete(&conn, id)
        .map_err(|e| format!("Failed to remove ingredient: {}", e))?;
    if !deleted {
        return Err(format!("Ingredient not found with id: {}", id));
    }

    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

/// Extract a recipe from assistant text and save it with its ingredients.
/// Nothing is saved if any part fails.
pub fn import_recipe(db: &Database, text: &str) -> Result<ImportRecipeResponse, String> {
    let draft = extract_recipe_json(text).map_err(|e| format!("Failed to import recipe: {}", e))?;

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let tx = conn
        .transaction()
        .map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::create(
        &tx,
        &RecipeCreate {
            name: draft.name.clone(),
            description: draft.description.clone(),
            servings: draft.servings,
            prep_time_minutes: draft.prep_time_minutes,
            cook_time_minutes: draft.cook_time_minutes,
            instructions: draft.instructions.clone(),
            tags: draft.tags.clone(),
            is_favorite: false,
            notes: None,
        },
    )
    .map_err(|e| format!("Failed to create recipe: {}", e))?;

    for ingredient in &draft.ingredients {
        RecipeIngredient::create(
            &tx,
            &RecipeIngredientCreate {
                recipe_id: recipe.id,
                name: ingredient.name.clone(),
                amount: ingredient.amount,
                unit: ingredient.unit.clone(),
                position: None,
                notes: ingredient.notes.clone(),
            },
        )
        .map_err(|e| format!("Failed to add ingredient '{}': {}", ingredient.name, e))?;
    }

    tx.commit().map_err(|e| format!("Database error: {}", e))?;

    tracing::info!(
        id = recipe.id,
        name = %recipe.name,
        ingredients = draft.ingredients.len(),
        "recipe imported"
    );
    Ok(ImportRecipeResponse {
        id: recipe.id,
        name: recipe.name,
        servings: recipe.servings,
        instruction_count: draft.instructions.len(),
        ingredients: draft.ingredients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_database;

    fn recipe(name: &str) -> RecipeCreate {
        RecipeCreate {
            name: name.to_string(),
            description: None,
            servings: 2.0,
            prep_time_minutes: Some(5),
            cook_time_minutes: Some(20),
            instructions: vec!["Boil".into(), "Drain".into()],
            tags: vec!["pasta".into()],
            is_favorite: false,
            notes: None,
        }
    }

    fn ingredient(recipe_id: i64, name: &str, amount: f64, unit: &str) -> RecipeIngredientCreate {
        RecipeIngredientCreate {
            recipe_id,
            name: name.to_string(),
            amount,
            unit: unit.to_string(),
            position: None,
            notes: None,
        }
    }

    #[test]
    fn test_create_recipe_validation() {
        let (_dir, db) = test_database();
        assert!(create_recipe(&db, recipe("   ")).is_err());

        let mut zero = recipe("Zero");
        zero.servings = 0.0;
        assert!(create_recipe(&db, zero).is_err());

        let created = create_recipe(&db, recipe("Carbonara")).unwrap();
        assert_eq!(created.name, "Carbonara");
    }

    #[test]
    fn test_get_recipe_converts_to_requested_system() {
        let (_dir, db) = test_database();
        let created = create_recipe(&db, recipe("Carbonara")).unwrap();
        add_recipe_ingredient(&db, ingredient(created.id, "spaghetti", 1000.0, "g")).unwrap();
        add_recipe_ingredient(&db, ingredient(created.id, "cream", 4.0, "cup")).unwrap();
        add_recipe_ingredient(&db, ingredient(created.id, "garlic", 2.0, "clove")).unwrap();

        let detail = get_recipe(&db, created.id, Some(MeasurementSystem::Imperial), MeasurementSystem::Metric)
            .unwrap()
            .unwrap();
        assert_eq!(detail.measurement_system, MeasurementSystem::Imperial);
        assert_eq!(detail.total_time_minutes, Some(25));

        let spaghetti = &detail.ingredients[0];
        assert_eq!(spaghetti.unit, "lb");
        assert_eq!(spaghetti.amount, 2.2);
        assert_eq!(spaghetti.display, "2.2 lb");
        assert_eq!(spaghetti.original_amount, 1000.0);
        assert_eq!(spaghetti.original_unit, "g");

        // already imperial, stays as authored
        assert_eq!(detail.ingredients[1].display, "4 cup");
        assert_eq!(detail.ingredients[2].display, "2 clove");

        let metric = get_recipe(&db, created.id, Some(MeasurementSystem::Metric), MeasurementSystem::Metric)
            .unwrap()
            .unwrap();
        assert_eq!(metric.ingredients[0].display, "1 kg");
        assert_eq!(metric.ingredients[1].display, "946 ml");
    }

    #[test]
    fn test_get_recipe_uses_stored_preference() {
        let (_dir, db) = test_database();
        let created = create_recipe(&db, recipe("Porridge")).unwrap();
        add_recipe_ingredient(&db, ingredient(created.id, "milk", 500.0, "ml")).unwrap();

        crate::tools::preferences::set_measurement_system(&db, "imperial").unwrap();

        let detail = get_recipe(&db, created.id, None, MeasurementSystem::Metric)
            .unwrap()
            .unwrap();
        assert_eq!(detail.measurement_system, MeasurementSystem::Imperial);
        assert_eq!(detail.ingredients[0].unit, "cup");
        assert_eq!(detail.ingredients[0].display, "2.1 cup");

        assert!(get_recipe(&db, 999, None, MeasurementSystem::Metric).unwrap().is_none());
    }

    #[test]
    fn test_list_and_search() {
        let (_dir, db) = test_database();
        let pasta = create_recipe(&db, recipe("Tomato Pasta")).unwrap();
        add_recipe_ingredient(&db, ingredient(pasta.id, "tomato", 3.0, "whole")).unwrap();
        let mut salad = recipe("Green Salad");
        salad.tags = vec!["salad".into()];
        create_recipe(&db, salad).unwrap();

        let listed = list_recipes(&db, None, false, "name", "asc", 500, -3).unwrap();
        assert_eq!(listed.total, 2);
        assert_eq!(listed.limit, 200);
        assert_eq!(listed.offset, 0);
        assert_eq!(listed.recipes[0].name, "Green Salad");
        assert_eq!(listed.recipes[1].ingredient_count, 1);

        let filtered = list_recipes(&db, Some("salad"), false, "name", "asc", 50, 0).unwrap();
        assert_eq!(filtered.recipes.len(), 1);
        assert_eq!(filtered.total, 1);

        let found = search_recipes(&db, "tomato", 10).unwrap();
        assert_eq!(found.count, 1);
        assert_eq!(found.results[0].id, pasta.id);
        assert!(search_recipes(&db, "  ", 10).is_err());
    }

    #[test]
    fn test_update_and_delete_recipe() {
        let (_dir, db) = test_database();
        let created = create_recipe(&db, recipe("Rice")).unwrap();

        let update = RecipeUpdate {
            is_favorite: Some(true),
            ..Default::default()
        };
        assert!(update_recipe(&db, created.id, update).unwrap().is_favorite);

        let bad = RecipeUpdate {
            servings: Some(-1.0),
            ..Default::default()
        };
        assert!(update_recipe(&db, created.id, bad).is_err());

        assert!(delete_recipe(&db, created.id).unwrap().success);
        assert!(delete_recipe(&db, created.id).is_err());
    }

    #[test]
    fn test_reorder_instruction() {
        let (_dir, db) = test_database();
        let created = create_recipe(&db, recipe("Noodles")).unwrap();

        let reordered = reorder_instruction(&db, created.id, 1, 0).unwrap();
        assert_eq!(reordered.instructions, vec!["Drain", "Boil"]);
        assert!(reorder_instruction(&db, created.id, 0, 5).is_err());
        assert!(reorder_instruction(&db, 999, 0, 1).is_err());
    }

    #[test]
    fn test_ingredient_lifecycle() {
        let (_dir, db) = test_database();
        let created = create_recipe(&db, recipe("Pesto")).unwrap();

        assert!(add_recipe_ingredient(&db, ingredient(999, "basil", 1.0, "bunch")).is_err());
        assert!(add_recipe_ingredient(&db, ingredient(created.id, " ", 1.0, "bunch")).is_err());

        let basil = add_recipe_ingredient(&db, ingredient(created.id, "basil", 1.0, "bunch")).unwrap();
        let update = RecipeIngredientUpdate {
            amount: Some(2.0),
            ..Default::default()
        };
        assert_eq!(update_recipe_ingredient(&db, basil.id, update).unwrap().amount, 2.0);

        assert!(remove_recipe_ingredient(&db, basil.id).unwrap().success);
        assert!(remove_recipe_ingredient(&db, basil.id).is_err());
    }

    #[test]
    fn test_import_recipe() {
        let (_dir, db) = test_database();
        let text = r#"Here you go:
```json
{"name": "Pancakes", "servings": 4,
 "ingredients": ["1 1/2 cups flour", "2 eggs", {"name": "milk", "amount": 300, "unit": "ml"}],
 "instructions": ["Whisk", "Fry"]}
```"#;

        let imported = import_recipe(&db, text).unwrap();
        assert_eq!(imported.name, "Pancakes");
        assert_eq!(imported.ingredients.len(), 3);
        assert_eq!(imported.instruction_count, 2);

        let detail = get_recipe(&db, imported.id, Some(MeasurementSystem::Metric), MeasurementSystem::Metric)
            .unwrap()
            .unwrap();
        assert_eq!(detail.ingredients[0].display, "355 ml");
        assert_eq!(detail.ingredients[1].display, "2 whole");
        assert_eq!(detail.ingredients[2].display, "300 ml");
    }

    #[test]
    fn test_import_skips_blank_ingredients() {
        let (_dir, db) = test_database();
        let text = r#"{"name": "Toast", "ingredients": ["", {"name": "  ", "amount": 1, "unit": "g"}, "2 slices bread"]}"#;

        let imported = import_recipe(&db, text).unwrap();
        assert_eq!(imported.ingredients.len(), 1);

        let detail = get_recipe(&db, imported.id, None, MeasurementSystem::Metric)
            .unwrap()
            .unwrap();
        assert_eq!(detail.ingredients.len(), 1);
        assert_eq!(detail.ingredients[0].name, "bread");
    }

    #[test]
    fn test_added_aliases_convert_on_read() {
        let (_dir, db) = test_database();
        let created = create_recipe(&db, recipe("Bread")).unwrap();
        let flour = add_recipe_ingredient(&db, ingredient(created.id, "flour", 2.0, "cups")).unwrap();
        assert_eq!(flour.unit, "cup");

        let detail = get_recipe(&db, created.id, Some(MeasurementSystem::Metric), MeasurementSystem::Metric)
            .unwrap()
            .unwrap();
        assert_eq!(detail.ingredients[0].display, "473 ml");
        assert_eq!(detail.ingredients[0].original_unit, "cup");
    }

    #[test]
    fn test_import_is_atomic() {
        let (_dir, db) = test_database();
        let text = r#"{"name": "Broken", "ingredients": [{"name": "flour", "amount": -2, "unit": "cup"}]}"#;

        assert!(import_recipe(&db, text).is_err());
        let listed = list_recipes(&db, None, false, "name", "asc", 50, 0).unwrap();
        assert_eq!(listed.total, 0);

        assert!(import_recipe(&db, "no json").is_err());
    }
}
