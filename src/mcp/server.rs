//! MealPrep MCP Server Implementation
//!
//! Routes MCP tool calls to the recipe, preference and conversion tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::measurement::MeasurementSystem;
use crate::models::{RecipeCreate, RecipeIngredientCreate, RecipeIngredientUpdate, RecipeUpdate};
use crate::tools::conversions;
use crate::tools::preferences;
use crate::tools::recipes;
use crate::tools::status::StatusTracker;

/// MealPrep MCP Service
#[derive(Clone)]
pub struct MealPrepService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    default_system: MeasurementSystem,
    tool_router: ToolRouter<MealPrepService>,
}

impl MealPrepService {
    pub fn new(database_path: PathBuf, database: Database, default_system: MeasurementSystem) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            default_system,
            tool_router: Self::tool_router(),
        }
    }
}

/// Serialize a tool response as pretty JSON text content
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn parse_system(value: &str) -> Result<MeasurementSystem, McpError> {
    MeasurementSystem::from_str(value).ok_or_else(|| {
        McpError::invalid_params(
            format!("measurement_system must be 'metric' or 'imperial', got '{}'", value),
            None,
        )
    })
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    /// Name of the recipe
    pub name: String,
    /// Short description (optional)
    pub description: Option<String>,
    /// Number of servings this recipe makes (default 1.0)
    #[serde(default = "default_servings")]
    pub servings: f64,
    /// Preparation time in minutes (optional)
    pub prep_time_minutes: Option<i64>,
    /// Cooking time in minutes (optional)
    pub cook_time_minutes: Option<i64>,
    /// Ordered instruction steps
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Free-form tags such as "vegetarian" or "dinner"
    #[serde(default)]
    pub tags: Vec<String>,
    /// Mark as favorite (default false)
    #[serde(default)]
    pub is_favorite: bool,
    /// Optional notes
    pub notes: Option<String>,
}

fn default_servings() -> f64 { 1.0 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecipeParams {
    /// Recipe ID
    pub id: i64,
    /// Show ingredients in "metric" or "imperial" (default: saved preference)
    pub measurement_system: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    /// Filter by recipe name (optional)
    pub query: Option<String>,
    /// Only show favorites (default false)
    #[serde(default)]
    pub favorites_only: bool,
    /// Sort by: name, created_at or updated_at (default name)
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Sort order: asc or desc (default asc)
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination (default 0)
    #[serde(default)]
    pub offset: i64,
}

fn default_sort_by() -> String { "name".to_string() }
fn default_sort_order() -> String { "asc".to_string() }
fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRecipesParams {
    /// Words to search for in names, tags, ingredients and descriptions
    pub query: String,
    /// Maximum results (default 20, max 100)
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeParams {
    /// Recipe ID to update
    pub id: i64,
    pub name: Option<String>,
    /// Empty string clears the description
    pub description: Option<String>,
    pub servings: Option<f64>,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    /// Replaces all instruction steps
    pub instructions: Option<Vec<String>>,
    /// Replaces all tags
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
    /// Empty string clears the notes
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReorderInstructionParams {
    /// Recipe ID
    pub recipe_id: i64,
    /// Current zero-based position of the step
    pub from: usize,
    /// New zero-based position of the step
    pub to: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportRecipeParams {
    /// Text containing the recipe JSON, fenced or inline
    pub text: String,
}

// ============================================================================
// Ingredient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddRecipeIngredientParams {
    /// Recipe ID to add the ingredient to
    pub recipe_id: i64,
    /// Ingredient name
    pub name: String,
    /// Amount as the author wrote it
    pub amount: f64,
    /// Unit symbol as the author wrote it (g, cup, tbsp, clove, ...)
    pub unit: String,
    /// Zero-based position (default: after the last ingredient)
    pub position: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeIngredientParams {
    /// Ingredient ID
    pub id: i64,
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub position: Option<i64>,
    /// Empty string clears the note
    pub notes: Option<String>,
}

// ============================================================================
// Preference and Conversion Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetMeasurementSystemParams {
    /// "metric" or "imperial"
    pub measurement_system: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetDietaryRestrictionsParams {
    /// Full replacement list, e.g. ["vegetarian", "nut-free"]
    pub restrictions: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertQuantityParams {
    /// Amount to convert; non-numeric values convert as 0
    pub amount: serde_json::Value,
    /// Unit symbol (g, kg, oz, lb, ml, l, fl oz, cup, tbsp, tsp, C, F, cm, m, in, ft)
    pub unit: String,
    /// Target system: "metric" or "imperial"
    pub measurement_system: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ClassifyUnitParams {
    /// Unit symbol to classify
    pub unit: String,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl MealPrepService {
    // --- Status ---

    #[tool(description = "Get the current status of the MealPrep service including build info, database status, and process information")]
    async fn mealprep_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status(&self.database))
    }

    #[tool(description = "Get instructions for storing, importing and reading recipes. Call this before adding recipes.")]
    fn usage_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::USAGE_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(USAGE_INSTRUCTIONS)]))
    }

    // --- Recipes ---

    #[tool(description = "Create a new recipe (ingredients are added separately)")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeCreate {
            name: p.name, description: p.description, servings: p.servings,
            prep_time_minutes: p.prep_time_minutes, cook_time_minutes: p.cook_time_minutes,
            instructions: p.instructions, tags: p.tags, is_favorite: p.is_favorite, notes: p.notes,
        };
        let result = recipes::create_recipe(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a recipe with ingredients converted to the saved measurement system, or to measurement_system if given")]
    fn get_recipe(&self, Parameters(p): Parameters<GetRecipeParams>) -> Result<CallToolResult, McpError> {
        let system = p.measurement_system.as_deref().map(parse_system).transpose()?;
        let result = recipes::get_recipe(&self.database, p.id, system, self.default_system)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(detail) => json_result(&detail),
            None => json_result(&serde_json::json!({ "error": "Recipe not found", "id": p.id })),
        }
    }

    #[tool(description = "List recipes with optional name filter, favorites filter, sorting, and pagination")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database, p.query.as_deref(), p.favorites_only, &p.sort_by, &p.sort_order, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Search recipes by words in their name, tags, ingredients and description, best matches first")]
    fn search_recipes(&self, Parameters(p): Parameters<SearchRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::search_recipes(&self.database, &p.query, p.limit)
            .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update recipe metadata, instructions or tags")]
    fn update_recipe(&self, Parameters(p): Parameters<UpdateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeUpdate {
            name: p.name, description: p.description, servings: p.servings,
            prep_time_minutes: p.prep_time_minutes, cook_time_minutes: p.cook_time_minutes,
            instructions: p.instructions, tags: p.tags, is_favorite: p.is_favorite, notes: p.notes,
        };
        let result = recipes::update_recipe(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a recipe and all of its ingredients")]
    fn delete_recipe(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Move one instruction step from one zero-based position to another")]
    fn reorder_instruction(&self, Parameters(p): Parameters<ReorderInstructionParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::reorder_instruction(&self.database, p.recipe_id, p.from, p.to)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Import a recipe from generated text containing recipe JSON (name, servings, ingredients, instructions, tags)")]
    fn import_recipe(&self, Parameters(p): Parameters<ImportRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::import_recipe(&self.database, &p.text).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Ingredients ---

    #[tool(description = "Add an ingredient to a recipe using the amount and unit exactly as written")]
    fn add_recipe_ingredient(&self, Parameters(p): Parameters<AddRecipeIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeIngredientCreate {
            recipe_id: p.recipe_id, name: p.name, amount: p.amount, unit: p.unit,
            position: p.position, notes: p.notes,
        };
        let result = recipes::add_recipe_ingredient(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update an ingredient's name, amount, unit, position or notes")]
    fn update_recipe_ingredient(&self, Parameters(p): Parameters<UpdateRecipeIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeIngredientUpdate {
            name: p.name, amount: p.amount, unit: p.unit, position: p.position, notes: p.notes,
        };
        let result = recipes::update_recipe_ingredient(&self.database, p.id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Remove an ingredient from its recipe")]
    fn remove_recipe_ingredient(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::remove_recipe_ingredient(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Preferences ---

    #[tool(description = "Get the saved measurement system and dietary restrictions")]
    fn get_preferences(&self) -> Result<CallToolResult, McpError> {
        let result = preferences::get_preferences(&self.database, self.default_system)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Set the measurement system recipes are displayed in: metric or imperial")]
    fn set_measurement_system(&self, Parameters(p): Parameters<SetMeasurementSystemParams>) -> Result<CallToolResult, McpError> {
        let system = parse_system(&p.measurement_system)?;
        let result = preferences::set_measurement_system(&self.database, system.to_db_str())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Replace the list of dietary restrictions")]
    fn set_dietary_restrictions(&self, Parameters(p): Parameters<SetDietaryRestrictionsParams>) -> Result<CallToolResult, McpError> {
        let result = preferences::set_dietary_restrictions(&self.database, &p.restrictions, self.default_system)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Conversion ---

    #[tool(description = "Convert an amount between metric and imperial and format it for display")]
    fn convert_quantity(&self, Parameters(p): Parameters<ConvertQuantityParams>) -> Result<CallToolResult, McpError> {
        let system = parse_system(&p.measurement_system)?;
        json_result(&conversions::convert_quantity(&p.amount, &p.unit, system))
    }

    #[tool(description = "Report whether a unit is metric, imperial or countable, and what it converts to")]
    fn classify_unit(&self, Parameters(p): Parameters<ClassifyUnitParams>) -> Result<CallToolResult, McpError> {
        json_result(&conversions::classify_unit(&p.unit))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MealPrepService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mealprep".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("MealPrep Agent".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MealPrep Agent - recipe management with metric/imperial display conversion. \
                 Call usage_instructions first. \
                 Recipes: create/get/list/search/update/delete_recipe, reorder_instruction, import_recipe. \
                 Ingredients: add/update/remove_recipe_ingredient (store amounts as written). \
                 Preferences: get_preferences, set_measurement_system, set_dietary_restrictions. \
                 Conversion: convert_quantity, classify_unit."
                    .into(),
            ),
        }
    }
}
