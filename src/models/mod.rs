//! Data models
//!
//! Rust structs representing database entities.

mod recipe;
mod recipe_ingredient;
mod user_preferences;

pub use recipe::{move_step, score_recipe, RankedRecipe, Recipe, RecipeCreate, RecipeUpdate};
pub use recipe_ingredient::{
    canonical_unit, validate_amount, RecipeIngredient, RecipeIngredientCreate, RecipeIngredientUpdate,
};
pub use user_preferences::UserPreferences;
