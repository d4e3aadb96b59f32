//! Recipe import
//!
//! Turns assistant-generated recipe text into structured drafts.

pub mod extractor;
pub mod ingredient_line;

pub use extractor::{extract_recipe_json, ExtractError, RecipeDraft};
pub use ingredient_line::{parse_amount, parse_ingredient_line, ParsedIngredient};
