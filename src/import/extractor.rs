//! Recipe JSON extraction
//!
//! Pulls a recipe object out of free-form assistant output. The text may
//! wrap the JSON in a fenced code block or surround it with prose.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ingredient_line::{parse_amount, parse_ingredient_line, ParsedIngredient, DEFAULT_COUNT_UNIT};
use crate::measurement::Unit;

static FENCED_JSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```").expect("fence pattern is valid")
});

/// Extraction failures
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No JSON object found in text")]
    NoJsonFound,

    #[error("Recipe JSON is malformed: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Recipe JSON has no name")]
    MissingName,
}

/// A recipe ready to be saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub description: Option<String>,
    pub servings: f64,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub ingredients: Vec<ParsedIngredient>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawIngredient {
    Line(String),
    Structured {
        name: String,
        #[serde(default, alias = "quantity")]
        amount: Option<serde_json::Value>,
        #[serde(default)]
        unit: Option<String>,
        #[serde(default)]
        notes: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawInstruction {
    Text(String),
    Step {
        #[serde(alias = "instruction", alias = "step")]
        text: String,
    },
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    #[serde(default, alias = "title")]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "yield")]
    servings: Option<serde_json::Value>,
    #[serde(default, alias = "prep_time", alias = "prepTime")]
    prep_time_minutes: Option<serde_json::Value>,
    #[serde(default, alias = "cook_time", alias = "cookTime")]
    cook_time_minutes: Option<serde_json::Value>,
    #[serde(default)]
    ingredients: Vec<RawIngredient>,
    #[serde(default, alias = "steps")]
    instructions: Vec<RawInstruction>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Numbers may arrive as JSON numbers or as text like "4 servings"
fn lenient_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse_amount(s),
        _ => None,
    }
}

fn lenient_minutes(value: Option<&serde_json::Value>) -> Option<i64> {
    value
        .and_then(lenient_number)
        .filter(|m| m.is_finite() && *m >= 0.0)
        .map(|m| m.round() as i64)
}

/// Locate the JSON object text inside `text`
fn find_json(text: &str) -> Option<&str> {
    if let Some(caps) = FENCED_JSON_RE.captures(text) {
        if let Some(m) = caps.get(1) {
            return Some(m.as_str());
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

impl RawIngredient {
    fn into_parsed(self) -> ParsedIngredient {
        match self {
            RawIngredient::Line(line) => parse_ingredient_line(&line),
            RawIngredient::Structured {
                name,
                amount,
                unit,
                notes,
            } => {
                let unit = unit
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty())
                    .map(|u| Unit::parse_alias(&u).map(|p| p.symbol().to_string()).unwrap_or(u))
                    .unwrap_or_else(|| DEFAULT_COUNT_UNIT.to_string());

                ParsedIngredient {
                    amount: amount.as_ref().and_then(lenient_number).unwrap_or(0.0),
                    unit,
                    name: name.trim().to_string(),
                    notes,
                }
            }
        }
    }
}

/// Extract a recipe from assistant text
pub fn extract_recipe_json(text: &str) -> Result<RecipeDraft, ExtractError> {
    let json = find_json(text).ok_or(ExtractError::NoJsonFound)?;
    let raw: RawRecipe = serde_json::from_str(json)?;

    let name = raw
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or(ExtractError::MissingName)?;

    let servings = raw
        .servings
        .as_ref()
        .and_then(lenient_number)
        .filter(|s| *s > 0.0)
        .unwrap_or(1.0);

    let instructions = raw
        .instructions
        .into_iter()
        .map(|step| match step {
            RawInstruction::Text(text) | RawInstruction::Step { text } => text.trim().to_string(),
        })
        .filter(|step| !step.is_empty())
        .collect();

    let draft = RecipeDraft {
        name,
        description: raw.description,
        servings,
        prep_time_minutes: lenient_minutes(raw.prep_time_minutes.as_ref()),
        cook_time_minutes: lenient_minutes(raw.cook_time_minutes.as_ref()),
        ingredients: raw
            .ingredients
            .into_iter()
            .map(RawIngredient::into_parsed)
            .filter(|ingredient| !ingredient.name.is_empty())
            .collect(),
        instructions,
        tags: raw.tags,
    };

    tracing::debug!(
        name = %draft.name,
        ingredients = draft.ingredients.len(),
        steps = draft.instructions.len(),
        "extracted recipe draft"
    );
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_block_wins() {
        let text = r#"Sure! Here is the recipe {not json}:

```json
{"name": "Guacamole", "servings": 4, "ingredients": ["3 avocados", "1 tbsp lime juice"], "instructions": ["Mash", "Season"]}
```
Enjoy {the dip}."#;

        let draft = extract_recipe_json(text).unwrap();
        assert_eq!(draft.name, "Guacamole");
        assert_eq!(draft.servings, 4.0);
        assert_eq!(draft.ingredients.len(), 2);
        assert_eq!(draft.ingredients[1].unit, "tbsp");
        assert_eq!(draft.instructions, vec!["Mash", "Season"]);
    }

    #[test]
    fn test_bare_object_in_prose() {
        let text = r#"Recipe: {"title": "Toast", "ingredients": [{"name": "bread", "quantity": "2", "unit": "slices"}]} done"#;
        let draft = extract_recipe_json(text).unwrap();
        assert_eq!(draft.name, "Toast");
        assert_eq!(draft.servings, 1.0);
        assert_eq!(draft.ingredients[0].amount, 2.0);
        assert_eq!(draft.ingredients[0].unit, "slice");
    }

    #[test]
    fn test_lenient_fields() {
        let text = r#"{"name": "Stew", "servings": "6 servings", "prep_time": "15 minutes",
            "cookTime": 90, "steps": [{"text": "Brown the beef"}, "Simmer", "  "],
            "ingredients": [{"name": "beef", "amount": 1.5, "unit": "pounds"}, {"name": "bay leaf"}]}"#;
        let draft = extract_recipe_json(text).unwrap();
        assert_eq!(draft.servings, 6.0);
        assert_eq!(draft.prep_time_minutes, Some(15));
        assert_eq!(draft.cook_time_minutes, Some(90));
        assert_eq!(draft.instructions, vec!["Brown the beef", "Simmer"]);
        assert_eq!(draft.ingredients[0].unit, "lb");
        assert_eq!(draft.ingredients[1].amount, 0.0);
        assert_eq!(draft.ingredients[1].unit, DEFAULT_COUNT_UNIT);
    }

    #[test]
    fn test_unknown_structured_unit_is_kept() {
        let text = r#"{"name": "Shake", "ingredients": [{"name": "protein powder", "amount": 1, "unit": "scoop"}]}"#;
        let draft = extract_recipe_json(text).unwrap();
        assert_eq!(draft.ingredients[0].unit, "scoop");
    }

    #[test]
    fn test_blank_ingredients_are_dropped() {
        let text = r#"{"name": "Salad", "ingredients": ["", "   ", {"name": "  ", "amount": 1, "unit": "g"}, "2 tomatoes"]}"#;
        let draft = extract_recipe_json(text).unwrap();
        assert_eq!(draft.ingredients.len(), 1);
        assert_eq!(draft.ingredients[0].name, "tomatoes");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(extract_recipe_json("no recipe here"), Err(ExtractError::NoJsonFound)));
        assert!(matches!(extract_recipe_json("{ broken"), Err(ExtractError::NoJsonFound)));
        assert!(matches!(extract_recipe_json("{\"name\": }"), Err(ExtractError::InvalidJson(_))));
        assert!(matches!(extract_recipe_json("{\"name\": \"  \"}"), Err(ExtractError::MissingName)));
        assert!(matches!(extract_recipe_json("{\"servings\": 2}"), Err(ExtractError::MissingName)));
    }
}
