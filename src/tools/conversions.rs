//! Conversion MCP Tools
//!
//! Expose the unit converter directly, without a stored recipe.

use serde::Serialize;

use crate::measurement::{
    coerce_amount, convert_ingredient, convert_value, format_converted_value, is_countable_unit,
    is_imperial_unit, is_metric_unit, ConvertedIngredient, MeasurementSystem, Quantity, Unit,
    UnitFamily,
};

/// Response for convert_quantity
#[derive(Debug, Serialize)]
pub struct ConvertQuantityResponse {
    /// Null when the input was not a finite number
    pub input_amount: Option<f64>,
    pub input_unit: String,
    pub target_system: MeasurementSystem,
    /// Direct table conversion
    pub converted: Quantity,
    /// Conversion after rescaling to a friendlier unit
    pub optimized: ConvertedIngredient,
    pub display: String,
}

/// Response for classify_unit
#[derive(Debug, Serialize)]
pub struct UnitClassification {
    pub unit: String,
    pub recognized: bool,
    pub family: Option<UnitFamily>,
    pub is_metric: bool,
    pub is_imperial: bool,
    pub is_countable: bool,
    /// Where a conversion of this unit lands, if it converts at all
    pub converts_to: Option<String>,
}

/// Convert an amount for display. Non-numeric amounts degrade to zero.
pub fn convert_quantity(
    amount: &serde_json::Value,
    unit: &str,
    target_system: MeasurementSystem,
) -> ConvertQuantityResponse {
    let value = coerce_amount(amount);
    let converted = convert_value(value, unit, target_system);
    let optimized = convert_ingredient(value, unit, target_system);
    let display = format_converted_value(optimized.amount, &optimized.unit);

    ConvertQuantityResponse {
        input_amount: value.is_finite().then_some(value),
        input_unit: unit.to_string(),
        target_system,
        converted,
        optimized,
        display,
    }
}

/// Report how a unit symbol is classified
pub fn classify_unit(unit: &str) -> UnitClassification {
    let parsed = Unit::parse(unit);
    UnitClassification {
        unit: unit.to_string(),
        recognized: parsed.is_some(),
        family: parsed.map(|u| u.family()),
        is_metric: is_metric_unit(unit),
        is_imperial: is_imperial_unit(unit),
        is_countable: is_countable_unit(unit),
        converts_to: parsed
            .and_then(|u| u.conversion())
            .map(|c| c.counterpart.symbol().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_quantity() {
        let response = convert_quantity(&json!(1000), "g", MeasurementSystem::Imperial);
        assert_eq!(response.input_amount, Some(1000.0));
        assert_eq!(response.converted, Quantity::new(35.3, "oz"));
        assert_eq!(response.optimized.unit, "lb");
        assert_eq!(response.display, "2.2 lb");
    }

    #[test]
    fn test_convert_quantity_large_metric_display() {
        let response = convert_quantity(&json!(1500), "ml", MeasurementSystem::Metric);
        assert_eq!(response.converted, Quantity::new(1500.0, "ml"));
        assert_eq!(response.display, "1.5 l");
        assert_eq!(format_converted_value(response.converted.value, &response.converted.unit), "1,500 ml");
    }

    #[test]
    fn test_convert_quantity_non_numeric() {
        let response = convert_quantity(&json!("abc"), "g", MeasurementSystem::Imperial);
        assert_eq!(response.input_amount, None);
        assert_eq!(response.converted, Quantity::new(0.0, "g"));
        assert_eq!(response.display, "0.00 g");
    }

    #[test]
    fn test_classify_unit() {
        let tbsp = classify_unit("tbsp");
        assert!(tbsp.recognized && tbsp.is_imperial);
        assert_eq!(tbsp.family, Some(UnitFamily::Volume));
        assert_eq!(tbsp.converts_to.as_deref(), Some("ml"));

        let clove = classify_unit("clove");
        assert!(clove.is_countable);
        assert_eq!(clove.converts_to, None);

        let scoop = classify_unit("scoop");
        assert!(!scoop.recognized);
        assert!(!scoop.is_metric && !scoop.is_imperial && !scoop.is_countable);
    }
}
