//! Unit conversion functions
//!
//! Display-time conversion of ingredient quantities between metric and
//! imperial, plus unit optimization and formatting. Every function here is
//! pure; invalid numbers degrade to zero instead of erroring.

use serde::{Deserialize, Serialize};

use super::units::{MeasurementSystem, Unit, UnitFamily};

/// A value paired with its unit symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

impl Quantity {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

/// An ingredient amount ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedIngredient {
    pub amount: f64,
    pub unit: String,
}

/// Round half-up, matching how the UI rounds
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round a converted value to a precision that reads well in a recipe
///
/// - `>= 100`: whole number
/// - `>= 1`: one decimal place
/// - otherwise: two decimal places
pub fn round_to_reasonable_precision(value: f64) -> f64 {
    if value >= 100.0 {
        round_half_up(value)
    } else if value >= 1.0 {
        round_half_up(value * 10.0) / 10.0
    } else {
        round_half_up(value * 100.0) / 100.0
    }
}

/// Convert a value from `from_unit` into `to_system`
///
/// Countable units, units already in the target system and unrecognized
/// units come back unchanged. Non-finite input returns `(0, from_unit)`.
pub fn convert_value(value: f64, from_unit: &str, to_system: MeasurementSystem) -> Quantity {
    if !value.is_finite() {
        return Quantity::new(0.0, from_unit);
    }

    let Some(unit) = Unit::parse(from_unit) else {
        return Quantity::new(value, from_unit);
    };

    if unit.family() == UnitFamily::Countable || unit.system() == Some(to_system) {
        return Quantity::new(value, from_unit);
    }

    match unit.conversion() {
        Some(conversion) => {
            let converted = conversion.transform.apply(value);
            if !converted.is_finite() {
                return Quantity::new(0.0, from_unit);
            }
            Quantity::new(
                round_to_reasonable_precision(converted),
                conversion.counterpart.symbol(),
            )
        }
        None => Quantity::new(value, from_unit),
    }
}

/// Convert an ingredient amount for display in `target_system`
///
/// Applies [`convert_value`] and then [`optimize_unit`]; a rescaled amount
/// is rounded again so "35.3 oz" shows as "2.2 lb".
pub fn convert_ingredient(
    amount: f64,
    unit: &str,
    target_system: MeasurementSystem,
) -> ConvertedIngredient {
    let converted = convert_value(amount, unit, target_system);
    let optimized = optimize_unit(converted.value, &converted.unit);

    let amount = if optimized.unit != converted.unit {
        round_to_reasonable_precision(optimized.value)
    } else {
        optimized.value
    };

    ConvertedIngredient {
        amount,
        unit: optimized.unit,
    }
}

/// Rescale to a larger unit once a threshold is crossed (16 oz -> 1 lb)
pub fn optimize_unit(value: f64, unit: &str) -> Quantity {
    if !value.is_finite() {
        return Quantity::new(0.0, unit);
    }

    match unit {
        "oz" if value >= 16.0 => Quantity::new(value / 16.0, "lb"),
        "fl oz" if value >= 8.0 => Quantity::new(value / 8.0, "cup"),
        "ml" if value >= 1000.0 => Quantity::new(value / 1000.0, "l"),
        "g" if value >= 1000.0 => Quantity::new(value / 1000.0, "kg"),
        _ => Quantity::new(value, unit),
    }
}

/// Render a value and unit for display
///
/// Values of 1000 and above get thousands separators, values below 1 get
/// two fixed decimals.
pub fn format_converted_value(value: f64, unit: &str) -> String {
    if !value.is_finite() {
        return format!("0 {}", unit);
    }

    if value >= 1000.0 {
        format!("{} {}", group_thousands(value), unit)
    } else if value >= 1.0 {
        format!("{} {}", value, unit)
    } else {
        format!("{:.2} {}", value, unit)
    }
}

/// Thousands-grouped rendering with at most three fractional digits
fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac)
    }
}

/// Read an amount from untyped JSON; anything that isn't a number becomes NaN
/// so it degrades to zero downstream.
pub fn coerce_amount(value: &serde_json::Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::units::MeasurementSystem::{Imperial, Metric};
    use crate::measurement::units::Unit;
    use serde_json::json;

    #[test]
    fn test_precision_buckets() {
        assert_eq!(round_to_reasonable_precision(123.456), 123.0);
        assert_eq!(round_to_reasonable_precision(45.678), 45.7);
        assert_eq!(round_to_reasonable_precision(5.678), 5.7);
        assert_eq!(round_to_reasonable_precision(0.456), 0.46);
    }

    #[test]
    fn test_precision_rounds_half_up_for_negatives() {
        assert_eq!(round_to_reasonable_precision(-17.7777), -17.78);
        assert_eq!(round_to_reasonable_precision(-0.125), -0.12);
    }

    #[test]
    fn test_same_system_is_identity() {
        for unit in Unit::ALL {
            let symbol = unit.symbol();
            match unit.system() {
                Some(system) => {
                    assert_eq!(convert_value(12.34, symbol, system), Quantity::new(12.34, symbol));
                }
                None => {
                    assert_eq!(convert_value(3.0, symbol, Metric), Quantity::new(3.0, symbol));
                    assert_eq!(convert_value(3.0, symbol, Imperial), Quantity::new(3.0, symbol));
                }
            }
        }
    }

    #[test]
    fn test_cups_to_millilitres() {
        assert_eq!(convert_value(4.0, "cup", Metric), Quantity::new(946.0, "ml"));
    }

    #[test]
    fn test_grams_to_ounces() {
        assert_eq!(convert_value(1000.0, "g", Imperial), Quantity::new(35.3, "oz"));
    }

    #[test]
    fn test_temperature_is_affine() {
        assert_eq!(convert_value(0.0, "C", Imperial), Quantity::new(32.0, "F"));
        assert_eq!(convert_value(350.0, "F", Metric), Quantity::new(177.0, "C"));
        assert_eq!(convert_value(0.0, "F", Metric), Quantity::new(-17.78, "C"));
    }

    #[test]
    fn test_length_conversions() {
        assert_eq!(convert_value(10.0, "in", Metric), Quantity::new(25.4, "cm"));
        assert_eq!(convert_value(2.0, "m", Imperial), Quantity::new(6.6, "ft"));
    }

    #[test]
    fn test_metric_imperial_round_trip() {
        let pairs = [("g", 100.0), ("kg", 2.0), ("ml", 250.0), ("cm", 30.0), ("m", 5.0)];
        for (unit, value) in pairs {
            let there = convert_value(value, unit, Imperial);
            let back = convert_value(there.value, &there.unit, Metric);
            assert_eq!(back.unit, unit);
            let tolerance = value * 0.02;
            assert!(
                (back.value - value).abs() <= tolerance,
                "{} {} came back as {}",
                value,
                unit,
                back.value
            );
        }
    }

    #[test]
    fn test_invalid_numbers_degrade_to_zero() {
        assert_eq!(convert_value(f64::NAN, "g", Imperial), Quantity::new(0.0, "g"));
        assert_eq!(convert_value(f64::INFINITY, "g", Imperial), Quantity::new(0.0, "g"));
        assert_eq!(
            convert_value(f64::NEG_INFINITY, "cup", Metric),
            Quantity::new(0.0, "cup")
        );
        let abc = coerce_amount(&json!("abc"));
        assert_eq!(convert_value(abc, "g", Imperial), Quantity::new(0.0, "g"));
    }

    #[test]
    fn test_overflowing_conversion_degrades_to_zero() {
        assert_eq!(convert_value(1e308, "oz", Metric), Quantity::new(0.0, "oz"));
        assert_eq!(convert_value(f64::MAX, "cup", Metric), Quantity::new(0.0, "cup"));
        assert_eq!(
            convert_ingredient(1e308, "oz", Metric),
            ConvertedIngredient { amount: 0.0, unit: "oz".to_string() }
        );
    }

    #[test]
    fn test_unknown_unit_passes_through() {
        assert_eq!(convert_value(2.0, "scoop", Imperial), Quantity::new(2.0, "scoop"));
    }

    #[test]
    fn test_optimizer_thresholds() {
        assert_eq!(optimize_unit(16.0, "oz"), Quantity::new(1.0, "lb"));
        assert_eq!(optimize_unit(15.9, "oz"), Quantity::new(15.9, "oz"));
        assert_eq!(optimize_unit(1000.0, "g"), Quantity::new(1.0, "kg"));
        assert_eq!(optimize_unit(12.0, "fl oz"), Quantity::new(1.5, "cup"));
        assert_eq!(optimize_unit(8.0, "fl oz"), Quantity::new(1.0, "cup"));
        assert_eq!(optimize_unit(7.9, "fl oz"), Quantity::new(7.9, "fl oz"));
        assert_eq!(optimize_unit(999.9, "g"), Quantity::new(999.9, "g"));
        assert_eq!(optimize_unit(2500.0, "ml"), Quantity::new(2.5, "l"));
        assert_eq!(optimize_unit(999.0, "ml"), Quantity::new(999.0, "ml"));
        assert_eq!(optimize_unit(f64::NAN, "oz"), Quantity::new(0.0, "oz"));
    }

    #[test]
    fn test_convert_ingredient_optimizes() {
        let converted = convert_ingredient(1000.0, "g", Imperial);
        assert_eq!(converted.unit, "lb");
        assert_eq!(converted.amount, 2.2);

        let same = convert_ingredient(1500.0, "ml", Metric);
        assert_eq!(same.unit, "l");
        assert_eq!(same.amount, 1.5);

        let cloves = convert_ingredient(3.0, "clove", Imperial);
        assert_eq!(cloves, ConvertedIngredient { amount: 3.0, unit: "clove".to_string() });
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_converted_value(1500.0, "ml"), "1,500 ml");
        assert_eq!(format_converted_value(1234567.0, "g"), "1,234,567 g");
        assert_eq!(format_converted_value(1234.5, "g"), "1,234.5 g");
        assert_eq!(format_converted_value(1000.0, "ml"), "1,000 ml");
    }

    #[test]
    fn test_format_mid_and_small_values() {
        assert_eq!(format_converted_value(35.3, "oz"), "35.3 oz");
        assert_eq!(format_converted_value(946.0, "ml"), "946 ml");
        assert_eq!(format_converted_value(0.456, "cup"), "0.46 cup");
        assert_eq!(format_converted_value(0.5, "tsp"), "0.50 tsp");
        assert_eq!(format_converted_value(1.0, "cup"), "1 cup");
        assert_eq!(format_converted_value(999.0, "g"), "999 g");
        assert_eq!(format_converted_value(0.0, "g"), "0.00 g");
    }

    #[test]
    fn test_format_invalid() {
        assert_eq!(format_converted_value(f64::NAN, "g"), "0 g");
        assert_eq!(format_converted_value(f64::INFINITY, "cup"), "0 cup");
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount(&json!(2.5)), 2.5);
        assert_eq!(coerce_amount(&json!(3)), 3.0);
        assert!(coerce_amount(&json!(null)).is_nan());
        assert!(coerce_amount(&json!("5")).is_nan());
    }
}
