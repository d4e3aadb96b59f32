//! Unit types and conversion constants
//!
//! Closed set of measurement units, the metric/imperial classifier and the
//! per-unit conversion table used for display-time conversion.

use serde::{Deserialize, Serialize};

/// Display convention chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    #[default]
    Metric,
    Imperial,
}

impl MeasurementSystem {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Some(MeasurementSystem::Metric),
            "imperial" => Some(MeasurementSystem::Imperial),
            _ => None,
        }
    }

    /// Convert to database string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MeasurementSystem::Metric => "metric",
            MeasurementSystem::Imperial => "imperial",
        }
    }
}

impl std::fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// Physical dimension of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitFamily {
    Weight,
    Volume,
    Temperature,
    Length,
    /// Discrete items, never converted
    Countable,
}

/// A recognized measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Gram,
    Kilogram,
    Ounce,
    Pound,
    Milliliter,
    Liter,
    FluidOunce,
    Cup,
    Tablespoon,
    Teaspoon,
    Celsius,
    Fahrenheit,
    Centimeter,
    Meter,
    Inch,
    Foot,
    Piece,
    Whole,
    Slice,
    Clove,
    Head,
    Bunch,
    Can,
    Package,
}

// ============================================================================
// Conversion Constants
// ============================================================================

pub const OZ_PER_G: f64 = 0.035274;
pub const LB_PER_KG: f64 = 2.20462;
pub const G_PER_OZ: f64 = 28.3495;
pub const KG_PER_LB: f64 = 0.453592;

pub const FL_OZ_PER_ML: f64 = 0.033814;
pub const CUP_PER_L: f64 = 4.22675;
pub const ML_PER_FL_OZ: f64 = 29.5735;
pub const ML_PER_CUP: f64 = 236.588;
pub const ML_PER_TBSP: f64 = 14.7868;
pub const ML_PER_TSP: f64 = 4.92892;

pub const IN_PER_CM: f64 = 0.393701;
pub const FT_PER_M: f64 = 3.28084;
pub const CM_PER_IN: f64 = 2.54;
pub const M_PER_FT: f64 = 0.3048;

/// One-directional transform from a unit to its counterpart
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Multiply by a constant factor
    Linear(f64),
    /// v * 9/5 + 32
    CelsiusToFahrenheit,
    /// (v - 32) * 5/9
    FahrenheitToCelsius,
}

impl Transform {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Transform::Linear(factor) => value * factor,
            Transform::CelsiusToFahrenheit => value * 9.0 / 5.0 + 32.0,
            Transform::FahrenheitToCelsius => (value - 32.0) * 5.0 / 9.0,
        }
    }
}

/// Conversion table entry: the transform and the unit it lands in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub transform: Transform,
    pub counterpart: Unit,
}

impl Unit {
    pub const ALL: [Unit; 24] = [
        Unit::Gram,
        Unit::Kilogram,
        Unit::Ounce,
        Unit::Pound,
        Unit::Milliliter,
        Unit::Liter,
        Unit::FluidOunce,
        Unit::Cup,
        Unit::Tablespoon,
        Unit::Teaspoon,
        Unit::Celsius,
        Unit::Fahrenheit,
        Unit::Centimeter,
        Unit::Meter,
        Unit::Inch,
        Unit::Foot,
        Unit::Piece,
        Unit::Whole,
        Unit::Slice,
        Unit::Clove,
        Unit::Head,
        Unit::Bunch,
        Unit::Can,
        Unit::Package,
    ];

    /// Parse a canonical unit symbol ("g", "fl oz", "C", "clove", ...)
    pub fn parse(symbol: &str) -> Option<Self> {
        let unit = match symbol.trim() {
            "g" => Unit::Gram,
            "kg" => Unit::Kilogram,
            "oz" => Unit::Ounce,
            "lb" => Unit::Pound,
            "ml" => Unit::Milliliter,
            "l" => Unit::Liter,
            "fl oz" => Unit::FluidOunce,
            "cup" => Unit::Cup,
            "tbsp" => Unit::Tablespoon,
            "tsp" => Unit::Teaspoon,
            "C" => Unit::Celsius,
            "F" => Unit::Fahrenheit,
            "cm" => Unit::Centimeter,
            "m" => Unit::Meter,
            "in" => Unit::Inch,
            "ft" => Unit::Foot,
            "piece" => Unit::Piece,
            "whole" => Unit::Whole,
            "slice" => Unit::Slice,
            "clove" => Unit::Clove,
            "head" => Unit::Head,
            "bunch" => Unit::Bunch,
            "can" => Unit::Can,
            "package" => Unit::Package,
            _ => return None,
        };
        Some(unit)
    }

    /// Parse a unit written the way people write recipes ("cups", "Tablespoons", "fluid ounce")
    pub fn parse_alias(word: &str) -> Option<Self> {
        if let Some(unit) = Self::parse(word) {
            return Some(unit);
        }

        let trimmed = word.trim().trim_end_matches('.');
        if let Some(unit) = Self::parse(trimmed) {
            return Some(unit);
        }

        let lower = trimmed.to_lowercase();
        if let Some(unit) = Self::parse(&lower) {
            return Some(unit);
        }
        let unit = match lower.as_str() {
            "gram" | "grams" | "gr" => Unit::Gram,
            "kilogram" | "kilograms" | "kgs" => Unit::Kilogram,
            "ounce" | "ounces" => Unit::Ounce,
            "lbs" | "pound" | "pounds" => Unit::Pound,
            "milliliter" | "milliliters" | "millilitre" | "millilitres" => Unit::Milliliter,
            "liter" | "liters" | "litre" | "litres" => Unit::Liter,
            "floz" | "fl. oz" | "fluid ounce" | "fluid ounces" => Unit::FluidOunce,
            "cups" | "c" => Unit::Cup,
            "tablespoon" | "tablespoons" | "tbs" | "tbsps" => Unit::Tablespoon,
            "teaspoon" | "teaspoons" | "tsps" => Unit::Teaspoon,
            "°c" | "celsius" => Unit::Celsius,
            "°f" | "fahrenheit" => Unit::Fahrenheit,
            "centimeter" | "centimeters" | "centimetre" | "centimetres" => Unit::Centimeter,
            "meter" | "meters" | "metre" | "metres" => Unit::Meter,
            "inch" | "inches" => Unit::Inch,
            "foot" | "feet" => Unit::Foot,
            "pieces" | "pc" | "pcs" => Unit::Piece,
            "slices" => Unit::Slice,
            "cloves" => Unit::Clove,
            "heads" => Unit::Head,
            "bunches" => Unit::Bunch,
            "cans" => Unit::Can,
            "packages" | "pkg" | "packet" | "packets" => Unit::Package,
            _ => return None,
        };
        Some(unit)
    }

    /// Canonical symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Ounce => "oz",
            Unit::Pound => "lb",
            Unit::Milliliter => "ml",
            Unit::Liter => "l",
            Unit::FluidOunce => "fl oz",
            Unit::Cup => "cup",
            Unit::Tablespoon => "tbsp",
            Unit::Teaspoon => "tsp",
            Unit::Celsius => "C",
            Unit::Fahrenheit => "F",
            Unit::Centimeter => "cm",
            Unit::Meter => "m",
            Unit::Inch => "in",
            Unit::Foot => "ft",
            Unit::Piece => "piece",
            Unit::Whole => "whole",
            Unit::Slice => "slice",
            Unit::Clove => "clove",
            Unit::Head => "head",
            Unit::Bunch => "bunch",
            Unit::Can => "can",
            Unit::Package => "package",
        }
    }

    pub fn family(&self) -> UnitFamily {
        match self {
            Unit::Gram | Unit::Kilogram | Unit::Ounce | Unit::Pound => UnitFamily::Weight,
            Unit::Milliliter
            | Unit::Liter
            | Unit::FluidOunce
            | Unit::Cup
            | Unit::Tablespoon
            | Unit::Teaspoon => UnitFamily::Volume,
            Unit::Celsius | Unit::Fahrenheit => UnitFamily::Temperature,
            Unit::Centimeter | Unit::Meter | Unit::Inch | Unit::Foot => UnitFamily::Length,
            Unit::Piece
            | Unit::Whole
            | Unit::Slice
            | Unit::Clove
            | Unit::Head
            | Unit::Bunch
            | Unit::Can
            | Unit::Package => UnitFamily::Countable,
        }
    }

    /// The system this unit belongs to; `None` for countable units
    pub fn system(&self) -> Option<MeasurementSystem> {
        match self {
            Unit::Gram
            | Unit::Kilogram
            | Unit::Milliliter
            | Unit::Liter
            | Unit::Celsius
            | Unit::Centimeter
            | Unit::Meter => Some(MeasurementSystem::Metric),
            Unit::Ounce
            | Unit::Pound
            | Unit::FluidOunce
            | Unit::Cup
            | Unit::Tablespoon
            | Unit::Teaspoon
            | Unit::Fahrenheit
            | Unit::Inch
            | Unit::Foot => Some(MeasurementSystem::Imperial),
            _ => None,
        }
    }

    /// Conversion table entry. Metric units map to imperial and vice versa;
    /// each unit has exactly one counterpart.
    pub fn conversion(&self) -> Option<Conversion> {
        let (transform, counterpart) = match self {
            Unit::Gram => (Transform::Linear(OZ_PER_G), Unit::Ounce),
            Unit::Kilogram => (Transform::Linear(LB_PER_KG), Unit::Pound),
            Unit::Ounce => (Transform::Linear(G_PER_OZ), Unit::Gram),
            Unit::Pound => (Transform::Linear(KG_PER_LB), Unit::Kilogram),
            Unit::Milliliter => (Transform::Linear(FL_OZ_PER_ML), Unit::FluidOunce),
            Unit::Liter => (Transform::Linear(CUP_PER_L), Unit::Cup),
            Unit::FluidOunce => (Transform::Linear(ML_PER_FL_OZ), Unit::Milliliter),
            Unit::Cup => (Transform::Linear(ML_PER_CUP), Unit::Milliliter),
            Unit::Tablespoon => (Transform::Linear(ML_PER_TBSP), Unit::Milliliter),
            Unit::Teaspoon => (Transform::Linear(ML_PER_TSP), Unit::Milliliter),
            Unit::Celsius => (Transform::CelsiusToFahrenheit, Unit::Fahrenheit),
            Unit::Fahrenheit => (Transform::FahrenheitToCelsius, Unit::Celsius),
            Unit::Centimeter => (Transform::Linear(IN_PER_CM), Unit::Inch),
            Unit::Meter => (Transform::Linear(FT_PER_M), Unit::Foot),
            Unit::Inch => (Transform::Linear(CM_PER_IN), Unit::Centimeter),
            Unit::Foot => (Transform::Linear(M_PER_FT), Unit::Meter),
            _ => return None,
        };
        Some(Conversion {
            transform,
            counterpart,
        })
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// Unit Classification
// ============================================================================

/// True for g, kg, ml, l, C, cm, m
pub fn is_metric_unit(unit: &str) -> bool {
    Unit::parse(unit).and_then(|u| u.system()) == Some(MeasurementSystem::Metric)
}

/// True for oz, lb, fl oz, cup, tbsp, tsp, F, in, ft
pub fn is_imperial_unit(unit: &str) -> bool {
    Unit::parse(unit).and_then(|u| u.system()) == Some(MeasurementSystem::Imperial)
}

/// True for discrete item units (piece, clove, can, ...)
pub fn is_countable_unit(unit: &str) -> bool {
    Unit::parse(unit).map(|u| u.family()) == Some(UnitFamily::Countable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_partitions_every_unit() {
        for unit in Unit::ALL {
            let s = unit.symbol();
            let hits = [is_metric_unit(s), is_imperial_unit(s), is_countable_unit(s)]
                .iter()
                .filter(|b| **b)
                .count();
            assert_eq!(hits, 1, "unit {} matched {} categories", s, hits);
        }
    }

    #[test]
    fn test_classify_metric_units() {
        for s in ["g", "kg", "ml", "l", "C", "cm", "m"] {
            assert!(is_metric_unit(s), "{}", s);
        }
        assert!(!is_metric_unit("oz"));
    }

    #[test]
    fn test_classify_imperial_units() {
        for s in ["oz", "lb", "fl oz", "cup", "tbsp", "tsp", "F", "in", "ft"] {
            assert!(is_imperial_unit(s), "{}", s);
        }
        assert!(!is_imperial_unit("g"));
    }

    #[test]
    fn test_classify_countable_units() {
        for s in ["piece", "whole", "slice", "clove", "head", "bunch", "can", "package"] {
            assert!(is_countable_unit(s), "{}", s);
            assert!(!is_metric_unit(s));
            assert!(!is_imperial_unit(s));
        }
    }

    #[test]
    fn test_unknown_unit_matches_nothing() {
        assert!(!is_metric_unit("scoop"));
        assert!(!is_imperial_unit("scoop"));
        assert!(!is_countable_unit("scoop"));
        assert_eq!(Unit::parse("scoop"), None);
    }

    #[test]
    fn test_symbol_round_trips_through_parse() {
        for unit in Unit::ALL {
            assert_eq!(Unit::parse(unit.symbol()), Some(unit));
        }
    }

    #[test]
    fn test_conversion_counterpart_is_in_other_system() {
        for unit in Unit::ALL {
            match unit.conversion() {
                Some(conv) => {
                    assert_eq!(conv.counterpart.family(), unit.family());
                    assert_ne!(conv.counterpart.system(), unit.system());
                }
                None => assert_eq!(unit.family(), UnitFamily::Countable),
            }
        }
    }

    #[test]
    fn test_temperature_transforms() {
        assert_eq!(Transform::CelsiusToFahrenheit.apply(100.0), 212.0);
        assert_eq!(Transform::FahrenheitToCelsius.apply(212.0), 100.0);
        assert_eq!(Transform::CelsiusToFahrenheit.apply(-40.0), -40.0);
    }

    #[test]
    fn test_parse_alias() {
        assert_eq!(Unit::parse_alias("Cups"), Some(Unit::Cup));
        assert_eq!(Unit::parse_alias("tablespoons"), Some(Unit::Tablespoon));
        assert_eq!(Unit::parse_alias("fluid ounces"), Some(Unit::FluidOunce));
        assert_eq!(Unit::parse_alias("lbs"), Some(Unit::Pound));
        assert_eq!(Unit::parse_alias("tsp."), Some(Unit::Teaspoon));
        assert_eq!(Unit::parse_alias("cloves"), Some(Unit::Clove));
        assert_eq!(Unit::parse_alias("onion"), None);
    }

    #[test]
    fn test_parse_alias_trailing_dot_and_case() {
        assert_eq!(Unit::parse_alias("tbsp."), Some(Unit::Tablespoon));
        assert_eq!(Unit::parse_alias("oz."), Some(Unit::Ounce));
        assert_eq!(Unit::parse_alias("lb."), Some(Unit::Pound));
        assert_eq!(Unit::parse_alias("g."), Some(Unit::Gram));
        assert_eq!(Unit::parse_alias("Tbsp"), Some(Unit::Tablespoon));
        assert_eq!(Unit::parse_alias("ML"), Some(Unit::Milliliter));
        assert_eq!(Unit::parse_alias("C"), Some(Unit::Celsius));
        assert_eq!(Unit::parse_alias("F."), Some(Unit::Fahrenheit));
        assert_eq!(Unit::parse_alias("c"), Some(Unit::Cup));
    }

    #[test]
    fn test_measurement_system_from_str() {
        assert_eq!(MeasurementSystem::from_str("Imperial"), Some(MeasurementSystem::Imperial));
        assert_eq!(MeasurementSystem::from_str(" metric "), Some(MeasurementSystem::Metric));
        assert_eq!(MeasurementSystem::from_str("nautical"), None);
        assert_eq!(MeasurementSystem::Imperial.to_db_str(), "imperial");
    }
}
