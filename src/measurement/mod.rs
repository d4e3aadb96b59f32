//! Measurement module
//!
//! Unit classification and metric/imperial display conversion.

pub mod converter;
pub mod units;

pub use converter::{
    coerce_amount, convert_ingredient, convert_value, format_converted_value, optimize_unit,
    round_to_reasonable_precision, ConvertedIngredient, Quantity,
};
pub use units::{
    is_countable_unit, is_imperial_unit, is_metric_unit, Conversion, MeasurementSystem,
    Transform, Unit, UnitFamily,
};
