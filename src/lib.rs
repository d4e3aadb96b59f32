//! MealPrep Agent Library
//!
//! Recipe storage with metric/imperial display conversion.

pub mod build_info;
pub mod config;
pub mod db;
pub mod import;
pub mod mcp;
pub mod measurement;
pub mod models;
pub mod tools;
