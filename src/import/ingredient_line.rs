//! Ingredient line parsing
//!
//! Turns free text such as "1 1/2 cups flour, sifted" into an amount, a
//! canonical unit symbol and a name.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::measurement::Unit;

/// Unit used when a line has a count but no recognizable unit ("2 eggs")
pub const DEFAULT_COUNT_UNIT: &str = "whole";

/// Leading amount: mixed number, simple fraction or decimal, optionally
/// followed by a unicode vulgar fraction ("1½")
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(\d+\s+\d+/\d+|\d+/\d+|\d+(?:[.,]\d+)?)\s*)?([½¼¾⅓⅔⅛])?")
        .expect("amount pattern is valid")
});

/// A parsed ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    pub amount: f64,
    pub unit: String,
    pub name: String,
    pub notes: Option<String>,
}

fn vulgar_fraction(c: char) -> Option<f64> {
    match c {
        '½' => Some(0.5),
        '¼' => Some(0.25),
        '¾' => Some(0.75),
        '⅓' => Some(1.0 / 3.0),
        '⅔' => Some(2.0 / 3.0),
        '⅛' => Some(0.125),
        _ => None,
    }
}

fn parse_fraction(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Some((whole, frac)) = s.split_once(char::is_whitespace) {
        let whole: f64 = whole.parse().ok()?;
        return Some(whole + parse_fraction(frac)?);
    }
    if s.contains('/') {
        return parse_fraction(s);
    }
    s.replace(',', ".").parse().ok()
}

/// Split a leading amount off `text`. Returns the amount (if any) and the remainder.
pub fn split_amount(text: &str) -> (Option<f64>, &str) {
    let Some(caps) = AMOUNT_RE.captures(text) else {
        return (None, text.trim());
    };

    let number = caps.get(1).map(|m| m.as_str());
    let fraction = caps
        .get(2)
        .and_then(|m| m.as_str().chars().next())
        .and_then(vulgar_fraction);

    let amount = match (number, fraction) {
        (None, None) => return (None, text.trim()),
        (Some(n), frac) => parse_number(n).map(|v| v + frac.unwrap_or(0.0)),
        (None, Some(frac)) => Some(frac),
    };

    match (amount, caps.get(0)) {
        (Some(amount), Some(m)) => (Some(amount), text[m.end()..].trim()),
        _ => (None, text.trim()),
    }
}

/// Parse a leading amount from a string like "1 1/2", "¾" or "4 servings"
pub fn parse_amount(text: &str) -> Option<f64> {
    split_amount(text).0
}

/// Take a unit off the front of `rest`, trying two-word units first ("fl oz")
fn split_unit(rest: &str) -> (Option<Unit>, &str) {
    let words: Vec<&str> = rest.split_whitespace().collect();

    if words.len() >= 2 {
        let pair = format!("{} {}", words[0], words[1]);
        if let Some(unit) = Unit::parse_alias(&pair) {
            return (Some(unit), skip_words(rest, 2));
        }
    }

    if let Some(first) = words.first() {
        if let Some(unit) = Unit::parse_alias(first) {
            return (Some(unit), skip_words(rest, 1));
        }
    }

    (None, rest)
}

/// Drop the first `n` whitespace-separated words
fn skip_words(s: &str, n: usize) -> &str {
    let mut remaining = s.trim_start();
    for _ in 0..n {
        remaining = match remaining.find(char::is_whitespace) {
            Some(idx) => remaining[idx..].trim_start(),
            None => "",
        };
    }
    remaining
}

/// Parse one ingredient line
///
/// Lines without a leading amount keep the whole text as the name with an
/// amount of zero; a trailing ", note" is split off into `notes`.
pub fn parse_ingredient_line(line: &str) -> ParsedIngredient {
    let (amount, rest) = split_amount(line);

    let (unit, name_part) = match amount {
        Some(_) => split_unit(rest),
        None => (None, rest),
    };

    let name_part = name_part.strip_prefix("of ").unwrap_or(name_part);
    let (name, notes) = match name_part.split_once(',') {
        Some((name, note)) if amount.is_some() && !note.trim().is_empty() => {
            (name.trim().to_string(), Some(note.trim().to_string()))
        }
        _ => (name_part.trim().to_string(), None),
    };

    ParsedIngredient {
        amount: amount.unwrap_or(0.0),
        unit: unit
            .map(|u| u.symbol().to_string())
            .unwrap_or_else(|| DEFAULT_COUNT_UNIT.to_string()),
        name,
        notes,
    }
}
