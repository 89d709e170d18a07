//! Lenient coercion of raw cell values into typed values.
//!
//! Imported sheets carry most values as text, written with whatever locale
//! the operator's spreadsheet used. Each coercion reports whether the value
//! was read as-is, read under an interpretation the operator should confirm
//! (comma decimals, day/month order, two-digit years), or could not be read.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::record::FieldType;

/// Outcome of reading a raw value as a typed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coercion<T> {
    /// Read without any interpretation.
    Exact(T),
    /// Read, but only after choosing one of several plausible readings.
    Interpreted { value: T, note: String },
    /// Not readable as the requested type.
    Failed,
}

impl<T> Coercion<T> {
    /// Returns the value, if any was read.
    #[must_use]
    pub fn value(self) -> Option<T> {
        match self {
            Self::Exact(value) | Self::Interpreted { value, .. } => Some(value),
            Self::Failed => None,
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns the interpretation note when one was applied.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        match self {
            Self::Interpreted { note, .. } => Some(note),
            _ => None,
        }
    }

    /// Maps the carried value, keeping the interpretation note.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Coercion<U> {
        match self {
            Self::Exact(value) => Coercion::Exact(f(value)),
            Self::Interpreted { value, note } => Coercion::Interpreted {
                value: f(value),
                note,
            },
            Self::Failed => Coercion::Failed,
        }
    }
}

/// Locale preferences applied while coercing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionOptions {
    /// Read `01/02/2024` as 1 February (day first) rather than 2 January.
    pub day_first_dates: bool,
}

impl Default for CoercionOptions {
    fn default() -> Self {
        Self {
            day_first_dates: true,
        }
    }
}

/// Returns true when a cell is absent, null or only whitespace.
#[must_use]
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Reads a value as a decimal amount.
#[must_use]
pub fn coerce_decimal(value: &Value) -> Coercion<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_or(Coercion::Failed, Coercion::Exact)
        }
        Value::String(s) => coerce_decimal_str(s),
        _ => Coercion::Failed,
    }
}

fn coerce_decimal_str(raw: &str) -> Coercion<Decimal> {
    let trimmed = raw.trim();
    let (negative, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = body
        .replace("R$", "")
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Coercion::Failed;
    }

    let commas = cleaned.matches(',').count();
    let dots = cleaned.matches('.').count();

    let (normalized, note) = match (commas, dots) {
        (0, 0) => (cleaned.clone(), None),
        (0, 1) => {
            let ambiguous = is_single_thousands_group(&cleaned, '.');
            let note = ambiguous.then(|| format!("read '{raw}' with '.' as decimal point"));
            (cleaned.clone(), note)
        }
        (0, _) => {
            if !has_valid_grouping(&cleaned, '.') {
                return Coercion::Failed;
            }
            (
                cleaned.replace('.', ""),
                Some(format!("read '{raw}' with '.' as thousands separator")),
            )
        }
        (1, 0) => (
            cleaned.replace(',', "."),
            Some(format!("read '{raw}' with ',' as decimal separator")),
        ),
        (_, 0) => {
            if !has_valid_grouping(&cleaned, ',') {
                return Coercion::Failed;
            }
            (
                cleaned.replace(',', ""),
                Some(format!("read '{raw}' with ',' as thousands separator")),
            )
        }
        _ => {
            // Whichever separator comes last is the decimal one.
            let last_comma = cleaned.rfind(',').unwrap_or(0);
            let last_dot = cleaned.rfind('.').unwrap_or(0);
            let (thousands, decimal) = if last_comma > last_dot {
                ('.', ',')
            } else {
                (',', '.')
            };
            if cleaned.matches(decimal).count() != 1 {
                return Coercion::Failed;
            }
            let int_part = &cleaned[..cleaned.rfind(decimal).unwrap_or(cleaned.len())];
            if !has_valid_grouping(int_part, thousands) {
                return Coercion::Failed;
            }
            let normalized = cleaned.replace(thousands, "").replace(decimal, ".");
            (
                normalized,
                Some(format!(
                    "read '{raw}' with '{decimal}' as decimal separator and '{thousands}' as thousands separator"
                )),
            )
        }
    };

    if !normalized
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+')))
    {
        return Coercion::Failed;
    }

    let Ok(mut amount) = Decimal::from_str(&normalized) else {
        return Coercion::Failed;
    };
    if negative {
        amount = -amount;
    }

    match note {
        Some(note) => Coercion::Interpreted {
            value: amount,
            note,
        },
        None => Coercion::Exact(amount),
    }
}

/// `1.234` or `12,500`: one separator followed by exactly three digits.
fn is_single_thousands_group(s: &str, sep: char) -> bool {
    let digits = s.trim_start_matches(['-', '+']);
    match digits.split_once(sep) {
        Some((int_part, frac)) => {
            (1..=3).contains(&int_part.len())
                && int_part != "0"
                && frac.len() == 3
                && frac.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Checks `1.234.567` style grouping: a 1-3 digit head, then 3-digit groups.
fn has_valid_grouping(s: &str, sep: char) -> bool {
    let digits = s.trim_start_matches(['-', '+']);
    let mut groups = digits.split(sep);
    let head_ok = groups
        .next()
        .is_some_and(|head| (1..=3).contains(&head.len()));
    head_ok && groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Reads a value as a whole number.
#[must_use]
pub fn coerce_integer(value: &Value) -> Coercion<i64> {
    if let Some(n) = value.as_i64() {
        return Coercion::Exact(n);
    }
    match coerce_decimal(value) {
        Coercion::Exact(d) if d.fract().is_zero() => d.to_i64().map_or(Coercion::Failed, Coercion::Exact),
        Coercion::Interpreted { value: d, note } if d.fract().is_zero() => d
            .to_i64()
            .map_or(Coercion::Failed, |value| Coercion::Interpreted { value, note }),
        _ => Coercion::Failed,
    }
}

/// Reads a value as a calendar date.
#[must_use]
pub fn coerce_date(value: &Value, options: &CoercionOptions) -> Coercion<NaiveDate> {
    let Value::String(raw) = value else {
        return Coercion::Failed;
    };
    let s = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Coercion::Exact(date);
    }
    // Timestamps such as 2024-03-01T10:00:00 carry the date in the first ten bytes.
    if s.len() > 10 && s.is_char_boundary(10) && matches!(s.as_bytes()[10], b'T' | b' ') {
        if let Ok(date) = NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d") {
            return Coercion::Exact(date);
        }
    }

    let parts: Vec<&str> = s.split(['/', '-', '.']).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return Coercion::Failed;
    }
    let nums: Vec<u32> = parts.iter().filter_map(|p| p.parse().ok()).collect();
    if nums.len() != 3 {
        return Coercion::Failed;
    }

    if parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(nums[0] as i32, nums[1], nums[2])
            .map_or(Coercion::Failed, Coercion::Exact);
    }

    let (year, two_digit_year) = match parts[2].len() {
        4 => (nums[2] as i32, false),
        2 => (2000 + nums[2] as i32, true),
        _ => return Coercion::Failed,
    };

    let (first, second) = (nums[0], nums[1]);
    let (day, month) = if options.day_first_dates {
        (first, second)
    } else {
        (second, first)
    };
    let primary = NaiveDate::from_ymd_opt(year, month, day);
    let swapped = NaiveDate::from_ymd_opt(year, day, month);

    let mut notes = Vec::new();
    let date = match (primary, swapped) {
        (Some(date), Some(_)) if first != second => {
            let order = if options.day_first_dates {
                "day/month"
            } else {
                "month/day"
            };
            notes.push(format!("read '{raw}' as {order}"));
            date
        }
        (Some(date), _) => date,
        (None, Some(date)) => {
            let order = if options.day_first_dates {
                "month/day"
            } else {
                "day/month"
            };
            notes.push(format!("read '{raw}' as {order}"));
            date
        }
        (None, None) => return Coercion::Failed,
    };
    if two_digit_year {
        notes.push(format!("two-digit year read as {year}"));
    }

    if notes.is_empty() {
        Coercion::Exact(date)
    } else {
        Coercion::Interpreted {
            value: date,
            note: notes.join("; "),
        }
    }
}

/// Reads a value as a yes/no flag.
#[must_use]
pub fn coerce_bool(value: &Value) -> Coercion<bool> {
    match value {
        Value::Bool(b) => Coercion::Exact(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Coercion::Exact(true),
            Some(0) => Coercion::Exact(false),
            _ => Coercion::Failed,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" | "sim" | "s" => Coercion::Exact(true),
            "false" | "0" | "no" | "n" | "não" | "nao" => Coercion::Exact(false),
            _ => Coercion::Failed,
        },
        _ => Coercion::Failed,
    }
}

/// Coerces a value to the declared field type, returning its normalized JSON form.
///
/// Decimals become canonical strings and dates ISO strings so that two rows
/// holding the same amount in different notations compare equal.
#[must_use]
pub fn coerce_field(value: &Value, field_type: FieldType, options: &CoercionOptions) -> Coercion<Value> {
    match field_type {
        FieldType::Text => Coercion::Exact(value.clone()),
        FieldType::Decimal => coerce_decimal(value).map(|d| Value::String(d.normalize().to_string())),
        FieldType::Integer => coerce_integer(value).map(Value::from),
        FieldType::Date => coerce_date(value, options).map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        FieldType::Boolean => coerce_bool(value).map(Value::Bool),
    }
}
