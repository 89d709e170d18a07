//! Daily and per-bet outcome records.
//!
//! These are the inputs of the streak analysis and the KPI summary. Values
//! arrive already deserialized from the backend or an imported sheet; a
//! missing or unreadable amount is carried as `None` and read as zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::coerce::coerce_decimal;

/// One day's net profit or loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyOutcome {
    /// Calendar day the result belongs to.
    pub date: NaiveDate,
    /// Net result of the day. `None` when the source value was missing or malformed.
    pub result_value: Option<Decimal>,
}

impl DailyOutcome {
    #[must_use]
    pub const fn new(date: NaiveDate, result_value: Decimal) -> Self {
        Self {
            date,
            result_value: Some(result_value),
        }
    }

    /// Builds an outcome from a raw text cell.
    ///
    /// Unreadable values are kept as `None` so the day still counts.
    #[must_use]
    pub fn from_raw(date: NaiveDate, raw: &str) -> Self {
        let result_value = coerce_decimal(&Value::String(raw.to_string())).value();
        if result_value.is_none() {
            tracing::warn!("Unreadable result '{}' on {}, treating as zero", raw, date);
        }
        Self { date, result_value }
    }

    /// Net result with missing values read as zero.
    #[must_use]
    pub fn value(&self) -> Decimal {
        self.result_value.unwrap_or(Decimal::ZERO)
    }
}

/// Settlement state of a single bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    Green,
    Red,
    Void,
    Cashout,
    Pending,
}

impl BetResult {
    /// Returns true once the bet has a final result.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Void => "void",
            Self::Cashout => "cashout",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for BetResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a bet result label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bet result: {0}")]
pub struct UnknownBetResult(pub String);

impl FromStr for BetResult {
    type Err = UnknownBetResult;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" | "win" | "ganha" | "ganho" => Ok(Self::Green),
            "red" | "loss" | "perdida" | "perda" => Ok(Self::Red),
            "void" | "anulada" | "devolvida" => Ok(Self::Void),
            "cashout" | "cash out" | "cash_out" => Ok(Self::Cashout),
            "pending" | "pendente" | "aberta" => Ok(Self::Pending),
            _ => Err(UnknownBetResult(s.to_string())),
        }
    }
}

/// A single bet as seen by the analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetOutcome {
    pub date: NaiveDate,
    pub result: BetResult,
    /// Amount staked, when known.
    #[serde(default)]
    pub stake: Option<Decimal>,
    /// Realised profit (negative on a loss), when known.
    #[serde(default)]
    pub profit: Option<Decimal>,
}

impl BetOutcome {
    #[must_use]
    pub const fn new(date: NaiveDate, result: BetResult) -> Self {
        Self {
            date,
            result,
            stake: None,
            profit: None,
        }
    }

    /// Attaches stake and profit amounts.
    #[must_use]
    pub const fn with_amounts(mut self, stake: Decimal, profit: Decimal) -> Self {
        self.stake = Some(stake);
        self.profit = Some(profit);
        self
    }

    #[must_use]
    pub fn stake_or_zero(&self) -> Decimal {
        self.stake.unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn profit_or_zero(&self) -> Decimal {
        self.profit.unwrap_or(Decimal::ZERO)
    }
}
