use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::coerce::CoercionOptions;
use crate::error::{CoreError, Result};
use crate::record::RecordSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analytics: AnalyticsConfig,
    pub risk: RiskThresholds,
    pub import: ImportConfig,
    pub reconciliation: ReconciliationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Number of most recent days shown in the W/L pattern.
    pub recent_window: usize,
}

/// Yellow and red cut-offs for one risk indicator. A reading at or above a
/// cut-off takes that colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorThresholds {
    pub yellow: Decimal,
    pub red: Decimal,
}

impl IndicatorThresholds {
    #[must_use]
    pub const fn new(yellow: Decimal, red: Decimal) -> Self {
        Self { yellow, red }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Max drawdown as a fraction of bankroll.
    pub drawdown_ratio: IndicatorThresholds,
    /// Length of the current losing streak, in days.
    pub loss_streak: IndicatorThresholds,
    /// Share of the float held by the single largest house.
    pub float_concentration: IndicatorThresholds,
    /// Last day's loss as a fraction of bankroll.
    pub daily_loss_ratio: IndicatorThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Minimum bigram similarity for a fuzzy header match (0.0 - 1.0).
    pub similarity_threshold: f64,
    /// Read slash dates as day/month/year.
    pub day_first_dates: bool,
    /// Named schemas imported sheets are mapped onto.
    pub schemas: BTreeMap<String, RecordSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Largest difference still treated as balanced.
    pub balance_tolerance: Decimal,
    /// Differences at or above this are major discrepancies.
    pub major_discrepancy: Decimal,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { recent_window: 7 }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            drawdown_ratio: IndicatorThresholds::new(dec!(0.10), dec!(0.20)),
            loss_streak: IndicatorThresholds::new(dec!(3), dec!(5)),
            float_concentration: IndicatorThresholds::new(dec!(0.40), dec!(0.60)),
            daily_loss_ratio: IndicatorThresholds::new(dec!(0.03), dec!(0.05)),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        let mut schemas = BTreeMap::new();
        schemas.insert("bets".to_string(), RecordSchema::bets());
        schemas.insert("daily".to_string(), RecordSchema::daily());
        schemas.insert("movements".to_string(), RecordSchema::movements());
        Self {
            similarity_threshold: 0.6,
            day_first_dates: true,
            schemas,
        }
    }
}

impl ImportConfig {
    #[must_use]
    pub const fn coercion_options(&self) -> CoercionOptions {
        CoercionOptions {
            day_first_dates: self.day_first_dates,
        }
    }

    #[must_use]
    pub fn schema(&self, name: &str) -> Option<&RecordSchema> {
        self.schemas.get(name)
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: dec!(0.01),
            major_discrepancy: dec!(10),
        }
    }
}

impl AppConfig {
    /// Checks that loaded values are usable.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfig` naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.analytics.recent_window == 0 {
            return Err(CoreError::InvalidConfig(
                "analytics.recent_window must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.import.similarity_threshold) {
            return Err(CoreError::InvalidConfig(format!(
                "import.similarity_threshold must be within [0, 1], got {}",
                self.import.similarity_threshold
            )));
        }

        let indicators = [
            ("drawdown_ratio", &self.risk.drawdown_ratio),
            ("loss_streak", &self.risk.loss_streak),
            ("float_concentration", &self.risk.float_concentration),
            ("daily_loss_ratio", &self.risk.daily_loss_ratio),
        ];
        for (name, thresholds) in indicators {
            if thresholds.yellow > thresholds.red {
                return Err(CoreError::InvalidConfig(format!(
                    "risk.{name}: yellow ({}) is above red ({})",
                    thresholds.yellow, thresholds.red
                )));
            }
        }

        let rec = &self.reconciliation;
        if rec.balance_tolerance < Decimal::ZERO || rec.major_discrepancy < rec.balance_tolerance {
            return Err(CoreError::InvalidConfig(format!(
                "reconciliation: need 0 <= balance_tolerance ({}) <= major_discrepancy ({})",
                rec.balance_tolerance, rec.major_discrepancy
            )));
        }

        Ok(())
    }
}
