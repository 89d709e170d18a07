//! Risk semaphore.
//!
//! Classifies a handful of bankroll indicators against yellow/red cut-offs
//! and rolls them up into a single traffic-light level:
//!
//! - drawdown ratio: max drawdown / bankroll
//! - loss streak: length of the losing streak in progress
//! - float concentration: largest house balance / float
//! - daily loss ratio: last day's loss / bankroll
//!
//! The overall level is the worst indicator; the score adds 1 per yellow and
//! 2 per red so that two dashboards at the same level can still be ranked.

use betbalance_core::{IndicatorThresholds, RiskThresholds};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::kpi::{DayResult, KpiSummary};
use crate::streaks::{StreakKind, StreakSummary};

/// Traffic-light level, ordered from safest to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Green,
    Yellow,
    Red,
}

impl RiskLevel {
    #[must_use]
    pub const fn points(self) -> u8 {
        match self {
            Self::Green => 0,
            Self::Yellow => 1,
            Self::Red => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskIndicator {
    DrawdownRatio,
    LossStreak,
    FloatConcentration,
    DailyLossRatio,
}

impl RiskIndicator {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DrawdownRatio => "Drawdown / bankroll",
            Self::LossStreak => "Losing streak (days)",
            Self::FloatConcentration => "Float in largest house",
            Self::DailyLossRatio => "Last day loss / bankroll",
        }
    }
}

/// Values the semaphore is evaluated on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskInputs {
    pub bankroll: Decimal,
    /// Money held across all houses.
    pub float: Decimal,
    pub largest_house_balance: Decimal,
    pub max_drawdown: Decimal,
    pub current_loss_streak: u32,
    /// Net result of the most recent day.
    pub last_day_result: Decimal,
}

impl RiskInputs {
    /// Assembles inputs from the KPI and streak analyses plus house balances.
    #[must_use]
    pub fn from_analysis(
        bankroll: Decimal,
        kpi: &KpiSummary,
        streaks: Option<&StreakSummary>,
        last_day: Option<DayResult>,
        float: Decimal,
        largest_house_balance: Decimal,
    ) -> Self {
        let current_loss_streak = streaks
            .map(|s| &s.current_streak)
            .filter(|s| s.kind == StreakKind::Loss)
            .map_or(0, |s| s.length);

        Self {
            bankroll,
            float,
            largest_house_balance,
            max_drawdown: kpi.max_drawdown,
            current_loss_streak,
            last_day_result: last_day.map_or(Decimal::ZERO, |d| d.value),
        }
    }
}

/// One classified indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorReading {
    pub indicator: RiskIndicator,
    pub value: Decimal,
    pub thresholds: IndicatorThresholds,
    pub level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskReport {
    pub readings: Vec<IndicatorReading>,
    /// Worst level among the readings.
    pub level: RiskLevel,
    /// Sum of reading points (yellow 1, red 2).
    pub score: u8,
}

impl RiskReport {
    pub fn alerts(&self) -> impl Iterator<Item = &IndicatorReading> {
        self.readings.iter().filter(|r| r.level != RiskLevel::Green)
    }
}

pub struct RiskSemaphore {
    thresholds: RiskThresholds,
}

impl RiskSemaphore {
    #[must_use]
    pub const fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    #[must_use]
    pub fn evaluate(&self, inputs: &RiskInputs) -> RiskReport {
        let daily_loss = if inputs.last_day_result < Decimal::ZERO {
            -inputs.last_day_result
        } else {
            Decimal::ZERO
        };

        let readings = vec![
            Self::read(
                RiskIndicator::DrawdownRatio,
                ratio(inputs.max_drawdown, inputs.bankroll),
                self.thresholds.drawdown_ratio,
            ),
            Self::read(
                RiskIndicator::LossStreak,
                Decimal::from(inputs.current_loss_streak),
                self.thresholds.loss_streak,
            ),
            Self::read(
                RiskIndicator::FloatConcentration,
                ratio(inputs.largest_house_balance, inputs.float),
                self.thresholds.float_concentration,
            ),
            Self::read(
                RiskIndicator::DailyLossRatio,
                ratio(daily_loss, inputs.bankroll),
                self.thresholds.daily_loss_ratio,
            ),
        ];

        let level = readings
            .iter()
            .map(|r| r.level)
            .max()
            .unwrap_or(RiskLevel::Green);
        let score = readings.iter().map(|r| r.level.points()).sum();

        if level != RiskLevel::Green {
            tracing::warn!("Risk semaphore at {} (score {})", level, score);
        }

        RiskReport {
            readings,
            level,
            score,
        }
    }

    fn read(indicator: RiskIndicator, value: Decimal, thresholds: IndicatorThresholds) -> IndicatorReading {
        IndicatorReading {
            indicator,
            value,
            thresholds,
            level: classify(value, thresholds),
        }
    }
}

fn classify(value: Decimal, thresholds: IndicatorThresholds) -> RiskLevel {
    if value >= thresholds.red {
        RiskLevel::Red
    } else if value >= thresholds.yellow {
        RiskLevel::Yellow
    } else {
        RiskLevel::Green
    }
}

/// `numerator / denominator`, or zero when the denominator is not positive.
/// An overflowing quotient saturates.
fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(if numerator.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaks::analyze_daily_streaks;
    use betbalance_core::DailyOutcome;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn calm_inputs() -> RiskInputs {
        RiskInputs {
            bankroll: dec!(10000),
            float: dec!(4000),
            largest_house_balance: dec!(1000),
            max_drawdown: dec!(200),
            current_loss_streak: 0,
            last_day_result: dec!(150),
        }
    }

    fn semaphore() -> RiskSemaphore {
        RiskSemaphore::new(RiskThresholds::default())
    }

    #[test]
    fn calm_bankroll_is_green() {
        let report = semaphore().evaluate(&calm_inputs());
        assert_eq!(report.level, RiskLevel::Green);
        assert_eq!(report.score, 0);
        assert_eq!(report.readings.len(), 4);
        assert_eq!(report.alerts().count(), 0);
    }

    #[test]
    fn level_is_worst_indicator() {
        let inputs = RiskInputs {
            current_loss_streak: 3,
            max_drawdown: dec!(2500),
            ..calm_inputs()
        };
        let report = semaphore().evaluate(&inputs);

        assert_eq!(report.level, RiskLevel::Red);
        assert_eq!(report.score, 3);
        let streak = report
            .readings
            .iter()
            .find(|r| r.indicator == RiskIndicator::LossStreak)
            .unwrap();
        assert_eq!(streak.level, RiskLevel::Yellow);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let inputs = RiskInputs {
            last_day_result: dec!(-300),
            ..calm_inputs()
        };
        let report = semaphore().evaluate(&inputs);
        let daily = report
            .readings
            .iter()
            .find(|r| r.indicator == RiskIndicator::DailyLossRatio)
            .unwrap();
        assert_eq!(daily.value, dec!(0.03));
        assert_eq!(daily.level, RiskLevel::Yellow);
    }

    #[test]
    fn zero_denominators_read_green() {
        let inputs = RiskInputs {
            bankroll: Decimal::ZERO,
            float: Decimal::ZERO,
            ..calm_inputs()
        };
        let report = semaphore().evaluate(&inputs);
        assert_eq!(report.level, RiskLevel::Green);
    }

    #[test]
    fn concentration_flags_single_house() {
        let inputs = RiskInputs {
            largest_house_balance: dec!(3000),
            ..calm_inputs()
        };
        let report = semaphore().evaluate(&inputs);
        assert_eq!(report.level, RiskLevel::Red);
    }

    #[test]
    fn inputs_from_analysis_pick_current_loss_streak() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
        let outcomes = vec![
            DailyOutcome::new(day(1), dec!(50)),
            DailyOutcome::new(day(2), dec!(-20)),
            DailyOutcome::new(day(3), dec!(-30)),
        ];
        let kpi = KpiSummary::from_outcomes(&outcomes, &[]);
        let streaks = analyze_daily_streaks(&outcomes);

        let inputs = RiskInputs::from_analysis(
            dec!(1000),
            &kpi,
            streaks.as_ref(),
            KpiSummary::last_day(&outcomes),
            dec!(800),
            dec!(400),
        );

        assert_eq!(inputs.current_loss_streak, 2);
        assert_eq!(inputs.max_drawdown, dec!(50));
        assert_eq!(inputs.last_day_result, dec!(-30));
    }

    #[test]
    fn overflowing_ratio_saturates_to_red() {
        let inputs = RiskInputs {
            bankroll: dec!(0.0000000000000000000000000001),
            max_drawdown: Decimal::MAX,
            ..calm_inputs()
        };
        let report = semaphore().evaluate(&inputs);

        assert_eq!(report.readings[0].value, Decimal::MAX);
        assert_eq!(report.level, RiskLevel::Red);
    }

    #[test]
    fn report_survives_json() {
        let report = semaphore().evaluate(&RiskInputs {
            current_loss_streak: 4,
            ..calm_inputs()
        });

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["level"], serde_json::to_value(report.level).unwrap());

        let restored: RiskReport = serde_json::from_value(json).unwrap();
        assert_eq!(restored, report);
    }
}
