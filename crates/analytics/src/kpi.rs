//! Headline bankroll KPIs over daily results and individual bets.

use betbalance_core::{BetOutcome, BetResult, DailyOutcome};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single day's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayResult {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// KPI card values for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    // Daily ledger
    /// Sum of all daily results.
    pub net_result: Decimal,
    pub total_days: usize,
    /// Days with a strictly positive result.
    pub winning_days: usize,
    /// Days with a zero or negative result.
    pub losing_days: usize,
    pub best_day: Option<DayResult>,
    pub worst_day: Option<DayResult>,
    /// Largest peak-to-trough fall of the cumulative daily result.
    pub max_drawdown: Decimal,

    // Bets
    pub settled_bets: usize,
    pub pending_bets: usize,
    pub green_bets: usize,
    /// Green bets over settled bets.
    pub bet_win_rate: f64,
    /// Stake over settled bets.
    pub total_staked: Decimal,
    /// Profit over settled bets.
    pub bet_profit: Decimal,
    /// Return on investment (bet_profit / total_staked).
    pub roi: Decimal,
}

impl KpiSummary {
    /// Computes KPIs from daily results and bets. Either slice may be empty.
    #[must_use]
    pub fn from_outcomes(days: &[DailyOutcome], bets: &[BetOutcome]) -> Self {
        let mut summary = Self::empty();

        let mut sorted: Vec<&DailyOutcome> = days.iter().collect();
        sorted.sort_by_key(|o| o.date);

        summary.total_days = sorted.len();
        summary.net_result = sorted
            .iter()
            .fold(Decimal::ZERO, |acc, o| acc.saturating_add(o.value()));
        summary.winning_days = sorted.iter().filter(|o| o.value() > Decimal::ZERO).count();
        summary.losing_days = summary.total_days - summary.winning_days;

        // Strict comparisons keep the earliest day on ties.
        for outcome in &sorted {
            let current = DayResult {
                date: outcome.date,
                value: outcome.value(),
            };
            if summary.best_day.map_or(true, |b| current.value > b.value) {
                summary.best_day = Some(current);
            }
            if summary.worst_day.map_or(true, |w| current.value < w.value) {
                summary.worst_day = Some(current);
            }
        }
        summary.max_drawdown = Self::calculate_max_drawdown(sorted.iter().map(|o| o.value()));

        for bet in bets {
            if bet.result == BetResult::Pending {
                summary.pending_bets += 1;
                continue;
            }
            summary.settled_bets += 1;
            if bet.result == BetResult::Green {
                summary.green_bets += 1;
            }
            summary.total_staked = summary.total_staked.saturating_add(bet.stake_or_zero());
            summary.bet_profit = summary.bet_profit.saturating_add(bet.profit_or_zero());
        }

        summary.bet_win_rate = if summary.settled_bets > 0 {
            summary.green_bets as f64 / summary.settled_bets as f64
        } else {
            0.0
        };
        summary.roi = if summary.total_staked > Decimal::ZERO {
            summary
                .bet_profit
                .checked_div(summary.total_staked)
                .unwrap_or(if summary.bet_profit.is_sign_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                })
        } else {
            Decimal::ZERO
        };

        summary
    }

    /// Returns the all-zero summary for when there is no data.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            net_result: Decimal::ZERO,
            total_days: 0,
            winning_days: 0,
            losing_days: 0,
            best_day: None,
            worst_day: None,
            max_drawdown: Decimal::ZERO,
            settled_bets: 0,
            pending_bets: 0,
            green_bets: 0,
            bet_win_rate: 0.0,
            total_staked: Decimal::ZERO,
            bet_profit: Decimal::ZERO,
            roi: Decimal::ZERO,
        }
    }

    /// Result of the most recent day, if any.
    #[must_use]
    pub fn last_day(days: &[DailyOutcome]) -> Option<DayResult> {
        days.iter().max_by_key(|o| o.date).map(|o| DayResult {
            date: o.date,
            value: o.value(),
        })
    }

    /// Calculates maximum drawdown from peak cumulative result.
    fn calculate_max_drawdown(values: impl Iterator<Item = Decimal>) -> Decimal {
        let mut peak = Decimal::ZERO;
        let mut equity = Decimal::ZERO;
        let mut max_dd = Decimal::ZERO;

        for value in values {
            equity = equity.saturating_add(value);
            if equity > peak {
                peak = equity;
            }
            let drawdown = peak.saturating_sub(equity);
            if drawdown > max_dd {
                max_dd = drawdown;
            }
        }

        max_dd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn days(values: &[Decimal]) -> Vec<DailyOutcome> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| DailyOutcome::new(day(i as u32 + 1), *v))
            .collect()
    }

    #[test]
    fn empty_inputs_give_empty_summary() {
        assert_eq!(KpiSummary::from_outcomes(&[], &[]), KpiSummary::empty());
    }

    #[test]
    fn daily_counts_and_extremes() {
        let summary =
            KpiSummary::from_outcomes(&days(&[dec!(10), dec!(-4), dec!(0), dec!(25), dec!(-4)]), &[]);

        assert_eq!(summary.net_result, dec!(27));
        assert_eq!(summary.winning_days, 2);
        assert_eq!(summary.losing_days, 3);
        assert_eq!(summary.best_day.unwrap().date, day(4));
        // Earliest of the two -4 days.
        assert_eq!(summary.worst_day.unwrap().date, day(2));
    }

    #[test]
    fn drawdown_from_peak() {
        // Equity: 100, 60, 90, 20, 50 -> peak 100, trough 20
        let summary = KpiSummary::from_outcomes(
            &days(&[dec!(100), dec!(-40), dec!(30), dec!(-70), dec!(30)]),
            &[],
        );
        assert_eq!(summary.max_drawdown, dec!(80));
    }

    #[test]
    fn drawdown_ignores_input_order() {
        let mut outcomes = days(&[dec!(100), dec!(-40), dec!(30), dec!(-70), dec!(30)]);
        outcomes.reverse();
        let summary = KpiSummary::from_outcomes(&outcomes, &[]);
        assert_eq!(summary.max_drawdown, dec!(80));
    }

    #[test]
    fn bet_roi_and_win_rate() {
        let bets = vec![
            BetOutcome::new(day(1), BetResult::Green).with_amounts(dec!(100), dec!(90)),
            BetOutcome::new(day(2), BetResult::Red).with_amounts(dec!(100), dec!(-100)),
            BetOutcome::new(day(3), BetResult::Void).with_amounts(dec!(50), dec!(0)),
            BetOutcome::new(day(4), BetResult::Green).with_amounts(dec!(50), dec!(60)),
            BetOutcome::new(day(5), BetResult::Pending).with_amounts(dec!(500), dec!(0)),
        ];
        let summary = KpiSummary::from_outcomes(&[], &bets);

        assert_eq!(summary.settled_bets, 4);
        assert_eq!(summary.pending_bets, 1);
        assert_eq!(summary.total_staked, dec!(300));
        assert_eq!(summary.bet_profit, dec!(50));
        assert!((summary.bet_win_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(summary.roi.round_dp(4), dec!(0.1667));
    }

    #[test]
    fn last_day_is_most_recent() {
        let mut outcomes = days(&[dec!(1), dec!(2), dec!(-3)]);
        outcomes.swap(0, 2);
        assert_eq!(KpiSummary::last_day(&outcomes).unwrap().value, dec!(-3));
        assert!(KpiSummary::last_day(&[]).is_none());
    }

    #[test]
    fn extreme_values_saturate() {
        let summary = KpiSummary::from_outcomes(&days(&[Decimal::MAX, Decimal::MAX, Decimal::MIN]), &[]);

        assert_eq!(summary.net_result, Decimal::ZERO);
        assert_eq!(summary.max_drawdown, Decimal::MAX);

        let bets = vec![
            BetOutcome::new(day(1), BetResult::Green).with_amounts(dec!(0.0000000000000000000000000001), Decimal::MAX),
            BetOutcome::new(day(2), BetResult::Green).with_amounts(dec!(0.0000000000000000000000000001), Decimal::MAX),
        ];
        let summary = KpiSummary::from_outcomes(&[], &bets);
        assert_eq!(summary.bet_profit, Decimal::MAX);
        assert_eq!(summary.roi, Decimal::MAX);
    }
}
