//! Win/loss streak analysis.
//!
//! Days (or bets) are sorted chronologically, classified as wins or losses,
//! and run-length encoded into maximal streaks. Summaries expose the longest
//! streak of each kind, average streak lengths, the streak in progress and
//! the most recent W/L pattern.
//!
//! # Example
//!
//! ```
//! use betbalance_analytics::streaks::analyze_daily_streaks;
//! use betbalance_core::DailyOutcome;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
//! let outcomes = vec![
//!     DailyOutcome::new(day(1), Decimal::from(10)),
//!     DailyOutcome::new(day(2), Decimal::from(-4)),
//! ];
//!
//! let summary = analyze_daily_streaks(&outcomes).unwrap();
//! assert_eq!(summary.pattern_string(), "WL");
//! ```

use betbalance_core::{AnalyticsConfig, BetOutcome, BetResult, DailyOutcome};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of a day or bet for streak purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Win,
    Loss,
}

impl StreakKind {
    /// Classifies a net result. Zero is a loss.
    #[must_use]
    pub fn from_value(value: Decimal) -> Self {
        if value > Decimal::ZERO {
            Self::Win
        } else {
            Self::Loss
        }
    }

    /// Classifies a settled bet. Only green is a win; void and cashout count as losses.
    #[must_use]
    pub const fn from_bet(result: BetResult) -> Self {
        match result {
            BetResult::Green => Self::Win,
            _ => Self::Loss,
        }
    }

    /// Returns the pattern token (`W` or `L`).
    #[must_use]
    pub const fn token(self) -> char {
        match self {
            Self::Win => 'W',
            Self::Loss => 'L',
        }
    }
}

impl std::fmt::Display for StreakKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Win => write!(f, "win"),
            Self::Loss => write!(f, "loss"),
        }
    }
}

/// A maximal run of consecutive same-kind outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub kind: StreakKind,
    /// Number of outcomes in the run. Zero only for the sentinel.
    pub length: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Sum of the results over the run.
    pub cumulative_value: Decimal,
}

impl Streak {
    fn open(kind: StreakKind, date: NaiveDate, value: Decimal) -> Self {
        Self {
            kind,
            length: 1,
            start_date: date,
            end_date: date,
            cumulative_value: value,
        }
    }

    fn extend(&mut self, date: NaiveDate, value: Decimal) {
        self.length += 1;
        self.end_date = date;
        self.cumulative_value = self.cumulative_value.saturating_add(value);
    }

    /// Zero-length placeholder used when no run of `kind` exists.
    #[must_use]
    pub fn sentinel(kind: StreakKind) -> Self {
        Self {
            kind,
            length: 0,
            start_date: NaiveDate::default(),
            end_date: NaiveDate::default(),
            cumulative_value: Decimal::ZERO,
        }
    }

    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        self.length == 0
    }
}

/// Streak statistics over daily results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakSummary {
    /// Every streak, in chronological order.
    pub runs: Vec<Streak>,
    pub longest_win: Streak,
    pub longest_loss: Streak,
    pub average_win_length: f64,
    pub average_loss_length: f64,
    /// Streak in progress as of the most recent day.
    pub current_streak: Streak,
    /// Classification of the most recent days, oldest first.
    pub recent_pattern: Vec<StreakKind>,
    pub total_days: usize,
}

impl StreakSummary {
    /// Renders the recent pattern as `W`/`L` tokens, e.g. `"WWLLL"`.
    #[must_use]
    pub fn pattern_string(&self) -> String {
        self.recent_pattern.iter().map(|k| k.token()).collect()
    }

    pub fn runs_of(&self, kind: StreakKind) -> impl Iterator<Item = &Streak> {
        self.runs.iter().filter(move |r| r.kind == kind)
    }
}

/// Streak statistics over individual bets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetStreakSummary {
    pub max_win_run: u32,
    pub max_loss_run: u32,
    pub current_run: Streak,
    /// Bets that took part in the sequence (pending ones excluded).
    pub settled_bets: usize,
    pub runs: Vec<Streak>,
}

/// Run-length encoder for daily and per-bet outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakAnalyzer {
    recent_window: usize,
}

impl Default for StreakAnalyzer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RECENT_WINDOW)
    }
}

impl StreakAnalyzer {
    pub const DEFAULT_RECENT_WINDOW: usize = 7;

    /// Creates an analyzer showing the last `recent_window` days in the pattern (at least 1).
    #[must_use]
    pub fn new(recent_window: usize) -> Self {
        Self {
            recent_window: recent_window.max(1),
        }
    }

    #[must_use]
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.recent_window)
    }

    #[must_use]
    pub const fn recent_window(&self) -> usize {
        self.recent_window
    }

    /// Analyzes daily results. Returns `None` when there is no data.
    #[must_use]
    pub fn analyze_daily(&self, outcomes: &[DailyOutcome]) -> Option<StreakSummary> {
        if outcomes.is_empty() {
            return None;
        }

        let mut sorted: Vec<&DailyOutcome> = outcomes.iter().collect();
        sorted.sort_by_key(|o| o.date);

        let runs = encode_runs(
            sorted
                .iter()
                .map(|o| (StreakKind::from_value(o.value()), o.date, o.value())),
        );
        let current_streak = runs.last()?.clone();

        let recent_start = sorted.len().saturating_sub(self.recent_window);
        let recent_pattern = sorted[recent_start..]
            .iter()
            .map(|o| StreakKind::from_value(o.value()))
            .collect();

        let summary = StreakSummary {
            longest_win: longest(&runs, StreakKind::Win),
            longest_loss: longest(&runs, StreakKind::Loss),
            average_win_length: average_length(&runs, StreakKind::Win),
            average_loss_length: average_length(&runs, StreakKind::Loss),
            current_streak,
            recent_pattern,
            total_days: outcomes.len(),
            runs,
        };

        tracing::debug!(
            "Analyzed {} days into {} streaks (current: {} x{})",
            summary.total_days,
            summary.runs.len(),
            summary.current_streak.kind,
            summary.current_streak.length
        );
        Some(summary)
    }

    /// Analyzes individual bets, skipping pending ones. Returns `None` when no settled bet remains.
    #[must_use]
    pub fn analyze_bets(&self, bets: &[BetOutcome]) -> Option<BetStreakSummary> {
        let mut settled: Vec<&BetOutcome> = bets.iter().filter(|b| b.result.is_settled()).collect();
        if settled.is_empty() {
            return None;
        }
        settled.sort_by_key(|b| b.date);

        let runs = encode_runs(
            settled
                .iter()
                .map(|b| (StreakKind::from_bet(b.result), b.date, b.profit_or_zero())),
        );
        let current_run = runs.last()?.clone();

        tracing::debug!(
            "Analyzed {} settled bets ({} pending skipped) into {} streaks",
            settled.len(),
            bets.len() - settled.len(),
            runs.len()
        );

        Some(BetStreakSummary {
            max_win_run: longest(&runs, StreakKind::Win).length,
            max_loss_run: longest(&runs, StreakKind::Loss).length,
            current_run,
            settled_bets: settled.len(),
            runs,
        })
    }
}

/// Analyzes daily results with the default 7-day pattern window.
#[must_use]
pub fn analyze_daily_streaks(outcomes: &[DailyOutcome]) -> Option<StreakSummary> {
    StreakAnalyzer::default().analyze_daily(outcomes)
}

/// Analyzes individual bets with default settings.
#[must_use]
pub fn analyze_bet_streaks(bets: &[BetOutcome]) -> Option<BetStreakSummary> {
    StreakAnalyzer::default().analyze_bets(bets)
}

fn encode_runs(items: impl Iterator<Item = (StreakKind, NaiveDate, Decimal)>) -> Vec<Streak> {
    let mut runs: Vec<Streak> = Vec::new();

    for (kind, date, value) in items {
        match runs.last_mut() {
            Some(run) if run.kind == kind => run.extend(date, value),
            _ => runs.push(Streak::open(kind, date, value)),
        }
    }

    runs
}

/// Longest run of `kind`, the earliest one on ties.
fn longest(runs: &[Streak], kind: StreakKind) -> Streak {
    runs.iter()
        .filter(|r| r.kind == kind)
        .fold(None::<&Streak>, |best, run| match best {
            Some(b) if b.length >= run.length => Some(b),
            _ => Some(run),
        })
        .cloned()
        .unwrap_or_else(|| Streak::sentinel(kind))
}

fn average_length(runs: &[Streak], kind: StreakKind) -> f64 {
    let (count, total) = runs
        .iter()
        .filter(|r| r.kind == kind)
        .fold((0u32, 0u32), |(count, total), r| (count + 1, total + r.length));

    if count == 0 {
        0.0
    } else {
        f64::from(total) / f64::from(count)
    }
}
