pub mod formatter;
pub mod kpi;
pub mod risk;
pub mod streaks;

pub use formatter::ReportFormatter;
pub use kpi::{DayResult, KpiSummary};
pub use risk::{IndicatorReading, RiskIndicator, RiskInputs, RiskLevel, RiskReport, RiskSemaphore};
pub use streaks::{
    analyze_bet_streaks, analyze_daily_streaks, BetStreakSummary, Streak, StreakAnalyzer,
    StreakKind, StreakSummary,
};
