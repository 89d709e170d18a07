#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]

use crate::kpi::KpiSummary;
use crate::risk::RiskReport;
use crate::streaks::{BetStreakSummary, Streak, StreakSummary};
use betbalance_reconcile::{BalanceReport, BalanceStatus};

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────\n";

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn streaks(summary: &StreakSummary) -> String {
        let mut output = header("DAILY STREAKS");

        output.push_str(&format!("Days Analyzed:         {}\n", summary.total_days));
        output.push_str(&format!("Streaks:               {}\n", summary.runs.len()));
        output.push_str(&format!(
            "Recent Pattern:        {}\n",
            summary.pattern_string()
        ));
        output.push('\n');

        output.push_str("Streaks\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!(
            "Current:               {}\n",
            describe(&summary.current_streak)
        ));
        output.push_str(&format!(
            "Longest Win:           {}\n",
            describe(&summary.longest_win)
        ));
        output.push_str(&format!(
            "Longest Loss:          {}\n",
            describe(&summary.longest_loss)
        ));
        output.push_str(&format!(
            "Avg Win Length:        {:.2} days\n",
            summary.average_win_length
        ));
        output.push_str(&format!(
            "Avg Loss Length:       {:.2} days\n",
            summary.average_loss_length
        ));
        output.push('\n');
        output.push_str(RULE);

        output
    }

    #[must_use]
    pub fn bet_streaks(summary: &BetStreakSummary) -> String {
        let mut output = header("BET STREAKS");

        output.push_str(&format!("Settled Bets:          {}\n", summary.settled_bets));
        output.push_str(&format!("Max Win Run:           {}\n", summary.max_win_run));
        output.push_str(&format!("Max Loss Run:          {}\n", summary.max_loss_run));
        output.push_str(&format!(
            "Current Run:           {}\n",
            describe(&summary.current_run)
        ));
        output.push('\n');
        output.push_str(RULE);

        output
    }

    #[must_use]
    pub fn kpi(kpi: &KpiSummary) -> String {
        let mut output = header("BANKROLL KPIs");

        output.push_str("Daily Ledger\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!("Net Result:            ${:.2}\n", kpi.net_result));
        output.push_str(&format!(
            "Winning / Losing Days: {} / {}\n",
            kpi.winning_days, kpi.losing_days
        ));
        if let Some(best) = kpi.best_day {
            output.push_str(&format!(
                "Best Day:              {} (${:.2})\n",
                best.date, best.value
            ));
        }
        if let Some(worst) = kpi.worst_day {
            output.push_str(&format!(
                "Worst Day:             {} (${:.2})\n",
                worst.date, worst.value
            ));
        }
        output.push_str(&format!("Max Drawdown:          ${:.2}\n", kpi.max_drawdown));
        output.push('\n');

        output.push_str("Bets\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!(
            "Settled / Pending:     {} / {}\n",
            kpi.settled_bets, kpi.pending_bets
        ));

        if kpi.settled_bets > 0 {
            output.push_str(&format!(
                "Win Rate:              {:.2}%\n",
                kpi.bet_win_rate * 100.0
            ));
            output.push_str(&format!("Total Staked:          ${:.2}\n", kpi.total_staked));
            output.push_str(&format!("Bet Profit:            ${:.2}\n", kpi.bet_profit));
            output.push_str(&format!(
                "ROI:                   {:.2}%\n",
                kpi.roi.saturating_mul(rust_decimal::Decimal::from(100))
            ));
        } else {
            output.push_str("Win Rate:              N/A (no settled bets)\n");
        }

        output.push('\n');
        output.push_str(RULE);

        output
    }

    #[must_use]
    pub fn risk(report: &RiskReport) -> String {
        let mut output = header("RISK SEMAPHORE");

        output.push_str(&format!(
            "Level:                 {} (score {})\n",
            report.level, report.score
        ));
        output.push('\n');

        output.push_str("Indicators\n");
        output.push_str(THIN_RULE);
        for reading in &report.readings {
            output.push_str(&format!(
                "{:<27}{:>10.4}  [{} / {}]  {}\n",
                reading.indicator.label(),
                reading.value,
                reading.thresholds.yellow,
                reading.thresholds.red,
                reading.level
            ));
        }
        output.push('\n');
        output.push_str(RULE);

        output
    }

    #[must_use]
    pub fn balances(report: &BalanceReport) -> String {
        let mut output = header("HOUSE BALANCES");

        output.push_str(&format!(
            "{:<16} {:>12} {:>12} {:>10}  {}\n",
            "House", "Expected", "Reported", "Diff", "Status"
        ));
        output.push_str(THIN_RULE);
        for check in &report.checks {
            let reported = check
                .reported
                .map_or_else(|| "-".to_string(), |r| r.round_dp(2).to_string());
            let marker = match check.status {
                BalanceStatus::Balanced => "",
                BalanceStatus::MinorDiscrepancy | BalanceStatus::Unreported => " !",
                BalanceStatus::MajorDiscrepancy => " !!",
            };
            output.push_str(&format!(
                "{:<16} {:>12} {:>12} {:>10}  {}{}\n",
                check.house,
                check.expected.round_dp(2),
                reported,
                check.difference.round_dp(2),
                check.status,
                marker
            ));
        }
        output.push('\n');

        output.push_str(&format!("Float:                 {}\n", report.float.round_dp(2)));
        output.push_str(&format!(
            "Largest House:         {}\n",
            report.largest_house_balance().round_dp(2)
        ));
        output.push_str(&format!(
            "Discrepancies:         {}\n",
            report.discrepancies().count()
        ));
        output.push('\n');
        output.push_str(RULE);

        output
    }
}

fn header(title: &str) -> String {
    let mut output = String::new();
    output.push('\n');
    output.push_str(RULE);
    output.push_str(&format!("{:^63}\n", title));
    output.push_str(RULE);
    output.push('\n');
    output
}

fn describe(streak: &Streak) -> String {
    if streak.is_sentinel() {
        return "none".to_string();
    }
    format!(
        "{} x{} ({} to {}, ${:.2})",
        streak.kind, streak.length, streak.start_date, streak.end_date, streak.cumulative_value
    )
}
