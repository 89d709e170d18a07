//! House balance reconciliation.
//!
//! The balance each house should hold is derived from the cash movements
//! recorded against it and compared with the balance the house itself
//! reports. The sum of derived balances is the float: money sitting inside
//! house accounts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use betbalance_core::ReconciliationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Deposit,
    Withdrawal,
    Bonus,
    /// Signed manual correction.
    Adjustment,
    /// Signed betting or casino result.
    Result,
}

/// Error returned when a movement kind label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown movement kind: {0}")]
pub struct UnknownMovementKind(pub String);

impl FromStr for MovementKind {
    type Err = UnknownMovementKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" | "deposito" | "depósito" => Ok(Self::Deposit),
            "withdrawal" | "saque" => Ok(Self::Withdrawal),
            "bonus" | "bônus" => Ok(Self::Bonus),
            "adjustment" | "ajuste" => Ok(Self::Adjustment),
            "result" | "resultado" => Ok(Self::Result),
            _ => Err(UnknownMovementKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashMovement {
    pub house: String,
    pub date: NaiveDate,
    pub kind: MovementKind,
    pub amount: Decimal,
}

impl CashMovement {
    /// Effect of the movement on the house balance.
    ///
    /// Deposits, bonuses and withdrawals are taken by magnitude; adjustments
    /// and results keep their sign.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            MovementKind::Deposit | MovementKind::Bonus => self.amount.abs(),
            MovementKind::Withdrawal => -self.amount.abs(),
            MovementKind::Adjustment | MovementKind::Result => self.amount,
        }
    }
}

/// Balance as reported by the house.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedBalance {
    pub house: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    Balanced,
    MinorDiscrepancy,
    MajorDiscrepancy,
    /// The house has movements but reported no balance.
    Unreported,
}

impl BalanceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::MinorDiscrepancy => "minor discrepancy",
            Self::MajorDiscrepancy => "major discrepancy",
            Self::Unreported => "unreported",
        }
    }
}

impl std::fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceCheck {
    pub house: String,
    /// Balance derived from movements.
    pub expected: Decimal,
    pub reported: Option<Decimal>,
    /// `reported - expected`, zero when unreported.
    pub difference: Decimal,
    pub status: BalanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// One check per house, sorted by house name.
    pub checks: Vec<BalanceCheck>,
    /// Sum of expected balances.
    pub float: Decimal,
}

impl BalanceReport {
    pub fn discrepancies(&self) -> impl Iterator<Item = &BalanceCheck> {
        self.checks
            .iter()
            .filter(|c| c.status != BalanceStatus::Balanced)
    }

    /// Largest expected balance held by a single house.
    #[must_use]
    pub fn largest_house_balance(&self) -> Decimal {
        self.checks
            .iter()
            .map(|c| c.expected)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.discrepancies().next().is_none()
    }
}

pub struct BalanceReconciler {
    tolerance: Decimal,
    major_threshold: Decimal,
}

impl Default for BalanceReconciler {
    fn default() -> Self {
        Self::from_config(&ReconciliationConfig::default())
    }
}

impl BalanceReconciler {
    #[must_use]
    pub const fn new(tolerance: Decimal, major_threshold: Decimal) -> Self {
        Self {
            tolerance,
            major_threshold,
        }
    }

    #[must_use]
    pub const fn from_config(config: &ReconciliationConfig) -> Self {
        Self::new(config.balance_tolerance, config.major_discrepancy)
    }

    /// Compares derived balances with reported ones for every house seen in either input.
    #[must_use]
    pub fn reconcile(&self, movements: &[CashMovement], reported: &[ReportedBalance]) -> BalanceReport {
        let mut expected: BTreeMap<&str, Decimal> = BTreeMap::new();
        for movement in movements {
            let balance = expected.entry(movement.house.as_str()).or_default();
            *balance = balance.saturating_add(movement.signed_amount());
        }

        let mut reported_by_house: BTreeMap<&str, Decimal> = BTreeMap::new();
        for balance in reported {
            if reported_by_house
                .insert(balance.house.as_str(), balance.balance)
                .is_some()
            {
                tracing::warn!("House {} reported more than once, keeping the last balance", balance.house);
            }
            expected.entry(balance.house.as_str()).or_default();
        }

        let checks: Vec<BalanceCheck> = expected
            .iter()
            .map(|(house, expected)| self.check(house, *expected, reported_by_house.get(house).copied()))
            .collect();
        let float = checks
            .iter()
            .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.expected));

        let report = BalanceReport { checks, float };
        tracing::debug!(
            "Reconciled {} houses, {} discrepancies, float {}",
            report.checks.len(),
            report.discrepancies().count(),
            report.float
        );
        report
    }

    fn check(&self, house: &str, expected: Decimal, reported: Option<Decimal>) -> BalanceCheck {
        let (difference, status) = match reported {
            None => (Decimal::ZERO, BalanceStatus::Unreported),
            Some(reported) => {
                let difference = reported.saturating_sub(expected);
                let magnitude = difference.abs();
                let status = if magnitude <= self.tolerance {
                    BalanceStatus::Balanced
                } else if magnitude < self.major_threshold {
                    BalanceStatus::MinorDiscrepancy
                } else {
                    BalanceStatus::MajorDiscrepancy
                };
                (difference, status)
            }
        };

        BalanceCheck {
            house: house.to_string(),
            expected,
            reported,
            difference,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn movement(house: &str, kind: MovementKind, amount: Decimal) -> CashMovement {
        CashMovement {
            house: house.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            kind,
            amount,
        }
    }

    fn reported(house: &str, balance: Decimal) -> ReportedBalance {
        ReportedBalance {
            house: house.to_string(),
            balance,
        }
    }

    #[test]
    fn signed_amounts() {
        assert_eq!(movement("a", MovementKind::Withdrawal, dec!(50)).signed_amount(), dec!(-50));
        assert_eq!(movement("a", MovementKind::Withdrawal, dec!(-50)).signed_amount(), dec!(-50));
        assert_eq!(movement("a", MovementKind::Result, dec!(-20)).signed_amount(), dec!(-20));
        assert_eq!(movement("a", MovementKind::Bonus, dec!(10)).signed_amount(), dec!(10));
    }

    #[test]
    fn classifies_by_tolerance() {
        let movements = vec![
            movement("alpha", MovementKind::Deposit, dec!(1000)),
            movement("alpha", MovementKind::Result, dec!(-150)),
            movement("beta", MovementKind::Deposit, dec!(500)),
            movement("beta", MovementKind::Withdrawal, dec!(200)),
            movement("gamma", MovementKind::Deposit, dec!(300)),
        ];
        let balances = vec![
            reported("alpha", dec!(850.005)),
            reported("beta", dec!(295)),
            reported("gamma", dec!(250)),
        ];
        let report = BalanceReconciler::default().reconcile(&movements, &balances);

        let status: Vec<BalanceStatus> = report.checks.iter().map(|c| c.status).collect();
        assert_eq!(
            status,
            vec![
                BalanceStatus::Balanced,
                BalanceStatus::MinorDiscrepancy,
                BalanceStatus::MajorDiscrepancy
            ]
        );
        assert_eq!(report.checks[1].difference, dec!(-5));
        assert_eq!(report.float, dec!(1450));
        assert_eq!(report.largest_house_balance(), dec!(850));
        assert!(!report.is_balanced());
    }

    #[test]
    fn unreported_and_reported_only_houses() {
        let movements = vec![movement("zeta", MovementKind::Deposit, dec!(100))];
        let balances = vec![reported("eta", dec!(40))];
        let report = BalanceReconciler::default().reconcile(&movements, &balances);

        assert_eq!(report.checks.len(), 2);
        assert_eq!(report.checks[0].house, "eta");
        assert_eq!(report.checks[0].expected, Decimal::ZERO);
        assert_eq!(report.checks[0].status, BalanceStatus::MajorDiscrepancy);
        assert_eq!(report.checks[1].status, BalanceStatus::Unreported);
        assert_eq!(report.discrepancies().count(), 2);
    }

    #[test]
    fn empty_inputs_balance() {
        let report = BalanceReconciler::default().reconcile(&[], &[]);
        assert!(report.checks.is_empty());
        assert!(report.is_balanced());
        assert_eq!(report.float, Decimal::ZERO);
    }

    #[test]
    fn movement_kind_labels() {
        assert_eq!("Saque".parse::<MovementKind>().unwrap(), MovementKind::Withdrawal);
        assert_eq!("deposit".parse::<MovementKind>().unwrap(), MovementKind::Deposit);
        assert_eq!(
            "transfer".parse::<MovementKind>().unwrap_err(),
            UnknownMovementKind("transfer".to_string())
        );
        assert_eq!(
            UnknownMovementKind("transfer".to_string()).to_string(),
            "unknown movement kind: transfer"
        );
    }

    #[test]
    fn extreme_amounts_saturate() {
        let movements = vec![
            movement("alpha", MovementKind::Deposit, Decimal::MAX),
            movement("alpha", MovementKind::Bonus, Decimal::MAX),
            movement("beta", MovementKind::Deposit, Decimal::MAX),
        ];
        let balances = vec![reported("alpha", Decimal::MIN)];
        let report = BalanceReconciler::default().reconcile(&movements, &balances);

        assert_eq!(report.checks[0].expected, Decimal::MAX);
        assert_eq!(report.checks[0].difference, Decimal::MIN);
        assert_eq!(report.checks[0].status, BalanceStatus::MajorDiscrepancy);
        assert_eq!(report.float, Decimal::MAX);
    }
}
