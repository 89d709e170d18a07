//! CLI commands for bankroll analytics and reconciliation.

pub mod balances;
pub mod diff;
pub mod map_columns;
pub mod risk;
pub mod streaks;
pub mod validate;

pub use balances::{run_balances, BalancesArgs};
pub use diff::{run_diff, DiffArgs};
pub use map_columns::{run_map_columns, MapColumnsArgs};
pub use risk::{run_risk, RiskArgs};
pub use streaks::{run_streaks, StreaksArgs};
pub use validate::{run_validate, ValidateArgs};
