use betbalance_analytics::{KpiSummary, RiskLevel, StreakAnalyzer, StreakKind};
use betbalance_cli::commands::risk::{evaluate, RiskArgs};
use betbalance_cli::commands::validate::{validate_file, ValidateArgs};
use betbalance_cli::io::{load_daily, load_movements, load_reported, read_json_records};
use betbalance_core::{AppConfig, ConfigStore, MemoryConfigStore};
use betbalance_reconcile::{compute_diff, BalanceReconciler, BalanceStatus};
use rust_decimal_macros::dec;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

const DAILY: &str = "\
Data,Resultado Líquido
05/04/2024,\"-40,00\"
01/04/2024,\"100,00\"
02/04/2024,\"50,00\"
03/04/2024,\"-30,00\"
04/04/2024,\"-20,00\"
";

const MOVEMENTS: &str = "\
House,Date,Kind,Amount
alpha,01/04/2024,deposito,1000
alpha,03/04/2024,resultado,-150
beta,01/04/2024,deposito,500
beta,02/04/2024,saque,200
";

const REPORTED: &str = "\
house,balance
alpha,850
beta,280
";

#[test]
fn daily_sheet_to_streaks_and_kpi() {
    let dir = TempDir::new().unwrap();
    let daily = write(&dir, "daily.csv", DAILY);
    let config = AppConfig::default();

    let days = load_daily(&daily, &config).unwrap();
    assert_eq!(days.len(), 5);

    let summary = StreakAnalyzer::from_config(&config.analytics)
        .analyze_daily(&days)
        .unwrap();
    assert_eq!(summary.pattern_string(), "WWLLL");
    assert_eq!(summary.longest_win.length, 2);
    assert_eq!(summary.current_streak.kind, StreakKind::Loss);
    assert_eq!(summary.current_streak.length, 3);

    let kpi = KpiSummary::from_outcomes(&days, &[]);
    assert_eq!(kpi.net_result, dec!(60));
    assert_eq!(kpi.max_drawdown, dec!(90));
}

#[test]
fn movement_sheet_to_balance_report() {
    let dir = TempDir::new().unwrap();
    let movements = write(&dir, "movements.csv", MOVEMENTS);
    let reported = write(&dir, "reported.csv", REPORTED);
    let config = AppConfig::default();

    let movements = load_movements(&movements, &config).unwrap();
    let reported = load_reported(&reported, &config).unwrap();
    assert_eq!(movements.len(), 4);

    let report = BalanceReconciler::from_config(&config.reconciliation).reconcile(&movements, &reported);
    assert_eq!(report.float, dec!(1150));
    assert_eq!(report.checks[0].status, BalanceStatus::Balanced);
    assert_eq!(report.checks[1].status, BalanceStatus::MajorDiscrepancy);
    assert_eq!(report.checks[1].difference, dec!(-20));
}

#[test]
fn risk_pipeline_flags_loss_streak_and_concentration() {
    let dir = TempDir::new().unwrap();
    let args = RiskArgs {
        daily: write(&dir, "daily.csv", DAILY),
        movements: write(&dir, "movements.csv", MOVEMENTS),
        reported: None,
        bankroll: dec!(2000),
    };

    let report = evaluate(&args, &AppConfig::default()).unwrap();

    // Three losing days in a row and 850 of the 1150 float in one house.
    assert_eq!(report.level, RiskLevel::Red);
    assert_eq!(report.alerts().count(), 2);
    assert_eq!(report.score, 3);
}

#[test]
fn risk_rejects_non_positive_bankroll() {
    let dir = TempDir::new().unwrap();
    let args = RiskArgs {
        daily: write(&dir, "daily.csv", DAILY),
        movements: write(&dir, "movements.csv", MOVEMENTS),
        reported: None,
        bankroll: dec!(0),
    };
    assert!(evaluate(&args, &AppConfig::default()).is_err());
}

#[test]
fn validate_reports_errors_and_warnings() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "bets.csv",
        "Data,Stake,Result\n01/04/2024,\"12,50\",green\n2024-04-02,abc,red\n",
    );
    let args = ValidateArgs {
        file,
        schema: "bets".to_string(),
    };
    let config = MemoryConfigStore::new(AppConfig::default()).load().unwrap();

    let loaded = validate_file(&args, &config).unwrap();
    assert_eq!(loaded.error_count(), 1);
    assert_eq!(loaded.valid_rows().len(), 1);

    let unknown = ValidateArgs {
        file: args.file.clone(),
        schema: "ledger".to_string(),
    };
    assert!(validate_file(&unknown, &config).is_err());
}

#[test]
fn json_record_sets_diff_and_converge() {
    let dir = TempDir::new().unwrap();
    let current = write(
        &dir,
        "current.json",
        r#"[{"id": 1, "stake": "10"}, {"id": 2, "stake": "20"}, {"id": 3, "stake": "30"}]"#,
    );
    let incoming = write(
        &dir,
        "incoming.json",
        r#"[{"id": 2, "stake": "25"}, {"id": 3, "stake": "30"}, {"id": 4, "stake": "40"}]"#,
    );

    let current = read_json_records(&current).unwrap();
    let incoming = read_json_records(&incoming).unwrap();
    let diff = compute_diff(&current, &incoming, "id").unwrap();

    assert_eq!(diff.to_add.len(), 1);
    assert_eq!(diff.to_update.len(), 1);
    assert_eq!(diff.to_remove.len(), 1);

    let converged = diff.apply_to(&current, "id");
    assert!(compute_diff(&converged, &incoming, "id").unwrap().is_empty());
}
