use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use chrono::{Datelike, Local};
use predicates::prelude::*;

/// Build an `objectif` command with HOME pointed at a scratch directory so
/// settings, data and exports never touch the real user profile.
fn objectif(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("objectif").unwrap();
    cmd.env("HOME", home);
    cmd
}

fn init(home: &Path) {
    objectif(home)
        .args([
            "init",
            "--data-dir",
            home.join("data").to_str().unwrap(),
            "--environment",
            "sandbox",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Objectif initialized"));
}

fn load_demo(home: &Path) {
    objectif(home)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo data loaded!"));
}

fn current_first_month() -> String {
    let today = Local::now().date_naive();
    let quarter_start_month = (today.month() - 1) / 3 * 3 + 1;
    format!("{:04}-{:02}", today.year(), quarter_start_month)
}

#[test]
fn test_init_creates_data_dir() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    assert!(home.path().join("data").is_dir());
    assert!(home
        .path()
        .join(".config")
        .join("objectif")
        .join("settings.json")
        .is_file());
}

#[test]
fn test_report_without_snapshot_suggests_fetch() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    objectif(home.path())
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("objectif fetch"));
}

#[test]
fn test_fetch_without_credentials_suggests_connect() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    objectif(home.path())
        .arg("fetch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("objectif connect"));
}

#[test]
fn test_demo_then_report() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    load_demo(home.path());
    assert!(home.path().join("data").join("snapshot.json").is_file());

    objectif(home.path())
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Résultats Tous"))
        .stdout(predicate::str::contains("VENTES"))
        .stdout(predicate::str::contains("COÛT DES ALIMENTS"))
        .stdout(predicate::str::contains("FCFP"))
        .stdout(predicate::str::contains("Note atteinte"));
}

#[test]
fn test_report_restaurant_filter() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    load_demo(home.path());

    objectif(home.path())
        .args(["report", "--restaurant", "HULL"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Résultats HULL"));
}

#[test]
fn test_kpi_set_and_list() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let month = current_first_month();

    objectif(home.path())
        .args(["kpi", "set", "--month", &month, "--fcfp", "120", "--numerique", "16.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded"));

    objectif(home.path())
        .args(["kpi", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&month))
        .stdout(predicate::str::contains("16.2%"));
}

#[test]
fn test_kpi_set_rejects_bad_month() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    objectif(home.path())
        .args(["kpi", "set", "--month", "janvier", "--fcfp", "120"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_export_html() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    load_demo(home.path());

    let out = home.path().join("dashboard.html");
    objectif(home.path())
        .args(["export", "html", "--restaurant", "HULL", "--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains("<h1>Résultats HULL</h1>"));
    assert!(html.contains("dashboard-table"));
    assert!(html.contains("<svg"));
    assert!(html.contains("Perte brute"));
}

#[test]
fn test_export_csv() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    load_demo(home.path());

    let out = home.path().join("dashboard.csv");
    objectif(home.path())
        .args(["export", "csv", "--output", out.to_str().unwrap()])
        .assert()
        .success();

    let csv = std::fs::read_to_string(&out).unwrap();
    let mut lines = csv.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("mois,ventes,annee_precedente"));
    // 3 monthly rows + the quarter total
    assert_eq!(lines.count(), 4);
}

#[test]
fn test_export_default_path_lands_in_exports() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    load_demo(home.path());

    objectif(home.path())
        .args(["export", "html"])
        .assert()
        .success();

    let exports = home.path().join("data").join("exports");
    let entries: Vec<_> = std::fs::read_dir(&exports)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "html").unwrap_or(false))
        .collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_status_reports_state() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    objectif(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not connected"))
        .stdout(predicate::str::contains("Snapshot:     none"));

    load_demo(home.path());
    objectif(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Period:"));
}

#[test]
fn test_completions() {
    let home = tempfile::tempdir().unwrap();
    objectif(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("objectif"));
}

#[test]
fn test_fetch_rejects_bad_quarter() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    objectif(home.path())
        .args(["fetch", "--quarter", "Q9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown quarter"));
}
