#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn bidscore(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bidscore").expect("binary should compile");
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn workspace_with_config(config: &str) -> TempDir {
    let dir = TempDir::new().expect("temp dir should be created");
    fs::write(dir.path().join("bidscore.toml"), config).expect("config should be written");
    fs::write(
        dir.path().join("averages.json"),
        r#"{"test": {"debtRatio": 150, "currentRatio": 120}}"#,
    )
    .expect("averages should be written");
    dir
}

fn scoring_workspace() -> TempDir {
    workspace_with_config(
        r#"
[industry]
averages = "averages.json"

[evaluation]
default_agency = "pps"
default_trade = "test"
"#,
    )
}

fn write_pool(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("pool.json");
    fs::write(
        &path,
        r#"[
  {"업체명": "가나건설", "사업자번호": "111-11-11111", "시평": "9,000,000,000", "5년실적": 2000000000, "부채비율": 90, "유동비율": 150, "영업기간": "2015-03-01", "신용평가": "A0", "대표지역": "서울"},
  {"업체명": "다라건설", "사업자번호": "222-22-22222", "시평": 30000000000, "5년실적": 50000000000, "부채비율": 60, "유동비율": 200, "영업기간": "12년", "신용평가": "AA-", "대표지역": "서울"},
  {"업체명": "마바건설", "사업자번호": "333-33-33333", "시평": 7000000000, "5년실적": "N/A", "부채비율": 200, "유동비율": 80, "영업기간": "3년 6개월", "신용평가": "B+", "대표지역": "부산"}
]"#,
    )
    .expect("pool should be written");
    path
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().expect("temp dir should be created");
    bidscore(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("filter"))
        .stdout(predicate::str::contains("formulas"));
}

#[test]
fn evaluate_normalizes_against_configured_industry_average() {
    let workspace = scoring_workspace();
    bidscore(workspace.path())
        .arg("evaluate")
        .arg("--workspace")
        .arg(workspace.path())
        .args(["--amount", "3000000000"])
        .args(["--debt-ratio", "120", "--current-ratio", "150", "--biz-years", "4"])
        .args(["--perf5y", "6000000000", "--base-amount", "10000000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ok\": true"))
        .stdout(predicate::str::contains("\"debtNorm\": 0.8"))
        .stdout(predicate::str::contains("\"currentNorm\": 1.25"))
        .stdout(predicate::str::contains("\"score\": 15.7"))
        .stdout(predicate::str::contains("\"chosen\": \"composite\""))
        .stdout(predicate::str::contains("\"formulaFingerprint\""));
}

#[test]
fn evaluate_unknown_agency_exits_with_error_code() {
    let workspace = scoring_workspace();
    bidscore(workspace.path())
        .arg("evaluate")
        .arg("--workspace")
        .arg(workspace.path())
        .args(["--agency", "nowhere", "--amount", "1000"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"error\": \"NO_AGENCY\""));
}

#[test]
fn evaluate_without_agency_is_runtime_failure() {
    let workspace = TempDir::new().expect("temp dir should be created");
    bidscore(workspace.path())
        .arg("evaluate")
        .arg("--workspace")
        .arg(workspace.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no agency selected"));
}

#[test]
fn evaluate_renders_markdown() {
    let workspace = scoring_workspace();
    bidscore(workspace.path())
        .arg("evaluate")
        .arg("--workspace")
        .arg(workspace.path())
        .args(["--format", "md", "--debt-ratio", "120", "--credit-grade", "AA0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Evaluation"))
        .stdout(predicate::str::contains("## Management"))
        .stdout(predicate::str::contains("## Performance"));
}

#[test]
fn invalid_config_is_runtime_failure() {
    let workspace = workspace_with_config("[filter]\nmin_credit_grade = \"XYZ9\"\n");
    bidscore(workspace.path())
        .arg("formulas")
        .arg("--workspace")
        .arg(workspace.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("config parse error"));
}

#[test]
fn formulas_lists_builtin_agencies_and_overrides() {
    let workspace = workspace_with_config("[formulas]\noverrides = \"overrides.json\"\n");
    fs::write(
        workspace.path().join("overrides.json"),
        r#"{"version": "local", "agencies": [{"id": "kepco", "name": "한국전력공사", "tiers": [{"minAmount": 0, "rules": {}}]}]}"#,
    )
    .expect("overrides should be written");

    bidscore(workspace.path())
        .arg("formulas")
        .arg("--workspace")
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"pps\""))
        .stdout(predicate::str::contains("\"id\": \"kepco\""))
        .stdout(predicate::str::contains("\"overridesApplied\": true"));

    bidscore(workspace.path())
        .arg("formulas")
        .arg("--workspace")
        .arg(workspace.path())
        .arg("--defaults-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("kepco").not())
        .stdout(predicate::str::contains("\"overridesApplied\": false"));
}

#[test]
fn filter_excludes_single_bid_eligible_and_ranks_the_rest() {
    let workspace = scoring_workspace();
    let pool = write_pool(workspace.path());

    bidscore(workspace.path())
        .arg("filter")
        .arg(&pool)
        .arg("--workspace")
        .arg(workspace.path())
        .args(["--amount", "3000000000"])
        .args(["--entry-amount", "20000000000", "--base-amount", "10000000000"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"reason\": \"single-bid-eligible\""))
        .stdout(predicate::str::contains("다라건설"));
}

#[test]
fn filter_honours_exclusions_and_minimum_grade() {
    let workspace = scoring_workspace();
    let pool = write_pool(workspace.path());

    bidscore(workspace.path())
        .arg("filter")
        .arg(&pool)
        .arg("--workspace")
        .arg(workspace.path())
        .args(["--amount", "3000000000", "--include-single-bid-eligible"])
        .args(["--exclude", "222-22-22222", "--min-credit-grade", "BBB-"])
        .args(["--format", "md"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1. 가나건설"))
        .stdout(predicate::str::contains("- 다라건설 [always-excluded]"))
        .stdout(predicate::str::contains("- 마바건설 [credit-below-minimum]"));
}

#[test]
fn filter_unknown_agency_is_runtime_failure() {
    let workspace = scoring_workspace();
    let pool = write_pool(workspace.path());

    bidscore(workspace.path())
        .arg("filter")
        .arg(&pool)
        .arg("--workspace")
        .arg(workspace.path())
        .args(["--agency", "nowhere"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown agency: nowhere"));
}

#[test]
fn check_reports_verdicts_per_candidate() {
    let workspace = scoring_workspace();
    let pool = write_pool(workspace.path());

    bidscore(workspace.path())
        .arg("check")
        .arg(&pool)
        .arg("--workspace")
        .arg(workspace.path())
        .args(["--amount", "3000000000", "--as-of", "2025-01-01"])
        .args(["--entry-amount", "5000000000", "--region", "서울,경기"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"regionOk\": false"))
        .stdout(predicate::str::contains("\"moneyOk\": true"))
        .stdout(predicate::str::contains("\"perfOk\": null"));
}

#[test]
fn missing_candidates_file_is_runtime_failure() {
    let workspace = scoring_workspace();
    bidscore(workspace.path())
        .arg("check")
        .arg(workspace.path().join("absent.json"))
        .arg("--workspace")
        .arg(workspace.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("path does not exist"));
}
