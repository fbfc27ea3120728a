use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const KEY: &str = "WHP-TEST-KEY-12345";

fn wealthmap(data: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wealthmap"));
    cmd.env_remove("WEALTHMAP_LICENSE_FILE")
        .env_remove("WEALTHMAP_PROXY_URL")
        .env("RUST_LOG", "warn")
        .arg("--data-dir")
        .arg(data);
    cmd
}

fn json_data(cmd: &mut Command) -> serde_json::Value {
    let assert = cmd.arg("--json").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let root: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    root["data"].clone()
}

fn authorized() -> TempDir {
    let tmp = TempDir::new().expect("tmpdir");
    wealthmap(tmp.path()).args(["activate", KEY]).assert().success();
    wealthmap(tmp.path()).args(["onboard", "Ana"]).assert().success();
    tmp
}

#[test]
fn help_lists_commands() {
    Command::new(assert_cmd::cargo::cargo_bin!("wealthmap"))
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("activate")
                .and(predicate::str::contains("backup"))
                .and(predicate::str::contains("serve"))
                .and(predicate::str::contains("--data-dir")),
        );
}

#[test]
fn activation_then_onboarding_reaches_dashboard() {
    let tmp = TempDir::new().expect("tmpdir");
    let status = json_data(wealthmap(tmp.path()).arg("status"));
    assert_eq!(status["state"], "needs-activation");
    assert_eq!(status["landing"], "/");

    wealthmap(tmp.path())
        .args(["activate", "WHP-FAKE-0000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
    assert!(!tmp.path().join(".wealthmap/store/license_key.json").exists());

    let activated = json_data(wealthmap(tmp.path()).args(["activate", &format!("  {KEY} ")]));
    assert_eq!(activated["state"], "needs-onboarding");
    assert_eq!(activated["landing"], "/onboarding");

    let onboarded = json_data(wealthmap(tmp.path()).args(["onboard", "Ana"]));
    assert_eq!(onboarded["state"], "authorized");
    assert_eq!(onboarded["landing"], "/dashboard");

    let stored = fs::read_to_string(tmp.path().join(".wealthmap/store/license_key.json"))
        .expect("license persisted");
    assert_eq!(stored.trim(), format!("\"{KEY}\""));
}

#[test]
fn protected_commands_refuse_without_license() {
    let tmp = TempDir::new().expect("tmpdir");
    wealthmap(tmp.path())
        .args(["goal", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires an activated license"));

    let route = json_data(wealthmap(tmp.path()).args(["route", "/dashboard"]));
    assert_eq!(route["protected"], true);
    assert_eq!(route["outcome"], "redirect");
    assert_eq!(route["to"], "/");
}

#[test]
fn sign_out_keeps_data_but_locks_routes() {
    let tmp = authorized();
    let route = json_data(wealthmap(tmp.path()).args(["route", "/goals"]));
    assert_eq!(route["outcome"], "render");

    let signed_out = json_data(wealthmap(tmp.path()).arg("sign-out"));
    assert_eq!(signed_out["state"], "needs-activation");
    assert!(tmp.path().join(".wealthmap/store/username.json").exists());

    let route = json_data(wealthmap(tmp.path()).args(["route", "/goals"]));
    assert_eq!(route["outcome"], "redirect");
}

#[test]
fn goals_and_transactions_round_trip() {
    let tmp = authorized();
    let goal = json_data(wealthmap(tmp.path()).args([
        "goal",
        "add",
        "Emergency fund",
        "--target",
        "1000",
        "--current",
        "250",
        "--by",
        "2027-01-01",
        "--importance",
        "high",
    ]));
    assert_eq!(goal["name"], "Emergency fund");
    assert_eq!(goal["importance"], "high");

    let goals = json_data(wealthmap(tmp.path()).args(["goal", "list"]));
    assert_eq!(goals[0]["progress"], 25.0);
    assert_eq!(goals[0]["remaining"], 750.0);

    wealthmap(tmp.path())
        .args(["tx", "add", "income", "2500", "Salary", "--date", "2026-01-01"])
        .assert()
        .success();
    wealthmap(tmp.path())
        .args(["tx", "add", "expense", "1200.5", "Rent, January", "--date", "2026-01-02"])
        .assert()
        .success();
    let list = json_data(wealthmap(tmp.path()).args(["tx", "list"]));
    assert_eq!(list["totals"]["balance"], 1299.5);

    wealthmap(tmp.path())
        .args(["tx", "add", "expense", "-5", "Refund", "--date", "2026-01-03"])
        .assert()
        .failure();

    wealthmap(tmp.path())
        .args(["csv", "export"])
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("Date,Description,Type,Amount")
                .and(predicate::str::contains("2026-01-02,\"Rent, January\",expense,1200.50")),
        );

    let id = goals[0]["id"].as_str().expect("goal id").to_string();
    wealthmap(tmp.path()).args(["goal", "rm", &id]).assert().success();
    wealthmap(tmp.path())
        .args(["goal", "rm", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no goal"));
}

#[test]
fn wheel_rejects_out_of_range_scores() {
    let tmp = authorized();
    let set = json_data(wealthmap(tmp.path()).args(["wheel", "set", "saving", "8"]));
    assert_eq!(set["value"], 8.0);
    wealthmap(tmp.path())
        .args(["wheel", "set", "saving", "11"])
        .assert()
        .failure();
    let wheel = json_data(wealthmap(tmp.path()).args(["wheel", "show"]));
    assert_eq!(wheel["categories"].as_array().map(Vec::len), Some(8));
}

#[test]
fn backup_restores_into_a_fresh_directory() {
    let source = authorized();
    wealthmap(source.path())
        .args(["reflect", "set", "wins", "Paid off my card"])
        .assert()
        .success();
    wealthmap(source.path())
        .args(["mood", "set", "good"])
        .assert()
        .success();
    let backup_file = source.path().join("backup.json");
    wealthmap(source.path())
        .args(["backup", "export", "--out"])
        .arg(&backup_file)
        .assert()
        .success();
    let text = fs::read_to_string(&backup_file).expect("backup written");
    assert!(!text.contains("license_key"));

    let target = authorized();
    let report = json_data(
        wealthmap(target.path())
            .args(["backup", "import"])
            .arg(&backup_file),
    );
    assert!(
        report["restored"]
            .as_array()
            .is_some_and(|keys| keys.iter().any(|k| k == "reflections"))
    );
    let mood = fs::read_to_string(target.path().join(".wealthmap/store/mood.json")).unwrap();
    assert_eq!(mood, "\"good\"");
}

#[test]
fn language_can_be_chosen_before_activation() {
    let tmp = TempDir::new().expect("tmpdir");
    let lang = json_data(wealthmap(tmp.path()).args(["language", "set", "es"]));
    assert_eq!(lang["language"], "es");
    let lang = json_data(wealthmap(tmp.path()).args(["language", "show"]));
    assert_eq!(lang["language"], "es");
}
