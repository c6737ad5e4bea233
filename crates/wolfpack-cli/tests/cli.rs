use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn wolfpack() -> Command {
    Command::cargo_bin("wolfpack").unwrap()
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

/// A conversation turn against the fixture events, persisting the session.
fn turn_command(session: &Path, intent: &str, slots: &[&str]) -> Command {
    let mut cmd = wolfpack();
    cmd.args(["turn", intent])
        .arg("--events")
        .arg(fixture("events.json"))
        .arg("--session")
        .arg(session)
        .arg("--update-session");
    for slot in slots {
        cmd.args(["--slot", slot]);
    }
    cmd
}

/// One turn on Nov 1 2016.
fn turn(session: &Path, intent: &str, slots: &[&str]) -> Value {
    stdout_json(turn_command(session, intent, slots).args(["--today", "2016-11-01"]))
}

// ── resolve ─────────────────────────────────────────────────────────────────

#[test]
fn test_resolve_current_week() {
    let range = stdout_json(wolfpack().args(["resolve", "2016-W44", "--today", "2016-11-01"]));
    assert_eq!(range["begin"], "2016-10-30");
    assert_eq!(range["end"], "2016-11-06");
    assert_eq!(range["granularity"], "week");
    assert_eq!(range["label"], "this week");
}

#[test]
fn test_resolve_day_label() {
    let range = stdout_json(wolfpack().args(["resolve", "2016-11-01", "--today", "2016-11-01"]));
    assert_eq!(range["label_with_preposition"], "on Tuesday, November 1, 2016");
}

#[test]
fn test_resolve_invalid_month_is_reported() {
    let report = stdout_json(wolfpack().args(["resolve", "2016-13", "--today", "2016-11-01"]));
    assert_eq!(report["error"]["kind"], "InvalidCalendarValue");
}

#[test]
fn test_resolve_decade_unsupported() {
    wolfpack()
        .args(["resolve", "201X", "--today", "2016-11-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UnsupportedDateGranularity"))
        .stdout(predicate::str::contains("I can't understand that kind of date yet."));
}

#[test]
fn test_resolve_uses_config_first_week() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"minimal_days_in_first_week": 4}"#).unwrap();

    let range = stdout_json(
        wolfpack()
            .arg("--config")
            .arg(&config)
            .args(["resolve", "2015-W01", "--today", "2015-01-06"]),
    );
    assert_eq!(range["begin"], "2015-01-04");
}

#[test]
fn test_bad_config_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"timezone": "Mars/Olympus"}"#).unwrap();

    wolfpack()
        .arg("--config")
        .arg(&config)
        .args(["resolve", "2016-11", "--today", "2016-11-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Mars/Olympus"));
}

// ── match ───────────────────────────────────────────────────────────────────

#[test]
fn test_match_misheard_name() {
    let found = stdout_json(wolfpack().args([
        "match",
        "Bball game",
        "Art Show",
        "Basketball Game",
        "Soccer Match",
    ]));
    assert_eq!(found["candidate"], "Basketball Game");
}

#[test]
fn test_match_requires_candidates() {
    wolfpack().args(["match", "Bball game"]).assert().failure();
}

// ── turn ────────────────────────────────────────────────────────────────────

#[test]
fn test_turn_narrow_then_pick() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");

    let first = turn(&session, "GetEventsOnDateIntent", &["date=2016-W44"]);
    assert_eq!(first["outcome"]["outcome"], "too_many_results");
    assert_eq!(first["outcome"]["count"], 7);
    assert_eq!(first["session"]["state"], "narrowing_required");

    let second = turn(&session, "SportsCategoryIntent", &[]);
    assert_eq!(second["outcome"]["outcome"], "resolved_list");
    assert_eq!(second["outcome"]["label"], "this week");
    let names: Vec<&str> = second["outcome"]["candidates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Basketball Game", "Soccer Match"]);
    assert_eq!(second["session"]["state"], "events_presented");

    let third = turn(&session, "GetLocationDetailsIntent", &["eventName=Bball game"]);
    assert_eq!(third["outcome"]["outcome"], "resolved_single");
    assert_eq!(third["outcome"]["name"], "Basketball Game");
    assert_eq!(third["outcome"]["id"], 101);
    assert_eq!(third["outcome"]["detail"], "location");
    assert_eq!(third["outcome"]["location"], "Reynolds Coliseum");
    assert_eq!(third["session"]["state"], "events_presented");

    let fourth = turn(&session, "GetFeeDetailsIntent", &["eventName=basketball"]);
    assert_eq!(fourth["outcome"]["name"], "Basketball Game");
    assert_eq!(fourth["outcome"]["fee"], "$5");

    let fifth = turn(&session, "GetEndTimeIntent", &["eventName=Soccer Match"]);
    assert_eq!(fifth["outcome"]["id"], 103);
    assert!(fifth["outcome"]["end_time"].is_null());
}

#[test]
fn test_turn_next_event() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");

    let report = turn(&session, "NextEventIntent", &[]);
    assert_eq!(report["outcome"]["outcome"], "next_event");
    assert_eq!(report["outcome"]["name"], "Basketball Game");
    assert_eq!(report["outcome"]["start"], "2016-11-01T19:00:00");
    assert_eq!(report["session"]["state"], "idle");

    let later = stdout_json(
        turn_command(&session, "NextEventIntent", &[]).args(["--now", "2016-11-01T20:00:00"]),
    );
    assert_eq!(later["outcome"]["name"], "Art Show");
}

#[test]
fn test_turn_next_event_keeps_pending_category_question() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");

    turn(&session, "GetEventsOnDateIntent", &["date=2016-W44"]);
    let report = turn(&session, "NextEventIntent", &[]);
    assert_eq!(report["outcome"]["outcome"], "next_event");
    assert_eq!(report["session"]["state"], "narrowing_required");

    let narrowed = turn(&session, "ClubsCategoryIntent", &[]);
    assert_eq!(narrowed["outcome"]["outcome"], "resolved_list");
}

#[test]
fn test_turn_nothing_upcoming() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");

    let report = stdout_json(
        turn_command(&session, "NextEventIntent", &[]).args(["--now", "2017-01-01T00:00:00"]),
    );
    assert_eq!(report["outcome"]["outcome"], "no_results");
    assert_eq!(report["outcome"]["label"], "coming up");
}

#[test]
fn test_turn_category_without_context() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");

    let report = turn(&session, "ClubsCategoryIntent", &[]);
    assert_eq!(report["error"]["kind"], "InvalidStateTransition");
    assert_eq!(report["session"]["state"], "idle");
}

#[test]
fn test_turn_no_results() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");

    let report = turn(&session, "GetEventsOnDateIntent", &["date=2017-02"]);
    assert_eq!(report["outcome"]["outcome"], "no_results");
    assert_eq!(report["outcome"]["label"], "in February");
    assert_eq!(report["session"]["state"], "idle");
}

#[test]
fn test_turn_missing_slot() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");

    let report = turn(&session, "GetEventsOnDateIntent", &[]);
    assert_eq!(report["error"]["kind"], "MissingSlot");
    assert_eq!(report["error"]["speech"], "Which date are you interested in?");
}

#[test]
fn test_turn_unrecognized_intent() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");

    let report = turn(&session, "AMAZON.HelpIntent", &[]);
    assert_eq!(report["outcome"]["outcome"], "not_understood");
}

#[test]
fn test_turn_rejects_malformed_slot() {
    wolfpack()
        .args(["turn", "GetEventsOnDateIntent", "--slot", "2016-W44"])
        .arg("--events")
        .arg(fixture("events.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME=VALUE"));
}
