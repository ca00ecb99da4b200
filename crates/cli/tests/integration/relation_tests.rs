//! Relation lifecycle integration tests: relate, push, depart, status.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn relate_records_relation() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["relate", "secrets", "producer-1"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Opened relation 0"));

  let state = env.state();
  assert_eq!(state["version"], 1);
  assert_eq!(state["relations"][0]["category"], "secrets");
  assert_eq!(state["relations"][0]["remote_app"], "producer-1");
}

#[test]
fn relate_unknown_category_fails() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["relate", "config-maps", "producer-1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unknown category"));
}

#[test]
fn push_without_relation_fails() {
  let env = TestEnv::new();
  let dir = env.write_secrets("p1", &["a1"]);

  env
    .cmd()
    .args(["push", "secrets", "producer-1"])
    .arg(&dir)
    .assert()
    .failure()
    .stderr(predicate::str::contains("no secrets relation"));
}

#[test]
fn producers_join_and_leave() {
  let env = TestEnv::new();
  let p1 = env.write_secrets("p1", &["a1", "a2"]);
  let p2 = env.write_secrets("p2", &["b1", "b2"]);

  env.cmd().args(["relate", "secrets", "producer-1"]).assert().success();
  env.cmd().args(["relate", "secrets", "producer-2"]).assert().success();
  env.cmd().args(["push", "secrets", "producer-1"]).arg(&p1).assert().success();
  env
    .cmd()
    .args(["push", "secrets", "producer-2"])
    .arg(&p2)
    .assert()
    .success()
    .stdout(predicate::str::contains("active"));

  assert_eq!(env.files("secrets"), vec!["a1.yaml", "a2.yaml", "b1.yaml", "b2.yaml"]);

  env
    .cmd()
    .args(["depart", "0"])
    .assert()
    .success()
    .stdout(predicate::str::contains("2 removed"));

  assert_eq!(env.files("secrets"), vec!["b1.yaml", "b2.yaml"]);
  let state = env.state();
  let relations = state["relations"].as_array().unwrap();
  assert_eq!(relations.len(), 1);
  assert_eq!(relations[0]["remote_app"], "producer-2");
}

#[test]
fn broken_hook_without_remote_app_uses_stored_relation() {
  let env = TestEnv::new();
  let p1 = env.write_secrets("p1", &["a1"]);
  let p2 = env.write_secrets("p2", &["b1"]);

  env.cmd().args(["relate", "secrets", "producer-1"]).assert().success();
  env.cmd().args(["relate", "secrets", "producer-2"]).assert().success();
  env.cmd().args(["push", "secrets", "producer-1"]).arg(&p1).assert().success();
  env.cmd().args(["push", "secrets", "producer-2"]).arg(&p2).assert().success();
  assert_eq!(env.files("secrets"), vec!["a1.yaml", "b1.yaml"]);

  env
    .cmd()
    .args(["hook", "secrets-relation-broken", "--relation-id", "0"])
    .assert()
    .success()
    .stdout(predicate::str::contains("1 removed"));

  assert_eq!(env.files("secrets"), vec!["b1.yaml"]);
}

#[test]
fn repeated_hook_changes_nothing() {
  let env = TestEnv::new();
  let p1 = env.write_secrets("p1", &["a1"]);
  env.cmd().args(["relate", "secrets", "producer-1"]).assert().success();
  env.cmd().args(["push", "secrets", "producer-1"]).arg(&p1).assert().success();

  let output = env
    .cmd()
    .args(["--format", "json", "hook", "update-status"])
    .output()
    .unwrap();
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  for category in json["categories"].as_array().unwrap() {
    assert!(category["report"]["written"].as_array().unwrap().is_empty());
    assert!(category["report"]["removed"].as_array().unwrap().is_empty());
  }
}

#[test]
fn collision_is_blocked() {
  let env = TestEnv::new();
  let p1 = env.write_secrets("p1", &["shared"]);
  let p2 = env.write_secrets("p2", &["shared"]);

  env.cmd().args(["relate", "secrets", "producer-1"]).assert().success();
  env.cmd().args(["relate", "secrets", "producer-2"]).assert().success();
  env.cmd().args(["push", "secrets", "producer-1"]).arg(&p1).assert().success();

  env
    .cmd()
    .args(["push", "secrets", "producer-2"])
    .arg(&p2)
    .assert()
    .failure()
    .stdout(predicate::str::contains("blocked"))
    .stdout(predicate::str::contains("shared"));

  // The previous sync is left in place.
  assert_eq!(env.files("secrets"), vec!["shared.yaml"]);

  env
    .cmd()
    .args(["depart", "1"])
    .assert()
    .success()
    .stdout(predicate::str::contains("active"));
}

#[test]
fn non_leader_push_sends_nothing() {
  let env = TestEnv::new();
  let p1 = env.write_secrets("p1", &["a1"]);
  env.cmd().args(["relate", "secrets", "producer-1"]).assert().success();

  env
    .cmd()
    .args(["--leader", "false", "push", "secrets", "producer-1"])
    .arg(&p1)
    .assert()
    .success()
    .stdout(predicate::str::contains("Not the leader"));

  let state = env.state();
  assert!(state["relations"][0]["data"].get("producer-1").is_none());
  assert!(env.files("secrets").is_empty());
}

#[test]
fn depart_unknown_relation_fails() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["depart", "7"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("No relation with id 7"));
}

#[test]
fn status_lists_relations_and_files() {
  let env = TestEnv::new();
  let p1 = env.write_secrets("p1", &["a1"]);
  env.cmd().args(["relate", "secrets", "producer-1"]).assert().success();
  env.cmd().args(["push", "secrets", "producer-1"]).arg(&p1).assert().success();

  env
    .cmd()
    .arg("status")
    .assert()
    .success()
    .stdout(predicate::str::contains("producer-1"))
    .stdout(predicate::str::contains("a1.yaml"));

  let output = env.cmd().args(["--format", "json", "status"]).output().unwrap();
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["ready"], true);
  assert_eq!(json["relations"][0]["manifests"], 1);
  assert_eq!(json["categories"][0]["category"], "secrets");
  assert_eq!(json["categories"][0]["files"][0], "a1.yaml");
}
