//! Hook command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn install_creates_category_directories() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["hook", "install"])
    .assert()
    .success()
    .stdout(predicate::str::contains("active"));

  for category in ["secrets", "service-accounts", "pod-defaults", "roles", "role-bindings"] {
    assert!(env.resources_path().join(category).is_dir(), "{category}");
  }
}

#[test]
fn hook_reads_environment() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("hook")
    .env("DISPATCH_HOOK_NAME", "config-changed")
    .assert()
    .success()
    .stdout(predicate::str::contains("active"));
}

#[test]
fn hook_without_name_fails() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("hook")
    .assert()
    .failure()
    .stderr(predicate::str::contains("DISPATCH_HOOK_NAME"));
}

#[test]
fn unknown_hook_fails() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["hook", "not-a-hook"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown hook"));
}

#[test]
fn relation_hook_needs_relation_id() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["hook", "secrets-relation-changed"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("relation id"));
}

#[test]
fn ignored_event_is_reported() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["hook", "leader-elected"])
    .assert()
    .success()
    .stdout(predicate::str::contains("not handled"));
}

#[test]
fn non_leader_waits() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["--leader", "false", "hook", "config-changed"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Waiting for leadership"));

  assert!(env.files("secrets").is_empty());
  assert!(!env.resources_path().join("secrets").exists());
}

#[test]
fn missing_resources_root_waits() {
  let env = TestEnv::without_resources();

  env
    .cmd()
    .args(["hook", "update-status"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Container is not ready"));
}

#[test]
fn json_output_carries_status() {
  let env = TestEnv::new();

  let output = env
    .cmd()
    .args(["--format", "json", "hook", "upgrade-charm"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["event"], "upgrade-charm");
  assert_eq!(json["status"]["state"], "active");
  assert_eq!(json["categories"].as_array().unwrap().len(), 5);
}

#[test]
fn remove_releases_destinations() {
  let env = TestEnv::new();
  env.cmd().args(["hook", "install"]).assert().success();

  env
    .cmd()
    .args(["hook", "remove"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Dispatched resources removed"));

  assert!(!env.resources_path().join("secrets").exists());
}

#[test]
fn config_file_limits_categories() {
  let env = TestEnv::new();
  env.write_file("dispatch.yaml", "categories: [roles]\n");

  env
    .cmd()
    .arg("--config")
    .arg(env.temp.path().join("dispatch.yaml"))
    .args(["hook", "install"])
    .assert()
    .success();

  assert!(env.resources_path().join("roles").is_dir());
  assert!(!env.resources_path().join("secrets").exists());
}

#[test]
fn invalid_config_fails() {
  let env = TestEnv::new();
  env.write_file("dispatch.yaml", "categories: []\n");

  env
    .cmd()
    .arg("--config")
    .arg(env.temp.path().join("dispatch.yaml"))
    .args(["hook", "install"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load configuration"));
}
