//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory with an isolated state file,
/// resources root and config directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create an environment whose resources root already exists.
  pub fn new() -> Self {
    let env = Self::without_resources();
    std::fs::create_dir_all(env.temp.path().join("resources")).unwrap();
    env
  }

  /// Create an environment whose resources root is missing (destination not ready).
  pub fn without_resources() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Write one Secret manifest per name into `dir`.
  pub fn write_secrets(&self, dir: &str, names: &[&str]) -> PathBuf {
    for name in names {
      self.write_file(
        &format!("{dir}/{name}.yaml"),
        &format!("apiVersion: v1\nkind: Secret\nmetadata:\n  name: {name}\nstringData:\n  key: value\n"),
      );
    }
    self.temp.path().join(dir)
  }

  pub fn state_path(&self) -> PathBuf {
    self.temp.path().join("state").join("relations.json")
  }

  pub fn resources_path(&self) -> PathBuf {
    let p = self.temp.path().join("resources");
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Sorted file names materialized for `category`.
  pub fn files(&self, category: &str) -> Vec<String> {
    let dir = self.resources_path().join(category);
    let Ok(entries) = std::fs::read_dir(dir) else {
      return Vec::new();
    };
    let mut names: Vec<_> = entries
      .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
      .collect();
    names.sort();
    names
  }

  /// Relation state as JSON.
  pub fn state(&self) -> serde_json::Value {
    let content = std::fs::read_to_string(self.state_path()).unwrap();
    serde_json::from_str(&content).unwrap()
  }

  /// Get a Command for the dispatch binary with isolated paths.
  pub fn cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("dispatch");
    cmd
      .arg("--state")
      .arg(self.state_path())
      .arg("--resources")
      .arg(self.temp.path().join("resources"))
      .env("XDG_CONFIG_HOME", self.temp.path().join("config"))
      .env_remove("DISPATCH_RESOURCES_ROOT")
      .env_remove("DISPATCH_STATE_FILE")
      .env_remove("DISPATCH_HOOK_NAME")
      .env_remove("DISPATCH_RELATION")
      .env_remove("DISPATCH_RELATION_ID")
      .env_remove("DISPATCH_REMOTE_APP")
      .env_remove("RUST_LOG");
    cmd
  }
}
