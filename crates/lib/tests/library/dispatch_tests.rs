//! End-to-end dispatch scenarios against a real directory tree.

use std::fs;

use tempfile::TempDir;

use dispatcher_lib::config::DispatcherConfig;
use dispatcher_lib::dispatcher::{Dispatcher, Status};
use dispatcher_lib::events::Event;
use dispatcher_lib::leader::StaticLeader;
use dispatcher_lib::relation::Relations;
use dispatcher_lib::sync::FsDestination;

use super::common::{connect, relation_event};

fn fs_dispatcher(temp: &TempDir) -> Dispatcher<FsDestination> {
  let config = DispatcherConfig {
    resources_root: temp.path().to_path_buf(),
    ..Default::default()
  };
  let destination = FsDestination::new(config.resources_root.clone());
  Dispatcher::new(config, destination, StaticLeader(true))
}

fn files(temp: &TempDir, category: &str) -> Vec<String> {
  let mut names: Vec<_> = fs::read_dir(temp.path().join(category))
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
    .collect();
  names.sort();
  names
}

#[test]
fn two_producers_then_one_leaves() {
  let temp = TempDir::new().unwrap();
  let mut relations = Relations::new();
  let p1 = connect(&mut relations, "secrets", "producer-1", &["p1-a", "p1-b"]);
  let p2 = connect(&mut relations, "secrets", "producer-2", &["p2-a", "p2-b"]);
  let mut dispatcher = fs_dispatcher(&temp);

  let outcome = dispatcher
    .handle(&Event::RelationChanged(relation_event("secrets", p2, "producer-2")), &relations)
    .unwrap();
  assert_eq!(outcome.status, Status::Active);
  assert_eq!(files(&temp, "secrets"), vec!["p1-a.yaml", "p1-b.yaml", "p2-a.yaml", "p2-b.yaml"]);

  let content = fs::read_to_string(temp.path().join("secrets").join("p1-a.yaml")).unwrap();
  let document: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
  assert_eq!(document["metadata"]["name"].as_str(), Some("p1-a"));
  assert_eq!(document["stringData"]["token"].as_str(), Some("p1-a-token"));

  let broken = Event::RelationBroken(relation_event("secrets", p1, "producer-1"));
  dispatcher.handle(&broken, &relations).unwrap();
  relations.close(p1);

  assert_eq!(files(&temp, "secrets"), vec!["p2-a.yaml", "p2-b.yaml"]);

  // Once the relation is gone a regular pass agrees with the teardown pass.
  let outcome = dispatcher.handle(&Event::UpdateStatus, &relations).unwrap();
  assert_eq!(outcome.written(), 0);
  assert_eq!(outcome.removed(), 0);
}

#[test]
fn stale_files_are_removed_on_install() {
  let temp = TempDir::new().unwrap();
  fs::create_dir_all(temp.path().join("secrets")).unwrap();
  fs::write(temp.path().join("secrets").join("y.yaml"), "stale").unwrap();
  fs::write(temp.path().join("secrets").join("z.yaml"), "stale").unwrap();

  let mut relations = Relations::new();
  connect(&mut relations, "secrets", "producer", &["x"]);
  let mut dispatcher = fs_dispatcher(&temp);

  dispatcher.handle(&Event::Install, &relations).unwrap();

  assert_eq!(files(&temp, "secrets"), vec!["x.yaml"]);
}

#[test]
fn missing_root_waits_until_created() {
  let temp = TempDir::new().unwrap();
  let root = temp.path().join("resources");
  let config = DispatcherConfig {
    resources_root: root.clone(),
    ..Default::default()
  };
  let mut dispatcher = Dispatcher::new(config, FsDestination::new(root.clone()), StaticLeader(true));
  let mut relations = Relations::new();
  connect(&mut relations, "roles", "producer", &["reader"]);

  let outcome = dispatcher.handle(&Event::ConfigChanged, &relations).unwrap();
  assert!(matches!(outcome.status, Status::Waiting(_)));

  fs::create_dir(&root).unwrap();
  let outcome = dispatcher.handle(&Event::UpdateStatus, &relations).unwrap();
  assert_eq!(outcome.status, Status::Active);
  assert!(root.join("roles").join("reader.yaml").is_file());
}
