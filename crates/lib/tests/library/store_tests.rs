//! Relation state persisted between hook invocations.

use tempfile::TempDir;

use dispatcher_lib::config::DispatcherConfig;
use dispatcher_lib::dispatcher::Dispatcher;
use dispatcher_lib::events::Event;
use dispatcher_lib::leader::StaticLeader;
use dispatcher_lib::provider::ManifestsProvider;
use dispatcher_lib::relation::RelationStore;
use dispatcher_lib::sync::MemoryDestination;
use dispatcher_lib::validate::validate;

use super::common::{connect, relation_event};

#[test]
fn published_manifests_survive_a_reload() {
  let temp = TempDir::new().unwrap();
  let store = RelationStore::new(temp.path().join("relations.json"));

  let mut relations = store.load().unwrap();
  connect(&mut relations, "service-accounts", "producer", &["sa-1", "sa-2"]);
  store.save(&relations).unwrap();

  let reloaded = store.load().unwrap();
  assert_eq!(reloaded, relations);

  let provider = ManifestsProvider::new("resource-dispatcher", "service-accounts");
  let merged = provider.get_manifests(&reloaded, None).unwrap();
  assert_eq!(merged.len(), 2);
  assert!(validate(&merged));
}

#[test]
fn each_invocation_sees_the_previous_one() {
  let temp = TempDir::new().unwrap();
  let store = RelationStore::new(temp.path().join("state").join("relations.json"));

  // First invocation: a producer joins.
  let mut relations = store.load().unwrap();
  let id = connect(&mut relations, "secrets", "producer", &["a"]);
  store.save(&relations).unwrap();

  // Second invocation: the relation breaks.
  let relations = store.load().unwrap();
  let mut dispatcher = Dispatcher::new(DispatcherConfig::default(), MemoryDestination::new(), StaticLeader(true));
  dispatcher.handle(&Event::ConfigChanged, &relations).unwrap();
  assert!(dispatcher.destination().files("secrets").unwrap().contains_key("a.yaml"));

  let broken = Event::RelationBroken(relation_event("secrets", id, "producer"));
  dispatcher.handle(&broken, &relations).unwrap();
  assert!(dispatcher.destination().files("secrets").unwrap().is_empty());
}
