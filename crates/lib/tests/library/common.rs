//! Shared helpers for library integration tests.

use dispatcher_lib::events::{Event, RelationEvent};
use dispatcher_lib::leader::StaticLeader;
use dispatcher_lib::manifest::Manifest;
use dispatcher_lib::producer::ManifestsRequirer;
use dispatcher_lib::relation::{RelationId, Relations};

pub fn secret(name: &str) -> Manifest {
  Manifest::new(format!(
    "apiVersion: v1\nkind: Secret\nmetadata:\n  name: {name}\ntype: Opaque\nstringData:\n  token: {name}-token\n"
  ))
  .unwrap()
}

pub fn relation_event(category: &str, relation_id: RelationId, app: &str) -> RelationEvent {
  RelationEvent {
    category: category.to_string(),
    relation_id,
    remote_app: Some(app.to_string()),
  }
}

/// Open a relation and let a static producer publish on relation-created.
pub fn connect(relations: &mut Relations, category: &str, app: &str, names: &[&str]) -> RelationId {
  let relation_id = relations.open(category, app);
  let producer = ManifestsRequirer::new(app, category, names.iter().map(|n| secret(n)).collect());
  let created = Event::RelationCreated(relation_event(category, relation_id, app));
  producer
    .handle(&created, relations, &StaticLeader(true))
    .unwrap()
    .unwrap();
  relation_id
}
