//! Implementation of the `dispatch depart` command.

use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;

use dispatcher_lib::events::{Event, RelationEvent, parse_relation_id};

use super::{Options, Session, finish};

/// Break a relation: deliver relation-broken while its data is still visible,
/// then close it.
pub fn cmd_depart(options: &Options, relation_id: &str) -> Result<ExitCode> {
  let relation_id = parse_relation_id(relation_id)?;
  let mut session = Session::open(options)?;

  let relation = session
    .relations
    .get(relation_id)
    .with_context(|| format!("No relation with id {relation_id}"))?;
  let event = Event::RelationBroken(RelationEvent {
    category: relation.category.clone(),
    relation_id,
    remote_app: Some(relation.remote_app.clone()),
  });

  let outcome = session.deliver(&event);
  session.relations.close(relation_id);
  session.save()?;
  info!(relation_id, "relation closed");

  finish(options, &event, outcome.as_ref())
}
