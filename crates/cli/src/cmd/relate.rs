//! Implementation of the `dispatch relate` command.

use std::process::ExitCode;

use anyhow::{Result, bail};
use tracing::info;

use dispatcher_lib::events::{Event, RelationEvent};

use crate::output::{print_info, print_json, symbols};

use super::{Options, Session, exit_code, finish, outcome_json};

/// Open a relation between the dispatcher and `app` on `category`.
///
/// Delivers relation-created followed by relation-changed, as the platform
/// does when a relation is established.
pub fn cmd_relate(options: &Options, category: &str, app: &str) -> Result<ExitCode> {
  let mut session = Session::open(options)?;
  if !session.config().categories.iter().any(|c| c == category) {
    bail!("Unknown category: {category}");
  }
  if app == session.config().app_name {
    bail!("{app} cannot relate to itself");
  }

  let relation_id = session.relations.open(category, app);
  session.save()?;
  info!(relation_id, %category, %app, "relation opened");

  let relation = RelationEvent {
    category: category.to_string(),
    relation_id,
    remote_app: Some(app.to_string()),
  };
  session.deliver(&Event::RelationCreated(relation.clone()));
  let event = Event::RelationChanged(relation);
  let outcome = session.deliver(&event);

  if options.format.is_json() {
    print_json(&serde_json::json!({
      "relation_id": relation_id,
      "result": outcome_json(&event, outcome.as_ref())?,
    }))?;
    return Ok(exit_code(outcome.as_ref()));
  }

  print_info(&format!("Opened relation {relation_id}: {category} {} {app}", symbols::ARROW));
  finish(options, &event, outcome.as_ref())
}
