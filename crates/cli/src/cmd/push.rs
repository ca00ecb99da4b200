//! Implementation of the `dispatch push` command.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};

use dispatcher_lib::events::{Event, RelationEvent};
use dispatcher_lib::leader::StaticLeader;
use dispatcher_lib::manifest::Manifest;
use dispatcher_lib::producer::{PushOutcome, RequirerWrapper};

use crate::output::{print_json, print_warning};

use super::{Options, Session, finish};

/// Publish the manifests in `dir` as `app`'s data on every `category` relation.
///
/// Each relation that received data then gets a relation-changed event.
pub fn cmd_push(options: &Options, category: &str, app: &str, dir: &Path) -> Result<ExitCode> {
  let manifests =
    Manifest::load_dir(dir).with_context(|| format!("Failed to load manifests from {}", dir.display()))?;

  let mut session = Session::open(options)?;
  let producer = RequirerWrapper::new(app, category);
  let pushed = producer.send_data(&mut session.relations, &StaticLeader(options.leader), &manifests)?;

  match pushed {
    PushOutcome::NotLeader => {
      if options.format.is_json() {
        print_json(&serde_json::json!({ "sent": false, "reason": "not leader" }))?;
      } else {
        print_warning("Not the leader, no data sent");
      }
      return Ok(ExitCode::SUCCESS);
    }
    PushOutcome::Sent { relations: 0 } => bail!(
      "{app} has no {category} relation; run `dispatch relate {category} {app}` first",
      app = producer.app(),
      category = producer.category()
    ),
    PushOutcome::Sent { .. } => {}
  }
  session.save()?;

  let relation_ids: Vec<_> = session
    .relations
    .for_category(producer.category())
    .into_iter()
    .filter(|r| r.remote_app == producer.app())
    .map(|r| r.id)
    .collect();

  let mut last = None;
  for relation_id in relation_ids {
    let event = Event::RelationChanged(RelationEvent {
      category: producer.category().to_string(),
      relation_id,
      remote_app: Some(producer.app().to_string()),
    });
    let outcome = session.deliver(&event);
    last = Some((event, outcome));
  }

  match last {
    Some((event, outcome)) => finish(options, &event, outcome.as_ref()),
    None => Ok(ExitCode::SUCCESS),
  }
}
