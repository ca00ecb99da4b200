//! Implementation of the `dispatch hook` command.

use std::process::ExitCode;

use anyhow::{Context, Result};

use dispatcher_lib::events::{Event, parse_relation_id};

use super::{Options, Session, finish};

/// Deliver one event.
///
/// With no hook name the event is read from the hook environment
/// (`DISPATCH_HOOK_NAME`, `DISPATCH_RELATION`, `DISPATCH_RELATION_ID`,
/// `DISPATCH_REMOTE_APP`), the way the orchestration platform invokes hooks.
pub fn cmd_hook(
  options: &Options,
  hook: Option<&str>,
  relation_id: Option<&str>,
  remote_app: Option<String>,
) -> Result<ExitCode> {
  let mut event = match hook {
    Some(hook) => {
      let relation_id = relation_id.map(parse_relation_id).transpose()?;
      Event::from_hook(hook, relation_id, remote_app)
    }
    None => Event::from_hook_env(),
  }
  .context("Invalid hook")?;

  let mut session = Session::open(options)?;

  // The departing producer is known from the relation store when the hook doesn't name it.
  if let Event::RelationBroken(broken) = &mut event
    && broken.remote_app.is_none()
    && let Some(relation) = session.relations.get(broken.relation_id)
  {
    broken.remote_app = Some(relation.remote_app.clone());
  }

  let outcome = session.deliver(&event);
  finish(options, &event, outcome.as_ref())
}
