//! Typed lifecycle events and their routing.
//!
//! The orchestration platform invokes the dispatcher once per event ("hook").
//! An [`Event`] is built once at the process edge, either from explicit
//! arguments or from the hook environment, and everything downstream works on
//! the typed value.
//!
//! Handlers are attached to [`EventKind`]s through an [`EventRouter`] built
//! when the dispatcher is constructed.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::relation::RelationId;

/// Hook environment variable naming the event being handled.
pub const HOOK_NAME_ENV: &str = "DISPATCH_HOOK_NAME";
/// Hook environment variable naming the relation of a relation event.
pub const RELATION_ENV: &str = "DISPATCH_RELATION";
/// Hook environment variable holding the relation id of a relation event.
pub const RELATION_ID_ENV: &str = "DISPATCH_RELATION_ID";
/// Hook environment variable naming the remote application of a relation event.
pub const REMOTE_APP_ENV: &str = "DISPATCH_REMOTE_APP";

const CREATED_SUFFIX: &str = "-relation-created";
const CHANGED_SUFFIX: &str = "-relation-changed";
const BROKEN_SUFFIX: &str = "-relation-broken";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
  #[error("no hook name given (set {HOOK_NAME_ENV})")]
  MissingHookName,

  #[error("unknown hook: {0}")]
  UnknownHook(String),

  #[error("relation hook {0} needs a relation id")]
  MissingRelationId(String),

  #[error("invalid relation id: {0}")]
  InvalidRelationId(String),

  #[error("hook {hook} does not match relation {relation}")]
  RelationMismatch { hook: String, relation: String },
}

/// Context carried by relation events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationEvent {
  /// Relation name, i.e. the manifest category.
  pub category: String,
  pub relation_id: RelationId,
  /// Application on the other side, when the platform knows it.
  pub remote_app: Option<String>,
}

/// An event delivered to the dispatcher or to a producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
  Install,
  UpgradeCharm,
  ConfigChanged,
  LeaderElected,
  UpdateStatus,
  Remove,
  RelationCreated(RelationEvent),
  RelationChanged(RelationEvent),
  RelationBroken(RelationEvent),
}

/// An event without its payload, used as a routing key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
  Install,
  UpgradeCharm,
  ConfigChanged,
  LeaderElected,
  UpdateStatus,
  Remove,
  RelationCreated(String),
  RelationChanged(String),
  RelationBroken(String),
}

impl Event {
  pub fn kind(&self) -> EventKind {
    match self {
      Event::Install => EventKind::Install,
      Event::UpgradeCharm => EventKind::UpgradeCharm,
      Event::ConfigChanged => EventKind::ConfigChanged,
      Event::LeaderElected => EventKind::LeaderElected,
      Event::UpdateStatus => EventKind::UpdateStatus,
      Event::Remove => EventKind::Remove,
      Event::RelationCreated(rel) => EventKind::RelationCreated(rel.category.clone()),
      Event::RelationChanged(rel) => EventKind::RelationChanged(rel.category.clone()),
      Event::RelationBroken(rel) => EventKind::RelationBroken(rel.category.clone()),
    }
  }

  /// Relation context, for relation events.
  pub fn relation(&self) -> Option<&RelationEvent> {
    match self {
      Event::RelationCreated(rel) | Event::RelationChanged(rel) | Event::RelationBroken(rel) => Some(rel),
      _ => None,
    }
  }

  /// Build an event from a hook name such as `secrets-relation-broken`.
  ///
  /// Relation hooks need `relation_id`; `remote_app` is optional.
  pub fn from_hook(hook: &str, relation_id: Option<RelationId>, remote_app: Option<String>) -> Result<Self, EventError> {
    let simple = match hook {
      "install" => Some(Event::Install),
      "upgrade-charm" => Some(Event::UpgradeCharm),
      "config-changed" => Some(Event::ConfigChanged),
      "leader-elected" => Some(Event::LeaderElected),
      "update-status" => Some(Event::UpdateStatus),
      "remove" => Some(Event::Remove),
      _ => None,
    };
    if let Some(event) = simple {
      return Ok(event);
    }

    type Ctor = fn(RelationEvent) -> Event;
    let relation_hooks: [(&str, Ctor); 3] = [
      (CREATED_SUFFIX, Event::RelationCreated),
      (CHANGED_SUFFIX, Event::RelationChanged),
      (BROKEN_SUFFIX, Event::RelationBroken),
    ];

    for (suffix, ctor) in relation_hooks {
      if let Some(category) = hook.strip_suffix(suffix)
        && !category.is_empty()
      {
        let relation_id = relation_id.ok_or_else(|| EventError::MissingRelationId(hook.to_string()))?;
        return Ok(ctor(RelationEvent {
          category: category.to_string(),
          relation_id,
          remote_app,
        }));
      }
    }

    Err(EventError::UnknownHook(hook.to_string()))
  }

  /// Build the event being handled from the hook environment.
  pub fn from_hook_env() -> Result<Self, EventError> {
    let hook = env_var(HOOK_NAME_ENV).ok_or(EventError::MissingHookName)?;
    let relation_id = match env_var(RELATION_ID_ENV) {
      Some(raw) => Some(parse_relation_id(&raw)?),
      None => None,
    };
    let event = Self::from_hook(&hook, relation_id, env_var(REMOTE_APP_ENV))?;

    if let (Some(rel), Some(relation)) = (event.relation(), env_var(RELATION_ENV))
      && rel.category != relation
    {
      return Err(EventError::RelationMismatch { hook, relation });
    }

    Ok(event)
  }

  /// The hook name this event is delivered as.
  pub fn hook_name(&self) -> String {
    match self {
      Event::Install => "install".to_string(),
      Event::UpgradeCharm => "upgrade-charm".to_string(),
      Event::ConfigChanged => "config-changed".to_string(),
      Event::LeaderElected => "leader-elected".to_string(),
      Event::UpdateStatus => "update-status".to_string(),
      Event::Remove => "remove".to_string(),
      Event::RelationCreated(rel) => format!("{}{}", rel.category, CREATED_SUFFIX),
      Event::RelationChanged(rel) => format!("{}{}", rel.category, CHANGED_SUFFIX),
      Event::RelationBroken(rel) => format!("{}{}", rel.category, BROKEN_SUFFIX),
    }
  }
}

impl fmt::Display for Event {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.relation() {
      Some(rel) => write!(f, "{} (relation {})", self.hook_name(), rel.relation_id),
      None => write!(f, "{}", self.hook_name()),
    }
  }
}

/// Parse a relation id, accepting the platform's `name:id` form.
pub fn parse_relation_id(raw: &str) -> Result<RelationId, EventError> {
  let digits = raw.rsplit(':').next().unwrap_or(raw);
  digits
    .trim()
    .parse()
    .map_err(|_| EventError::InvalidRelationId(raw.to_string()))
}

fn env_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Maps event kinds to the handlers registered for them.
#[derive(Debug, Clone)]
pub struct EventRouter<H> {
  routes: BTreeMap<EventKind, Vec<H>>,
}

impl<H> Default for EventRouter<H> {
  fn default() -> Self {
    Self { routes: BTreeMap::new() }
  }
}

impl<H: PartialEq> EventRouter<H> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Attach `handler` to `kind`. Registering the same pair twice is a no-op.
  pub fn register(&mut self, kind: EventKind, handler: H) {
    let handlers = self.routes.entry(kind).or_default();
    if !handlers.contains(&handler) {
      handlers.push(handler);
    }
  }

  /// Handlers for `event`, in registration order.
  pub fn route(&self, event: &Event) -> &[H] {
    self.routes.get(&event.kind()).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn is_routed(&self, kind: &EventKind) -> bool {
    self.routes.contains_key(kind)
  }
}
