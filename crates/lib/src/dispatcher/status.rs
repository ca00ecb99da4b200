use std::fmt;

use serde::Serialize;

pub const WAITING_FOR_LEADERSHIP: &str = "Waiting for leadership";
pub const CONTAINER_NOT_READY: &str = "Container is not ready";
pub const REMOVING_RESOURCES: &str = "Removing dispatched resources";
pub const RESOURCES_REMOVED: &str = "Dispatched resources removed";

/// Externally visible health of the dispatcher.
///
/// Blocked and Waiting are not terminal: the next relevant event starts a new
/// pass that may clear them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum Status {
  Active,
  Waiting(String),
  Blocked(String),
  Maintenance(String),
}

impl Status {
  pub fn name(&self) -> &'static str {
    match self {
      Status::Active => "active",
      Status::Waiting(_) => "waiting",
      Status::Blocked(_) => "blocked",
      Status::Maintenance(_) => "maintenance",
    }
  }

  pub fn message(&self) -> Option<&str> {
    match self {
      Status::Active => None,
      Status::Waiting(msg) | Status::Blocked(msg) | Status::Maintenance(msg) => Some(msg),
    }
  }

  /// Whether operator intervention is needed.
  pub fn is_failure(&self) -> bool {
    matches!(self, Status::Blocked(_))
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.message() {
      Some(msg) => write!(f, "{}: {}", self.name(), msg),
      None => write!(f, "{}", self.name()),
    }
  }
}
