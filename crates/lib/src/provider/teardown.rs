//! Departing-producer detection.
//!
//! While a relation-broken event is being handled the relation is still
//! listed with its data intact. Merging it would re-create the very resources
//! its removal is meant to delete, so the departing producer is excluded for
//! that pass.

use crate::events::Event;

/// The producer leaving `category` during `event`, if any.
///
/// Only a relation-broken event for this exact category that names its remote
/// application yields a producer; every other event excludes nothing.
pub fn departing_producer_for<'a>(event: &'a Event, category: &str) -> Option<&'a str> {
  match event {
    Event::RelationBroken(rel) if rel.category == category => rel.remote_app.as_deref(),
    _ => None,
  }
}
