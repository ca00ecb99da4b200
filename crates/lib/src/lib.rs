//! dispatcher-lib: manifest dispatching for related producers
//!
//! Producers publish Kubernetes manifests on per-category relations. The
//! dispatcher merges every producer's contribution, rejects name collisions
//! and keeps one destination directory per category in sync:
//! - `manifest`: parsed manifest units and their identity
//! - `channel`: the relation data wire codec
//! - `producer` / `provider`: both sides of a manifests relation
//! - `sync`: diffing and applying a desired set against a destination
//! - `dispatcher`: the per-event orchestration and status reporting

pub mod channel;
pub mod config;
pub mod consts;
pub mod dispatcher;
pub mod events;
pub mod leader;
pub mod manifest;
pub mod platform;
pub mod producer;
pub mod provider;
pub mod relation;
pub mod sync;
pub mod util;
pub mod validate;
