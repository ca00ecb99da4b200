//! Command implementations for the `dispatch` binary.
//!
//! Every command works on a [`Session`]: the resolved configuration, the
//! relation state loaded from the state file, and a dispatcher writing to the
//! resources directory.

mod depart;
mod hook;
mod push;
mod relate;
mod status;

pub use depart::cmd_depart;
pub use hook::cmd_hook;
pub use push::cmd_push;
pub use relate::cmd_relate;
pub use status::cmd_status;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;

use dispatcher_lib::config::DispatcherConfig;
use dispatcher_lib::dispatcher::{Dispatcher, PassOutcome};
use dispatcher_lib::events::Event;
use dispatcher_lib::leader::StaticLeader;
use dispatcher_lib::relation::{RelationStore, Relations};
use dispatcher_lib::sync::FsDestination;

use crate::output::{OutputFormat, print_info, print_json, print_outcome};

/// Global command-line options.
pub struct Options {
  pub config: Option<PathBuf>,
  pub state: Option<PathBuf>,
  pub resources: Option<PathBuf>,
  pub leader: bool,
  pub format: OutputFormat,
  pub verbose: bool,
}

impl Options {
  /// Resolve configuration: file, then environment, then flags.
  pub fn load_config(&self) -> Result<DispatcherConfig> {
    let mut config = DispatcherConfig::load(self.config.as_deref()).context("Failed to load configuration")?;
    if let Some(root) = &self.resources {
      config.resources_root = root.clone();
    }
    if let Some(state) = &self.state {
      config.state_file = Some(state.clone());
    }
    Ok(config)
  }
}

pub struct Session {
  store: RelationStore,
  pub relations: Relations,
  dispatcher: Dispatcher<FsDestination>,
}

impl Session {
  pub fn open(options: &Options) -> Result<Self> {
    let config = options.load_config()?;
    let store = RelationStore::new(config.state_file());
    let relations = store
      .load()
      .with_context(|| format!("Failed to load relation state from {}", store.path().display()))?;

    let destination = FsDestination::new(config.resources_root.clone());
    let dispatcher = Dispatcher::new(config, destination, StaticLeader(options.leader));

    Ok(Self {
      store,
      relations,
      dispatcher,
    })
  }

  pub fn config(&self) -> &DispatcherConfig {
    self.dispatcher.config()
  }

  pub fn destination(&self) -> &FsDestination {
    self.dispatcher.destination()
  }

  /// Deliver `event` to the dispatcher against the current relation state.
  pub fn deliver(&mut self, event: &Event) -> Option<PassOutcome> {
    info!(%event, "delivering event");
    self.dispatcher.handle(event, &self.relations)
  }

  pub fn save(&self) -> Result<()> {
    self
      .store
      .save(&self.relations)
      .with_context(|| format!("Failed to save relation state to {}", self.store.path().display()))
  }
}

/// Exit code for a delivered event: failure only when the dispatcher is blocked.
pub fn exit_code(outcome: Option<&PassOutcome>) -> ExitCode {
  match outcome {
    Some(outcome) if outcome.status.is_failure() => ExitCode::FAILURE,
    _ => ExitCode::SUCCESS,
  }
}

/// JSON form of a delivered event's result.
pub fn outcome_json(event: &Event, outcome: Option<&PassOutcome>) -> Result<serde_json::Value> {
  match outcome {
    Some(outcome) => serde_json::to_value(outcome).context("Failed to serialize outcome"),
    None => Ok(serde_json::json!({ "event": event.hook_name(), "handled": false })),
  }
}

/// Print the result of a delivered event and pick the exit code.
pub fn finish(options: &Options, event: &Event, outcome: Option<&PassOutcome>) -> Result<ExitCode> {
  match outcome {
    _ if options.format.is_json() => print_json(&outcome_json(event, outcome)?)?,
    Some(outcome) => print_outcome(outcome, options.verbose),
    None => print_info(&format!("{} is not handled by the dispatcher", event.hook_name())),
  }
  Ok(exit_code(outcome))
}
