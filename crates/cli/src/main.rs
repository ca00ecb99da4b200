mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::Options;
use output::{OutputFormat, print_error};

/// dispatch - deliver lifecycle events to the resource dispatcher
#[derive(Parser)]
#[command(name = "dispatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Configuration file (default: config.yaml in the config directory, if present)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Relation state file
  #[arg(long, global = true)]
  state: Option<PathBuf>,

  /// Directory holding one subdirectory per category
  #[arg(long, global = true)]
  resources: Option<PathBuf>,

  /// Whether this unit is the leader
  #[arg(long, global = true, default_value_t = true, action = ArgAction::Set)]
  leader: bool,

  /// Output format
  #[arg(long, global = true, value_enum, default_value = "text")]
  format: OutputFormat,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Deliver one event to the dispatcher
  Hook {
    /// Hook name, e.g. install or secrets-relation-changed (default: read the hook environment)
    event: Option<String>,

    /// Relation id of a relation hook
    #[arg(long)]
    relation_id: Option<String>,

    /// Remote application of a relation hook
    #[arg(long)]
    remote_app: Option<String>,
  },

  /// Open a relation with a producer application
  Relate { category: String, app: String },

  /// Publish every YAML manifest in DIR as APP's manifests for CATEGORY
  Push {
    category: String,
    app: String,
    dir: PathBuf,
  },

  /// Break a relation and close it
  Depart { relation_id: String },

  /// Show relations and materialized manifests
  Status,
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let options = Options {
    config: cli.config,
    state: cli.state,
    resources: cli.resources,
    leader: cli.leader,
    format: cli.format,
    verbose: cli.verbose,
  };

  let result = match cli.command {
    Commands::Hook {
      event,
      relation_id,
      remote_app,
    } => cmd::cmd_hook(&options, event.as_deref(), relation_id.as_deref(), remote_app),
    Commands::Relate { category, app } => cmd::cmd_relate(&options, &category, &app),
    Commands::Push { category, app, dir } => cmd::cmd_push(&options, &category, &app, &dir),
    Commands::Depart { relation_id } => cmd::cmd_depart(&options, &relation_id),
    Commands::Status => cmd::cmd_status(&options),
  };

  match result {
    Ok(code) => code,
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}
