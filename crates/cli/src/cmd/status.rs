//! Implementation of the `dispatch status` command.
//!
//! Lists open relations with the number of manifests each producer published,
//! and the manifests currently materialized per category.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use dispatcher_lib::channel;
use dispatcher_lib::consts::KUBERNETES_MANIFESTS_FIELD;
use dispatcher_lib::relation::RelationId;
use dispatcher_lib::sync::Destination;

use crate::output::{print_info, print_json, print_stat, print_success, print_warning, symbols};

use super::{Options, Session};

#[derive(Serialize)]
struct RelationSummary {
  id: RelationId,
  category: String,
  remote_app: String,
  /// `None` when the payload can't be decoded.
  manifests: Option<usize>,
}

#[derive(Serialize)]
struct CategorySummary {
  category: String,
  files: Vec<String>,
}

#[derive(Serialize)]
struct StatusSummary {
  state_file: PathBuf,
  resources_root: PathBuf,
  ready: bool,
  relations: Vec<RelationSummary>,
  categories: Vec<CategorySummary>,
}

pub fn cmd_status(options: &Options) -> Result<ExitCode> {
  let session = Session::open(options)?;
  let config = session.config();
  let destination = session.destination();
  let ready = destination.can_connect();

  let mut relations: Vec<_> = session
    .relations
    .relations
    .iter()
    .map(|r| RelationSummary {
      id: r.id,
      category: r.category.clone(),
      remote_app: r.remote_app.clone(),
      manifests: channel::decode(r.remote(KUBERNETES_MANIFESTS_FIELD)).ok().map(|d| d.len()),
    })
    .collect();
  relations.sort_by_key(|r| r.id);

  let mut categories = Vec::new();
  for category in &config.categories {
    let files = if ready {
      destination
        .list(category)?
        .into_iter()
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
    } else {
      Vec::new()
    };
    categories.push(CategorySummary {
      category: category.clone(),
      files,
    });
  }

  let summary = StatusSummary {
    state_file: config.state_file(),
    resources_root: config.resources_root.clone(),
    ready,
    relations,
    categories,
  };

  if options.format.is_json() {
    print_json(&summary)?;
    return Ok(ExitCode::SUCCESS);
  }

  print_stat("State", &summary.state_file.display().to_string());
  print_stat("Resources", &summary.resources_root.display().to_string());
  println!();

  if summary.relations.is_empty() {
    print_info("No relations");
  } else {
    print_info(&format!("{} relation(s)", summary.relations.len()));
    for relation in &summary.relations {
      let manifests = match relation.manifests {
        Some(count) => format!("{count} manifest(s)"),
        None => "invalid payload".to_string(),
      };
      println!(
        "  {} {} {} {} ({})",
        relation.id,
        relation.category,
        symbols::ARROW,
        relation.remote_app,
        manifests
      );
    }
  }
  println!();

  if !summary.ready {
    print_warning("Resources directory is not ready");
    return Ok(ExitCode::SUCCESS);
  }

  print_success("Dispatched manifests");
  for category in &summary.categories {
    let files = if category.files.is_empty() {
      "-".to_string()
    } else {
      category.files.join(", ")
    };
    print_stat(&category.category, &files);
  }

  Ok(ExitCode::SUCCESS)
}
