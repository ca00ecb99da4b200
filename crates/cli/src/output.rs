//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output: colored status lines,
//! per-category sync summaries, and JSON rendering.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use dispatcher_lib::dispatcher::{PassOutcome, Status};
use dispatcher_lib::sync::SyncReport;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  println!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stdout, |s| s.yellow()),
    message.if_supports_color(Stream::Stdout, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Print a status on stdout. Blocked goes to stdout too, since it is a result, not an error.
pub fn print_status(status: &Status) {
  let line = status.to_string();
  match status {
    Status::Active => print_success(&line),
    Status::Blocked(_) => println!(
      "{} {}",
      symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()),
      line.if_supports_color(Stream::Stdout, |s| s.red())
    ),
    Status::Waiting(_) => print_warning(&line),
    Status::Maintenance(_) => print_info(&line),
  }
}

pub fn describe_report(report: &SyncReport) -> String {
  format!(
    "{} written, {} removed, {} unchanged",
    report.written.len(),
    report.removed.len(),
    report.unchanged
  )
}

/// Print the outcome of a delivered event as text.
pub fn print_outcome(outcome: &PassOutcome, verbose: bool) {
  print_status(&outcome.status);
  for category in &outcome.categories {
    if verbose || !category.report.is_noop() {
      print_stat(&category.category, &describe_report(&category.report));
    }
  }
}
