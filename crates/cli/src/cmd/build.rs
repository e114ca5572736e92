//! Implementation of the default command: build every selected grammar.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use tracing::debug;

use grammar_wasm_lib::execute::{PackageOutcome, run};

use crate::cmd::{ConfigArgs, resolve_config};
use crate::output::{
  OutputFormat, format_duration, print_error, print_info, print_json, print_stat, print_success, print_warning,
};

/// Execute the build command.
///
/// Prints one line per package and a summary. Returns `false` when any
/// package failed, in which case the output directory has been emptied.
pub fn cmd_build(args: &ConfigArgs, format: OutputFormat) -> Result<bool> {
  let start = Instant::now();
  let config = resolve_config(args)?;
  debug!(?config, "resolved configuration");

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let summary = rt.block_on(run(&config)).context("Build failed")?;

  if format.is_json() {
    print_json(&summary)?;
    return Ok(!summary.failed);
  }

  if summary.packages.is_empty() {
    print_info("No grammar packages matched");
    return Ok(true);
  }

  for package in &summary.packages {
    print_outcome(package);
  }

  println!();
  print_stat("Packages", &summary.packages.len().to_string());
  print_stat("Succeeded", &summary.succeeded().to_string());
  print_stat("Failed", &(summary.packages.len() - summary.succeeded()).to_string());
  print_stat("Artifacts", &summary.artifact_count().to_string());
  print_stat("Output", &summary.out_dir.display().to_string());
  print_stat("Time", &format_duration(start.elapsed()));

  if summary.failed {
    println!();
    print_warning("Some packages failed; the output directory was left empty");
  }

  Ok(!summary.failed)
}

fn print_outcome(package: &PackageOutcome) {
  match &package.failure {
    None => print_success(&format!(
      "{} {}",
      package.name,
      outcome_detail(package).if_supports_color(Stream::Stdout, |s| s.dimmed())
    )),
    Some(failure) => {
      let label = failure.kind.map_or("unexpected error", |k| k.label());
      print_error(&format!("{}: {}", package.name, label));
      for line in failure.message.lines() {
        eprintln!("    {}", line);
      }
    }
  }
}

/// `(artifact, ..., duration)` for a succeeded package.
fn outcome_detail(package: &PackageOutcome) -> String {
  let elapsed = format_duration(Duration::from_millis(package.duration_ms));
  if package.artifacts.is_empty() {
    format!("({elapsed})")
  } else {
    format!("({}, {elapsed})", package.artifacts.join(", "))
  }
}
