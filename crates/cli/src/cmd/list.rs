//! Implementation of `--list`: show the selected packages and their recipes
//! without running anything.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

use grammar_wasm_lib::manifest::Manifest;
use grammar_wasm_lib::recipe::recipe_for;

use crate::cmd::{ConfigArgs, resolve_config};
use crate::output::{OutputFormat, print_info, print_json, symbols};

#[derive(Debug, Serialize)]
struct ListedPackage {
  name: String,
  source: String,
  steps: Vec<String>,
}

pub fn cmd_list(args: &ConfigArgs, format: OutputFormat) -> Result<()> {
  let config = resolve_config(args)?;
  let manifest = Manifest::load(&config.manifest_path)
    .with_context(|| format!("Failed to load manifest: {}", config.manifest_path.display()))?;

  let listed: Vec<ListedPackage> = manifest
    .grammar_packages(config.filter.as_deref())
    .into_iter()
    .map(|name| ListedPackage {
      source: manifest.source(&name).unwrap_or_default().to_string(),
      steps: recipe_for(&name).iter().map(ToString::to_string).collect(),
      name,
    })
    .collect();

  if format.is_json() {
    return print_json(&listed);
  }

  if listed.is_empty() {
    print_info("No grammar packages matched");
    return Ok(());
  }

  for package in &listed {
    println!("{} {}", package.name.cyan(), package.source.dimmed());
    for step in &package.steps {
      println!("  {} {}", symbols::ARROW, step);
    }
  }

  Ok(())
}
