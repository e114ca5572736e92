//! Shared state handed to every package task.

use std::path::PathBuf;

use crate::config::RunConfig;
use crate::consts::CLI_EXECUTABLE;
use crate::locate::Locator;
use crate::manifest::Manifest;

/// Everything a recipe needs to fetch and build one package.
#[derive(Debug, Clone)]
pub struct Context {
  pub project_dir: PathBuf,
  pub manifest: Manifest,
  pub locator: Locator,
  pub out_dir: PathBuf,
  pub cli_package: String,
  pub git: PathBuf,
}

impl Context {
  pub fn new(config: &RunConfig, manifest: Manifest) -> Self {
    Self {
      project_dir: config.project_dir.clone(),
      manifest,
      locator: Locator::new(&config.project_dir, &config.modules_dir),
      out_dir: config.out_dir.clone(),
      cli_package: config.cli_package.clone(),
      git: config.git.clone(),
    }
  }

  /// Path of the grammar compiler executable.
  pub async fn cli_executable(&self) -> PathBuf {
    self.locator.locate(&self.cli_package).await.join(CLI_EXECUTABLE)
  }
}
