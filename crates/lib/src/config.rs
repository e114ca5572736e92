//! Run configuration.
//!
//! Defaults are derived from the project directory; a few environment
//! variables can override them, and the CLI overrides both.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::consts::{CLI_PACKAGE, DEFAULT_GIT, DEFAULT_OUT_DIRNAME, MANIFEST_FILENAME, MODULES_DIRNAME};

/// Overrides the default parallelism.
pub const ENV_JOBS: &str = "GRAMMAR_WASM_JOBS";
/// Overrides the output directory.
pub const ENV_OUT_DIR: &str = "GRAMMAR_WASM_OUT_DIR";
/// Overrides the git executable.
pub const ENV_GIT: &str = "GRAMMAR_WASM_GIT";

/// Configuration for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
  /// Directory holding the manifest; module resolution starts here.
  pub project_dir: PathBuf,

  pub manifest_path: PathBuf,

  /// Directory collecting built artifacts. Recreated on every run.
  pub out_dir: PathBuf,

  /// Where packages are expected when resolution fails.
  pub modules_dir: PathBuf,

  /// Package providing the grammar compiler executable.
  pub cli_package: String,

  pub git: PathBuf,

  /// Maximum number of packages processed at once.
  pub parallelism: usize,

  /// Only process packages whose name contains this.
  pub filter: Option<String>,
}

impl RunConfig {
  /// Default configuration for a project directory.
  pub fn new(project_dir: impl Into<PathBuf>) -> Self {
    let project_dir = project_dir.into();
    Self {
      manifest_path: project_dir.join(MANIFEST_FILENAME),
      out_dir: project_dir.join(DEFAULT_OUT_DIRNAME),
      modules_dir: project_dir.join(MODULES_DIRNAME),
      cli_package: CLI_PACKAGE.to_string(),
      git: PathBuf::from(DEFAULT_GIT),
      parallelism: num_cpus(),
      filter: None,
      project_dir,
    }
  }

  /// Default configuration with environment overrides applied.
  ///
  /// A relative `GRAMMAR_WASM_OUT_DIR` is taken relative to the project.
  pub fn from_env(project_dir: impl Into<PathBuf>) -> Self {
    let mut config = Self::new(project_dir);

    if let Ok(jobs) = std::env::var(ENV_JOBS) {
      match parse_jobs(&jobs) {
        Some(n) => config.parallelism = n,
        None => warn!(value = %jobs, "ignoring invalid {}", ENV_JOBS),
      }
    }

    if let Ok(out_dir) = std::env::var(ENV_OUT_DIR)
      && !out_dir.is_empty()
    {
      config.out_dir = config.project_dir.join(out_dir);
    }

    if let Ok(git) = std::env::var(ENV_GIT)
      && !git.is_empty()
    {
      config.git = PathBuf::from(git);
    }

    config
  }

  pub fn with_filter(mut self, filter: Option<String>) -> Self {
    self.filter = filter.filter(|f| !f.is_empty());
    self
  }

  pub fn with_parallelism(mut self, parallelism: usize) -> Self {
    self.parallelism = parallelism.max(1);
    self
  }

  pub fn with_out_dir(mut self, out_dir: &Path) -> Self {
    self.out_dir = self.project_dir.join(out_dir);
    self
  }
}

fn parse_jobs(value: &str) -> Option<usize> {
  value.trim().parse().ok().filter(|n| *n > 0)
}

/// Get the number of CPUs for default parallelism.
fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}
