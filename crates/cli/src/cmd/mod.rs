mod build;
mod list;

use std::path::PathBuf;

use anyhow::{Context, Result};

use grammar_wasm_lib::RunConfig;

pub use build::cmd_build;
pub use list::cmd_list;

/// Options shared by every command, as given on the command line.
#[derive(Debug, Clone)]
pub struct ConfigArgs {
  pub project: PathBuf,
  pub filter: Option<String>,
  pub out_dir: Option<PathBuf>,
  pub jobs: Option<usize>,
  pub git: Option<PathBuf>,
}

/// Resolve the run configuration: defaults, then environment, then flags.
pub fn resolve_config(args: &ConfigArgs) -> Result<RunConfig> {
  let project_dir = dunce::canonicalize(&args.project)
    .with_context(|| format!("Project directory not found: {}", args.project.display()))?;

  let mut config = RunConfig::from_env(project_dir).with_filter(args.filter.clone());

  if let Some(out_dir) = &args.out_dir {
    config = config.with_out_dir(out_dir);
  }
  if let Some(jobs) = args.jobs {
    config = config.with_parallelism(jobs);
  }
  if let Some(git) = &args.git {
    config.git = git.clone();
  }

  Ok(config)
}
