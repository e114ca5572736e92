//! Artifact building.
//!
//! Compiles one grammar (a package root or a sub-path inside it) with the
//! grammar compiler and moves the produced parser modules into the shared
//! output directory.

mod artifacts;

use std::path::PathBuf;

use tracing::{debug, info};

use crate::context::Context;
use crate::execute::cmd::run_cmd;
use crate::execute::types::BuildError;
use crate::recipe::BuildStep;

pub use artifacts::{is_artifact, move_artifacts};

/// Build one grammar of `package` and collect its artifacts.
///
/// Returns the paths of the artifacts now in the output directory. The
/// working directory must already exist; if it does not, neither the
/// generate nor the build command is run. A build that leaves no artifact
/// behind is a failure.
pub async fn build_grammar(ctx: &Context, package: &str, step: &BuildStep) -> Result<Vec<PathBuf>, BuildError> {
  let cli = ctx.cli_executable().await;

  let root = ctx.locator.locate(package).await;
  let dir = match step.sub_path {
    Some(sub_path) => root.join(sub_path),
    None => root,
  };

  if !tokio::fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
    return Err(BuildError::MissingDir {
      package: package.to_string(),
      path: dir,
    });
  }

  if step.generate {
    info!(package, dir = %dir.display(), "generating grammar");
    run_cmd(&cli, &["generate"], &dir)
      .await
      .map_err(|source| BuildError::Generate {
        package: package.to_string(),
        dir: dir.clone(),
        source,
      })?;
  }

  info!(package, dir = %dir.display(), "building grammar");
  run_cmd(&cli, &["build", "--wasm"], &dir)
    .await
    .map_err(|source| BuildError::Build {
      package: package.to_string(),
      dir: dir.clone(),
      source,
    })?;

  let moved = move_artifacts(&dir, &ctx.out_dir)
    .await
    .map_err(|source| BuildError::Move {
      package: package.to_string(),
      dir: dir.clone(),
      source,
    })?;

  if moved.is_empty() {
    return Err(BuildError::NoArtifacts {
      package: package.to_string(),
      dir,
    });
  }

  debug!(package, count = moved.len(), "collected artifacts");
  Ok(moved)
}
