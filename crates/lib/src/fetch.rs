//! Pinned revision fetching.
//!
//! Some grammars are only usable from a specific upstream commit. For those,
//! the installed copy is thrown away and replaced with a fresh clone reset to
//! the revision declared in the manifest.

use std::io;

use tracing::info;

use crate::context::Context;
use crate::execute::cmd::run_cmd;
use crate::execute::types::BuildError;
use crate::source::PinnedSource;

/// Replace the local copy of `package` with its pinned upstream revision.
///
/// Destructive: the resolved package directory is deleted unconditionally.
pub async fn fetch_pinned(ctx: &Context, package: &str) -> Result<PinnedSource, BuildError> {
  let path = ctx.locator.locate(package).await;

  let value = ctx.manifest.source(package).unwrap_or_default();
  let source = PinnedSource::parse(value).map_err(|source| BuildError::Descriptor {
    package: package.to_string(),
    value: value.to_string(),
    source,
  })?;

  info!(package, source = %source, path = %path.display(), "fetching pinned revision");

  match tokio::fs::remove_dir_all(&path).await {
    Ok(()) => {}
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(source) => {
      return Err(BuildError::Remove {
        package: package.to_string(),
        path,
        source,
      });
    }
  }

  let dest = path.to_string_lossy().into_owned();
  let clone_dir = path.parent().unwrap_or(ctx.project_dir.as_path());
  run_cmd(&ctx.git, &["clone", source.url.as_str(), dest.as_str()], clone_dir)
    .await
    .map_err(|source_err| BuildError::Clone {
      package: package.to_string(),
      url: source.url.clone(),
      source: source_err,
    })?;

  run_cmd(&ctx.git, &["reset", "--hard", source.rev.as_str()], &path)
    .await
    .map_err(|source_err| BuildError::Reset {
      package: package.to_string(),
      rev: source.rev.clone(),
      source: source_err,
    })?;

  Ok(source)
}
