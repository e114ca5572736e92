//! Moving built parser modules into the output directory.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::consts::ARTIFACT_EXTENSION;

/// Whether `path` names a compiled parser module.
pub fn is_artifact(path: &Path) -> bool {
  path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION)
}

/// Move every artifact directly inside `from` into `to`.
///
/// Returns the new paths, sorted. An existing file of the same name in `to`
/// is replaced.
pub async fn move_artifacts(from: &Path, to: &Path) -> io::Result<Vec<PathBuf>> {
  if !fs::metadata(to).await?.is_dir() {
    return Err(io::Error::new(
      io::ErrorKind::NotADirectory,
      format!("'{}' is not a directory", to.display()),
    ));
  }

  let mut moved = Vec::new();
  let mut entries = fs::read_dir(from).await?;

  while let Some(entry) = entries.next_entry().await? {
    let path = entry.path();
    if !entry.file_type().await?.is_file() || !is_artifact(&path) {
      continue;
    }

    let dest = to.join(entry.file_name());
    move_file(&path, &dest).await?;
    debug!(from = %path.display(), to = %dest.display(), "moved artifact");
    moved.push(dest);
  }

  moved.sort();
  Ok(moved)
}

/// Rename, or copy and remove when the rename crosses filesystems.
async fn move_file(from: &Path, to: &Path) -> io::Result<()> {
  match fs::rename(from, to).await {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::CrossesDevices => copy_then_remove(from, to).await,
    Err(e) => Err(e),
  }
}

async fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
  fs::copy(from, to).await?;
  fs::remove_file(from).await
}
