//! Package root resolution.
//!
//! Mirrors how the package manager's runtime finds an installed module: look
//! for `node_modules/<name>` in the project directory and each of its
//! ancestors, load the package entry point, then walk up from the entry point
//! to the nearest directory holding a `package.json`. When any of that fails
//! the expected install location is returned unchecked; a missing directory
//! only surfaces when a later step tries to use it.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::fs;
use tracing::debug;

use crate::consts::{MANIFEST_FILENAME, MODULES_DIRNAME};

#[derive(Debug, Default, Deserialize)]
struct PackageEntry {
  main: Option<String>,
}

/// Resolves package names to their root directories.
#[derive(Debug, Clone)]
pub struct Locator {
  project_dir: PathBuf,
  modules_dir: PathBuf,
}

impl Locator {
  /// Create a locator searching from `project_dir`, falling back to paths
  /// under `modules_dir`.
  pub fn new(project_dir: impl Into<PathBuf>, modules_dir: impl Into<PathBuf>) -> Self {
    Self {
      project_dir: project_dir.into(),
      modules_dir: modules_dir.into(),
    }
  }

  /// Root directory of the named package.
  pub async fn locate(&self, name: &str) -> PathBuf {
    match self.resolve(name).await {
      Some(root) => {
        debug!(package = name, root = %root.display(), "resolved package");
        root
      }
      None => {
        let fallback = self.fallback(name);
        debug!(package = name, path = %fallback.display(), "package not resolvable, using fallback path");
        fallback
      }
    }
  }

  /// The install location used when resolution fails.
  pub fn fallback(&self, name: &str) -> PathBuf {
    self.modules_dir.join(name)
  }

  async fn resolve(&self, name: &str) -> Option<PathBuf> {
    let mut package_dir = None;
    for dir in self.project_dir.ancestors() {
      let candidate = dir.join(MODULES_DIRNAME).join(name);
      if is_file(&candidate.join(MANIFEST_FILENAME)).await {
        package_dir = Some(candidate);
        break;
      }
    }

    let entry = entry_point(&package_dir?).await?;
    find_root(&entry).await
  }
}

async fn is_file(path: &Path) -> bool {
  fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

/// The file the package exposes as its main module.
async fn entry_point(package_dir: &Path) -> Option<PathBuf> {
  let content = fs::read_to_string(package_dir.join(MANIFEST_FILENAME)).await.ok()?;
  let entry: PackageEntry = serde_json::from_str(&content).ok()?;
  let main = package_dir.join(entry.main.as_deref().unwrap_or("index.js"));

  for candidate in [main.clone(), main.with_extension("js"), main.join("index.js")] {
    if is_file(&candidate).await {
      let canonical = fs::canonicalize(&candidate).await.ok()?;
      return Some(dunce::simplified(&canonical).to_path_buf());
    }
  }
  None
}

/// Nearest ancestor of `entry` that contains a `package.json`.
async fn find_root(entry: &Path) -> Option<PathBuf> {
  for dir in entry.parent()?.ancestors() {
    if is_file(&dir.join(MANIFEST_FILENAME)).await {
      return Some(dir.to_path_buf());
    }
  }
  None
}
