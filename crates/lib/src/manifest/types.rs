use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{CLI_PACKAGE, EXTRA_GRAMMARS, GRAMMAR_PREFIX};

/// Errors that can occur when loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest '{}'", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse manifest '{}'", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// The subset of `package.json` this tool reads.
///
/// ```json
/// {
///   "devDependencies": {
///     "tree-sitter-cli": "0.25.3",
///     "tree-sitter-json": "0.24.8",
///     "tree-sitter-vue": "github:ikatyang/tree-sitter-vue#91fe27547abc"
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,

  #[serde(default)]
  pub dependencies: BTreeMap<String, String>,

  #[serde(default)]
  pub dev_dependencies: BTreeMap<String, String>,
}

impl Manifest {
  /// Load a manifest from the given path.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// All declared packages. Dev entries shadow regular ones with the same name.
  pub fn packages(&self) -> BTreeMap<&str, &str> {
    self
      .dependencies
      .iter()
      .chain(self.dev_dependencies.iter())
      .map(|(name, value)| (name.as_str(), value.as_str()))
      .collect()
  }

  /// The declared version or source descriptor of a package.
  pub fn source(&self, name: &str) -> Option<&str> {
    self
      .dev_dependencies
      .get(name)
      .or_else(|| self.dependencies.get(name))
      .map(String::as_str)
  }

  /// Grammar packages to process, sorted by name.
  ///
  /// A package is a grammar when its name carries the grammar prefix (the
  /// compiler package excluded) or is one of the known extra names. With a
  /// filter, only names containing it as a substring are kept.
  pub fn grammar_packages(&self, filter: Option<&str>) -> Vec<String> {
    self
      .packages()
      .into_keys()
      .filter(|name| is_grammar_package(name))
      .filter(|name| filter.is_none_or(|f| name.contains(f)))
      .map(str::to_string)
      .collect()
  }
}

/// Whether a manifest entry names a grammar package.
pub fn is_grammar_package(name: &str) -> bool {
  if EXTRA_GRAMMARS.contains(&name) {
    return true;
  }
  name.starts_with(GRAMMAR_PREFIX) && name != CLI_PACKAGE
}
