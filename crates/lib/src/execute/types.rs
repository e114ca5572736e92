//! Types for package execution.
//!
//! This module defines the per-package error enumeration, the run-level
//! errors and the summary produced by a run.

use std::error::Error as _;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::execute::cmd::CmdError;
use crate::manifest::ManifestError;
use crate::source::DescriptorError;

/// The phase a package failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  Descriptor,
  Remove,
  Clone,
  Reset,
  MissingDir,
  Generate,
  Build,
  Move,
  NoArtifacts,
}

impl ErrorKind {
  /// Human-readable label for log lines.
  pub fn label(self) -> &'static str {
    match self {
      ErrorKind::Descriptor => "invalid pinned source",
      ErrorKind::Remove => "failed to remove package directory",
      ErrorKind::Clone => "failed to clone pinned source",
      ErrorKind::Reset => "failed to reset to pinned revision",
      ErrorKind::MissingDir => "missing working directory",
      ErrorKind::Generate => "failed to generate grammar",
      ErrorKind::Build => "failed to build grammar",
      ErrorKind::Move => "failed to move artifacts",
      ErrorKind::NoArtifacts => "no artifacts produced",
    }
  }
}

impl std::fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.label())
  }
}

/// A failure while processing one package.
///
/// Aborts the remaining steps of that package only.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("{package}: invalid pinned source '{value}'")]
  Descriptor {
    package: String,
    value: String,
    #[source]
    source: DescriptorError,
  },

  #[error("{package}: failed to remove '{}'", path.display())]
  Remove {
    package: String,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{package}: failed to clone {url}")]
  Clone {
    package: String,
    url: String,
    #[source]
    source: CmdError,
  },

  #[error("{package}: failed to reset to {rev}")]
  Reset {
    package: String,
    rev: String,
    #[source]
    source: CmdError,
  },

  #[error("{package}: working directory '{}' does not exist", path.display())]
  MissingDir { package: String, path: PathBuf },

  #[error("{package}: generate failed in '{}'", dir.display())]
  Generate {
    package: String,
    dir: PathBuf,
    #[source]
    source: CmdError,
  },

  #[error("{package}: build failed in '{}'", dir.display())]
  Build {
    package: String,
    dir: PathBuf,
    #[source]
    source: CmdError,
  },

  #[error("{package}: failed to move artifacts from '{}'", dir.display())]
  Move {
    package: String,
    dir: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{package}: build in '{}' produced no artifacts", dir.display())]
  NoArtifacts { package: String, dir: PathBuf },
}

impl BuildError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      BuildError::Descriptor { .. } => ErrorKind::Descriptor,
      BuildError::Remove { .. } => ErrorKind::Remove,
      BuildError::Clone { .. } => ErrorKind::Clone,
      BuildError::Reset { .. } => ErrorKind::Reset,
      BuildError::MissingDir { .. } => ErrorKind::MissingDir,
      BuildError::Generate { .. } => ErrorKind::Generate,
      BuildError::Build { .. } => ErrorKind::Build,
      BuildError::Move { .. } => ErrorKind::Move,
      BuildError::NoArtifacts { .. } => ErrorKind::NoArtifacts,
    }
  }

  /// The package this error is tagged with.
  pub fn package(&self) -> &str {
    match self {
      BuildError::Descriptor { package, .. }
      | BuildError::Remove { package, .. }
      | BuildError::Clone { package, .. }
      | BuildError::Reset { package, .. }
      | BuildError::MissingDir { package, .. }
      | BuildError::Generate { package, .. }
      | BuildError::Build { package, .. }
      | BuildError::Move { package, .. }
      | BuildError::NoArtifacts { package, .. } => package,
    }
  }

  /// This error followed by its chain of causes.
  pub fn report(&self) -> String {
    let mut report = self.to_string();
    let mut cause = self.source();
    while let Some(err) = cause {
      report.push_str(": ");
      report.push_str(&err.to_string());
      cause = err.source();
    }
    report
  }
}

/// Errors that stop a run before any package is processed.
#[derive(Debug, Error)]
pub enum RunError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error("failed to prepare output directory '{}'", path.display())]
  OutDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("refusing to use '{}' as output directory: it would delete '{}'", path.display(), protected.display())]
  UnsafeOutDir { path: PathBuf, protected: PathBuf },
}

/// Why a package failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageFailure {
  /// `None` for failures outside the known phases (a panicking task).
  pub kind: Option<ErrorKind>,
  pub message: String,
}

impl From<&BuildError> for PackageFailure {
  fn from(err: &BuildError) -> Self {
    Self {
      kind: Some(err.kind()),
      message: err.report(),
    }
  }
}

/// Outcome of processing one package.
#[derive(Debug, Clone, Serialize)]
pub struct PackageOutcome {
  pub name: String,
  /// Artifact file names written to the output directory.
  pub artifacts: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub failure: Option<PackageFailure>,
  pub duration_ms: u64,
}

impl PackageOutcome {
  pub fn is_success(&self) -> bool {
    self.failure.is_none()
  }
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
  pub out_dir: PathBuf,
  /// Outcomes sorted by package name.
  pub packages: Vec<PackageOutcome>,
  /// True if any package failed. The output directory is empty in that case.
  pub failed: bool,
}

impl RunSummary {
  pub fn succeeded(&self) -> usize {
    self.packages.iter().filter(|p| p.is_success()).count()
  }

  pub fn failures(&self) -> impl Iterator<Item = &PackageOutcome> {
    self.packages.iter().filter(|p| !p.is_success())
  }

  pub fn artifact_count(&self) -> usize {
    self.packages.iter().map(|p| p.artifacts.len()).sum()
  }
}
