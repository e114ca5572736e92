//! Package execution.
//!
//! This module provides the entry point for a run. It handles:
//! - Preparing a fresh output directory
//! - Selecting grammar packages from the manifest
//! - Running each package's recipe with bounded parallelism
//! - Isolating failures so one package never stops another
//! - Emptying the output directory again if anything failed

pub mod cmd;
pub mod types;

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::RunConfig;
use crate::context::Context;
use crate::manifest::Manifest;
use crate::recipe::execute_recipe;

pub use cmd::{CmdError, run_cmd};
pub use types::{BuildError, ErrorKind, PackageFailure, PackageOutcome, RunError, RunSummary};

/// Build every selected grammar package.
///
/// The output directory is recreated empty before any package starts. If any
/// package fails it is recreated empty again at the end, so a partial
/// artifact set is never left behind.
pub async fn run(config: &RunConfig) -> Result<RunSummary, RunError> {
  let manifest = Manifest::load(&config.manifest_path)?;
  let packages = manifest.grammar_packages(config.filter.as_deref());

  info!(
    packages = packages.len(),
    parallelism = config.parallelism,
    out_dir = %config.out_dir.display(),
    "starting run"
  );

  check_out_dir(config).await?;
  reset_dir(&config.out_dir).await?;

  let ctx = Arc::new(Context::new(config, manifest));
  let outcomes = run_packages(packages, config.parallelism, move |name| {
    let ctx = ctx.clone();
    async move { execute_recipe(&ctx, &name).await }
  })
  .await;

  let failed = outcomes.iter().any(|o| !o.is_success());
  if failed {
    warn!(out_dir = %config.out_dir.display(), "run failed, discarding artifacts");
    reset_dir(&config.out_dir).await?;
  }

  let summary = RunSummary {
    out_dir: config.out_dir.clone(),
    packages: outcomes,
    failed,
  };

  info!(
    succeeded = summary.succeeded(),
    failed = summary.packages.len() - summary.succeeded(),
    artifacts = summary.artifact_count(),
    "run complete"
  );

  Ok(summary)
}

/// Run `job` once for every package, at most `parallelism` at a time.
///
/// Each job's failure is logged and recorded in its outcome; it never stops
/// the others. A panicking job is recorded as a failure without a kind.
/// Outcomes are returned sorted by package name.
pub async fn run_packages<F, Fut>(packages: Vec<String>, parallelism: usize, job: F) -> Vec<PackageOutcome>
where
  F: Fn(String) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Vec<PathBuf>, BuildError>> + Send + 'static,
{
  let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));
  let job = Arc::new(job);
  let mut join_set = JoinSet::new();
  let mut names = HashMap::new();

  for name in packages {
    let semaphore = semaphore.clone();
    let job = job.clone();
    let task_name = name.clone();

    let span = info_span!("package", name = %name);
    let task = async move {
      // The semaphore is never closed.
      let _permit = semaphore.acquire_owned().await.ok();

      info!("processing package");
      let start = Instant::now();
      let result = job(task_name.clone()).await;
      outcome(task_name, result, start)
    };

    let handle = join_set.spawn(task.instrument(span));
    names.insert(handle.id(), name);
  }

  let mut outcomes = Vec::with_capacity(names.len());

  while let Some(joined) = join_set.join_next_with_id().await {
    match joined {
      Ok((_, outcome)) => outcomes.push(outcome),
      Err(e) => {
        let name = names.remove(&e.id()).unwrap_or_default();
        error!(package = %name, error = %e, "package task panicked");
        outcomes.push(PackageOutcome {
          name,
          artifacts: Vec::new(),
          failure: Some(PackageFailure {
            kind: None,
            message: e.to_string(),
          }),
          duration_ms: 0,
        });
      }
    }
  }

  outcomes.sort_by(|a, b| a.name.cmp(&b.name));
  outcomes
}

fn outcome(name: String, result: Result<Vec<PathBuf>, BuildError>, start: Instant) -> PackageOutcome {
  let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

  match result {
    Ok(artifacts) => {
      info!(artifacts = artifacts.len(), duration_ms, "package succeeded");
      PackageOutcome {
        name,
        artifacts: artifacts
          .iter()
          .filter_map(|p| p.file_name())
          .map(|f| f.to_string_lossy().into_owned())
          .collect(),
        failure: None,
        duration_ms,
      }
    }
    Err(e) => {
      error!(kind = e.kind().label(), error = %e.report(), "package failed");
      PackageOutcome {
        name,
        artifacts: Vec::new(),
        failure: Some(PackageFailure::from(&e)),
        duration_ms,
      }
    }
  }
}

/// Reject an output directory whose reset would delete the project or its
/// installed modules.
async fn check_out_dir(config: &RunConfig) -> Result<(), RunError> {
  let out_dir = normalize(&config.out_dir).await;

  for protected in [&config.project_dir, &config.modules_dir] {
    if normalize(protected).await.starts_with(&out_dir) {
      return Err(RunError::UnsafeOutDir {
        path: config.out_dir.clone(),
        protected: protected.clone(),
      });
    }
  }

  Ok(())
}

/// Resolve `.` and `..` lexically, then canonicalize the deepest existing
/// ancestor so symlinked prefixes compare equal.
async fn normalize(path: &Path) -> PathBuf {
  let mut lexical = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        lexical.pop();
      }
      other => lexical.push(other),
    }
  }

  for ancestor in lexical.ancestors() {
    if ancestor.as_os_str().is_empty() {
      break;
    }
    if let Ok(canonical) = tokio::fs::canonicalize(ancestor).await {
      let rest = lexical.strip_prefix(ancestor).unwrap_or(Path::new(""));
      return dunce::simplified(&canonical).join(rest);
    }
  }

  lexical
}

/// Delete `dir` if present and create it empty.
async fn reset_dir(dir: &Path) -> Result<(), RunError> {
  let to_run_error = |source| RunError::OutDir {
    path: dir.to_path_buf(),
    source,
  };

  match tokio::fs::remove_dir_all(dir).await {
    Ok(()) => {}
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => return Err(to_run_error(e)),
  }

  tokio::fs::create_dir_all(dir).await.map_err(to_run_error)
}


#[cfg(all(test, unix))]
mod run_tests {
  use super::*;
  use crate::util::testutil::{TestProject, file_names};
  use tracing_test::traced_test;

  #[tokio::test]
  async fn builds_every_grammar_into_out_dir() {
    let project = TestProject::new(&[("tree-sitter-json", "1.0.0"), ("tree-sitter-typescript", "1.0.0")]);
    project.install("tree-sitter-json", &[]);
    project.install("tree-sitter-typescript", &[("typescript/grammar.js", ""), ("tsx/grammar.js", "")]);
    std::fs::create_dir_all(project.out_dir()).unwrap();
    std::fs::write(project.out_dir().join("leftover.wasm"), "").unwrap();

    let summary = run(&project.config()).await.unwrap();

    assert!(!summary.failed);
    assert_eq!(
      file_names(&project.out_dir()),
      vec!["tree-sitter-json.wasm", "tree-sitter-tsx.wasm", "tree-sitter-typescript.wasm"]
    );
    assert_eq!(summary.artifact_count(), 3);
    assert_eq!(summary.packages[1].artifacts, vec!["tree-sitter-typescript.wasm", "tree-sitter-tsx.wasm"]);
  }

  #[tokio::test]
  #[traced_test]
  async fn any_failure_empties_out_dir() {
    let project = TestProject::new(&[("tree-sitter-json", "1.0.0"), ("tree-sitter-xml", "0.7.0")]);
    project.install("tree-sitter-json", &[]);
    project.install("tree-sitter-xml", &[("xml/grammar.js", "")]);

    let summary = run(&project.config()).await.unwrap();

    assert!(summary.failed);
    assert_eq!(summary.succeeded(), 1);
    assert!(project.out_dir().is_dir());
    assert!(file_names(&project.out_dir()).is_empty());
    assert!(logs_contain("missing working directory"));
  }

  #[tokio::test]
  async fn project_dir_as_out_dir_deletes_nothing() {
    let project = TestProject::new(&[("tree-sitter-json", "1.0.0")]);
    project.install("tree-sitter-json", &[]);

    let result = run(&project.config().with_out_dir(Path::new("."))).await;

    assert!(matches!(result, Err(RunError::UnsafeOutDir { .. })));
    assert!(project.root().join("package.json").is_file());
    assert!(project.modules_dir().join("tree-sitter-json").is_dir());
  }

  #[tokio::test]
  async fn grammar_without_artifacts_fails_the_run() {
    let project = TestProject::new(&[("tree-sitter-json", "1.0.0"), ("tree-sitter-c", "0.23.0")]);
    project.install("tree-sitter-json", &[]);
    project.install("tree-sitter-c", &[(".no-output", "")]);

    let summary = run(&project.config()).await.unwrap();

    assert!(summary.failed);
    let c = &summary.packages[0];
    assert_eq!(c.name, "tree-sitter-c");
    assert_eq!(c.failure.as_ref().unwrap().kind, Some(ErrorKind::NoArtifacts));
    assert!(file_names(&project.out_dir()).is_empty());
  }

  #[tokio::test]
  async fn filter_restricts_packages() {
    let project = TestProject::new(&[("tree-sitter-json", "1.0.0"), ("tree-sitter-c", "0.23.0")]);
    project.install("tree-sitter-json", &[]);

    let config = project.config().with_filter(Some("json".to_string()));
    let summary = run(&config).await.unwrap();

    assert!(!summary.failed);
    assert_eq!(summary.packages.len(), 1);
    assert_eq!(file_names(&project.out_dir()), vec!["tree-sitter-json.wasm"]);
  }

  #[tokio::test]
  async fn pinned_package_is_fetched_then_built() {
    let project = TestProject::new(&[("tree-sitter-vue", "github:ikatyang/tree-sitter-vue#91fe275")]);
    project.install("tree-sitter-vue", &[]);

    let summary = run(&project.config()).await.unwrap();

    assert!(!summary.failed, "{:?}", summary.packages);
    assert_eq!(file_names(&project.out_dir()), vec!["tree-sitter-vue.wasm"]);
    assert!(project.modules_dir().join("tree-sitter-vue/generated").exists());
  }
}
