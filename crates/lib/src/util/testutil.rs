//! Test fixtures for grammar-wasm-lib.
//!
//! Builds a throwaway project with a `package.json`, a `node_modules` tree and
//! fake `tree-sitter` and `git` executables. The fakes log their invocations
//! so tests can assert on what was run and where.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

use crate::config::RunConfig;
use crate::consts::CLI_EXECUTABLE;
use crate::context::Context;
use crate::manifest::Manifest;

/// Fake grammar compiler.
///
/// `build --wasm` writes `tree-sitter-<dir>.wasm` into the working directory
/// (or `<dir>.wasm` when the directory already carries the prefix). A
/// `.fail-build` or `.fail-generate` file in the working directory makes the
/// matching phase exit non-zero; `.no-output` makes `build` succeed without
/// writing anything.
const FAKE_CLI: &str = r#"#!/bin/sh
dir=$(pwd -P)
echo "$dir $*" >> "__LOG__"
case "$1" in
  generate)
    if [ -e .fail-generate ]; then echo "generate exploded" >&2; exit 1; fi
    touch generated
    ;;
  build)
    if [ -e .fail-build ]; then echo "build exploded" >&2; exit 1; fi
    if [ -e .no-output ]; then exit 0; fi
    name=$(basename "$dir")
    case "$name" in
      tree-sitter-*) out="$name.wasm" ;;
      *) out="tree-sitter-$name.wasm" ;;
    esac
    printf 'wasm' > "$out"
    ;;
esac
"#;

/// Fake version-control client. A `git.fail` file naming a subcommand makes
/// that subcommand fail. `clone` records its working directory in the
/// `cloned` marker.
const FAKE_GIT: &str = r#"#!/bin/sh
echo "$*" >> "__LOG__"
if [ -e "__FAIL__" ] && [ "$(cat "__FAIL__")" = "$1" ]; then
  echo "fatal: $1 refused" >&2
  exit 128
fi
case "$1" in
  clone)
    mkdir -p "$3"
    pwd -P > "$3/cloned"
    ;;
esac
"#;

pub struct TestProject {
  _temp: TempDir,
  root: PathBuf,
}

impl TestProject {
  /// Create a project whose manifest declares `packages` plus the compiler.
  pub fn new(packages: &[(&str, &str)]) -> Self {
    let temp = TempDir::new().unwrap();
    let root = dunce::canonicalize(temp.path()).unwrap();

    let mut deps = serde_json::Map::new();
    deps.insert("tree-sitter-cli".to_string(), json!("0.25.3"));
    for (name, value) in packages {
      deps.insert(name.to_string(), json!(value));
    }
    let manifest = json!({ "name": "grammars", "devDependencies": deps });
    fs::write(root.join("package.json"), serde_json::to_string_pretty(&manifest).unwrap()).unwrap();

    let project = Self { _temp: temp, root };
    project.install_cli();
    project.install_git();
    project
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn modules_dir(&self) -> PathBuf {
    self.root.join("node_modules")
  }

  pub fn out_dir(&self) -> PathBuf {
    self.root.join("out")
  }

  /// Install a package with the given files at its root.
  pub fn install(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = self.modules_dir().join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("package.json"), "{}").unwrap();
    fs::write(dir.join("index.js"), "").unwrap();
    for (path, content) in files {
      let file = dir.join(path);
      fs::create_dir_all(file.parent().unwrap()).unwrap();
      fs::write(file, content).unwrap();
    }
    dir
  }

  /// Make the named `git` subcommand fail.
  pub fn fail_git(&self, subcommand: &str) {
    fs::write(self.root.join("git.fail"), subcommand).unwrap();
  }

  pub fn config(&self) -> RunConfig {
    let mut config = RunConfig::new(&self.root);
    config.git = self.root.join("bin").join("git");
    config
  }

  pub fn context(&self) -> Context {
    let config = self.config();
    let manifest = Manifest::load(&config.manifest_path).unwrap();
    Context::new(&config, manifest)
  }

  fn install_cli(&self) {
    let dir = self.modules_dir().join("tree-sitter-cli");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("package.json"), r#"{"main": "cli.js"}"#).unwrap();
    fs::write(dir.join("cli.js"), "").unwrap();
    let log = self.root.join("tree-sitter.log");
    write_script(&dir.join(CLI_EXECUTABLE), &FAKE_CLI.replace("__LOG__", &log.to_string_lossy()));
  }

  fn install_git(&self) {
    let bin = self.root.join("bin");
    fs::create_dir_all(&bin).unwrap();
    let script = FAKE_GIT
      .replace("__LOG__", &self.root.join("git.log").to_string_lossy())
      .replace("__FAIL__", &self.root.join("git.fail").to_string_lossy());
    write_script(&bin.join("git"), &script);
  }
}

fn write_script(path: &Path, content: &str) {
  fs::write(path, content).unwrap();
  fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn read_lines(path: &Path) -> Vec<String> {
  fs::read_to_string(path)
    .map(|s| s.lines().map(str::to_string).collect())
    .unwrap_or_default()
}

/// Invocations of the fake `git`, one line per call.
pub fn git_log(project: &TestProject) -> Vec<String> {
  read_lines(&project.root.join("git.log"))
}

/// Invocations of the fake compiler as `<cwd> <args>`.
pub fn cli_log(project: &TestProject) -> Vec<String> {
  read_lines(&project.root.join("tree-sitter.log"))
}

/// Sorted file names in a directory.
pub fn file_names(dir: &Path) -> Vec<String> {
  let mut names: Vec<String> = fs::read_dir(dir)
    .map(|entries| {
      entries
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
    })
    .unwrap_or_default();
  names.sort();
  names
}
