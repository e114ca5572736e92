//! Per-package build recipes.
//!
//! Grammar packages are laid out differently upstream: most hold a single
//! grammar at their root, some bundle several grammars in sub-directories,
//! some ship a grammar that has to be regenerated before it builds, and a few
//! are only buildable from a pinned upstream commit. The table below records
//! which is which; every package not listed gets the default recipe.

use std::fmt;
use std::path::PathBuf;

use crate::build::build_grammar;
use crate::context::Context;
use crate::execute::types::BuildError;
use crate::fetch::fetch_pinned;

/// One build of one grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildStep {
  /// Directory inside the package holding the grammar.
  pub sub_path: Option<&'static str>,
  /// Regenerate the parser sources before building.
  pub generate: bool,
}

/// A step of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  /// Replace the installed package with its pinned upstream revision.
  FetchPinned,
  Build(BuildStep),
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Step::FetchPinned => write!(f, "fetch pinned revision"),
      Step::Build(build) => {
        write!(f, "build {}", build.sub_path.unwrap_or("."))?;
        if build.generate {
          write!(f, " (generate)")?;
        }
        Ok(())
      }
    }
  }
}

const fn build() -> Step {
  Step::Build(BuildStep {
    sub_path: None,
    generate: false,
  })
}

const fn build_at(sub_path: &'static str) -> Step {
  Step::Build(BuildStep {
    sub_path: Some(sub_path),
    generate: false,
  })
}

const fn generate_and_build() -> Step {
  Step::Build(BuildStep {
    sub_path: None,
    generate: true,
  })
}

const DEFAULT_RECIPE: &[Step] = &[build()];

static RECIPES: &[(&str, &[Step])] = &[
  ("tree-sitter-typescript", &[build_at("typescript"), build_at("tsx")]),
  ("tree-sitter-php", &[build_at("php")]),
  ("tree-sitter-xml", &[build_at("xml"), build_at("dtd")]),
  ("tree-sitter-ocaml", &[build_at("grammars/ocaml"), build_at("grammars/interface")]),
  (
    "tree-sitter-markdown",
    &[build_at("tree-sitter-markdown"), build_at("tree-sitter-markdown-inline")],
  ),
  ("@elm-tooling/tree-sitter-elm", &[generate_and_build()]),
  ("tree-sitter-swift", &[generate_and_build()]),
  ("tree-sitter-vue", &[Step::FetchPinned, generate_and_build()]),
  ("tree-sitter-ql", &[Step::FetchPinned, generate_and_build()]),
  ("tree-sitter-embedded-template", &[Step::FetchPinned, generate_and_build()]),
];

/// The recipe for `package`. Packages without an entry get a single build
/// at the package root.
pub fn recipe_for(package: &str) -> &'static [Step] {
  RECIPES
    .iter()
    .find(|(name, _)| *name == package)
    .map(|(_, steps)| *steps)
    .unwrap_or(DEFAULT_RECIPE)
}

/// Packages with a non-default recipe.
pub fn overridden_packages() -> impl Iterator<Item = &'static str> {
  RECIPES.iter().map(|(name, _)| *name)
}

/// Run the recipe for `package`, stopping at the first failing step.
///
/// Returns every artifact moved into the output directory.
pub async fn execute_recipe(ctx: &Context, package: &str) -> Result<Vec<PathBuf>, BuildError> {
  let mut artifacts = Vec::new();

  for step in recipe_for(package) {
    match step {
      Step::FetchPinned => {
        fetch_pinned(ctx, package).await?;
      }
      Step::Build(build) => {
        artifacts.extend(build_grammar(ctx, package, build).await?);
      }
    }
  }

  Ok(artifacts)
}
