//! Names and paths shared across the crate.

/// Prefix selecting grammar packages from the manifest.
pub const GRAMMAR_PREFIX: &str = "tree-sitter-";

/// Non-prefixed packages that are grammars too.
pub const EXTRA_GRAMMARS: &[&str] = &["@elm-tooling/tree-sitter-elm"];

/// Package providing the grammar compiler.
pub const CLI_PACKAGE: &str = "tree-sitter-cli";

#[cfg(not(windows))]
pub const CLI_EXECUTABLE: &str = "tree-sitter";

#[cfg(windows)]
pub const CLI_EXECUTABLE: &str = "tree-sitter.exe";

pub const MANIFEST_FILENAME: &str = "package.json";

pub const MODULES_DIRNAME: &str = "node_modules";

pub const DEFAULT_OUT_DIRNAME: &str = "out";

/// Extension of compiled parser modules.
pub const ARTIFACT_EXTENSION: &str = "wasm";

pub const DEFAULT_GIT: &str = "git";
