//! grammar-wasm-lib: build orchestration for tree-sitter grammar packages.
//!
//! For every grammar package declared in a project's `package.json`, this
//! crate optionally replaces the installed copy with a pinned upstream
//! revision, compiles the grammar to a WebAssembly parser module with the
//! `tree-sitter` CLI, and collects the modules in one output directory:
//! - `manifest`: reading `package.json` and selecting grammar packages
//! - `recipe`: which steps each package needs
//! - `execute`: running all packages with bounded parallelism

pub mod build;
pub mod config;
pub mod consts;
pub mod context;
pub mod execute;
pub mod fetch;
pub mod locate;
pub mod manifest;
pub mod recipe;
pub mod source;
pub mod util;

pub use config::RunConfig;
pub use execute::{RunError, RunSummary, run};
