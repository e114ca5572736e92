//! Package manifest types.
//!
//! The manifest is the project's `package.json`: it declares which grammar
//! packages exist and which version or pinned source each one resolves to.

mod types;

pub use types::*;
