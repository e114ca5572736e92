//! Shared utilities.

#[cfg(all(test, unix))]
pub mod testutil;
