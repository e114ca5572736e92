//! Pinned-source descriptors.
//!
//! A package that must be built from a specific upstream commit declares its
//! manifest value as `github:<owner>/<repo>#<revision>` instead of a version.

use std::fmt;

use thiserror::Error;

const GITHUB_SCHEME: &str = "github:";

/// Errors that can occur when parsing a pinned-source descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
  #[error("expected 'github:<owner>/<repo>#<revision>', got '{0}'")]
  UnsupportedScheme(String),

  #[error("missing '#<revision>' in '{0}'")]
  MissingRevision(String),

  #[error("expected '<owner>/<repo>' in '{0}'")]
  InvalidRepository(String),
}

/// A repository URL and the revision to reset it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedSource {
  pub url: String,
  pub rev: String,
}

impl PinnedSource {
  /// Parse a `github:<owner>/<repo>#<revision>` descriptor.
  pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
    let rest = descriptor
      .strip_prefix(GITHUB_SCHEME)
      .ok_or_else(|| DescriptorError::UnsupportedScheme(descriptor.to_string()))?;

    let (repository, rev) = rest
      .split_once('#')
      .filter(|(_, rev)| !rev.is_empty())
      .ok_or_else(|| DescriptorError::MissingRevision(descriptor.to_string()))?;

    let (owner, repo) = repository
      .split_once('/')
      .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
      .ok_or_else(|| DescriptorError::InvalidRepository(descriptor.to_string()))?;

    Ok(Self {
      url: format!("https://github.com/{}/{}.git", owner, repo),
      rev: rev.to_string(),
    })
  }
}

impl fmt::Display for PinnedSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}#{}", self.url, self.rev)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_github_descriptor() {
    let source = PinnedSource::parse("github:acme/foo#deadbeef").unwrap();
    assert_eq!(source.url, "https://github.com/acme/foo.git");
    assert_eq!(source.rev, "deadbeef");
  }

  #[test]
  fn accepts_tag_revisions() {
    let source = PinnedSource::parse("github:tree-sitter/tree-sitter-ql#v0.23.1").unwrap();
    assert_eq!(source.rev, "v0.23.1");
    assert_eq!(source.to_string(), "https://github.com/tree-sitter/tree-sitter-ql.git#v0.23.1");
  }

  #[test]
  fn rejects_missing_revision() {
    assert_eq!(
      PinnedSource::parse("github:acme/foo"),
      Err(DescriptorError::MissingRevision("github:acme/foo".to_string()))
    );
    assert!(matches!(
      PinnedSource::parse("github:acme/foo#"),
      Err(DescriptorError::MissingRevision(_))
    ));
  }

  #[test]
  fn rejects_version_ranges() {
    assert!(matches!(
      PinnedSource::parse("^0.23.0"),
      Err(DescriptorError::UnsupportedScheme(_))
    ));
  }

  #[test]
  fn rejects_malformed_repository() {
    for descriptor in ["github:foo#abc", "github:/foo#abc", "github:acme/#abc", "github:a/b/c#abc"] {
      assert!(
        matches!(PinnedSource::parse(descriptor), Err(DescriptorError::InvalidRepository(_))),
        "{descriptor} should be rejected"
      );
    }
  }
}
