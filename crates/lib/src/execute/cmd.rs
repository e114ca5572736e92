//! External process invocation.
//!
//! Every command runs with an explicit working directory. Nothing here (or
//! anywhere else in the crate) changes the process-wide current directory,
//! so concurrent packages cannot disturb each other's relative paths.

use std::ffi::OsStr;
use std::io;
use std::path::Path;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Number of trailing stderr lines kept in a failure.
const STDERR_TAIL_LINES: usize = 20;

/// Errors from running an external command.
#[derive(Debug, Error)]
pub enum CmdError {
  /// The process could not be started at all.
  #[error("failed to spawn '{program}'")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// The process ran and exited unsuccessfully.
  #[error("'{command}' failed with exit code {code:?}{}", format_stderr(stderr))]
  Failed {
    command: String,
    code: Option<i32>,
    stderr: String,
  },
}

fn format_stderr(stderr: &str) -> String {
  if stderr.is_empty() {
    String::new()
  } else {
    format!(":\n{}", stderr)
  }
}

/// Run `program` with `args` inside `cwd`.
///
/// Returns the trimmed stdout on success. On a non-zero exit the error carries
/// the exit code and the tail of stderr.
pub async fn run_cmd<S: AsRef<OsStr>>(program: impl AsRef<OsStr>, args: &[S], cwd: &Path) -> Result<String, CmdError> {
  let program = program.as_ref();
  let command_line = render_command(program, args);

  info!(cmd = %command_line, cwd = %cwd.display(), "executing command");

  let output = Command::new(program)
    .args(args)
    .current_dir(cwd)
    .kill_on_drop(true)
    .output()
    .await
    .map_err(|source| CmdError::Spawn {
      program: program.to_string_lossy().into_owned(),
      source,
    })?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  let stderr = String::from_utf8_lossy(&output.stderr);

  if !output.status.success() {
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }

    return Err(CmdError::Failed {
      command: command_line,
      code: output.status.code(),
      stderr: tail(&stderr, STDERR_TAIL_LINES),
    });
  }

  let stdout = stdout.trim().to_string();
  if !stdout.is_empty() {
    debug!(stdout = %stdout, "command output");
  }

  Ok(stdout)
}

fn render_command<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> String {
  let mut rendered = program.to_string_lossy().into_owned();
  for arg in args {
    rendered.push(' ');
    rendered.push_str(&arg.as_ref().to_string_lossy());
  }
  rendered
}

fn tail(text: &str, lines: usize) -> String {
  let all: Vec<&str> = text.trim_end().lines().collect();
  all[all.len().saturating_sub(lines)..].join("\n")
}
