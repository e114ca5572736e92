mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cmd::{ConfigArgs, cmd_build, cmd_list};
use output::{OutputFormat, print_error};

/// grammar-wasm - build tree-sitter grammar packages into WebAssembly parsers
#[derive(Parser)]
#[command(name = "grammar-wasm")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Only process packages whose name contains this
  filter: Option<String>,

  /// Project directory containing package.json
  #[arg(short = 'C', long, default_value = ".")]
  project: PathBuf,

  /// Output directory, relative to the project (default: out)
  #[arg(short, long)]
  out_dir: Option<PathBuf>,

  /// Maximum number of packages processed at once (default: CPU count)
  #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
  jobs: Option<u64>,

  /// git executable used for pinned revisions
  #[arg(long)]
  git: Option<PathBuf>,

  /// List selected packages and their recipes without building
  #[arg(long)]
  list: bool,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  format: OutputFormat,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "info" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let args = ConfigArgs {
    project: cli.project,
    filter: cli.filter,
    out_dir: cli.out_dir,
    jobs: cli.jobs.map(|j| usize::try_from(j).unwrap_or(usize::MAX)),
    git: cli.git,
  };

  if cli.list {
    return cmd_list(&args, cli.format);
  }

  match cmd_build(&args, cli.format) {
    Ok(true) => Ok(()),
    Ok(false) => std::process::exit(1),
    Err(e) => {
      print_error(&format!("{:#}", e));
      std::process::exit(1);
    }
  }
}
