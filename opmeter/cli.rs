use std::{
  fmt,
  path::PathBuf,
};

use anyhow::{
  Context,
  Result,
  ensure,
};
use clap::{
  ArgAction,
  Parser,
  ValueEnum,
};

#[derive(Clone, Debug)]
pub struct CliOptions {
  pub file:        PathBuf,
  /// 1-based inclusive line range to total instead of annotating.
  pub select:      Option<(usize, usize)>,
  pub format:      OutputFormat,
  pub verbosity:   u8,
  pub log_file:    Option<PathBuf>,
  pub config_file: Option<PathBuf>,
}

impl CliOptions {
  pub fn parse() -> Result<Self> {
    let raw = RawCli::parse();
    raw.try_into()
  }
}

#[derive(Parser, Debug)]
#[command(
  name = "opmeter",
  about = "Annotate assembly listings with per-line size and cycle counts",
  version
)]
struct RawCli {
  /// Source file to annotate
  #[arg(value_name = "FILE")]
  file: PathBuf,

  /// Only print totals for the given 1-based line range, e.g. 3:10
  #[arg(short = 's', long = "select", value_name = "START:END")]
  select: Option<String>,

  /// Listing output format
  #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Plain)]
  format: OutputFormat,

  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count)]
  verbosity: u8,

  /// Save logs to a specific file
  #[arg(long = "log", value_name = "FILE")]
  log_file: Option<PathBuf>,

  /// Load configuration from a specific file
  #[arg(short = 'c', long = "config", value_name = "FILE")]
  config_file: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  Plain,
  Color,
  Json,
}

impl fmt::Display for OutputFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Plain => write!(f, "plain"),
      Self::Color => write!(f, "color"),
      Self::Json => write!(f, "json"),
    }
  }
}

impl TryFrom<RawCli> for CliOptions {
  type Error = anyhow::Error;

  fn try_from(raw: RawCli) -> Result<Self> {
    let select = raw.select.as_deref().map(parse_select).transpose()?;
    Ok(Self {
      file: raw.file,
      select,
      format: raw.format,
      verbosity: raw.verbosity,
      log_file: raw.log_file,
      config_file: raw.config_file,
    })
  }
}

fn parse_select(raw: &str) -> Result<(usize, usize)> {
  let (start, end) = raw
    .split_once(':')
    .with_context(|| format!("expected START:END, got {raw:?}"))?;
  let start: usize = start.trim().parse().context("invalid start line")?;
  let end: usize = end.trim().parse().context("invalid end line")?;
  ensure!(start >= 1 && end >= 1, "line numbers are 1-based");
  Ok((start.min(end), start.max(end)))
}
