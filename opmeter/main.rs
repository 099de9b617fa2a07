use std::{
  fs,
  io::Write,
  path::Path,
};

use anyhow::{
  Context,
  Result,
  ensure,
};
use opmeter_lib::{
  analyzer::{
    analyze_lines,
    count_lines,
  },
  registry::AnnotatorRegistry,
  scratch::ScratchHost,
  totals::Totals,
};

use crate::cli::OutputFormat;

mod cli;
mod config;
mod demo;
mod listing;

fn main() -> Result<()> {
  let options = cli::CliOptions::parse()?;
  setup_logging(options.verbosity, options.log_file.as_deref())?;
  let config = config::Config::load(options.config_file.as_deref())?;

  let source = fs::read_to_string(&options.file)
    .with_context(|| format!("failed to read {}", options.file.display()))?;
  let analyzer = demo::DemoAnalyzer;

  if let Some((start, end)) = options.select {
    // One-shot range count, no session involved.
    let line_count = count_lines(&source);
    ensure!(
      end <= line_count,
      "selection {start}:{end} is out of range, the file has {line_count} lines"
    );
    let selected: Vec<&str> = source
      .split('\n')
      .skip(start - 1)
      .take(end - start + 1)
      .collect();
    let facts = analyze_lines(&analyzer, &selected.join("\n"));
    let totals = Totals::aggregate(&facts);
    println!("{}", totals.status(&analyzer));
    return Ok(());
  }

  let mut host = ScratchHost::new(&source);
  let mut registry = AnnotatorRegistry::new(analyzer);
  registry.toggle(host.buffer(), &source, &mut host);

  let session = registry
    .session(host.buffer())
    .context("annotation session missing after toggle")?;

  let stdout = std::io::stdout();
  let mut out = stdout.lock();
  match options.format {
    OutputFormat::Json => {
      listing::write_json(&mut out, &host, session.facts(), session.totals())?;
    },
    OutputFormat::Plain => {
      listing::write_text(&mut out, &host, &config, false).context("failed to write listing")?;
    },
    OutputFormat::Color => {
      listing::write_text(&mut out, &host, &config, true).context("failed to write listing")?;
    },
  }
  out.flush()?;
  Ok(())
}

fn setup_logging(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
  let level = match verbosity {
    0 => log::LevelFilter::Warn,
    1 => log::LevelFilter::Info,
    2 => log::LevelFilter::Debug,
    _ => log::LevelFilter::Trace,
  };

  let dispatch = fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{} {:<5} [{}] {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.level(),
        record.target(),
        message
      ))
    })
    .level(level);

  let dispatch = match log_file {
    Some(path) => dispatch.chain(
      fern::log_file(path).with_context(|| format!("failed to open log {}", path.display()))?,
    ),
    None => dispatch.chain(std::io::stderr()),
  };

  dispatch.apply().context("failed to install logger")?;
  Ok(())
}
