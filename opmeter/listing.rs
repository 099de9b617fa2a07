//! Annotated listing output.

use std::{
  collections::HashMap,
  io::{
    self,
    Write,
  },
};

use opmeter_lib::{
  facts::LineCost,
  scratch::ScratchHost,
  surface::{
    Decoration,
    TextSource,
  },
  totals::Totals,
};
use serde::Serialize;

use crate::config::{
  Color,
  Config,
};

const RESET: &str = "\x1b[0m";

/// Write the annotated source with one label column per line, followed by
/// the totals footer.
pub fn write_text(
  out: &mut impl Write,
  host: &ScratchHost,
  config: &Config,
  color: bool,
) -> io::Result<()> {
  let mut by_line: HashMap<usize, Decoration> = HashMap::new();
  for anchored in host.decorations() {
    by_line.insert(anchored.line, anchored.decoration);
  }

  for line in 0..host.line_count() {
    let source = host.line(line).unwrap_or_default();
    let decoration = by_line.get(&line);
    let label = decoration.map(|d| d.label.as_str()).unwrap_or("");

    if color {
      let paint = config.color_for(decoration.and_then(|d| d.level)).ansi();
      let reset = if paint.is_empty() { "" } else { RESET };
      write!(
        out,
        "{paint}{label:>width$}{reset} | {source}",
        width = config.label_width
      )?;
    } else {
      write!(out, "{label:>width$} | {source}", width = config.label_width)?;
    }

    if config.show_detail {
      if let Some(detail) = decoration.and_then(|d| d.detail.as_ref()) {
        write!(out, "  [{detail}]")?;
      }
    }
    writeln!(out)?;
  }

  if let Some(status) = host.status() {
    writeln!(out, "{:->width$}-+-", "", width = config.label_width)?;
    writeln!(out, "{status}")?;
  }
  Ok(())
}

#[derive(Serialize)]
struct JsonLine<'a> {
  line: usize,
  text: String,
  #[serde(skip_serializing_if = "line_cost_is_empty")]
  cost: &'a LineCost,
}

fn line_cost_is_empty(cost: &&LineCost) -> bool {
  cost.is_empty()
}

#[derive(Serialize)]
struct JsonListing<'a> {
  lines:  Vec<JsonLine<'a>>,
  totals: Totals,
}

/// Machine-readable listing: the per-line facts plus the totals.
pub fn write_json(
  out: &mut impl Write,
  host: &ScratchHost,
  facts: &[LineCost],
  totals: Totals,
) -> anyhow::Result<()> {
  let lines = facts
    .iter()
    .enumerate()
    .map(|(line, cost)| JsonLine {
      line,
      text: host.line(line).unwrap_or_default(),
      cost,
    })
    .collect();
  let listing = JsonListing { lines, totals };
  serde_json::to_writer_pretty(&mut *out, &listing)?;
  writeln!(out)?;
  Ok(())
}
