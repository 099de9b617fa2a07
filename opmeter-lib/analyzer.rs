//! Boundary to the external line analyzer.
//!
//! The engine never inspects source text itself; it hands line ranges to an
//! [`Analyzer`] and stores whatever facts come back. Analyzer input is
//! sanitized here, not in the overlay, so every implementation sees the same
//! cleaned-up text.

use std::borrow::Cow;

use thiserror::Error;

use crate::facts::{
  Level,
  LineCost,
};

#[derive(Debug, Error)]
pub enum AnalyzeError {
  #[error("malformed source near line {line}: {reason}")]
  Malformed { line: usize, reason: String },
  #[error("analyzer backend failure: {0}")]
  Backend(String),
}

/// External analyzer for one or more lines of source text.
///
/// `analyze` returns exactly one [`LineCost`] per newline-delimited line of
/// its input; a trailing line without a terminating newline still counts.
pub trait Analyzer {
  fn analyze(&self, text: &str) -> Result<Vec<LineCost>, AnalyzeError>;

  /// Format a cycle count for display.
  fn format_timing(&self, value: u64) -> String {
    value.to_string()
  }

  /// Classify a cycle count for presentation.
  fn timing_level(&self, value: u32) -> Level {
    match value {
      0..=19 => Level::Low,
      20..=39 => Level::Med,
      40..=99 => Level::High,
      _ => Level::VHigh,
    }
  }
}

/// Number of newline-delimited lines in `text`. Empty text is one line.
pub fn count_lines(text: &str) -> usize {
  text.bytes().filter(|&byte| byte == b'\n').count() + 1
}

/// Strip tokens that confuse analyzers when assembly is embedded in C string
/// literals: two-character `\n` escapes, double quotes and `%%` sequences.
/// Real newlines survive, so the line count of the input is preserved.
pub fn sanitize(text: &str) -> Cow<'_, str> {
  if !text.contains(['"', '\\', '%']) {
    return Cow::Borrowed(text);
  }

  let mut out = String::with_capacity(text.len());
  let mut chars = text.chars().peekable();
  while let Some(ch) = chars.next() {
    match ch {
      '"' => {},
      '\\' if chars.peek() == Some(&'n') => {
        chars.next();
      },
      '%' if chars.peek() == Some(&'%') => {
        chars.next();
      },
      _ => out.push(ch),
    }
  }
  Cow::Owned(out)
}

/// Run `analyzer` over `text` and guarantee one fact per input line.
///
/// Failures and count mismatches degrade to empty annotations for the
/// affected lines instead of propagating, so the caller's line alignment
/// always holds.
pub fn analyze_lines<A: Analyzer + ?Sized>(analyzer: &A, text: &str) -> Vec<LineCost> {
  let expected = count_lines(text);
  match analyzer.analyze(&sanitize(text)) {
    Ok(mut facts) => {
      if facts.len() != expected {
        log::warn!(
          "analyzer returned {} facts for {} lines, realigning",
          facts.len(),
          expected
        );
        facts.resize_with(expected, LineCost::default);
      }
      facts
    },
    Err(err) => {
      log::warn!("analysis failed, {expected} lines degrade to empty annotations: {err}");
      vec![LineCost::default(); expected]
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct FailingAnalyzer;

  impl Analyzer for FailingAnalyzer {
    fn analyze(&self, _text: &str) -> Result<Vec<LineCost>, AnalyzeError> {
      Err(AnalyzeError::Backend("no table loaded".into()))
    }
  }

  struct ShortAnalyzer;

  impl Analyzer for ShortAnalyzer {
    fn analyze(&self, _text: &str) -> Result<Vec<LineCost>, AnalyzeError> {
      Ok(vec![LineCost {
        bytes: 2,
        ..Default::default()
      }])
    }
  }

  #[test]
  fn count_lines_edges() {
    assert_eq!(count_lines(""), 1);
    assert_eq!(count_lines("a"), 1);
    assert_eq!(count_lines("a\n"), 2);
    assert_eq!(count_lines("a\nb\nc"), 3);
  }

  #[test]
  fn sanitize_strips_inline_asm_noise() {
    assert_eq!(sanitize(r#""move.w d0,d1\n""#), "move.w d0,d1");
    assert_eq!(sanitize("move.l %%d0,%%d1"), "move.l %d0,%d1");
    assert_eq!(sanitize("plain text"), "plain text");
  }

  #[test]
  fn sanitize_preserves_line_count() {
    let input = "\"a\\n\"\n%%b\nc\\";
    assert_eq!(count_lines(&sanitize(input)), count_lines(input));
  }

  #[test]
  fn failure_degrades_to_empty_facts() {
    let facts = analyze_lines(&FailingAnalyzer, "a\nb\nc");
    assert_eq!(facts.len(), 3);
    assert!(facts.iter().all(LineCost::is_empty));
  }

  #[test]
  fn count_mismatch_is_realigned() {
    let facts = analyze_lines(&ShortAnalyzer, "a\nb\nc");
    assert_eq!(facts.len(), 3);
    assert_eq!(facts[0].bytes, 2);
    assert!(facts[1].is_empty());
    assert!(facts[2].is_empty());
  }

  #[test]
  fn default_level_thresholds() {
    let analyzer = ShortAnalyzer;
    assert_eq!(analyzer.timing_level(4), Level::Low);
    assert_eq!(analyzer.timing_level(24), Level::Med);
    assert_eq!(analyzer.timing_level(70), Level::High);
    assert_eq!(analyzer.timing_level(140), Level::VHigh);
  }
}
