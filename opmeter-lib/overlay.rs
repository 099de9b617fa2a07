//! Index-aligned shadow of a buffer's lines holding derived cost facts.
//!
//! The overlay mirrors a mutating buffer one fact per line. Edits are
//! spliced in place: only the replacement text is re-analyzed, never the
//! whole buffer, so the cost of an edit is proportional to its size.

use crate::{
  analyzer::{
    Analyzer,
    analyze_lines,
  },
  facts::LineCost,
  surface::LineEdit,
};

/// Result of splicing one edit into the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Splice {
  /// First affected line.
  pub start:    usize,
  /// Number of facts removed at `start`.
  pub removed:  usize,
  /// Number of fresh facts inserted at `start`.
  pub inserted: usize,
}

/// Ordered facts, one per buffer line.
///
/// Invariant: while populated, `facts[i]` describes buffer line `i` and the
/// length equals the buffer's line count. This holds after every applied
/// edit, including ones that insert or delete lines.
#[derive(Debug, Default)]
pub struct Overlay {
  facts: Vec<LineCost>,
}

impl Overlay {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.facts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.facts.is_empty()
  }

  pub fn facts(&self) -> &[LineCost] {
    &self.facts
  }

  pub fn get(&self, line: usize) -> Option<&LineCost> {
    self.facts.get(line)
  }

  /// Drop all facts without re-deriving anything.
  pub fn clear(&mut self) {
    self.facts.clear();
  }

  /// Discard all facts and re-derive them from `full_text`.
  pub fn rebuild_all<A: Analyzer + ?Sized>(&mut self, analyzer: &A, full_text: &str) {
    self.facts = analyze_lines(analyzer, full_text);
  }

  /// Splice in the facts for an edit that replaced buffer lines
  /// `[edit.start_line, edit.end_line]` with `edit.text`.
  ///
  /// Only the replacement text is analyzed. Coordinates refer to the buffer
  /// state before this edit; batches must be applied in the order the host
  /// delivered them. Out-of-range coordinates are clamped rather than
  /// trusted.
  ///
  /// Returns the [`Splice`] so the caller can reconcile any rendered
  /// decorations tied to the replaced lines and re-index what follows.
  pub fn apply_edit<A: Analyzer + ?Sized>(&mut self, analyzer: &A, edit: &LineEdit) -> Splice {
    let len = self.facts.len();
    if edit.start_line > edit.end_line || edit.end_line >= len {
      log::warn!(
        "edit {}..={} does not fit an overlay of {len} lines, clamping",
        edit.start_line,
        edit.end_line
      );
    }
    let start = edit.start_line.min(len);
    let end = edit.end_line.saturating_add(1).clamp(start, len);

    let fresh = analyze_lines(analyzer, &edit.text);
    let inserted = fresh.len();
    let removed = end - start;
    self.facts.splice(start..end, fresh);

    Splice {
      start,
      removed,
      inserted,
    }
  }

  /// Read-only view of lines `[start_line, end_line]` (inclusive), clamped
  /// to the overlay bounds.
  pub fn slice(&self, start_line: usize, end_line: usize) -> &[LineCost] {
    let end = end_line.saturating_add(1).min(self.facts.len());
    let start = start_line.min(end);
    &self.facts[start..end]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    analyzer::AnalyzeError,
    facts::Timing,
  };

  /// Pure per-line analyzer: facts depend only on the line's own content,
  /// which makes incremental and full analysis directly comparable.
  struct LenAnalyzer;

  impl Analyzer for LenAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<LineCost>, AnalyzeError> {
      Ok(
        text
          .split('\n')
          .map(|line| {
            let bytes = line.trim().len() as u32;
            LineCost {
              bytes,
              timing: (bytes > 0).then(|| Timing::fixed(bytes * 2)),
              ..Default::default()
            }
          })
          .collect(),
      )
    }
  }

  fn overlay_of(text: &str) -> Overlay {
    let mut overlay = Overlay::new();
    overlay.rebuild_all(&LenAnalyzer, text);
    overlay
  }

  fn apply_to_model(lines: &mut Vec<String>, edit: &LineEdit) {
    let replacement = edit.text.split('\n').map(str::to_string);
    lines.splice(edit.start_line..=edit.end_line, replacement);
  }

  #[test]
  fn rebuild_is_idempotent() {
    let text = "move.w d0,d1\n\n  rts";
    let a = overlay_of(text);
    let b = overlay_of(text);
    assert_eq!(a.facts(), b.facts());
    assert_eq!(a.len(), 3);
  }

  #[test]
  fn single_line_replacement_keeps_length() {
    let mut overlay = overlay_of("aa\nbbb\ncccc");
    let splice = overlay.apply_edit(&LenAnalyzer, &LineEdit {
      start_line: 1,
      end_line:   1,
      text:       "x".into(),
    });
    assert_eq!(splice, Splice {
      start:    1,
      removed:  1,
      inserted: 1,
    });
    assert_eq!(overlay.len(), 3);
    assert_eq!(overlay.get(1).unwrap().bytes, 1);
  }

  #[test]
  fn insertion_shifts_untouched_facts() {
    let mut overlay = overlay_of("aa\nbbb");
    let before_first = overlay.get(0).unwrap().clone();
    let before_last = overlay.get(1).unwrap().clone();

    // Line 1 turns into two lines; the new one carries no cost.
    let splice = overlay.apply_edit(&LenAnalyzer, &LineEdit {
      start_line: 1,
      end_line:   1,
      text:       "\nbbb".into(),
    });
    assert_eq!(splice.inserted, 2);
    assert_eq!(overlay.len(), 3);
    assert_eq!(overlay.get(0), Some(&before_first));
    assert!(overlay.get(1).unwrap().is_empty());
    assert_eq!(overlay.get(2), Some(&before_last));
  }

  #[test]
  fn pure_deletion_leaves_one_empty_line() {
    let mut overlay = overlay_of("aa\nbbb\ncccc");
    let splice = overlay.apply_edit(&LenAnalyzer, &LineEdit {
      start_line: 0,
      end_line:   2,
      text:       String::new(),
    });
    assert_eq!(splice.removed, 3);
    assert_eq!(splice.inserted, 1);
    assert_eq!(overlay.len(), 1);
    assert!(overlay.get(0).unwrap().is_empty());
  }

  #[test]
  fn out_of_range_edit_is_clamped() {
    let mut overlay = overlay_of("aa\nbbb");
    let splice = overlay.apply_edit(&LenAnalyzer, &LineEdit {
      start_line: 5,
      end_line:   9,
      text:       "x".into(),
    });
    assert_eq!(splice.removed, 0);
    assert_eq!(overlay.len(), 3);
  }

  #[test]
  fn slice_is_clamped_and_inclusive() {
    let overlay = overlay_of("aa\nbbb\ncccc");
    assert_eq!(overlay.slice(1, 2).len(), 2);
    assert_eq!(overlay.slice(1, 99).len(), 2);
    assert_eq!(overlay.slice(99, 99).len(), 0);
  }

  quickcheck::quickcheck! {
    /// The alignment invariant holds under arbitrary edit scripts, and the
    /// incrementally maintained overlay matches a fresh full rebuild of the
    /// final text.
    fn tracks_arbitrary_edit_scripts(script: Vec<(usize, usize, String)>) -> bool {
      let mut lines: Vec<String> = vec!["seed".into()];
      let mut overlay = overlay_of("seed");

      for (a, b, text) in script {
        let start = a % lines.len();
        let end = start + b % (lines.len() - start);
        let edit = LineEdit { start_line: start, end_line: end, text };
        apply_to_model(&mut lines, &edit);
        overlay.apply_edit(&LenAnalyzer, &edit);
        if overlay.len() != lines.len() {
          return false;
        }
      }

      let fresh = overlay_of(&lines.join("\n"));
      overlay.facts() == fresh.facts()
    }
  }
}
