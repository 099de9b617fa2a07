//! Narrow interface to the host editor substrate.
//!
//! The engine reads buffer text through [`TextSource`] and paints through
//! [`Surface`]; everything else about the host stays opaque.

use std::{
  borrow::Cow,
  num::{
    NonZeroU64,
    NonZeroUsize,
  },
};

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  Tendril,
  analyzer::count_lines,
  facts::Level,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(NonZeroUsize);

impl BufferId {
  pub const fn new(id: NonZeroUsize) -> Self {
    Self(id)
  }

  pub const fn get(self) -> NonZeroUsize {
    self.0
  }
}

impl From<NonZeroUsize> for BufferId {
  fn from(value: NonZeroUsize) -> Self {
    Self::new(value)
  }
}

/// Handle for one rendered inline annotation.
///
/// Handles are scoped resources: every attached decoration must be released
/// exactly once, either when its line range is replaced by an edit or when
/// the owning session hides or is disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationId(NonZeroU64);

impl DecorationId {
  pub const fn new(id: NonZeroU64) -> Self {
    Self(id)
  }

  pub const fn get(self) -> NonZeroU64 {
    self.0
  }
}

/// One host edit: buffer lines `[start_line, end_line]` (inclusive) were
/// replaced by `text`.
///
/// `text` spans one or more newline-delimited lines; a pure deletion is an
/// edit whose replacement still covers at least one (possibly empty) line.
/// Within a batch, coordinates refer to the buffer state before the edit
/// they belong to, and edits are pre-sorted and non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
  pub start_line: usize,
  pub end_line:   usize,
  pub text:       String,
}

impl LineEdit {
  /// Number of lines the replacement text spans. Always at least one.
  pub fn replacement_lines(&self) -> usize {
    count_lines(&self.text)
  }
}

/// Inclusive line range of the user's selection, normalized so that
/// `start_line <= end_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
  pub start_line: usize,
  pub end_line:   usize,
}

impl SelectionRange {
  pub fn new(a: usize, b: usize) -> Self {
    Self {
      start_line: a.min(b),
      end_line:   a.max(b),
    }
  }

  pub fn is_multiline(&self) -> bool {
    self.start_line != self.end_line
  }
}

/// Inline annotation content for one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
  /// Short label shown before the line, zero width from the buffer's point
  /// of view.
  pub label:  Tendril,
  /// Longer explanation (outcome labels, cycle breakdown), shown on demand.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub detail: Option<Tendril>,
  /// Severity used for coloring; `None` renders in the host's fallback
  /// color.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub level:  Option<Level>,
}

/// Read access to a live buffer's text.
pub trait TextSource {
  fn line_count(&self) -> usize;
  fn text(&self) -> Cow<'_, str>;
}

impl TextSource for str {
  fn line_count(&self) -> usize {
    count_lines(self)
  }

  fn text(&self) -> Cow<'_, str> {
    Cow::Borrowed(self)
  }
}

impl TextSource for String {
  fn line_count(&self) -> usize {
    count_lines(self)
  }

  fn text(&self) -> Cow<'_, str> {
    Cow::Borrowed(self)
  }
}

/// Rendering primitives of the host editor.
///
/// Attached decorations are document-anchored: the host keeps each handle on
/// the line it was attached to while later edits shift line numbers around
/// it. There is one status line per surface.
pub trait Surface {
  fn attach(&mut self, buffer: BufferId, line: usize, decoration: Decoration) -> DecorationId;
  fn release(&mut self, id: DecorationId);
  fn set_status(&mut self, text: &str);
  fn clear_status(&mut self);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn selection_normalizes() {
    let selection = SelectionRange::new(7, 3);
    assert_eq!(selection.start_line, 3);
    assert_eq!(selection.end_line, 7);
    assert!(selection.is_multiline());
    assert!(!SelectionRange::new(4, 4).is_multiline());
  }

  #[test]
  fn pure_deletion_still_spans_one_line() {
    let edit = LineEdit {
      start_line: 2,
      end_line:   4,
      text:       String::new(),
    };
    assert_eq!(edit.replacement_lines(), 1);
  }
}
