//! In-memory reference host.
//!
//! `ScratchHost` pairs a rope-backed buffer with a surface that records
//! rendered decorations the way a real editor tracks them: handles stay
//! anchored to their line while later edits shift line numbers. The binary
//! drives it to annotate files, and the test suite uses it to observe what a
//! session actually painted.

use std::{
  borrow::Cow,
  collections::HashMap,
  num::{
    NonZeroU64,
    NonZeroUsize,
  },
};

use ropey::Rope;

use crate::{
  analyzer::count_lines,
  surface::{
    BufferId,
    Decoration,
    DecorationId,
    LineEdit,
    Surface,
    TextSource,
  },
};

/// A decoration as currently rendered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchored {
  pub buffer:     BufferId,
  pub line:       usize,
  pub decoration: Decoration,
}

#[derive(Debug)]
pub struct ScratchHost {
  buffer:      BufferId,
  text:        Rope,
  decorations: HashMap<DecorationId, Anchored>,
  status:      Option<String>,
  next_id:     NonZeroU64,
}

impl ScratchHost {
  pub fn new(text: &str) -> Self {
    Self::with_buffer(BufferId::new(NonZeroUsize::MIN), text)
  }

  pub fn with_buffer(buffer: BufferId, text: &str) -> Self {
    Self {
      buffer,
      text: Rope::from_str(text),
      decorations: HashMap::new(),
      status: None,
      next_id: NonZeroU64::MIN,
    }
  }

  pub fn buffer(&self) -> BufferId {
    self.buffer
  }

  pub fn status(&self) -> Option<&str> {
    self.status.as_deref()
  }

  pub fn decoration_count(&self) -> usize {
    self.decorations.len()
  }

  /// Rendered decorations ordered by line.
  pub fn decorations(&self) -> Vec<Anchored> {
    let mut rendered: Vec<Anchored> = self.decorations.values().cloned().collect();
    rendered.sort_by_key(|anchored| anchored.line);
    rendered
  }

  pub fn decoration_at(&self, line: usize) -> Option<Anchored> {
    self
      .decorations
      .values()
      .find(|anchored| anchored.line == line)
      .cloned()
  }

  /// Owned copy of the buffer text, handy where the host itself is already
  /// mutably borrowed as a [`Surface`].
  pub fn snapshot(&self) -> String {
    self.text.to_string()
  }

  pub fn line(&self, line: usize) -> Option<String> {
    if line >= self.text.len_lines() {
      return None;
    }
    let content = self.text.line(line).to_string();
    Some(content.trim_end_matches(['\n', '\r']).to_string())
  }

  /// Replace lines `[start_line, end_line]` (inclusive) with `text` and
  /// return the notification a host would deliver for it.
  ///
  /// Decoration anchors past the replaced range shift with the edit;
  /// anchors inside it keep their position until their owner releases them.
  pub fn replace_lines(&mut self, start_line: usize, end_line: usize, text: &str) -> LineEdit {
    assert!(start_line <= end_line, "inverted line range");
    assert!(end_line < self.text.len_lines(), "edit past end of buffer");

    let has_following_line = end_line + 1 < self.text.len_lines();
    let start_char = self.text.line_to_char(start_line);
    let end_char = if has_following_line {
      self.text.line_to_char(end_line + 1)
    } else {
      self.text.len_chars()
    };

    self.text.remove(start_char..end_char);
    let mut insert = String::from(text);
    if has_following_line {
      insert.push('\n');
    }
    self.text.insert(start_char, &insert);

    let removed = end_line - start_line + 1;
    let inserted = count_lines(text);
    let delta = inserted as isize - removed as isize;
    if delta != 0 {
      for anchored in self.decorations.values_mut() {
        if anchored.line > end_line {
          anchored.line = (anchored.line as isize + delta) as usize;
        }
      }
    }

    LineEdit {
      start_line,
      end_line,
      text: text.to_string(),
    }
  }
}

impl TextSource for ScratchHost {
  fn line_count(&self) -> usize {
    self.text.len_lines()
  }

  fn text(&self) -> Cow<'_, str> {
    Cow::Owned(self.text.to_string())
  }
}

impl Surface for ScratchHost {
  fn attach(&mut self, buffer: BufferId, line: usize, decoration: Decoration) -> DecorationId {
    let id = DecorationId::new(self.next_id);
    self.next_id = self.next_id.checked_add(1).unwrap_or(NonZeroU64::MIN);
    self.decorations.insert(id, Anchored {
      buffer,
      line,
      decoration,
    });
    id
  }

  fn release(&mut self, id: DecorationId) {
    if self.decorations.remove(&id).is_none() {
      log::warn!("released unknown decoration handle {id:?}");
    }
  }

  fn set_status(&mut self, text: &str) {
    self.status = Some(text.to_string());
  }

  fn clear_status(&mut self) {
    self.status = None;
  }
}
