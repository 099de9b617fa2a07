//! Per-buffer annotation lifecycle.

use crate::{
  Tendril,
  analyzer::Analyzer,
  facts::LineCost,
  overlay::Overlay,
  surface::{
    BufferId,
    Decoration,
    DecorationId,
    LineEdit,
    SelectionRange,
    Surface,
    TextSource,
  },
  totals::Totals,
};

/// The live controller bound to one open buffer.
///
/// A session starts visible and flips between visible and hidden through
/// [`Annotator::toggle`]. Hiding releases every rendered decoration and
/// discards the derived facts; showing again re-derives everything from the
/// current buffer text. The decoration handle table is index-aligned with
/// the overlay, so every rendered line owns exactly one handle and every
/// handle is released exactly once, either when its lines are replaced by an
/// edit or when the session hides.
#[derive(Debug)]
pub struct Annotator {
  buffer:      BufferId,
  overlay:     Overlay,
  decorations: Vec<DecorationId>,
  selection:   Option<SelectionRange>,
  visible:     bool,
}

impl Annotator {
  /// Create the session for `buffer` and render it immediately.
  pub fn new<A: Analyzer + ?Sized>(
    buffer: BufferId,
    analyzer: &A,
    text: &dyn TextSource,
    surface: &mut dyn Surface,
  ) -> Self {
    let mut session = Self {
      buffer,
      overlay: Overlay::new(),
      decorations: Vec::new(),
      selection: None,
      visible: false,
    };
    session.show(analyzer, text, surface);
    session
  }

  pub fn buffer(&self) -> BufferId {
    self.buffer
  }

  pub fn is_visible(&self) -> bool {
    self.visible
  }

  /// Facts currently mirrored from the buffer. Empty while hidden.
  pub fn facts(&self) -> &[LineCost] {
    self.overlay.facts()
  }

  pub fn selection(&self) -> Option<SelectionRange> {
    self.selection
  }

  /// Rebuild the overlay from the current buffer text and render one
  /// decoration per line.
  pub fn show<A: Analyzer + ?Sized>(
    &mut self,
    analyzer: &A,
    text: &dyn TextSource,
    surface: &mut dyn Surface,
  ) {
    self.release_decorations(surface);
    self.overlay.rebuild_all(analyzer, &text.text());
    self.visible = true;

    let mut handles = Vec::with_capacity(self.overlay.len());
    for cost in self.overlay.facts() {
      let line = handles.len();
      handles.push(surface.attach(self.buffer, line, decoration_for(analyzer, cost)));
    }
    self.decorations = handles;
    log::debug!("annotations shown for {:?} ({} lines)", self.buffer, self.overlay.len());
  }

  /// Release every decoration, hide the totals display and discard the
  /// overlay data.
  pub fn hide(&mut self, surface: &mut dyn Surface) {
    self.release_decorations(surface);
    self.overlay.clear();
    self.visible = false;
    surface.clear_status();
    log::debug!("annotations hidden for {:?}", self.buffer);
  }

  pub fn toggle<A: Analyzer + ?Sized>(
    &mut self,
    analyzer: &A,
    text: &dyn TextSource,
    surface: &mut dyn Surface,
  ) {
    if self.visible {
      self.hide(surface);
    } else {
      self.show(analyzer, text, surface);
    }
  }

  /// Apply a batch of host edits in order. Ignored entirely while hidden.
  ///
  /// Each edit re-derives facts for its replacement text only, then swaps
  /// the decorations of the replaced lines for fresh ones; handles outside
  /// the edit stay attached and keep tracking their (possibly shifted)
  /// lines.
  pub fn on_edits<A: Analyzer + ?Sized>(
    &mut self,
    analyzer: &A,
    edits: &[LineEdit],
    surface: &mut dyn Surface,
  ) {
    if !self.visible {
      return;
    }

    for edit in edits {
      let splice = self.overlay.apply_edit(analyzer, edit);

      // Old handles go first, then fresh decorations take their slots.
      let end = (splice.start + splice.removed).min(self.decorations.len());
      let start = splice.start.min(end);
      for stale in self.decorations.drain(start..end) {
        surface.release(stale);
      }

      let mut fresh = Vec::with_capacity(splice.inserted);
      for (offset, cost) in self
        .overlay
        .slice(splice.start, splice.start + splice.inserted.saturating_sub(1))
        .iter()
        .enumerate()
      {
        fresh.push(surface.attach(
          self.buffer,
          splice.start + offset,
          decoration_for(analyzer, cost),
        ));
      }
      self.decorations.splice(start..start, fresh);
    }
  }

  /// Remember the selection reported by the host; totals follow it.
  pub fn set_selection(&mut self, selection: SelectionRange) {
    self.selection = Some(selection);
  }

  /// Totals over the current selection when it spans more than one line,
  /// else over the whole buffer.
  pub fn totals(&self) -> Totals {
    match self.selection {
      Some(selection) if selection.is_multiline() => {
        Totals::aggregate(self.overlay.slice(selection.start_line, selection.end_line))
      },
      _ => Totals::aggregate(self.overlay.facts()),
    }
  }

  /// Paint the totals display. No-op while hidden.
  pub fn show_totals<A: Analyzer + ?Sized>(&self, analyzer: &A, surface: &mut dyn Surface) {
    if !self.visible {
      return;
    }
    surface.set_status(&self.totals().status(analyzer));
  }

  /// Hide only the totals display; decorations stay attached.
  pub fn hide_totals(&self, surface: &mut dyn Surface) {
    surface.clear_status();
  }

  /// Release everything this session owns. The session must not be used
  /// afterwards.
  pub fn dispose(&mut self, surface: &mut dyn Surface) {
    self.hide(surface);
  }

  fn release_decorations(&mut self, surface: &mut dyn Surface) {
    for id in self.decorations.drain(..) {
      surface.release(id);
    }
  }
}

/// Compose the inline label and the optional long-form detail for one line.
///
/// The label joins the formatted timing values and appends the byte cost;
/// lines without any cost get an empty label in the fallback color. The
/// detail carries the outcome labels and the cycle breakdown when there is
/// more to say than the label shows.
pub(crate) fn decoration_for<A: Analyzer + ?Sized>(analyzer: &A, cost: &LineCost) -> Decoration {
  let mut label = Tendril::new();
  if let Some(timing) = &cost.timing {
    for (index, &value) in timing.values.iter().enumerate() {
      if index > 0 {
        label.push(' ');
      }
      label.push_str(&analyzer.format_timing(u64::from(value)));
    }
  }
  if cost.bytes > 0 {
    if !label.is_empty() {
      label.push(' ');
    }
    label.push_str(&cost.bytes.to_string());
  }

  let detail = cost.timing.as_ref().and_then(|timing| {
    if timing.values.len() < 2 && timing.calculation.is_none() {
      return None;
    }
    let mut parts: Vec<String> = Vec::new();
    if !timing.labels.is_empty() {
      let outcomes: Vec<String> = timing
        .labels
        .iter()
        .zip(&timing.values)
        .map(|(name, value)| format!("{name} {value}"))
        .collect();
      parts.push(outcomes.join(", "));
    }
    if let Some(calculation) = &timing.calculation {
      parts.push(calculation.to_string());
    }
    if parts.is_empty() {
      return None;
    }
    Some(Tendril::from(parts.join("; ")))
  });

  Decoration {
    label,
    detail,
    level: cost.level,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    analyzer::AnalyzeError,
    facts::{
      Calculation,
      Level,
      Timing,
    },
  };

  struct PlainAnalyzer;

  impl Analyzer for PlainAnalyzer {
    fn analyze(&self, _text: &str) -> Result<Vec<LineCost>, AnalyzeError> {
      Ok(Vec::new())
    }
  }

  #[test]
  fn label_joins_timings_then_bytes() {
    let cost = LineCost {
      bytes: 2,
      timing: Some(Timing::alternatives([10, 8])),
      level: Some(Level::Low),
      ..Default::default()
    };
    let decoration = decoration_for(&PlainAnalyzer, &cost);
    assert_eq!(decoration.label.as_str(), "10 8 2");
    assert_eq!(decoration.level, Some(Level::Low));
  }

  #[test]
  fn empty_line_renders_empty_label() {
    let decoration = decoration_for(&PlainAnalyzer, &LineCost::default());
    assert!(decoration.label.is_empty());
    assert!(decoration.detail.is_none());
    assert_eq!(decoration.level, None);
  }

  #[test]
  fn single_value_timing_has_no_detail() {
    let cost = LineCost {
      bytes: 2,
      timing: Some(Timing::fixed(4)),
      ..Default::default()
    };
    assert!(decoration_for(&PlainAnalyzer, &cost).detail.is_none());
  }

  #[test]
  fn detail_carries_outcomes_and_breakdown() {
    let timing = Timing::alternatives([10, 8])
      .with_labels(["taken", "not taken"])
      .with_calculation(Calculation {
        base:       8,
        multiplier: Some(2),
        n:          1,
        ea:         None,
      });
    let cost = LineCost {
      bytes: 2,
      timing: Some(timing),
      ..Default::default()
    };
    let detail = decoration_for(&PlainAnalyzer, &cost).detail.unwrap();
    assert_eq!(detail.as_str(), "taken 10, not taken 8; 8(+2*n), n = 1");
  }
}
