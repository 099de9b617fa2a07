//! One annotation session per open buffer.

use std::collections::HashMap;

use crate::{
  analyzer::Analyzer,
  session::Annotator,
  surface::{
    BufferId,
    LineEdit,
    SelectionRange,
    Surface,
    TextSource,
  },
};

/// Owns every [`Annotator`] and routes host notifications to them.
///
/// The registry is an explicit value constructed by the embedder at startup
/// and torn down at shutdown; there is no ambient global state. It tracks
/// which buffer the host's active view shows, because the totals display
/// follows the active buffer while decorations stay attached to theirs.
#[derive(Debug)]
pub struct AnnotatorRegistry<A> {
  analyzer: A,
  sessions: HashMap<BufferId, Annotator>,
  active:   Option<BufferId>,
}

impl<A: Analyzer> AnnotatorRegistry<A> {
  pub fn new(analyzer: A) -> Self {
    Self {
      analyzer,
      sessions: HashMap::new(),
      active: None,
    }
  }

  pub fn analyzer(&self) -> &A {
    &self.analyzer
  }

  pub fn session(&self, buffer: BufferId) -> Option<&Annotator> {
    self.sessions.get(&buffer)
  }

  pub fn active(&self) -> Option<BufferId> {
    self.active
  }

  pub fn len(&self) -> usize {
    self.sessions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sessions.is_empty()
  }

  /// User-facing toggle for the buffer under the active view.
  ///
  /// Creates a freshly rendered session when none exists; flips the
  /// existing one otherwise. Toggling a buffer without a session is the
  /// creation path, not an error.
  pub fn toggle(&mut self, buffer: BufferId, text: &dyn TextSource, surface: &mut dyn Surface) {
    self.active = Some(buffer);
    if let Some(session) = self.sessions.get_mut(&buffer) {
      session.toggle(&self.analyzer, text, surface);
      session.show_totals(&self.analyzer, surface);
    } else {
      let session = Annotator::new(buffer, &self.analyzer, text, surface);
      session.show_totals(&self.analyzer, surface);
      self.sessions.insert(buffer, session);
      log::info!("annotation session created for {buffer:?}");
    }
  }

  /// Host edit batch for `buffer`. Buffers without a session and hidden
  /// sessions are no-ops.
  pub fn on_buffer_change(
    &mut self,
    buffer: BufferId,
    edits: &[LineEdit],
    surface: &mut dyn Surface,
  ) {
    let Some(session) = self.sessions.get_mut(&buffer) else {
      return;
    };
    session.on_edits(&self.analyzer, edits, surface);
    if self.active == Some(buffer) {
      session.show_totals(&self.analyzer, surface);
    }
  }

  /// Selection moved in `buffer`. Refreshes the totals display only; no
  /// re-analysis happens.
  pub fn on_selection_change(
    &mut self,
    buffer: BufferId,
    selection: SelectionRange,
    surface: &mut dyn Surface,
  ) {
    let Some(session) = self.sessions.get_mut(&buffer) else {
      return;
    };
    session.set_selection(selection);
    if self.active == Some(buffer) {
      session.show_totals(&self.analyzer, surface);
    }
  }

  /// The host switched views.
  ///
  /// The session of the newly active buffer is rebuilt in full, which guards
  /// against drift accumulated while the buffer was not being observed. For
  /// every other session only the totals display goes away; decorations are
  /// buffer-scoped and stay attached.
  pub fn on_active_buffer(
    &mut self,
    active: Option<(BufferId, &dyn TextSource)>,
    surface: &mut dyn Surface,
  ) {
    surface.clear_status();
    self.active = active.map(|(buffer, _)| buffer);

    let Some((buffer, text)) = active else {
      return;
    };
    let Some(session) = self.sessions.get_mut(&buffer) else {
      return;
    };
    if session.is_visible() {
      session.show(&self.analyzer, text, surface);
      session.show_totals(&self.analyzer, surface);
    }
  }

  /// Dispose and forget the session of a closed buffer.
  pub fn on_buffer_closed(&mut self, buffer: BufferId, surface: &mut dyn Surface) {
    if let Some(mut session) = self.sessions.remove(&buffer) {
      session.dispose(surface);
      log::info!("annotation session disposed for {buffer:?}");
    }
    if self.active == Some(buffer) {
      self.active = None;
    }
  }

  /// Tear down every session. Used at shutdown.
  pub fn dispose_all(&mut self, surface: &mut dyn Surface) {
    for (_, mut session) in self.sessions.drain() {
      session.dispose(surface);
    }
    self.active = None;
  }
}
