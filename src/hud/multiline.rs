//! Multiline widgets.
//!
//! A multiline widget is a small stack of [`Line`]s plus everything needed to
//! draw it: font, color range, flags, and what makes it visible. Widgets whose
//! text comes from game state carry a [`WidgetContent`] value which rebuilds
//! their lines on demand.
//!
//! # Lazy building
//!
//! Content is never rebuilt per frame. Each tic, the engine invalidates the
//! widgets of the active layout, and then calls
//! [`Multiline::mark_built_if_needed()`] for every widget whose content wants
//! to be shown; only a widget that is wanted *and* not yet built this tic runs
//! its builder. Several triggers (automap toggled, cheat toggled, key held)
//! can therefore share one widget without duplicate work.

use crate::gfx::texel::ColorRange;
use crate::hud::line::Line;
use crate::hud::line::MAX_LINE_LEN;
use crate::hud::markup;
use crate::hud::markup::Styled;

/// The most lines a single widget may hold.
pub const MAX_LINES: usize = 16;

/// What the game is showing, as far as widget visibility is concerned.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewMode {
  /// Whether the automap is up.
  pub automap: bool,
  /// Whether the 3-D view fills the screen with the HUD enabled (i.e., no
  /// status bar).
  pub fullscreen: bool,
}

bitflags::bitflags! {
  /// Where an optional widget is enabled.
  #[derive(Default)]
  pub struct Show: u8 {
    /// Shown while the automap is up.
    const AUTOMAP = 1 << 0;
    /// Shown over the 3-D view.
    const HUD = 1 << 1;
    /// Shown everywhere.
    const ALWAYS = Self::AUTOMAP.bits | Self::HUD.bits;
  }
}

impl Show {
  /// Returns whether these flags enable a widget in `view`.
  pub fn applies(self, view: ViewMode) -> bool {
    if view.automap {
      self.contains(Self::AUTOMAP)
    } else {
      self.contains(Self::HUD)
    }
  }
}

bitflags::bitflags! {
  /// Drawing behavior flags for a [`Multiline`].
  #[derive(Default)]
  pub struct WidgetFlags: u8 {
    /// The widget claims whole rows when stacked against a screen edge.
    const EXCLUSIVE = 1 << 0;
    /// A cursor is drawn after the last line.
    const DRAW_CURSOR = 1 << 1;
    /// Lines are drawn newest-first.
    const BOTTOM_UP = 1 << 2;
  }
}

/// A font as seen by the rendering backend.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Font {
  /// The large, uppercase-only message font.
  Big,
  /// The compact status font.
  Small,
  /// A fixed-width font for tabular widgets.
  Mono,
}

/// The font a widget asks for.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum WidgetFont {
  /// Always [`Font::Big`], like the message and title lines.
  Message,
  /// The stat widget font, which the player may switch between
  /// [`Font::Small`] and [`Font::Big`].
  Stat,
  /// Always [`Font::Mono`].
  Mono,
}

impl WidgetFont {
  /// Resolves this request against the current stat font.
  pub fn resolve(self, stat: Font) -> Font {
    match self {
      Self::Message => Font::Big,
      Self::Stat => stat,
      Self::Mono => Font::Mono,
    }
  }
}

/// An engine-owned visibility flag a widget can be tied to.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Flag {
  /// The level title is up.
  Title,
  /// The message line is up.
  Message,
  /// The secret notice is up.
  Secret,
  /// Chat is being composed.
  Chat,
}

/// What makes a widget visible.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Visibility {
  /// Visible on tics where its content was built.
  WhenBuilt,
  /// Visible while an engine flag is on (and also when built).
  Flag(Flag),
}

/// Content for a widget, rebuilt from game state on demand.
///
/// Implementations are usually an `enum` of every content kind the game
/// offers. `build()` must only read `state` and write `lines`; building twice
/// in a row from unchanged state must produce the same lines.
pub trait WidgetContent {
  /// The game state that content is formatted from.
  type State;

  /// Returns whether this widget should be shown this tic.
  fn wanted(&self, state: &Self::State, view: ViewMode) -> bool;

  /// Writes this widget's text into `lines`, which are cleared beforehand.
  fn build(&self, state: &Self::State, lines: &mut LineLog);
}

/// A fixed set of lines, written oldest-to-newest as a ring.
///
/// Writing a line always goes to the *current* line and then advances; once
/// every line has been written, the next write recycles the oldest one. A
/// single-line log simply overwrites its line.
#[derive(Clone, Debug)]
pub struct LineLog {
  lines: Vec<Line>,
  cur: usize,
}

impl LineLog {
  /// Creates a log of `count` empty lines, clamped to `1..=MAX_LINES`.
  pub fn new(count: usize) -> Self {
    let count = count.max(1).min(MAX_LINES);
    Self {
      lines: (0..count).map(|_| Line::new(MAX_LINE_LEN)).collect(),
      cur: 0,
    }
  }

  /// Returns the number of lines this log holds.
  pub fn capacity(&self) -> usize {
    self.lines.len()
  }

  /// Clears every line.
  pub fn clear_all_lines(&mut self) {
    for line in &mut self.lines {
      line.clear();
    }
    self.cur = 0;
  }

  /// Returns the current line, which key edits apply to.
  pub fn cur_line_mut(&mut self) -> &mut Line {
    &mut self.lines[self.cur]
  }

  /// Returns the current line.
  pub fn cur_line(&self) -> &Line {
    &self.lines[self.cur]
  }

  /// Replaces the current line with `text`, which may contain inline color
  /// escapes, and advances to the next line.
  pub fn add_string_to_cur_line(&mut self, text: &str) {
    self.add_line_with(|line| markup::parse_into(line, text));
  }

  /// Replaces the current line with styled segments, and advances to the next
  /// line.
  pub fn add_styled(&mut self, styled: &Styled) {
    self.add_line_with(|line| styled.write_to(line));
  }

  /// Replaces the current line with whatever `f` writes, and advances to the
  /// next line.
  pub fn add_line_with(&mut self, f: impl FnOnce(&mut Line)) {
    let line = &mut self.lines[self.cur];
    line.clear();
    f(line);
    if self.lines.len() > 1 {
      self.cur = (self.cur + 1) % self.lines.len();
    }
  }

  /// Applies a chat key to the current line, without advancing.
  ///
  /// Returns whether the key was consumed.
  pub fn add_key_to_cur_line(&mut self, key: u8) -> bool {
    self.cur_line_mut().add_key(key)
  }

  /// Returns the non-empty lines of this log, oldest first.
  pub fn lines(&self) -> impl DoubleEndedIterator<Item = &Line> + '_ {
    let (newer, older) = self.lines.split_at(self.cur);
    older
      .iter()
      .chain(newer.iter())
      .filter(|line| !line.is_empty())
  }
}

/// A multiline widget.
#[derive(Clone, Debug)]
pub struct Multiline<W> {
  log: LineLog,
  font: WidgetFont,
  color: ColorRange,
  visibility: Visibility,
  flags: WidgetFlags,
  content: Option<W>,
  // Invariant: true only between a build and the next invalidate().
  built: bool,
}

impl<W> Multiline<W> {
  /// Creates a new widget of `lines` lines drawn in `font` and `color`.
  ///
  /// The widget starts out unbuilt, without content, visible only when built.
  pub fn new(lines: usize, font: WidgetFont, color: ColorRange) -> Self {
    Self {
      log: LineLog::new(lines),
      font,
      color,
      visibility: Visibility::WhenBuilt,
      flags: WidgetFlags::empty(),
      content: None,
      built: false,
    }
  }

  /// Attaches content that builds this widget's lines.
  pub fn with_content(mut self, content: W) -> Self {
    self.content = Some(content);
    self
  }

  /// Ties this widget's visibility to an engine flag.
  pub fn shown_by(mut self, flag: Flag) -> Self {
    self.visibility = Visibility::Flag(flag);
    self
  }

  /// Sets this widget's drawing flags.
  pub fn with_flags(mut self, flags: WidgetFlags) -> Self {
    self.flags = flags;
    self
  }

  /// Returns this widget's lines.
  pub fn log(&self) -> &LineLog {
    &self.log
  }

  /// Returns this widget's lines, mutably.
  pub fn log_mut(&mut self) -> &mut LineLog {
    &mut self.log
  }

  /// Returns the font this widget asks for.
  pub fn font(&self) -> WidgetFont {
    self.font
  }

  /// Returns this widget's color range.
  pub fn color(&self) -> ColorRange {
    self.color
  }

  /// Returns what makes this widget visible.
  pub fn visibility(&self) -> Visibility {
    self.visibility
  }

  /// Returns this widget's drawing flags.
  pub fn flags(&self) -> WidgetFlags {
    self.flags
  }

  /// Returns this widget's content, if it has any.
  pub fn content(&self) -> Option<&W> {
    self.content.as_ref()
  }

  /// Returns whether this widget was built since it was last invalidated.
  pub fn is_built(&self) -> bool {
    self.built
  }

  /// Forgets that this widget was built, so that the next
  /// [`mark_built_if_needed()`](Self::mark_built_if_needed) rebuilds it.
  pub fn invalidate(&mut self) {
    self.built = false;
  }

  /// Resets this widget to `lines` empty, unbuilt lines.
  pub fn reset(&mut self, lines: usize) {
    self.log = LineLog::new(lines);
    self.built = false;
  }
}

impl<W: WidgetContent> Multiline<W> {
  /// Builds this widget if it should be visible and isn't built yet.
  ///
  /// Returns whether the builder ran. A widget without content is simply
  /// marked built.
  pub fn mark_built_if_needed(&mut self, visible: bool, state: &W::State) -> bool {
    if !visible || self.built {
      return false;
    }
    self.build(state);
    true
  }

  /// Unconditionally rebuilds this widget.
  pub fn build(&mut self, state: &W::State) {
    if let Some(content) = &self.content {
      self.log.clear_all_lines();
      content.build(state, &mut self.log);
    }
    self.built = true;
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;

  struct Counter;

  impl WidgetContent for Counter {
    type State = Cell<u32>;

    fn wanted(&self, _: &Cell<u32>, _: ViewMode) -> bool {
      true
    }

    fn build(&self, state: &Cell<u32>, lines: &mut LineLog) {
      state.set(state.get() + 1);
      lines.add_string_to_cur_line(&format!("BUILD {}", state.get()));
    }
  }

  fn texts(log: &LineLog) -> Vec<String> {
    log.lines().map(|l| l.as_str().to_string()).collect()
  }

  #[test]
  fn builds_once_until_invalidated() {
    let calls = Cell::new(0);
    let mut w = Multiline::new(1, WidgetFont::Stat, ColorRange::Gray)
      .with_content(Counter);

    w.invalidate();
    assert!(w.mark_built_if_needed(true, &calls));
    assert!(w.is_built());
    assert_eq!(calls.get(), 1);

    assert!(!w.mark_built_if_needed(true, &calls));
    assert_eq!(calls.get(), 1);

    w.invalidate();
    assert!(!w.mark_built_if_needed(false, &calls));
    assert!(!w.is_built());
    assert!(w.mark_built_if_needed(true, &calls));
    assert_eq!(calls.get(), 2);
    assert_eq!(texts(w.log()), vec!["BUILD 2"]);
  }

  #[test]
  fn log_evicts_oldest_line() {
    let mut log = LineLog::new(3);
    for msg in &["ONE", "TWO", "THREE", "FOUR"] {
      log.add_string_to_cur_line(msg);
    }
    assert_eq!(texts(&log), vec!["TWO", "THREE", "FOUR"]);
  }

  #[test]
  fn log_reads_oldest_first_before_wrapping() {
    let mut log = LineLog::new(4);
    log.add_string_to_cur_line("ONE");
    log.add_string_to_cur_line("TWO");
    assert_eq!(texts(&log), vec!["ONE", "TWO"]);
    assert_eq!(
      log.lines().rev().map(|l| l.as_str()).collect::<Vec<_>>(),
      vec!["TWO", "ONE"]
    );
  }

  #[test]
  fn single_line_log_overwrites() {
    let mut log = LineLog::new(1);
    log.add_string_to_cur_line("ONE");
    log.add_string_to_cur_line("TWO");
    assert_eq!(texts(&log), vec!["TWO"]);
  }

  #[test]
  fn show_flags_follow_view() {
    let automap = ViewMode {
      automap: true,
      fullscreen: false,
    };
    assert!(Show::AUTOMAP.applies(automap));
    assert!(!Show::HUD.applies(automap));
    assert!(Show::ALWAYS.applies(ViewMode::default()));
    assert!(!Show::empty().applies(ViewMode::default()));
  }
}
