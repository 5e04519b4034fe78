//! The heads-up display.
//!
//! [`HudEngine`] owns every widget, the layout registry, and the timed state
//! of the message, secret, title and chat lines. A game drives it with two
//! entry points that never overlap:
//!
//! - [`HudEngine::tick()`], once per simulation tic, advances timers, takes in
//!   chat, and rebuilds whichever widgets are wanted this tic.
//! - [`HudEngine::draw()`], once per rendered frame, resolves alignment and
//!   draws onto a [`Surface`]. It only reads.
//!
//! Widgets that show game state are [`Multiline`]s carrying a
//! [`WidgetContent`]; the engine decides *when* to build them, and the
//! content decides *what* they say.

use crate::error::ConfigError;
use crate::error::LayoutError;
use crate::geo::Point;
use crate::geo::Rect;
use crate::gfx::texel::ColorRange;
use crate::options::HudOptions;
use crate::options::ANNOUNCE_TICS;

pub mod align;
pub mod chat;
pub mod layout;
pub mod line;
pub mod markup;
pub mod multiline;
pub mod parser;
pub mod responder;
pub mod timer;

use align::Stacker;
use chat::MAX_PLAYERS;
use layout::Binding;
use layout::HAlign;
use layout::Layouts;
use layout::VAlign;
use layout::WidgetId;
use line::Line;
use line::MAX_LINE_LEN;
use multiline::Flag;
use multiline::Font;
use multiline::Multiline;
use multiline::ViewMode;
use multiline::Visibility;
use multiline::WidgetContent;
use multiline::WidgetFlags;
use multiline::WidgetFont;
use parser::WidgetNames;
use responder::ChatKeys;
use responder::Composer;
use responder::ComposerConfig;
use responder::KeyInput;
use responder::Session;
use timer::Countdown;
use timer::Message;
use timer::MessageState;

/// The rendering boundary.
///
/// Coordinates and extents are in whatever units the surface uses; the
/// engine only ever combines them with each other.
pub trait Surface {
  /// Returns the size of the whole screen.
  fn size(&self) -> Point;

  /// Returns the height of the status bar at the bottom of the screen, which
  /// the HUD avoids unless the view is full-screen.
  fn status_bar_height(&self) -> i32;

  /// Returns the width of `text` drawn in `font`.
  fn text_width(&self, font: Font, text: &str) -> i32;

  /// Returns the height of one line of `font`.
  fn line_height(&self, font: Font) -> i32;

  /// Draws `line` with its upper-left corner at `at`; spans without a color
  /// of their own use `color`.
  fn draw_text(&mut self, at: Point, font: Font, line: &Line, color: ColorRange);

  /// Draws a text cursor at `at`.
  fn draw_cursor(&mut self, at: Point, font: Font, color: ColorRange);

  /// Clears `rect` back to whatever is behind the HUD.
  fn clear(&mut self, rect: Rect);
}

/// Everything a tic needs from the game.
pub struct TicInput<'a, S> {
  /// What the game is showing.
  pub view: ViewMode,
  /// Who is playing.
  pub session: Session,
  /// The chat character each player sent this tic, or zero.
  pub chat_chars: [u8; MAX_PLAYERS],
  /// The state widget contents are built from.
  pub state: &'a S,
}

/// Something the game should react to after a tic.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Cue {
  /// A chat line from `from` was shown; play the chat sound.
  ChatReceived {
    /// The sending player.
    from: usize,
  },
}

/// A widget placed for one draw pass.
struct Placed<'a> {
  rows: Vec<&'a Line>,
  font: Font,
  color: ColorRange,
  at: Point,
  size: Point,
  cursor: bool,
}

/// The heads-up display engine.
pub struct HudEngine<W> {
  options: HudOptions,
  widgets: Vec<Multiline<W>>,
  names: WidgetNames,
  layouts: Layouts,
  active: usize,

  message: WidgetId,
  secret: WidgetId,
  chat: WidgetId,
  title: WidgetId,

  messages: MessageState,
  secret_timer: Countdown,
  pending_secret: Option<String>,
  title_on: bool,
  title_counter: u32,
  composer: Composer,
  inputs: Vec<Line>,
  chat_dest: [u8; MAX_PLAYERS],

  stat_font: Font,
  view: ViewMode,
  running: bool,
  // Set from invalidation until the end of the tic that rebuilds; suppresses
  // drawing.
  pending: bool,
}

impl<W: WidgetContent> HudEngine<W> {
  /// Creates a stopped engine with the built-in widgets: the message line,
  /// the secret notice, the chat line, and a title built from `title`.
  ///
  /// Every layout starts out with the built-in widgets' default placement.
  pub fn new(options: HudOptions, title: W) -> Result<Self, LayoutError> {
    let mut widgets = Vec::new();
    let mut add = |w: Multiline<W>| {
      widgets.push(w);
      WidgetId(widgets.len() - 1)
    };

    let message = add(
      Multiline::new(
        options.message_lines(),
        WidgetFont::Message,
        options.hudcolor_mesg,
      )
      .shown_by(Flag::Message),
    );
    let secret = add(
      Multiline::new(1, WidgetFont::Message, ColorRange::Gold)
        .shown_by(Flag::Secret),
    );
    let chat = add(
      Multiline::new(1, WidgetFont::Message, options.hudcolor_chat)
        .shown_by(Flag::Chat)
        .with_flags(WidgetFlags::DRAW_CURSOR),
    );
    let title = add(
      Multiline::new(1, WidgetFont::Message, options.hudcolor_titl)
        .shown_by(Flag::Title)
        .with_content(title),
    );

    let mut names = WidgetNames::new();
    names.insert("title", None, title);
    names.insert("message", None, message);
    names.insert("secret", None, secret);

    let mut layouts = Layouts::new();
    for n in 0..layouts.count() {
      let zero = Point::zero();
      layouts.bind(n, title, HAlign::Direct, VAlign::Bottom, zero)?;
      layouts.bind(n, message, HAlign::Direct, VAlign::Top, zero)?;
      layouts.bind(n, chat, HAlign::Direct, VAlign::Top, zero)?;
      layouts.bind(n, secret, HAlign::Center, VAlign::Secret, zero)?;
    }

    let composer = Composer::new(ChatKeys::default(), composer_config(&options));
    let active = options.hud_active.min(layouts.count() - 1);
    Ok(Self {
      options,
      widgets,
      names,
      layouts,
      active,
      message,
      secret,
      chat,
      title,
      messages: MessageState::new(),
      secret_timer: Countdown::new(),
      pending_secret: None,
      title_on: false,
      title_counter: 0,
      composer,
      inputs: (0..MAX_PLAYERS).map(|_| Line::new(MAX_LINE_LEN)).collect(),
      chat_dest: [0; MAX_PLAYERS],
      stat_font: Font::Small,
      view: ViewMode::default(),
      running: false,
      pending: false,
    })
  }

  /// Adds a widget the layout language can refer to by `name` or `alias`.
  ///
  /// The widget is not placed in any layout until a layout resource or
  /// [`bind()`](Self::bind) places it.
  pub fn register(
    &mut self,
    name: &str,
    alias: Option<&str>,
    widget: Multiline<W>,
  ) -> WidgetId {
    let id = WidgetId(self.widgets.len());
    self.widgets.push(widget);
    self.names.insert(name, alias, id);
    id
  }

  /// Places a widget in a layout directly.
  ///
  /// Fails if `widget` is not one of this engine's widgets.
  pub fn bind(
    &mut self,
    layout: usize,
    widget: WidgetId,
    h_align: HAlign,
    v_align: VAlign,
    pos: Point,
  ) -> Result<(), LayoutError> {
    if widget.0 >= self.widgets.len() {
      return Err(LayoutError::NoSuchWidget { widget: widget.0 });
    }
    self.layouts.bind(layout, widget, h_align, v_align, pos)?;
    self.apply_centering();
    Ok(())
  }

  /// Applies a layout resource on top of the current layouts.
  ///
  /// `screen` is the screen size explicit coordinates are checked against. On
  /// error, the layouts are left exactly as they were.
  pub fn load_layout(&mut self, src: &str, screen: Point) -> Result<(), ConfigError> {
    let layouts = parser::parse(src, &self.names, screen, &self.layouts)?;
    for n in 0..layouts.count() {
      log::info!("layout {}: {} widgets", n, layouts.bindings(n).len());
    }
    self.layouts = layouts;
    self.apply_centering();
    Ok(())
  }

  /// Starts (or restarts) the HUD for a new level.
  ///
  /// Timed lines are reset, the title is built, and drawing is held off until
  /// the first tic has run.
  pub fn start(&mut self, state: &W::State) {
    if self.running {
      self.stop();
    }

    self.messages.reset();
    self.secret_timer.hide();
    self.pending_secret = None;
    self.composer.reset(composer_config(&self.options));
    for input in &mut self.inputs {
      input.clear();
    }
    self.chat_dest = [0; MAX_PLAYERS];

    let message_lines = self.options.message_lines();
    self.widgets[self.message.0].reset(message_lines);
    self.widgets[self.secret.0].reset(1);
    self.widgets[self.chat.0].reset(1);

    self.widgets[self.title.0].build(state);
    self.title_counter = if self.options.hud_map_announce {
      ANNOUNCE_TICS
    } else {
      0
    };
    self.title_on = self.title_counter > 0;

    self.apply_centering();
    self.invalidate_active();
    self.running = true;
    log::info!("HUD started on layout {}", self.active);
  }

  /// Stops the HUD; it neither ticks nor draws until started again.
  pub fn stop(&mut self) {
    if self.running {
      log::info!("HUD stopped");
    }
    self.running = false;
  }

  /// Returns whether the HUD is running.
  pub fn is_running(&self) -> bool {
    self.running
  }

  /// Returns the options in effect.
  pub fn options(&self) -> &HudOptions {
    &self.options
  }

  /// Replaces the options.
  ///
  /// The layout and message centering change immediately; everything else
  /// takes effect at the next [`start()`](Self::start).
  pub fn set_options(&mut self, options: HudOptions) {
    self.options = options;
    self.set_layout(self.options.hud_active);
    self.apply_centering();
  }

  /// Returns the view as of the last tic, with `fullscreen` only set when
  /// the HUD is actually displayed over a full-screen view.
  pub fn view(&self) -> ViewMode {
    self.view
  }

  /// Returns the index of the active layout.
  pub fn active_layout(&self) -> usize {
    self.active
  }

  /// Switches to another layout, clamping out-of-range indices.
  ///
  /// Nothing is rebuilt; the new layout's widgets are drawn from the next
  /// tic on.
  pub fn set_layout(&mut self, layout: usize) {
    let layout = layout.min(self.layouts.count() - 1);
    if layout != self.active {
      log::info!("switching to layout {}", layout);
      self.active = layout;
      self.invalidate_active();
    }
  }

  /// Returns the layout registry.
  pub fn layouts(&self) -> &Layouts {
    &self.layouts
  }

  /// Looks up a widget by name or alias.
  pub fn lookup(&self, name: &str) -> Option<WidgetId> {
    self.names.lookup(name)
  }

  /// Returns a widget, if `id` is one of this engine's.
  pub fn widget(&self, id: WidgetId) -> Option<&Multiline<W>> {
    self.widgets.get(id.0)
  }

  /// Returns the message widget.
  pub fn message_widget(&self) -> WidgetId {
    self.message
  }

  /// Returns the secret notice widget.
  pub fn secret_widget(&self) -> WidgetId {
    self.secret
  }

  /// Returns the chat widget.
  pub fn chat_widget(&self) -> WidgetId {
    self.chat
  }

  /// Returns the title widget.
  pub fn title_widget(&self) -> WidgetId {
    self.title
  }

  /// Returns whether drawing is held off until the current tic finishes.
  pub fn is_pending(&self) -> bool {
    self.pending
  }

  /// Returns whether an engine flag is currently on.
  pub fn flag(&self, flag: Flag) -> bool {
    match flag {
      Flag::Title => self.title_on,
      Flag::Message => self.messages.is_on(),
      Flag::Secret => self.secret_timer.is_on(),
      Flag::Chat => self.composer.is_on(),
    }
  }

  /// Posts a message for the message line.
  pub fn post_message(&mut self, text: &str) {
    self.messages.post(Message {
      text: text.to_string(),
      system: false,
    });
  }

  /// Posts a system notice, which is shown even while messages are turned
  /// off, and which ordinary messages cannot interrupt.
  pub fn post_system_message(&mut self, text: &str) {
    self.messages.post(Message {
      text: text.to_string(),
      system: true,
    });
  }

  /// Announces a revealed secret, if secret notices are turned on.
  pub fn reveal_secret(&mut self, text: &str) {
    if self.options.hud_secret_message {
      self.pending_secret = Some(text.to_string());
    }
  }

  /// Responds to a key event; returns whether the HUD ate it.
  pub fn respond(&mut self, key: &KeyInput, session: &Session) -> bool {
    if !self.running {
      return false;
    }
    let chat = self.widgets[self.chat.0].log_mut();
    self.composer.respond(key, session, chat, &mut self.messages)
  }

  /// Removes the next outgoing chat character, to be sent with the local
  /// player's command this tic.
  pub fn dequeue_chat_char(&mut self) -> Option<u8> {
    self.composer.dequeue()
  }

  /// Runs one simulation tic.
  pub fn tick(&mut self, input: &TicInput<'_, W::State>) -> Vec<Cue> {
    let mut cues = Vec::new();
    if !self.running {
      return cues;
    }

    let automap = input.view.automap;
    self.view = ViewMode {
      automap,
      fullscreen: input.view.fullscreen && self.options.hud_displayed && !automap,
    };
    self.invalidate_active();

    self.stat_font = match self.options.hud_widget_font {
      1 if automap => Font::Big,
      2 if !automap => Font::Big,
      3 => Font::Big,
      _ => Font::Small,
    };

    let chat = self.widgets[self.chat.0].log_mut();
    self.composer.tick(chat, &mut self.messages);
    self.messages.tick();
    self.secret_timer.tick();

    if let Some(text) = self.pending_secret.take() {
      self.widgets[self.secret.0]
        .log_mut()
        .add_string_to_cur_line(&text);
      self.secret_timer.show(ANNOUNCE_TICS);
    }

    if let Some(msg) = self.messages.take_pending(self.options.show_messages) {
      self.write_message(&msg.text);
      self.messages.show(self.options.message_tics(), msg.system);
    }

    if input.session.netgame {
      self.receive_chat(input, &mut cues);
    }

    self.title_counter = self.title_counter.saturating_sub(1);
    self.title_on = automap || self.title_counter > 0;

    let view = self.view;
    for id in self.layouts.widgets(self.active) {
      let widget = &mut self.widgets[id.0];
      if widget.visibility() != Visibility::WhenBuilt {
        continue;
      }
      let wanted = widget
        .content()
        .map_or(false, |c| c.wanted(input.state, view));
      widget.mark_built_if_needed(wanted, input.state);
    }

    self.pending = false;
    cues
  }

  /// Draws the active layout.
  ///
  /// Does nothing while the HUD is stopped or a rebuild is pending.
  pub fn draw(&self, surface: &mut impl Surface) {
    if !self.running || self.pending {
      return;
    }
    for p in self.place(&*surface) {
      let line_height = surface.line_height(p.font);
      let mut at = p.at;
      for row in &p.rows {
        surface.draw_text(at, p.font, row, p.color);
        at = at + Point::new(0, line_height);
      }
      if p.cursor {
        let last = p.rows.last().map_or("", |l| l.as_str());
        let x = p.at.x() + surface.text_width(p.font, last);
        let y = p.at.y() + line_height * (p.rows.len() as i32 - 1).max(0);
        surface.draw_cursor(Point::new(x, y), p.font, p.color);
      }
    }
  }

  /// Clears the area of every shown widget, for views where the HUD overlaps
  /// something that is not redrawn every frame.
  pub fn erase(&self, surface: &mut impl Surface) {
    if !self.running || self.view.automap || self.view.fullscreen {
      return;
    }
    for p in self.place(&*surface) {
      surface.clear(Rect::new(p.at, p.at + p.size));
    }
  }

  fn is_shown(&self, widget: &Multiline<W>) -> bool {
    widget.is_built()
      || match widget.visibility() {
        Visibility::WhenBuilt => false,
        Visibility::Flag(flag) => self.flag(flag),
      }
  }

  /// Resolves where every shown widget of the active layout goes.
  fn place(&self, surface: &impl Surface) -> Vec<Placed<'_>> {
    let size = surface.size();
    let bar = if self.view.fullscreen {
      0
    } else {
      surface.status_bar_height()
    };
    let area = Rect::new(Point::zero(), Point::new(size.x(), size.y() - bar));
    let mut stacker = Stacker::new(area, 2 * surface.line_height(Font::Big));

    let mut placed = Vec::new();
    for binding in self.layouts.bindings(self.active) {
      let widget = &self.widgets[binding.widget().0];
      if !self.is_shown(widget) {
        continue;
      }
      if let Some(p) = self.place_one(surface, &mut stacker, binding, widget) {
        placed.push(p);
      }
    }
    placed
  }

  fn place_one<'a>(
    &self,
    surface: &impl Surface,
    stacker: &mut Stacker,
    binding: &Binding,
    widget: &'a Multiline<W>,
  ) -> Option<Placed<'a>> {
    let font = widget.font().resolve(self.stat_font);
    let flags = widget.flags();
    let cursor = flags.contains(WidgetFlags::DRAW_CURSOR);

    let rows: Vec<&Line> = if cursor {
      vec![widget.log().cur_line()]
    } else if flags.contains(WidgetFlags::BOTTOM_UP) {
      widget.log().lines().rev().collect()
    } else {
      widget.log().lines().collect()
    };
    if rows.is_empty() {
      return None;
    }

    let mut width = rows
      .iter()
      .map(|l| surface.text_width(font, l.as_str()))
      .max()
      .unwrap_or(0);
    if cursor {
      width += surface.text_width(font, "_");
    }
    let size = Point::new(width, surface.line_height(font) * rows.len() as i32);
    let at = stacker.place(binding, size, flags.contains(WidgetFlags::EXCLUSIVE));

    Some(Placed {
      rows,
      font,
      color: widget.color(),
      at,
      size,
      cursor,
    })
  }

  fn invalidate_active(&mut self) {
    for id in self.layouts.widgets(self.active) {
      self.widgets[id.0].invalidate();
    }
    self.pending = true;
  }

  fn apply_centering(&mut self) {
    self
      .layouts
      .set_centered(self.message, self.options.message_centered);
  }

  fn write_message(&mut self, text: &str) {
    let log = self.widgets[self.message.0].log_mut();
    if text.is_empty() {
      log.clear_all_lines();
    } else if self.options.message_colorized {
      let rules = &self.options.message_highlights;
      log.add_line_with(|line| markup::colorize_into(line, text, rules));
    } else {
      log.add_string_to_cur_line(text);
    }
  }

  fn receive_chat(&mut self, input: &TicInput<'_, W::State>, cues: &mut Vec<Cue>) {
    let session = &input.session;
    for from in 0..MAX_PLAYERS {
      let c = input.chat_chars[from];
      if !session.in_game[from] || from == session.console_player || c == 0 {
        continue;
      }
      if c <= chat::BROADCAST {
        self.chat_dest[from] = c;
        continue;
      }

      let c = if c.is_ascii_lowercase() {
        chat::shift(c)
      } else {
        c
      };
      if !self.inputs[from].add_key(c) || c != chat::KEY_ENTER {
        continue;
      }

      let dest = self.chat_dest[from];
      let for_us = dest as usize == session.console_player + 1 || dest == chat::BROADCAST;
      if for_us && !self.inputs[from].is_empty() {
        let text = format!("{}{}", chat::PLAYER_NAMES[from], self.inputs[from].as_str());
        self.write_message(&text);
        self.messages.show(self.options.chat_tics(), true);
        cues.push(Cue::ChatReceived { from });
      }
      self.inputs[from].clear();
    }
  }
}

fn composer_config(options: &HudOptions) -> ComposerConfig {
  ComposerConfig {
    message_tics: options.message_tics(),
    idle_tics: options.chat_idle_tics(),
    macros: options.chat_macros.clone(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyCode;
  use crossterm::event::KeyModifiers;
  use pretty_assertions::assert_eq;

  #[derive(Default)]
  struct State {
    health: u32,
  }

  enum Content {
    Title,
    Health,
    Armor,
  }

  impl WidgetContent for Content {
    type State = State;

    fn wanted(&self, _: &State, view: ViewMode) -> bool {
      match self {
        Self::Title | Self::Armor => true,
        Self::Health => view.fullscreen,
      }
    }

    fn build(&self, state: &State, lines: &mut multiline::LineLog) {
      match self {
        Self::Title => lines.add_string_to_cur_line("E1M1: HANGAR"),
        Self::Health => {
          lines.add_string_to_cur_line(&format!("HEALTH {}", state.health))
        }
        Self::Armor => lines.add_string_to_cur_line("ARMOR 0"),
      }
    }
  }

  /// A surface that records what was drawn, one unit per character.
  #[derive(Default)]
  struct Recorder {
    text: Vec<(Point, String)>,
    fonts: Vec<(String, Font)>,
    spans: Vec<Vec<(String, Option<ColorRange>)>>,
    cursors: Vec<Point>,
    cleared: Vec<Rect>,
  }

  impl Surface for Recorder {
    fn size(&self) -> Point {
      Point::new(80, 25)
    }
    fn status_bar_height(&self) -> i32 {
      3
    }
    fn text_width(&self, _: Font, text: &str) -> i32 {
      text.chars().count() as i32
    }
    fn line_height(&self, _: Font) -> i32 {
      1
    }
    fn draw_text(&mut self, at: Point, font: Font, line: &Line, _: ColorRange) {
      self.text.push((at, line.as_str().to_string()));
      self.fonts.push((line.as_str().to_string(), font));
      self
        .spans
        .push(line.spans().map(|s| (s.text.to_string(), s.color)).collect());
    }
    fn draw_cursor(&mut self, at: Point, _: Font, _: ColorRange) {
      self.cursors.push(at);
    }
    fn clear(&mut self, rect: Rect) {
      self.cleared.push(rect);
    }
  }

  fn engine(options: HudOptions) -> HudEngine<Content> {
    HudEngine::new(options, Content::Title).unwrap()
  }

  fn tick(hud: &mut HudEngine<Content>, state: &State, fullscreen: bool) -> Vec<Cue> {
    let view = ViewMode {
      automap: false,
      fullscreen,
    };
    tick_view(hud, state, view)
  }

  fn tick_view(hud: &mut HudEngine<Content>, state: &State, view: ViewMode) -> Vec<Cue> {
    hud.tick(&TicInput {
      view,
      session: Session::default(),
      chat_chars: [0; MAX_PLAYERS],
      state,
    })
  }

  fn drawn(hud: &HudEngine<Content>) -> Vec<(Point, String)> {
    let mut r = Recorder::default();
    hud.draw(&mut r);
    r.text
  }

  fn font_of(hud: &HudEngine<Content>, text: &str) -> Option<Font> {
    let mut r = Recorder::default();
    hud.draw(&mut r);
    r.fonts.into_iter().find(|(t, _)| t == text).map(|(_, f)| f)
  }

  fn list_options() -> HudOptions {
    HudOptions {
      message_list: true,
      hud_msg_lines: 3,
      ..HudOptions::default()
    }
  }

  #[test]
  fn default_bindings_in_every_layout() {
    let hud = engine(HudOptions::default());
    for n in 0..layout::MAX_LAYOUTS {
      let ids: Vec<_> = hud.layouts().widgets(n).collect();
      assert_eq!(
        ids,
        vec![
          hud.title_widget(),
          hud.message_widget(),
          hud.chat_widget(),
          hud.secret_widget()
        ]
      );
    }
    assert_eq!(hud.lookup("chat"), None);
    assert_eq!(hud.lookup("MESSAGE"), Some(hud.message_widget()));
  }

  #[test]
  fn nothing_draws_until_the_first_tic() {
    let mut hud = engine(HudOptions::default());
    let state = State::default();
    assert!(!hud.is_running());
    hud.start(&state);
    assert!(hud.is_running());
    hud.post_message("Picked up a clip.");
    assert!(hud.is_pending());
    assert_eq!(drawn(&hud), vec![]);

    tick(&mut hud, &state, false);
    assert!(!hud.is_pending());
    assert_eq!(
      drawn(&hud),
      vec![(Point::new(0, 0), "Picked up a clip.".to_string())]
    );
  }

  #[test]
  fn stat_widgets_rebuild_each_tic_when_wanted() {
    let mut hud = engine(HudOptions::default());
    let health = hud.register(
      "health",
      None,
      Multiline::new(1, WidgetFont::Stat, ColorRange::Green)
        .with_content(Content::Health),
    );
    hud
      .load_layout("HUD 2 health bottomleft", Point::new(80, 25))
      .unwrap();

    let mut state = State { health: 100 };
    hud.start(&state);
    tick(&mut hud, &state, true);
    assert!(hud.widget(health).map_or(false, |w| w.is_built()));
    assert_eq!(
      drawn(&hud),
      vec![(Point::new(0, 24), "HEALTH 100".to_string())]
    );

    state.health = 42;
    tick(&mut hud, &state, true);
    assert_eq!(
      drawn(&hud),
      vec![(Point::new(0, 24), "HEALTH 42".to_string())]
    );

    // Not wanted with the status bar up.
    tick(&mut hud, &state, false);
    assert!(!hud.widget(health).map_or(true, |w| w.is_built()));
    assert_eq!(drawn(&hud), vec![]);
  }

  #[test]
  fn system_message_is_not_preempted() {
    let mut hud = engine(HudOptions::default());
    let state = State::default();
    hud.start(&state);

    hud.post_system_message("Messages OFF");
    tick(&mut hud, &state, false);
    hud.post_message("Picked up a shotgun!");
    tick(&mut hud, &state, false);
    assert_eq!(drawn(&hud), vec![(Point::zero(), "Messages OFF".to_string())]);

    hud.post_system_message("Messages ON");
    tick(&mut hud, &state, false);
    assert_eq!(drawn(&hud), vec![(Point::zero(), "Messages ON".to_string())]);
  }

  #[test]
  fn messages_expire() {
    let options = HudOptions {
      message_timer_ms: 100,
      ..HudOptions::default()
    };
    let tics = options.message_tics();
    let mut hud = engine(options);
    let state = State::default();
    hud.start(&state);
    hud.post_message("hello");
    tick(&mut hud, &state, false);
    for _ in 0..tics {
      assert!(hud.flag(Flag::Message));
      tick(&mut hud, &state, false);
    }
    assert!(!hud.flag(Flag::Message));
    assert_eq!(drawn(&hud), vec![]);
  }

  #[test]
  fn centered_messages_restore_alignment() {
    let mut hud = engine(HudOptions {
      message_centered: true,
      ..HudOptions::default()
    });
    let msg = hud.message_widget();
    assert_eq!(
      hud.layouts().find(0, msg).map(|b| b.h_align()),
      Some(HAlign::Center)
    );

    let mut options = hud.options().clone();
    options.message_centered = false;
    hud.set_options(options);
    assert_eq!(
      hud.layouts().find(0, msg).map(|b| b.h_align()),
      Some(HAlign::Direct)
    );
  }

  #[test]
  fn title_is_announced_then_hidden() {
    let mut hud = engine(HudOptions {
      hud_map_announce: true,
      ..HudOptions::default()
    });
    let state = State::default();
    hud.start(&state);
    tick(&mut hud, &state, false);
    assert_eq!(drawn(&hud), vec![(Point::new(0, 21), "E1M1: HANGAR".to_string())]);

    for _ in 0..ANNOUNCE_TICS {
      tick(&mut hud, &state, false);
    }
    assert!(!hud.flag(Flag::Title));
    assert_eq!(drawn(&hud), vec![]);
  }

  #[test]
  fn incoming_chat_is_delivered() {
    let mut hud = engine(HudOptions::default());
    let state = State::default();
    hud.start(&state);

    let session = Session {
      netgame: true,
      demo_playback: false,
      console_player: 0,
      in_game: [true, true, false, false],
    };
    let mut cues = Vec::new();
    for &c in [chat::BROADCAST, b'h', b'i', chat::KEY_ENTER].iter() {
      cues.extend(hud.tick(&TicInput {
        view: ViewMode::default(),
        session,
        chat_chars: [0, c, 0, 0],
        state: &state,
      }));
    }
    assert_eq!(cues, vec![Cue::ChatReceived { from: 1 }]);
    assert_eq!(drawn(&hud), vec![(Point::zero(), "Indigo: HI".to_string())]);

    // Guarded: an ordinary message waits.
    hud.post_message("Picked up a clip.");
    tick(&mut hud, &state, false);
    assert_eq!(drawn(&hud), vec![(Point::zero(), "Indigo: HI".to_string())]);
  }

  #[test]
  fn chat_line_draws_with_cursor() {
    let mut hud = engine(HudOptions::default());
    let state = State::default();
    hud.start(&state);
    let session = Session {
      netgame: true,
      demo_playback: false,
      console_player: 0,
      in_game: [true, true, false, false],
    };
    for c in "tgo".chars() {
      hud.respond(&KeyInput::down(KeyCode::Char(c), KeyModifiers::empty()), &session);
    }
    tick(&mut hud, &state, false);

    let mut r = Recorder::default();
    hud.draw(&mut r);
    assert_eq!(r.text, vec![(Point::zero(), "GO".to_string())]);
    assert_eq!(r.cursors, vec![Point::new(2, 0)]);
    assert_eq!(hud.dequeue_chat_char(), Some(chat::BROADCAST));
  }

  #[test]
  fn erase_clears_shown_widgets() {
    let mut hud = engine(HudOptions::default());
    let state = State::default();
    hud.start(&state);
    hud.post_message("abc");
    tick(&mut hud, &state, false);

    let mut r = Recorder::default();
    hud.erase(&mut r);
    assert_eq!(
      r.cleared,
      vec![Rect::new(Point::zero(), Point::new(3, 1))]
    );

    tick(&mut hud, &state, true);
    let mut r = Recorder::default();
    hud.erase(&mut r);
    assert_eq!(r.cleared, vec![]);
  }

  #[test]
  fn bad_layout_resource_changes_nothing() {
    let mut hud = engine(HudOptions::default());
    let before = hud.layouts().clone();
    let err = hud
      .load_layout("HUD 0 title topright HUD 99", Point::new(80, 25))
      .unwrap_err();
    assert!(matches!(err, ConfigError::Layout { layout: 99, .. }));
    assert_eq!(hud.layouts(), &before);
  }

  #[test]
  fn layout_selection_is_clamped() {
    let mut hud = engine(HudOptions::default());
    hud.set_layout(7);
    assert_eq!(hud.active_layout(), layout::MAX_LAYOUTS - 1);
    hud.set_layout(0);
    assert_eq!(hud.active_layout(), 0);
  }

  #[test]
  fn secret_is_announced_then_hidden() {
    let mut hud = engine(HudOptions::default());
    let state = State::default();
    hud.start(&state);
    hud.reveal_secret("A secret is revealed!");
    tick(&mut hud, &state, false);
    assert!(hud.flag(Flag::Secret));
    // Centered, two big lines above the middle of the 22-row view.
    assert_eq!(
      drawn(&hud),
      vec![(Point::new(29, 8), "A secret is revealed!".to_string())]
    );

    for _ in 1..ANNOUNCE_TICS {
      tick(&mut hud, &state, false);
    }
    assert!(hud.flag(Flag::Secret));
    tick(&mut hud, &state, false);
    assert!(!hud.flag(Flag::Secret));
    assert_eq!(drawn(&hud), vec![]);
  }

  #[test]
  fn secret_notices_can_be_turned_off() {
    let mut hud = engine(HudOptions {
      hud_secret_message: false,
      ..HudOptions::default()
    });
    let state = State::default();
    hud.start(&state);
    hud.reveal_secret("A secret is revealed!");
    tick(&mut hud, &state, false);
    assert!(!hud.flag(Flag::Secret));
    assert_eq!(drawn(&hud), vec![]);
  }

  #[test]
  fn message_list_keeps_latest_lines() {
    let mut hud = engine(list_options());
    let state = State::default();
    hud.start(&state);
    for msg in ["one", "two", "three", "four"].iter() {
      hud.post_message(msg);
      tick(&mut hud, &state, false);
    }
    assert_eq!(
      drawn(&hud),
      vec![
        (Point::new(0, 0), "two".to_string()),
        (Point::new(0, 1), "three".to_string()),
        (Point::new(0, 2), "four".to_string()),
      ]
    );
  }

  #[test]
  fn empty_message_clears_list() {
    let mut hud = engine(list_options());
    let state = State::default();
    hud.start(&state);
    for msg in ["one", "two"].iter() {
      hud.post_message(msg);
      tick(&mut hud, &state, false);
    }
    hud.post_message("");
    tick(&mut hud, &state, false);

    let lines = hud
      .widget(hud.message_widget())
      .map(|w| w.log().lines().count());
    assert_eq!(lines, Some(0));
    assert_eq!(drawn(&hud), vec![]);
  }

  #[test]
  fn colorized_messages_split_highlights() {
    let mut hud = engine(HudOptions {
      message_colorized: true,
      ..HudOptions::default()
    });
    let state = State::default();
    hud.start(&state);
    hud.post_message("Picked up a blue keycard.");
    tick(&mut hud, &state, false);

    let mut r = Recorder::default();
    hud.draw(&mut r);
    assert_eq!(
      r.spans,
      vec![vec![
        ("Picked up a".to_string(), None),
        (" blue ".to_string(), Some(ColorRange::Blue2)),
        ("keycard.".to_string(), None),
      ]]
    );
  }

  #[test]
  fn stat_font_follows_option() {
    let mut hud = engine(HudOptions {
      hud_widget_font: 1,
      ..HudOptions::default()
    });
    hud.register(
      "armor",
      None,
      Multiline::new(1, WidgetFont::Stat, ColorRange::Green)
        .with_content(Content::Armor),
    );
    hud
      .load_layout("HUD 2 armor bottomleft", Point::new(80, 25))
      .unwrap();
    let state = State::default();
    hud.start(&state);
    let map = ViewMode {
      automap: true,
      fullscreen: false,
    };

    tick_view(&mut hud, &state, ViewMode::default());
    assert_eq!(font_of(&hud, "ARMOR 0"), Some(Font::Small));
    tick_view(&mut hud, &state, map);
    assert_eq!(font_of(&hud, "ARMOR 0"), Some(Font::Big));

    let mut options = hud.options().clone();
    options.hud_widget_font = 2;
    hud.set_options(options);
    tick_view(&mut hud, &state, map);
    assert_eq!(font_of(&hud, "ARMOR 0"), Some(Font::Small));
    tick_view(&mut hud, &state, ViewMode::default());
    assert_eq!(font_of(&hud, "ARMOR 0"), Some(Font::Big));
  }

  #[test]
  fn foreign_widgets_are_rejected() {
    let mut hud = engine(HudOptions::default());
    let mut other = engine(HudOptions::default());
    let id = other.register(
      "armor",
      None,
      Multiline::new(1, WidgetFont::Stat, ColorRange::Green),
    );
    let before = hud.layouts().clone();

    let err = hud
      .bind(0, id, HAlign::Left, VAlign::Top, Point::zero())
      .unwrap_err();
    assert_eq!(err, LayoutError::NoSuchWidget { widget: 4 });
    assert!(hud.widget(id).is_none());
    assert_eq!(hud.layouts(), &before);
  }
}
