//! Input processing utilties.

use std::collections::HashSet;

use crate::gfx::Curses;
use crate::hud::responder::KeyInput;
use crate::timing::SystemTimer;

pub use crossterm::event::KeyCode;
pub use crossterm::event::KeyEvent;
pub use crossterm::event::KeyModifiers;

/// A tracker for a frame's key presses.
///
/// Due to the nature of teletype terminals, the only inputs we can really
/// capture are key-presses as recorded by the VT100 emulator; there are no
/// key releases. A key that was pressed last frame but not this one is
/// therefore reported released at the start of this frame.
///
/// At the begining of each frame [`start_frame()`](Self::start_frame) should
/// be called to load up that frame's inputs.
pub struct UserInput {
  keys: HashSet<KeyCode>,
  held: HashSet<KeyCode>,
  mods: KeyModifiers,
  events: Vec<KeyInput>,
}

impl UserInput {
  /// Creates a new `UserInput`.
  pub fn new() -> Self {
    Self {
      keys: HashSet::new(),
      held: HashSet::new(),
      mods: KeyModifiers::empty(),
      events: Vec::new(),
    }
  }

  /// Checks whether `code` was pressed this frame.
  ///
  /// Letters are matched case-insensitively.
  pub fn has_key(&self, code: KeyCode) -> bool {
    self.keys.contains(&fold(code))
  }

  /// Checks whether `mod` was held this frame.
  pub fn has_mod(&self, m: KeyModifiers) -> bool {
    self.mods.contains(m)
  }

  /// Returns this frame's key events, releases first, in arrival order.
  pub fn events(&self) -> &[KeyInput] {
    &self.events
  }

  /// Clears internal buffers and loads this frame's `keys`.
  pub fn start_frame(&mut self, keys: impl IntoIterator<Item = KeyEvent>) {
    self.keys.clear();
    self.events.clear();
    self.mods = KeyModifiers::empty();

    let mut pressed = HashSet::new();
    let mut downs = Vec::new();
    for e in keys {
      self.keys.insert(fold(e.code));
      pressed.insert(e.code);
      self.mods |= e.modifiers;
      downs.push(KeyInput::down(e.code, e.modifiers));
    }

    let mut released: Vec<KeyCode> = self
      .held
      .iter()
      .filter(|k| !pressed.contains(k))
      .copied()
      .collect();
    // HashSet order is arbitrary; keep releases deterministic.
    released.sort_by_key(|k| format!("{:?}", k));
    self.events.extend(released.into_iter().map(KeyInput::up));
    self.events.extend(downs);

    self.held = pressed;
  }
}

impl Default for UserInput {
  fn default() -> Self {
    Self::new()
  }
}

fn fold(code: KeyCode) -> KeyCode {
  match code {
    KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
    k => k,
  }
}

/// System: Loads inputs from the terminal into a [`UserInput`] for
/// processing on a given frame.
#[legion::system]
pub fn start_frame(
  #[resource] input: &mut UserInput,
  #[resource] window: &mut Curses,
  #[resource] timer: &SystemTimer,
) {
  let _t = timer.start("input::start_frame()");
  match window.keys() {
    Ok(keys) => input.start_frame(keys),
    Err(e) => {
      log::error!("failed to read input: {}", e);
      input.start_frame(Vec::new());
    }
  }
}
