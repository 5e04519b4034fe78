//! Chat composition.
//!
//! The [`Composer`] owns everything about typing a chat message: whether
//! chat is open, the outgoing [`ChatQueue`], backspace auto-repeat, and the
//! keys that start a chat. It responds to key events between tics, and is
//! ticked along with the rest of the HUD.

use crossterm::event::KeyCode;
use crossterm::event::KeyModifiers;

use crate::hud::chat;
use crate::hud::chat::ChatQueue;
use crate::hud::chat::MAX_PLAYERS;
use crate::hud::multiline::LineLog;
use crate::hud::timer::Countdown;
use crate::hud::timer::Message;
use crate::hud::timer::MessageState;

/// Posted when the chat queue overflows.
pub const MSG_UNSENT: &str = "[Message unsent]";

/// Whether a key went down or came back up.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum KeyState {
  /// Pressed, or repeated by the terminal.
  Down,
  /// Released.
  Up,
}

/// A key event, as seen by the HUD.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct KeyInput {
  /// The key.
  pub code: KeyCode,
  /// Modifiers held along with it.
  pub modifiers: KeyModifiers,
  /// Whether it went down or up.
  pub state: KeyState,
}

impl KeyInput {
  /// Creates a key-down event.
  pub fn down(code: KeyCode, modifiers: KeyModifiers) -> Self {
    Self {
      code,
      modifiers,
      state: KeyState::Down,
    }
  }

  /// Creates a key-up event.
  pub fn up(code: KeyCode) -> Self {
    Self {
      code,
      modifiers: KeyModifiers::empty(),
      state: KeyState::Up,
    }
  }

  /// Returns the chat character this key types, or zero.
  fn chat_char(&self) -> u8 {
    match self.code {
      KeyCode::Char(c) if c.is_ascii() => c as u8,
      KeyCode::Enter => chat::KEY_ENTER,
      KeyCode::Esc => chat::KEY_ESCAPE,
      KeyCode::Backspace => chat::KEY_BACKSPACE,
      _ => 0,
    }
  }
}

/// The keys chat responds to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatKeys {
  /// Starts a chat to everyone.
  pub chat: KeyCode,
  /// Starts a chat to one player, by player index.
  pub dest: [KeyCode; MAX_PLAYERS],
  /// Sends the chat line, or reviews messages when not chatting.
  pub enter: KeyCode,
  /// Deletes the last character, repeating while held.
  pub backspace: KeyCode,
}

impl Default for ChatKeys {
  fn default() -> Self {
    Self {
      chat: KeyCode::Char('t'),
      dest: [
        KeyCode::Char('g'),
        KeyCode::Char('i'),
        KeyCode::Char('b'),
        KeyCode::Char('r'),
      ],
      enter: KeyCode::Enter,
      backspace: KeyCode::Backspace,
    }
  }
}

/// What the composer needs to know about the game session.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Session {
  /// Whether this is a network game.
  pub netgame: bool,
  /// Whether a demo is being played back.
  pub demo_playback: bool,
  /// The local player's index.
  pub console_player: usize,
  /// Which player slots are in the game.
  pub in_game: [bool; MAX_PLAYERS],
}

impl Session {
  /// Returns the number of players in the game.
  pub fn players(&self) -> usize {
    self.in_game.iter().filter(|&&p| p).count()
  }
}

/// Durations and canned text the composer works with.
#[derive(Clone, Debug, Default)]
pub struct ComposerConfig {
  /// How long reviewed messages stay up, in tics.
  pub message_tics: u32,
  /// How long chat may idle before it closes, in tics; zero never closes it.
  pub idle_tics: u32,
  /// Chat macros, sent with Alt and a digit.
  pub macros: Vec<String>,
}

// Backspace repeats once its hold counter passes REPEAT_DELAY, and the counter
// then falls back to REPEAT_RESET.
const REPEAT_DELAY: u32 = 9;
const REPEAT_RESET: u32 = 8;

/// Chat composition state.
#[derive(Clone, Default)]
pub struct Composer {
  keys: ChatKeys,
  config: ComposerConfig,
  open: Countdown,
  queue: ChatQueue,
  backspace: Option<u32>,
  nobrainers: u32,
}

impl Composer {
  /// Creates a closed `Composer`.
  pub fn new(keys: ChatKeys, config: ComposerConfig) -> Self {
    Self {
      keys,
      config,
      ..Self::default()
    }
  }

  /// Returns whether a chat message is being composed.
  pub fn is_on(&self) -> bool {
    self.open.is_on()
  }

  /// Closes chat, forgets any queued characters, and takes up `config`.
  pub fn reset(&mut self, config: ComposerConfig) {
    self.config = config;
    self.open.hide();
    self.queue.clear();
    self.backspace = None;
  }

  /// Removes the next outgoing chat character, if any.
  ///
  /// The network layer calls this once per tic, to fill in the local
  /// player's command.
  pub fn dequeue(&mut self) -> Option<u8> {
    self.queue.dequeue()
  }

  /// Returns the outgoing chat queue.
  pub fn queue(&self) -> &ChatQueue {
    &self.queue
  }

  /// Advances backspace repeat and the idle timeout by one tic.
  pub fn tick(&mut self, line: &mut LineLog, messages: &mut MessageState) {
    let repeat = match &mut self.backspace {
      Some(held) => {
        let was = *held;
        *held += 1;
        if was > REPEAT_DELAY {
          *held = REPEAT_RESET;
        }
        was > REPEAT_DELAY
      }
      None => false,
    };
    if repeat && self.open.is_on() && line.add_key_to_cur_line(chat::KEY_BACKSPACE)
    {
      self.send(chat::KEY_BACKSPACE, messages);
    }

    if self.open.tick() {
      log::debug!("chat closed after idling");
    }
  }

  /// Responds to a key event.
  ///
  /// `line` is the chat widget's text, and `messages` the message line that
  /// notices go to. Returns whether the key was eaten.
  pub fn respond(
    &mut self,
    key: &KeyInput,
    session: &Session,
    line: &mut LineLog,
    messages: &mut MessageState,
  ) -> bool {
    let mut c = match key.state {
      KeyState::Down => key.chat_char(),
      KeyState::Up => 0,
    };

    if key.code == self.keys.backspace {
      match key.state {
        KeyState::Down => {
          if self.backspace.is_none() {
            self.backspace = Some(0);
          }
          c = chat::KEY_BACKSPACE;
        }
        KeyState::Up => self.backspace = None,
      }
    }

    if key.state == KeyState::Up {
      return false;
    }

    if !self.is_on() {
      return self.respond_closed(key, session, line, messages);
    }

    if key.code == self.keys.enter {
      c = chat::KEY_ENTER;
    }

    if key.modifiers.contains(KeyModifiers::ALT) {
      let index = match c.checked_sub(b'0') {
        Some(i) if i <= 9 => i as usize,
        _ => return false,
      };
      let text = self.config.macros.get(index).cloned().unwrap_or_default();
      self.send(chat::KEY_ENTER, messages);
      for &b in text.as_bytes() {
        self.send(b, messages);
      }
      self.send(chat::KEY_ENTER, messages);

      self.open.hide();
      messages.post(Message {
        text,
        system: false,
      });
      return true;
    }

    if key.modifiers.contains(KeyModifiers::SHIFT) || c.is_ascii_lowercase() {
      c = chat::shift(c);
    }
    let eaten = line.add_key_to_cur_line(c);
    if eaten {
      self.send(c, messages);
      self.open.show(self.config.idle_tics);
    }

    match c {
      chat::KEY_ENTER => {
        self.open.hide();
        let sent = line.cur_line().as_str();
        if !sent.is_empty() {
          messages.post(Message {
            text: sent.to_string(),
            system: false,
          });
        }
      }
      chat::KEY_ESCAPE => self.open.hide(),
      _ => {}
    }
    eaten
  }

  fn respond_closed(
    &mut self,
    key: &KeyInput,
    session: &Session,
    line: &mut LineLog,
    messages: &mut MessageState,
  ) -> bool {
    if key.code == self.keys.enter {
      messages.review(self.config.message_tics);
      return true;
    }

    if session.demo_playback || !session.netgame {
      return false;
    }

    if key.code == self.keys.chat {
      self.start(line);
      self.send(chat::BROADCAST, messages);
      return true;
    }

    if session.players() <= 2 {
      return false;
    }
    let dest = match self.keys.dest.iter().position(|&k| k == key.code) {
      Some(dest) => dest,
      None => return false,
    };

    if dest == session.console_player {
      self.nobrainers += 1;
      messages.post(Message {
        text: chat::talk_to_self(self.nobrainers).to_string(),
        system: false,
      });
      return false;
    }
    if !session.in_game[dest] {
      return false;
    }
    self.start(line);
    self.send(dest as u8 + 1, messages);
    true
  }

  fn start(&mut self, line: &mut LineLog) {
    line.cur_line_mut().clear();
    self.open.show(self.config.idle_tics);
  }

  fn send(&mut self, c: u8, messages: &mut MessageState) {
    if let Err(chat::QueueFull(c)) = self.queue.enqueue(c) {
      log::warn!("chat queue full, dropped {:?}", c as char);
      messages.post(Message {
        text: MSG_UNSENT.to_string(),
        system: false,
      });
    }
  }
}
