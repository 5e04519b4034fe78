//! Tic-driven visibility timers.
//!
//! Every transient HUD line (messages, the secret notice, chat composition,
//! the level title) follows the same shape: something turns it on for a
//! number of tics, and it turns itself off when the count runs out. Only the
//! tick pass advances these; drawing just reads them.

/// A countdown that keeps a line visible for a number of tics.
///
/// States are *idle* (`on == false`) and *showing* (`on == true`). A showing
/// countdown with a positive counter goes idle on exactly the tic its counter
/// reaches zero. A countdown shown with zero tics is *held*: it stays on
/// until [`hide()`](Self::hide) is called.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Countdown {
  on: bool,
  counter: u32,
}

impl Countdown {
  /// Creates an idle `Countdown`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns whether the line is currently shown.
  pub fn is_on(&self) -> bool {
    self.on
  }

  /// Returns the number of tics left before the line hides itself.
  pub fn remaining(&self) -> u32 {
    self.counter
  }

  /// Shows the line for `tics` tics, restarting any running count.
  ///
  /// Zero tics holds the line on indefinitely.
  pub fn show(&mut self, tics: u32) {
    self.on = true;
    self.counter = tics;
  }

  /// Hides the line immediately.
  pub fn hide(&mut self) {
    self.on = false;
    self.counter = 0;
  }

  /// Advances the countdown by one tic.
  ///
  /// Returns `true` on the tic the line goes idle because its count expired.
  pub fn tick(&mut self) -> bool {
    if self.counter == 0 {
      return false;
    }
    self.counter -= 1;
    if self.counter == 0 {
      self.on = false;
      return true;
    }
    false
  }
}

/// A message the game wants shown on the message line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
  /// The text of the message; empty clears the message line.
  pub text: String,
  /// Whether this is a system notice (such as "Messages OFF") that must be
  /// seen even while ordinary messages are suppressed.
  pub system: bool,
}

/// The message line's state machine.
///
/// On top of the [`Countdown`], the message line carries a single guard: a
/// message that must not be interrupted (a system notice, or a received chat
/// line) blocks ordinary messages until it expires. Only another system
/// message may replace it.
#[derive(Clone, Debug, Default)]
pub struct MessageState {
  timer: Countdown,
  pending: Option<Message>,
  no_interrupt: bool,
  shown_any: bool,
}

impl MessageState {
  /// Creates an idle `MessageState`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns whether the message line is currently shown.
  pub fn is_on(&self) -> bool {
    self.timer.is_on()
  }

  /// Returns the number of tics left before the message line hides itself.
  pub fn remaining(&self) -> u32 {
    self.timer.remaining()
  }

  /// Returns whether the message currently shown blocks ordinary messages.
  pub fn is_guarded(&self) -> bool {
    self.no_interrupt
  }

  /// Queues `message` for the next tic.
  ///
  /// Only the latest message posted within a tic survives, except that an
  /// ordinary message never replaces a system message waiting in the same
  /// tic.
  pub fn post(&mut self, message: Message) {
    if let Some(waiting) = &self.pending {
      if waiting.system && !message.system {
        return;
      }
    }
    self.pending = Some(message);
  }

  /// Advances the countdown by one tic, dropping the guard on expiry.
  pub fn tick(&mut self) {
    if self.timer.tick() {
      self.no_interrupt = false;
    }
  }

  /// Takes the pending message if it may be shown now.
  ///
  /// `show_messages` is the player's message toggle; system messages bypass
  /// it. An ordinary message arriving while a guarded message is up stays
  /// pending and is retried on later tics.
  pub fn take_pending(&mut self, show_messages: bool) -> Option<Message> {
    let system = match &self.pending {
      Some(m) => m.system,
      None => return None,
    };
    if !(show_messages || system) {
      // Ordinary messages are dropped while messages are turned off.
      self.pending = None;
      return None;
    }
    if self.no_interrupt && !system {
      return None;
    }
    self.pending.take()
  }

  /// Shows the message line for `tics` tics.
  ///
  /// `guarded` makes the newly shown message uninterruptible by ordinary
  /// messages until it expires.
  pub fn show(&mut self, tics: u32, guarded: bool) {
    self.timer.show(tics);
    self.no_interrupt = guarded;
    self.shown_any = true;
  }

  /// Re-shows the last message, for message review.
  ///
  /// Does nothing if no message was ever shown.
  pub fn review(&mut self, tics: u32) -> bool {
    if !self.shown_any {
      return false;
    }
    self.timer.show(tics);
    true
  }

  /// Returns to the idle state, forgetting any pending message.
  pub fn reset(&mut self) {
    *self = Self::default();
  }
}
