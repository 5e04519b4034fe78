//! The outgoing chat character queue.
//!
//! Keys typed while composing a chat message arrive whenever the terminal
//! delivers them, possibly several per poll (a macro expands to dozens), but
//! only one character per tic can ride along in a network command. The
//! [`ChatQueue`] sits between the two.

/// Capacity of the chat queue. Must be a power of two.
pub const QUEUE_SIZE: usize = 128;

/// The number of player slots.
pub const MAX_PLAYERS: usize = 4;

/// Chat destination code meaning "everyone". Codes `1..=MAX_PLAYERS` address
/// a single player (player index plus one).
pub const BROADCAST: u8 = 5;

/// The prefix a received chat line gets, by sending player.
pub const PLAYER_NAMES: [&str; MAX_PLAYERS] =
  ["Green: ", "Indigo: ", "Brown: ", "Red: "];

/// Chat control character: the enter key.
pub const KEY_ENTER: u8 = 13;
/// Chat control character: the escape key.
pub const KEY_ESCAPE: u8 = 27;
/// Chat control character: the backspace key.
pub const KEY_BACKSPACE: u8 = 0x7f;

/// Returned by [`ChatQueue::enqueue()`] when the queue has no room left.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct QueueFull(pub u8);

/// A fixed-size circular queue of chat characters.
///
/// One slot is always left empty so that "full" and "empty" can be told apart
/// from the indices alone; the queue therefore holds at most
/// `QUEUE_SIZE - 1` characters.
#[derive(Clone)]
pub struct ChatQueue {
  chars: [u8; QUEUE_SIZE],
  head: usize,
  tail: usize,
}

impl ChatQueue {
  /// Creates an empty `ChatQueue`.
  pub fn new() -> Self {
    Self {
      chars: [0; QUEUE_SIZE],
      head: 0,
      tail: 0,
    }
  }

  /// Returns whether the queue holds no characters.
  pub fn is_empty(&self) -> bool {
    self.head == self.tail
  }

  /// Returns whether the next [`enqueue()`](Self::enqueue) would fail.
  pub fn is_full(&self) -> bool {
    (self.head + 1) & (QUEUE_SIZE - 1) == self.tail
  }

  /// Returns the number of queued characters.
  pub fn len(&self) -> usize {
    self.head.wrapping_sub(self.tail) & (QUEUE_SIZE - 1)
  }

  /// Adds `c` to the back of the queue.
  ///
  /// A full queue rejects the character without touching its indices.
  pub fn enqueue(&mut self, c: u8) -> Result<(), QueueFull> {
    if self.is_full() {
      return Err(QueueFull(c));
    }
    self.chars[self.head] = c;
    self.head = (self.head + 1) & (QUEUE_SIZE - 1);
    Ok(())
  }

  /// Removes the character at the front of the queue, if any.
  pub fn dequeue(&mut self) -> Option<u8> {
    if self.is_empty() {
      return None;
    }
    let c = self.chars[self.tail];
    self.tail = (self.tail + 1) & (QUEUE_SIZE - 1);
    Some(c)
  }

  /// Discards every queued character.
  pub fn clear(&mut self) {
    self.head = 0;
    self.tail = 0;
  }
}

impl Default for ChatQueue {
  fn default() -> Self {
    Self::new()
  }
}

/// Returns the scolding for the `n`th attempt to chat with yourself.
pub fn talk_to_self(n: u32) -> &'static str {
  match n {
    0..=2 => "You mumble to yourself",
    3..=5 => "Who's there?",
    6..=8 => "You scare yourself",
    9..=31 => "You start to rave",
    _ => "You've lost it...",
  }
}

/// Returns the character produced by `c` with shift held, on a US keyboard.
///
/// Lowercase letters become uppercase; the HUD font has no lowercase glyphs,
/// so this is applied to every letter typed into chat.
pub fn shift(c: u8) -> u8 {
  match c {
    b'a'..=b'z' => c.to_ascii_uppercase(),
    b'\'' => b'"',
    b',' => b'<',
    b'-' => b'_',
    b'.' => b'>',
    b'/' => b'?',
    b'0' => b')',
    b'1' => b'!',
    b'2' => b'@',
    b'3' => b'#',
    b'4' => b'$',
    b'5' => b'%',
    b'6' => b'^',
    b'7' => b'&',
    b'8' => b'*',
    b'9' => b'(',
    b';' => b':',
    b'=' => b'+',
    b'\\' => b'!',
    b'`' => b'\'',
    _ => c,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn full_after_capacity_minus_one() {
    let mut q = ChatQueue::new();
    for i in 0..QUEUE_SIZE - 1 {
      assert!(!q.is_full(), "full too early at {}", i);
      q.enqueue(b'A' + (i % 26) as u8).unwrap();
    }
    assert!(q.is_full());
    assert_eq!(q.len(), QUEUE_SIZE - 1);

    let head = q.head;
    assert_eq!(q.enqueue(b'!'), Err(QueueFull(b'!')));
    assert_eq!(q.head, head);
    assert_eq!(q.len(), QUEUE_SIZE - 1);
  }

  #[test]
  fn dequeue_is_fifo_then_empty() {
    let mut q = ChatQueue::new();
    for &c in b"HELLO" {
      q.enqueue(c).unwrap();
    }
    let out: Vec<u8> = std::iter::from_fn(|| q.dequeue()).collect();
    assert_eq!(out, b"HELLO".to_vec());
    assert!(q.is_empty());
    assert_eq!(q.dequeue(), None);
  }

  #[test]
  fn indices_wrap_around() {
    let mut q = ChatQueue::new();
    for round in 0..3 {
      for i in 0..100u8 {
        q.enqueue(i).unwrap();
      }
      for i in 0..100u8 {
        assert_eq!(q.dequeue(), Some(i), "round {}", round);
      }
    }
    assert!(q.is_empty());
  }

  #[test]
  fn shift_uppercases_and_maps_symbols() {
    assert_eq!(shift(b'g'), b'G');
    assert_eq!(shift(b'1'), b'!');
    assert_eq!(shift(b'G'), b'G');
    assert_eq!(shift(b' '), b' ');
  }

  #[test]
  fn scolding_escalates() {
    assert_eq!(talk_to_self(1), "You mumble to yourself");
    assert_eq!(talk_to_self(3), "Who's there?");
    assert_eq!(talk_to_self(40), "You've lost it...");
  }
}
