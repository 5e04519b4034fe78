//! Text line buffers.
//!
//! A [`Line`] is a bounded run of HUD text. Color changes inside a line are
//! kept as a list of *runs* (offsets where a new color range starts) rather
//! than as escape bytes embedded in the text, so editing and truncation can
//! never leave half of a color code behind.

use crate::gfx::texel::ColorRange;
use crate::hud::chat;

/// The longest line any HUD widget holds, in characters.
pub const MAX_LINE_LEN: usize = 120;

/// A bounded, editable line of colored text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
  text: String,
  // Invariant: starts are strictly increasing and < text.len().
  runs: Vec<Run>,
  len: usize,
  cap: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Run {
  start: usize,
  color: Option<ColorRange>,
}

/// A borrowed stretch of a [`Line`] drawn in one color.
///
/// A `color` of `None` means the owning widget's own color range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Span<'a> {
  /// The text of this span.
  pub text: &'a str,
  /// The color range override for this span, if any.
  pub color: Option<ColorRange>,
}

impl Line {
  /// Creates an empty line holding at most `cap` characters.
  pub fn new(cap: usize) -> Self {
    Self {
      text: String::with_capacity(cap),
      runs: Vec::new(),
      len: 0,
      cap,
    }
  }

  /// Returns the number of characters in this line.
  pub fn len(&self) -> usize {
    self.len
  }

  /// Returns whether this line holds no characters.
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Returns the maximum number of characters this line can hold.
  pub fn capacity(&self) -> usize {
    self.cap
  }

  /// Returns the plain text of this line, without color information.
  pub fn as_str(&self) -> &str {
    &self.text
  }

  /// Empties this line, keeping its storage.
  pub fn clear(&mut self) {
    self.text.clear();
    self.runs.clear();
    self.len = 0;
  }

  /// Appends `c` in the current color.
  ///
  /// Returns `false`, and leaves the line untouched, if the line is full.
  pub fn push_char(&mut self, c: char) -> bool {
    let color = self.current_color();
    self.push_colored(c, color)
  }

  /// Appends `c` in the given color range.
  ///
  /// Returns `false`, and leaves the line untouched, if the line is full.
  pub fn push_colored(&mut self, c: char, color: Option<ColorRange>) -> bool {
    if self.len >= self.cap {
      return false;
    }
    if self.current_color() != color {
      self.runs.push(Run {
        start: self.text.len(),
        color,
      });
    }
    self.text.push(c);
    self.len += 1;
    true
  }

  /// Appends as much of `s` as fits, in the current color.
  ///
  /// Returns the number of characters appended.
  pub fn push_str(&mut self, s: &str) -> usize {
    let color = self.current_color();
    self.push_span(s, color)
  }

  /// Appends as much of `s` as fits, in the given color range.
  ///
  /// Returns the number of characters appended.
  pub fn push_span(&mut self, s: &str, color: Option<ColorRange>) -> usize {
    s.chars().take_while(|&c| self.push_colored(c, color)).count()
  }

  /// Removes the last character, if there is one.
  pub fn backspace(&mut self) -> bool {
    if self.text.pop().is_none() {
      return false;
    }
    self.len -= 1;
    if let Some(run) = self.runs.last() {
      if run.start >= self.text.len() {
        self.runs.pop();
      }
    }
    true
  }

  /// Applies one chat key to this line.
  ///
  /// Printable characters of the HUD font are appended, backspace deletes,
  /// and enter is accepted without changing the line. Returns whether the key
  /// was consumed; a printable key is consumed even when the line is full.
  pub fn add_key(&mut self, key: u8) -> bool {
    match key {
      b' '..=b'_' => {
        self.push_char(key as char);
        true
      }
      chat::KEY_BACKSPACE => {
        self.backspace();
        true
      }
      chat::KEY_ENTER => true,
      _ => false,
    }
  }

  /// Returns the colored spans making up this line, in order.
  pub fn spans(&self) -> impl Iterator<Item = Span<'_>> + '_ {
    let head_end = self.runs.first().map(|r| r.start).unwrap_or(self.text.len());
    let head = if head_end > 0 {
      Some(Span {
        text: &self.text[..head_end],
        color: None,
      })
    } else {
      None
    };

    let tail = self.runs.iter().enumerate().map(move |(i, run)| {
      let end = self
        .runs
        .get(i + 1)
        .map(|r| r.start)
        .unwrap_or(self.text.len());
      Span {
        text: &self.text[run.start..end],
        color: run.color,
      }
    });

    head.into_iter().chain(tail)
  }

  fn current_color(&self) -> Option<ColorRange> {
    self.runs.last().and_then(|r| r.color)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn spans(line: &Line) -> Vec<(String, Option<ColorRange>)> {
    line.spans().map(|s| (s.text.to_string(), s.color)).collect()
  }

  #[test]
  fn push_char_stops_at_capacity() {
    let mut line = Line::new(3);
    assert!(line.push_char('a'));
    assert!(line.push_char('b'));
    assert!(line.push_char('c'));
    assert!(!line.push_char('d'));
    assert_eq!(line.as_str(), "abc");
    assert_eq!(line.len(), 3);
  }

  #[test]
  fn push_str_truncates() {
    let mut line = Line::new(5);
    assert_eq!(line.push_str("hello world"), 5);
    assert_eq!(line.as_str(), "hello");
    assert_eq!(line.push_str("!"), 0);
  }

  #[test]
  fn backspace_on_empty_is_noop() {
    let mut line = Line::new(4);
    assert!(!line.backspace());
    line.push_str("ab");
    assert!(line.backspace());
    assert_eq!(line.as_str(), "a");
  }

  #[test]
  fn colored_runs_survive_editing() {
    let mut line = Line::new(32);
    line.push_str("Picked up a");
    line.push_span(" blue ", Some(ColorRange::Blue2));
    line.push_span("keycard", None);
    assert_eq!(
      spans(&line),
      vec![
        ("Picked up a".to_string(), None),
        (" blue ".to_string(), Some(ColorRange::Blue2)),
        ("keycard".to_string(), None),
      ]
    );

    for _ in 0.."keycard".len() {
      line.backspace();
    }
    assert_eq!(
      spans(&line),
      vec![
        ("Picked up a".to_string(), None),
        (" blue ".to_string(), Some(ColorRange::Blue2)),
      ]
    );

    // Truncation at capacity only ever cuts whole characters.
    let mut short = Line::new(3);
    short.push_span("ab", Some(ColorRange::Red));
    short.push_span("cd", None);
    assert_eq!(
      spans(&short),
      vec![
        ("ab".to_string(), Some(ColorRange::Red)),
        ("c".to_string(), None),
      ]
    );
  }

  #[test]
  fn add_key_edits_like_chat() {
    let mut line = Line::new(8);
    assert!(line.add_key(b'H'));
    assert!(line.add_key(b'I'));
    assert!(line.add_key(chat::KEY_BACKSPACE));
    assert!(line.add_key(chat::KEY_ENTER));
    assert!(!line.add_key(b'a'));
    assert!(!line.add_key(0x01));
    assert_eq!(line.as_str(), "H");
  }
}
