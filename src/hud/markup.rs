//! Colored text building.
//!
//! Text reaches the HUD in two ways: widget contents built by a
//! [`WidgetContent`](crate::hud::multiline::WidgetContent), which compose
//! [`Styled`] segments directly, and messages posted by the game, which may
//! carry inline color escapes (an escape byte followed by `'0' + index`, or
//! `'/'` for "back to the widget color"). Both end up as colored runs in a
//! [`Line`]; escapes never survive into line storage.

use serde::Deserialize;
use serde::Serialize;

use crate::gfx::texel::ColorRange;
use crate::hud::line::Line;

/// The byte that starts an inline color escape.
pub const ESCAPE: char = '\x1b';

/// The digit that selects the widget's own color in an inline escape.
pub const ESCAPE_ORIGINAL: char = '/';

/// A sequence of (text, color) segments, built up functionally.
///
/// ```text
/// Styled::new().text("HEALTH ").colored("100%", ColorRange::Green)
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Styled {
  segments: Vec<(String, Option<ColorRange>)>,
}

impl Styled {
  /// Creates an empty `Styled`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends text in the widget's own color.
  pub fn text(mut self, text: impl Into<String>) -> Self {
    self.segments.push((text.into(), None));
    self
  }

  /// Appends text in the given color range.
  pub fn colored(mut self, text: impl Into<String>, color: ColorRange) -> Self {
    self.segments.push((text.into(), Some(color)));
    self
  }

  /// Writes these segments into `line`, truncating at its capacity.
  pub fn write_to(&self, line: &mut Line) {
    for (text, color) in &self.segments {
      line.push_span(text, *color);
    }
  }
}

/// Parses `text`, which may contain inline color escapes, into `line`.
///
/// Escapes with an unknown index, and an escape cut off at the end of the
/// text, are dropped.
pub fn parse_into(line: &mut Line, text: &str) {
  let mut color = None;
  let mut chars = text.chars();
  while let Some(c) = chars.next() {
    if c != ESCAPE {
      line.push_colored(c, color);
      continue;
    }
    match chars.next() {
      Some(ESCAPE_ORIGINAL) => color = None,
      Some(d) => {
        if let Some(cr) = (d as u32)
          .checked_sub('0' as u32)
          .filter(|&i| i < ColorRange::ALL.len() as u32)
          .and_then(|i| ColorRange::from_index(i as u8))
        {
          color = Some(cr);
        }
      }
      None => break,
    }
  }
}

/// Removes inline color escapes from `text`.
pub fn strip(text: &str) -> String {
  let mut line = Line::new(text.len());
  parse_into(&mut line, text);
  line.as_str().to_string()
}

/// A rule highlighting every occurrence of `needle` in a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
  /// The text to highlight, matched case-sensitively.
  pub needle: String,
  /// The color range to draw it in.
  pub color: ColorRange,
}

impl Highlight {
  fn new(needle: &str, color: ColorRange) -> Self {
    Self {
      needle: needle.to_string(),
      color,
    }
  }
}

/// Returns the stock message highlights: key colors, and player name
/// prefixes on chat lines.
pub fn default_highlights() -> Vec<Highlight> {
  vec![
    Highlight::new(" blue ", ColorRange::Blue2),
    Highlight::new(" red ", ColorRange::Red),
    Highlight::new(" yellow ", ColorRange::Gold),
    Highlight::new("Green: ", ColorRange::Green),
    Highlight::new("Indigo: ", ColorRange::Gray),
    Highlight::new("Brown: ", ColorRange::Brown),
    Highlight::new("Red: ", ColorRange::Red),
  ]
}

/// Writes `text` into `line`, coloring any highlighted stretches.
///
/// Inline escapes in `text` are honored as in [`parse_into()`]; highlights
/// apply to the escaped-out plain text, and the first matching rule wins.
pub fn colorize_into(line: &mut Line, text: &str, rules: &[Highlight]) {
  let mut plain = Line::new(text.len());
  parse_into(&mut plain, text);
  if rules.is_empty() {
    copy_into(line, &plain);
    return;
  }

  for span in plain.spans() {
    let mut rest = span.text;
    while !rest.is_empty() {
      let hit = rules
        .iter()
        .filter(|r| !r.needle.is_empty())
        .filter_map(|r| rest.find(r.needle.as_str()).map(|at| (at, r)))
        .min_by_key(|&(at, _)| at);

      match hit {
        Some((at, rule)) => {
          line.push_span(&rest[..at], span.color);
          line.push_span(&rule.needle, Some(rule.color));
          rest = &rest[at + rule.needle.len()..];
        }
        None => {
          line.push_span(rest, span.color);
          rest = "";
        }
      }
    }
  }
}

/// Appends the contents of `src` to `dst`, keeping its colors.
pub fn copy_into(dst: &mut Line, src: &Line) {
  for span in src.spans() {
    dst.push_span(span.text, span.color);
  }
}
