//! Texels and color ranges.
//!
//! A *texel* is a single cell of the HUD canvas: a glyph with foreground and
//! background colors. HUD text is colored by *color range*, a small palette of
//! named text colors that widgets and inline markup refer to by index.

use serde::Deserialize;
use serde::Serialize;

pub use palette::named as colors;

/// An RGB value used by a [`Texel`].
pub type Rgb = palette::Srgb<u8>;

/// A foreground or background color for a [`Texel`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Color {
  /// A solid RGB value.
  Rgb(Rgb),

  /// The "default" value, i.e., reset to whatever the terminal's default colors
  /// are.
  Reset,
}

impl From<Rgb> for Color {
  fn from(rgb: Rgb) -> Self {
    Self::Rgb(rgb)
  }
}

/// A named text color range.
///
/// The discriminants are the digits used by inline color markup: an escape
/// byte followed by `b'0' + index` switches to that range mid-line.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
#[rustfmt::skip]
pub enum ColorRange {
  Brick, Tan, Gray, Green, Brown, Gold, Red, Blue1, Blue2, Orange, Yellow,
  Black, Purple, White, None,
}

impl ColorRange {
  /// Every color range, in markup-index order.
  #[rustfmt::skip]
  pub const ALL: [ColorRange; 15] = [
    Self::Brick, Self::Tan, Self::Gray, Self::Green, Self::Brown, Self::Gold,
    Self::Red, Self::Blue1, Self::Blue2, Self::Orange, Self::Yellow,
    Self::Black, Self::Purple, Self::White, Self::None,
  ];

  /// Looks up a color range by its markup index.
  pub fn from_index(index: u8) -> Option<Self> {
    Self::ALL.get(index as usize).copied()
  }

  /// Returns this range's markup index.
  pub fn index(self) -> u8 {
    self as u8
  }

  /// Returns the terminal color this range is drawn with.
  ///
  /// `None` means "untranslated": the font's own color, which the terminal
  /// shows as its default foreground.
  pub fn color(self) -> Color {
    match self {
      Self::Brick => colors::FIREBRICK.into(),
      Self::Tan => colors::TAN.into(),
      Self::Gray => colors::GRAY.into(),
      Self::Green => colors::LIMEGREEN.into(),
      Self::Brown => colors::SADDLEBROWN.into(),
      Self::Gold => colors::GOLD.into(),
      Self::Red => colors::RED.into(),
      Self::Blue1 => colors::ROYALBLUE.into(),
      Self::Blue2 => colors::DEEPSKYBLUE.into(),
      Self::Orange => colors::ORANGE.into(),
      Self::Yellow => colors::YELLOW.into(),
      Self::Black => colors::DIMGRAY.into(),
      Self::Purple => colors::MEDIUMPURPLE.into(),
      Self::White => colors::WHITE.into(),
      Self::None => Color::Reset,
    }
  }
}

/// A "terminal element", analogous to a pixel or voxel.
///
/// A texel consists of an optional glyph (a printable character), a
/// foreground color, and a background color.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Texel {
  glyph: Option<char>,
  fg: Color,
  bg: Color,
}

impl Texel {
  /// Creates a new invisible texel.
  #[inline]
  pub fn empty() -> Self {
    Self {
      glyph: None,
      fg: Color::Reset,
      bg: Color::Reset,
    }
  }

  /// Creates a new colorless texel with the given glyph.
  #[inline]
  pub fn new(glyph: char) -> Self {
    Self {
      glyph: Some(glyph),
      ..Self::empty()
    }
  }

  /// Returns this texel's glyph.
  #[inline]
  pub fn glyph(self) -> Option<char> {
    self.glyph
  }

  /// Returns a copy of this texel showing `glyph`.
  #[inline]
  pub fn with_glyph(mut self, glyph: char) -> Self {
    self.glyph = Some(glyph);
    self
  }

  /// Returns this texel's foreground color.
  #[inline]
  pub fn fg(self) -> Color {
    self.fg
  }

  /// Returns a copy of this texel with the given foreground color.
  #[inline]
  pub fn with_fg(mut self, color: impl Into<Color>) -> Self {
    self.fg = color.into();
    self
  }

  /// Returns this texel's background color.
  #[inline]
  pub fn bg(self) -> Color {
    self.bg
  }

  /// Returns a copy of this texel with the given background color.
  #[inline]
  pub fn with_bg(mut self, color: impl Into<Color>) -> Self {
    self.bg = color.into();
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn markup_indices_round_trip() {
    for &cr in ColorRange::ALL.iter() {
      assert_eq!(ColorRange::from_index(cr.index()), Some(cr));
    }
    assert_eq!(ColorRange::from_index(15), None);
  }
}
