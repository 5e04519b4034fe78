//! The in-memory texel canvas.
//!
//! A [`Canvas`] is one frame's worth of [`Texel`]s. The game paints its view
//! onto it, the HUD draws over that through the [`Surface`] trait, and the
//! finished frame is handed to [`Curses::present()`](super::Curses::present).
//!
//! Every font is one texel per character and one row per line; the big font
//! is told apart by being drawn in uppercase.

use crate::geo::Point;
use crate::geo::Rect;
use crate::geo::RectVec;
use crate::gfx::texel::ColorRange;
use crate::gfx::texel::Texel;
use crate::hud::line::Line;
use crate::hud::multiline::Font;
use crate::hud::Surface;

/// A frame of texels.
#[derive(Clone, Debug)]
pub struct Canvas {
  texels: RectVec<Texel>,
  status_bar: i32,
}

impl Canvas {
  /// Creates a blank canvas of `size`, whose bottom `status_bar` rows belong
  /// to the status bar.
  pub fn new(size: Point, status_bar: i32) -> Self {
    Self {
      texels: RectVec::new(Rect::with_dims(size.x(), size.y()), Texel::empty()),
      status_bar,
    }
  }

  /// Returns the area this canvas covers.
  pub fn dims(&self) -> Rect {
    self.texels.dims()
  }

  /// Returns the area above the status bar.
  pub fn view_area(&self) -> Rect {
    let dims = self.dims();
    Rect::new(
      dims.upper_left(),
      dims.lower_right() - Point::new(0, self.status_bar.min(dims.height())),
    )
  }

  /// Returns the status bar's area.
  pub fn status_bar_area(&self) -> Rect {
    let dims = self.dims();
    let top = self.view_area().lower_right().y();
    Rect::new(Point::new(dims.upper_left().x(), top), dims.lower_right())
  }

  /// Resizes this canvas, blanking it if the size changed.
  pub fn resize(&mut self, size: Point) {
    if self.size() != size {
      self.texels =
        RectVec::new(Rect::with_dims(size.x(), size.y()), Texel::empty());
    }
  }

  /// Blanks the whole canvas.
  pub fn blank(&mut self) {
    self.texels.fill(self.dims(), Texel::empty());
  }

  /// Fills `rect` with `texel`.
  pub fn fill(&mut self, rect: Rect, texel: Texel) {
    self.texels.fill(rect, texel);
  }

  /// Writes `text` starting at `at`, clipped to the canvas.
  pub fn put_str(&mut self, at: Point, text: &str, texel: Texel) {
    for (i, c) in text.chars().enumerate() {
      self.put(at + Point::new(i as i32, 0), texel.with_glyph(c));
    }
  }

  /// Returns the texel at `p`, if it is on the canvas.
  pub fn get(&self, p: Point) -> Option<Texel> {
    self.texels.get(p).copied()
  }

  /// Returns the rows of this canvas, top to bottom.
  pub fn rows(&self) -> impl Iterator<Item = &[Texel]> + '_ {
    self.texels.rows()
  }

  /// Returns the glyphs of row `y` as a string, with blanks as spaces.
  pub fn row_text(&self, y: i32) -> String {
    (0..self.size().x())
      .map(|x| {
        self
          .get(Point::new(x, y))
          .and_then(Texel::glyph)
          .unwrap_or(' ')
      })
      .collect()
  }

  fn put(&mut self, p: Point, texel: Texel) {
    if let Some(slot) = self.texels.get_mut(p) {
      *slot = texel;
    }
  }
}

impl Surface for Canvas {
  fn size(&self) -> Point {
    let dims = self.dims();
    Point::new(dims.width(), dims.height())
  }

  fn status_bar_height(&self) -> i32 {
    self.status_bar
  }

  fn text_width(&self, _: Font, text: &str) -> i32 {
    text.chars().count() as i32
  }

  fn line_height(&self, _: Font) -> i32 {
    1
  }

  fn draw_text(&mut self, at: Point, font: Font, line: &Line, color: ColorRange) {
    let mut x = at.x();
    for span in line.spans() {
      let fg = span.color.unwrap_or(color).color();
      for c in span.text.chars() {
        let c = match font {
          Font::Big => c.to_ascii_uppercase(),
          _ => c,
        };
        self.put(Point::new(x, at.y()), Texel::new(c).with_fg(fg));
        x += 1;
      }
    }
  }

  fn draw_cursor(&mut self, at: Point, _: Font, color: ColorRange) {
    self.put(at, Texel::new('_').with_fg(color.color()));
  }

  fn clear(&mut self, rect: Rect) {
    self.texels.fill(rect, Texel::empty());
  }
}
