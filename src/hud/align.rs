//! Alignment resolution.
//!
//! Symbolic alignments are resolved once per draw pass, against the screen
//! area the HUD may use and the measured extent of each widget. Widgets
//! aligned to the top or bottom edge stack away from that edge in binding
//! order; the stacking offsets live in a [`Stacker`], which is created fresh
//! for every pass.

use crate::geo::center_offset;
use crate::geo::Point;
use crate::geo::Rect;
use crate::hud::layout::Binding;
use crate::hud::layout::HAlign;
use crate::hud::layout::VAlign;

const LEFT: usize = 0;
const CENTER: usize = 1;
const RIGHT: usize = 2;
const ROW: &[usize] = &[LEFT, CENTER, RIGHT];
const LEFT_ONLY: &[usize] = &[LEFT];
const RIGHT_ONLY: &[usize] = &[RIGHT];

/// Per-pass stacking state.
///
/// The left, center and right columns of each edge stack independently; a
/// widget that claims the whole row pushes all three columns past itself.
#[derive(Clone, Debug)]
pub struct Stacker {
  area: Rect,
  secret_rise: i32,
  // Next free y per column, growing downwards.
  top: [i32; 3],
  // Lowest used y per column (exclusive), growing upwards.
  bottom: [i32; 3],
}

impl Stacker {
  /// Creates a new `Stacker` over `area`.
  ///
  /// Widgets aligned [`VAlign::Secret`] are centered `secret_rise` units above
  /// the middle of `area`.
  pub fn new(area: Rect, secret_rise: i32) -> Self {
    Self {
      area,
      secret_rise,
      top: [area.upper_left().y(); 3],
      bottom: [area.lower_right().y(); 3],
    }
  }

  /// Resolves where a widget of `size` bound by `binding` goes, returning its
  /// upper-left corner and advancing the stacking offsets.
  ///
  /// `whole_row` forces the widget to claim every column of its edge, as
  /// exclusive widgets do.
  pub fn place(&mut self, binding: &Binding, size: Point, whole_row: bool) -> Point {
    let (w, h) = (size.x(), size.y());
    let left = self.area.upper_left().x();
    let right = self.area.lower_right().x();

    let x = match binding.h_align() {
      HAlign::Left => left,
      HAlign::Right => right - w,
      HAlign::Center => left + center_offset(self.area.width(), w),
      HAlign::Direct => binding.pos().x(),
    };

    let columns = match binding.h_align() {
      _ if whole_row => ROW,
      HAlign::Left => LEFT_ONLY,
      HAlign::Right => RIGHT_ONLY,
      HAlign::Center | HAlign::Direct => ROW,
    };

    let y = match binding.v_align() {
      VAlign::Top => {
        let y = columns
          .iter()
          .map(|&c| self.top[c])
          .max()
          .unwrap_or_else(|| self.area.upper_left().y());
        for &c in columns {
          self.top[c] = y + h;
        }
        y
      }
      VAlign::Bottom => {
        let bottom = columns
          .iter()
          .map(|&c| self.bottom[c])
          .min()
          .unwrap_or_else(|| self.area.lower_right().y());
        let y = bottom - h;
        for &c in columns {
          self.bottom[c] = y;
        }
        y
      }
      VAlign::Secret => {
        self.area.upper_left().y() + center_offset(self.area.height(), h)
          - self.secret_rise
      }
      VAlign::Direct => binding.pos().y(),
    };

    Point::new(x, y)
  }
}
