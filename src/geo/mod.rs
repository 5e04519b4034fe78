//! Screen geometry.
//!
//! HUD coordinates live in a virtual screen whose origin is the upper-left
//! corner: x increases to the right, and y increases downwards. Everything the
//! alignment code touches is expressed in terms of [`Point`] and [`Rect`].

use num::Integer;
use num::Signed;
use num::Zero;

mod impls;

/// A two-dimensional point.
///
/// `Point<T>` values may be added and subtracted componentwise.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
pub struct Point<T = i32>([T; 2]);

impl<T> Point<T> {
  /// Creates a new `Point` with the given coordinates.
  #[inline]
  pub fn new(x: T, y: T) -> Self {
    Self([x, y])
  }

  /// Creates a new `Point` representing the origin.
  #[inline]
  pub fn zero() -> Self
  where
    T: Zero,
  {
    Self([T::zero(), T::zero()])
  }

  /// Returns the `x` coordinate.
  #[inline]
  pub fn x(self) -> T
  where
    T: Copy,
  {
    self.0[0]
  }

  /// Returns the `y` coordinate.
  #[inline]
  pub fn y(self) -> T
  where
    T: Copy,
  {
    self.0[1]
  }
}

/// A rectangle, represented as its upper-left corner and its (exclusive)
/// lower-right corner.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Rect<T = i32>(Point<T>, Point<T>);

// Invariant: rect.0.x <= rect.1.x and rect.0.y <= rect.1.y.
impl<T: Signed + Copy + PartialOrd> Rect<T> {
  /// Creates a new `Rect` with the given [`Point`] values as opposing corners.
  #[inline]
  pub fn new(p1: Point<T>, p2: Point<T>) -> Self {
    let min = |a: T, b: T| if a < b { a } else { b };
    let max = |a: T, b: T| if a < b { b } else { a };
    Self(
      Point::new(min(p1.x(), p2.x()), min(p1.y(), p2.y())),
      Point::new(max(p1.x(), p2.x()), max(p1.y(), p2.y())),
    )
  }

  /// Creates a new `Rect` of the given dimensions with one corner at the
  /// origin.
  #[inline]
  pub fn with_dims(width: T, height: T) -> Self {
    Self(Point::zero(), Point::new(width.abs(), height.abs()))
  }

  /// Returns the upper-left corner of this `Rect`.
  #[inline]
  pub fn upper_left(self) -> Point<T> {
    self.0
  }

  /// Returns the lower-right corner of this `Rect`.
  #[inline]
  pub fn lower_right(self) -> Point<T> {
    self.1
  }

  /// Returns the width of this `Rect`.
  #[inline]
  pub fn width(self) -> T {
    self.1.x() - self.0.x()
  }

  /// Returns the height of this `Rect`.
  #[inline]
  pub fn height(self) -> T {
    self.1.y() - self.0.y()
  }

  /// Returns whether this `Rect` has no area.
  #[inline]
  pub fn is_empty(self) -> bool {
    !(self.width() * self.height()).is_positive()
  }

  /// Returns whether this `Rect` contains a given point.
  ///
  /// Note that the points in a rectangle form an "exclusive" range; points
  /// colinear with the lower-right corner are *not* part of the rectangle.
  #[inline]
  pub fn contains(self, p: Point<T>) -> bool {
    (self.0.x()..self.1.x()).contains(&p.x())
      && (self.0.y()..self.1.y()).contains(&p.y())
  }

  /// Computes the intersection of this `Rect` with `other`.
  ///
  /// Returns `None` if they do not intersect at all.
  pub fn intersect(self, other: Rect<T>) -> Option<Rect<T>> {
    let max = |a: T, b: T| if a < b { b } else { a };
    let min = |a: T, b: T| if a < b { a } else { b };
    let ul = Point::new(max(self.0.x(), other.0.x()), max(self.0.y(), other.0.y()));
    let lr = Point::new(min(self.1.x(), other.1.x()), min(self.1.y(), other.1.y()));

    if ul.x() >= lr.x() || ul.y() >= lr.y() {
      return None;
    }
    Some(Rect(ul, lr))
  }
}

/// Computes the offset that centers a span of `len` units inside `total`
/// units, rounding towards the start.
pub fn center_offset<T: Integer + Copy>(total: T, len: T) -> T {
  let two = T::one() + T::one();
  (total - len).div_floor(&two)
}

/// A rectangle with associated data at each point.
// Invariant: self.1.len() == self.0.area()
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct RectVec<T>(Rect<i32>, Box<[T]>);

impl<T: Clone> RectVec<T> {
  /// Creates a new `RectVec` with the requested dimensions and filled with the
  /// given value.
  pub fn new(rect: Rect<i32>, val: T) -> Self {
    let area = (rect.width() * rect.height()).max(0) as usize;
    RectVec(rect, vec![val; area].into_boxed_slice())
  }

  /// Returns this `RectVec`'s dimensions.
  pub fn dims(&self) -> Rect<i32> {
    self.0
  }

  /// Fills every point inside `rect` with `val`.
  pub fn fill(&mut self, rect: Rect<i32>, val: T) {
    let area = match self.0.intersect(rect) {
      Some(r) => r,
      None => return,
    };
    for y in area.upper_left().y()..area.lower_right().y() {
      for x in area.upper_left().x()..area.lower_right().x() {
        if let Some(slot) = self.get_mut(Point::new(x, y)) {
          *slot = val.clone();
        }
      }
    }
  }

  /// Gets a reference to the data value associated with `p`.
  ///
  /// Returns `None` if `p` is out-of-bounds.
  pub fn get(&self, p: Point<i32>) -> Option<&T> {
    let index = self.index(p)?;
    self.1.get(index)
  }

  /// Gets a mutable reference to the data value associated with `p`.
  ///
  /// Returns `None` if `p` is out-of-bounds.
  pub fn get_mut(&mut self, p: Point<i32>) -> Option<&mut T> {
    let index = self.index(p)?;
    self.1.get_mut(index)
  }

  /// Returns an iterator over the rows of this `RectVec`, top to bottom.
  pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
    let width = self.0.width().max(1) as usize;
    self.1.chunks(width)
  }

  fn index(&self, p: Point<i32>) -> Option<usize> {
    if !self.dims().contains(p) {
      return None;
    }
    let rel = p - self.dims().upper_left();
    Some((rel.x() + rel.y() * self.dims().width()) as usize)
  }
}
