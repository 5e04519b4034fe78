//! Operator overloads.

use std::ops::Add;
use std::ops::AddAssign;
use std::ops::Sub;

use crate::geo::Point;

impl<T: Add<Output = T> + Copy> Add for Point<T> {
  type Output = Self;
  #[inline]
  fn add(self, other: Self) -> Self {
    Point::new(self.x() + other.x(), self.y() + other.y())
  }
}

impl<T: Add<Output = T> + Copy> AddAssign for Point<T> {
  #[inline]
  fn add_assign(&mut self, other: Self) {
    *self = *self + other;
  }
}

impl<T: Sub<Output = T> + Copy> Sub for Point<T> {
  type Output = Self;
  #[inline]
  fn sub(self, other: Self) -> Self {
    Point::new(self.x() - other.x(), self.y() - other.y())
  }
}

impl<T> From<(T, T)> for Point<T> {
  #[inline]
  fn from((x, y): (T, T)) -> Self {
    Point::new(x, y)
  }
}
