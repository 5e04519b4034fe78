//! The HUD layout registry.
//!
//! The HUD offers a few alternate *layouts*, one of which is active at a time.
//! Each layout is an ordered list of [`Binding`]s placing a widget on screen;
//! the same widget can be bound in several layouts with different placement.
//! Order matters: later bindings are drawn on top of earlier ones.

use crate::error::LayoutError;
use crate::geo::Point;

/// The number of alternate layouts.
pub const MAX_LAYOUTS: usize = 3;

/// The most widgets one layout can place.
pub const MAX_BINDINGS: usize = 19;

/// A handle to a widget owned by a [`HudEngine`](crate::hud::HudEngine).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct WidgetId(pub(crate) usize);

/// Horizontal placement of a widget.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum HAlign {
  /// Flush with the left margin.
  Left,
  /// Flush with the right margin.
  Right,
  /// Centered on the screen.
  Center,
  /// At the binding's explicit x coordinate.
  Direct,
}

/// Vertical placement of a widget.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum VAlign {
  /// Stacked downwards from the top edge.
  Top,
  /// Stacked upwards from the bottom edge.
  Bottom,
  /// At a fixed height above the screen center, outside of any stacking.
  Secret,
  /// At the binding's explicit y coordinate.
  Direct,
}

/// Looks up a symbolic alignment keyword, such as `topleft` or `lowercenter`.
///
/// Keywords are case-insensitive; `upper` and `lower` are accepted for `top`
/// and `bottom`.
pub fn parse_alignment(keyword: &str) -> Option<(HAlign, VAlign)> {
  let keyword = keyword.to_ascii_lowercase();
  let (v, rest) = if let Some(rest) = strip(&keyword, &["top", "upper"]) {
    (VAlign::Top, rest)
  } else if let Some(rest) = strip(&keyword, &["bottom", "lower"]) {
    (VAlign::Bottom, rest)
  } else {
    return None;
  };

  let h = match rest {
    "left" => HAlign::Left,
    "right" => HAlign::Right,
    "center" => HAlign::Center,
    _ => return None,
  };
  Some((h, v))
}

fn strip<'a>(s: &'a str, prefixes: &[&str]) -> Option<&'a str> {
  prefixes.iter().find_map(|p| {
    if s.starts_with(p) {
      Some(&s[p.len()..])
    } else {
      None
    }
  })
}

/// A widget's placement within one layout.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Binding {
  widget: WidgetId,
  h_align: HAlign,
  v_align: VAlign,
  h_align_orig: HAlign,
  pos: Point,
}

impl Binding {
  /// Returns the bound widget.
  pub fn widget(&self) -> WidgetId {
    self.widget
  }

  /// Returns the current horizontal alignment.
  pub fn h_align(&self) -> HAlign {
    self.h_align
  }

  /// Returns the vertical alignment.
  pub fn v_align(&self) -> VAlign {
    self.v_align
  }

  /// Returns the horizontal alignment this binding was configured with,
  /// before any temporary override.
  pub fn h_align_orig(&self) -> HAlign {
    self.h_align_orig
  }

  /// Returns the explicit position, used on axes aligned [`HAlign::Direct`] or
  /// [`VAlign::Direct`].
  pub fn pos(&self) -> Point {
    self.pos
  }
}

/// Every layout's list of bindings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layouts {
  // Invariant: each list has at most MAX_BINDINGS entries, and no widget
  // appears twice in one list.
  layouts: Vec<Vec<Binding>>,
}

impl Layouts {
  /// Creates `MAX_LAYOUTS` empty layouts.
  pub fn new() -> Self {
    Self {
      layouts: (0..MAX_LAYOUTS)
        .map(|_| Vec::with_capacity(MAX_BINDINGS))
        .collect(),
    }
  }

  /// Returns the number of layouts.
  pub fn count(&self) -> usize {
    self.layouts.len()
  }

  /// Places `widget` in `layout`.
  ///
  /// If `widget` is already bound in `layout`, its binding is updated in
  /// place (keeping its draw order); otherwise a new binding is appended. In
  /// both cases `h_align` becomes the binding's original alignment.
  pub fn bind(
    &mut self,
    layout: usize,
    widget: WidgetId,
    h_align: HAlign,
    v_align: VAlign,
    pos: Point,
  ) -> Result<(), LayoutError> {
    let count = self.count();
    let list = self
      .layouts
      .get_mut(layout)
      .ok_or(LayoutError::NoSuchLayout { layout, count })?;

    let binding = Binding {
      widget,
      h_align,
      v_align,
      h_align_orig: h_align,
      pos,
    };

    if let Some(existing) = list.iter_mut().find(|b| b.widget == widget) {
      *existing = binding;
      return Ok(());
    }
    if list.len() >= MAX_BINDINGS {
      return Err(LayoutError::Full {
        layout,
        capacity: MAX_BINDINGS,
      });
    }
    list.push(binding);
    Ok(())
  }

  /// Returns the bindings of `layout` in draw order.
  ///
  /// An out-of-range layout has no bindings.
  pub fn bindings(&self, layout: usize) -> &[Binding] {
    self.layouts.get(layout).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Returns the widgets bound in `layout`, in draw order.
  pub fn widgets(&self, layout: usize) -> impl Iterator<Item = WidgetId> + '_ {
    self.bindings(layout).iter().map(|b| b.widget)
  }

  /// Returns `widget`'s binding in `layout`, if it has one.
  pub fn find(&self, layout: usize, widget: WidgetId) -> Option<&Binding> {
    self.bindings(layout).iter().find(|b| b.widget == widget)
  }

  /// Temporarily centers `widget` in every layout, or restores its original
  /// horizontal alignment.
  pub fn set_centered(&mut self, widget: WidgetId, centered: bool) {
    for b in self.layouts.iter_mut().flatten() {
      if b.widget == widget {
        b.h_align = if centered {
          HAlign::Center
        } else {
          b.h_align_orig
        };
      }
    }
  }
}

impl Default for Layouts {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn rebinding_replaces_in_place() {
    let mut layouts = Layouts::new();
    let a = WidgetId(0);
    let b = WidgetId(1);
    layouts
      .bind(1, a, HAlign::Left, VAlign::Top, Point::zero())
      .unwrap();
    layouts
      .bind(1, b, HAlign::Right, VAlign::Top, Point::zero())
      .unwrap();
    layouts
      .bind(1, a, HAlign::Direct, VAlign::Direct, Point::new(5, 6))
      .unwrap();

    let bound: Vec<WidgetId> = layouts.widgets(1).collect();
    assert_eq!(bound, vec![a, b]);

    let binding = layouts.find(1, a).unwrap();
    assert_eq!(binding.h_align(), HAlign::Direct);
    assert_eq!(binding.v_align(), VAlign::Direct);
    assert_eq!(binding.h_align_orig(), HAlign::Direct);
    assert_eq!(binding.pos(), Point::new(5, 6));
  }

  #[test]
  fn layouts_are_independent() {
    let mut layouts = Layouts::new();
    let a = WidgetId(3);
    layouts
      .bind(0, a, HAlign::Left, VAlign::Top, Point::zero())
      .unwrap();
    layouts
      .bind(2, a, HAlign::Right, VAlign::Bottom, Point::zero())
      .unwrap();
    assert_eq!(layouts.find(0, a).unwrap().h_align(), HAlign::Left);
    assert_eq!(layouts.find(1, a), None);
    assert_eq!(layouts.find(2, a).unwrap().v_align(), VAlign::Bottom);
  }

  #[test]
  fn bind_rejects_bad_layout_and_overflow() {
    let mut layouts = Layouts::new();
    assert_eq!(
      layouts.bind(3, WidgetId(0), HAlign::Left, VAlign::Top, Point::zero()),
      Err(LayoutError::NoSuchLayout {
        layout: 3,
        count: MAX_LAYOUTS
      })
    );

    for i in 0..MAX_BINDINGS {
      layouts
        .bind(0, WidgetId(i), HAlign::Left, VAlign::Top, Point::zero())
        .unwrap();
    }
    assert_eq!(
      layouts.bind(0, WidgetId(99), HAlign::Left, VAlign::Top, Point::zero()),
      Err(LayoutError::Full {
        layout: 0,
        capacity: MAX_BINDINGS
      })
    );
    // Rebinding an existing widget still works on a full layout.
    assert!(layouts
      .bind(0, WidgetId(4), HAlign::Center, VAlign::Top, Point::zero())
      .is_ok());
  }

  #[test]
  fn centering_restores_original() {
    let mut layouts = Layouts::new();
    let msg = WidgetId(0);
    for layout in 0..MAX_LAYOUTS {
      layouts
        .bind(layout, msg, HAlign::Direct, VAlign::Top, Point::zero())
        .unwrap();
    }
    layouts.set_centered(msg, true);
    assert!(layouts
      .bindings(2)
      .iter()
      .all(|b| b.h_align() == HAlign::Center));
    layouts.set_centered(msg, false);
    assert_eq!(layouts.find(1, msg).unwrap().h_align(), HAlign::Direct);
  }

  #[test]
  fn alignment_keywords() {
    assert_eq!(parse_alignment("topleft"), Some((HAlign::Left, VAlign::Top)));
    assert_eq!(
      parse_alignment("LowerCenter"),
      Some((HAlign::Center, VAlign::Bottom))
    );
    assert_eq!(
      parse_alignment("upperright"),
      Some((HAlign::Right, VAlign::Top))
    );
    assert_eq!(parse_alignment("middleleft"), None);
    assert_eq!(parse_alignment("top"), None);
  }
}
