//! The HUD layout language.
//!
//! A layout resource is a flat list of statements, separated by nothing but
//! whitespace:
//!
//! ```text
//! // Select layout 1, then place widgets in it.
//! HUD 1
//! health  topleft
//! ammo    -10 -10   /* ten units in from the lower-right corner */
//! ```
//!
//! `HUD n` selects the layout the following statements edit. Any other
//! identifier names a widget, and is followed either by an alignment keyword
//! (see [`parse_alignment()`]) or by explicit `x y` coordinates; negative
//! coordinates count from the right and bottom edges of the screen. Tokens
//! that are neither identifiers nor part of a statement are skipped.
//!
//! Parsing is all-or-nothing: [`parse()`] applies statements to a copy of the
//! registry, and hands that copy back only if every statement succeeded.

use crate::error::ConfigError;
use crate::geo::Point;
use crate::hud::layout::parse_alignment;
use crate::hud::layout::HAlign;
use crate::hud::layout::Layouts;
use crate::hud::layout::VAlign;
use crate::hud::layout::WidgetId;

/// The table of widget names the layout language can refer to.
///
/// Each widget has a primary name and at most one alias; lookups ignore ASCII
/// case.
#[derive(Clone, Debug, Default)]
pub struct WidgetNames {
  entries: Vec<(String, Option<String>, WidgetId)>,
}

impl WidgetNames {
  /// Creates an empty name table.
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a name, and optionally an alias, for `widget`.
  pub fn insert(&mut self, name: &str, alias: Option<&str>, widget: WidgetId) {
    self
      .entries
      .push((name.to_string(), alias.map(str::to_string), widget));
  }

  /// Looks up a widget by name or alias.
  pub fn lookup(&self, name: &str) -> Option<WidgetId> {
    self
      .entries
      .iter()
      .find(|(primary, alias, _)| {
        primary.eq_ignore_ascii_case(name)
          || alias.as_ref().map_or(false, |a| a.eq_ignore_ascii_case(name))
      })
      .map(|&(_, _, id)| id)
  }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Token<'a> {
  Ident(&'a str),
  Int(i64),
  Other(&'a str),
}

impl Token<'_> {
  fn describe(self) -> String {
    match self {
      Token::Ident(s) | Token::Other(s) => format!("`{}`", s),
      Token::Int(n) => format!("`{}`", n),
    }
  }
}

/// A tokenizer over layout source text, tracking line numbers.
#[derive(Copy, Clone, Debug)]
struct Scanner<'a> {
  src: &'a str,
  pos: usize,
  line: usize,
}

impl<'a> Scanner<'a> {
  fn new(src: &'a str) -> Self {
    Self {
      src,
      pos: 0,
      line: 1,
    }
  }

  fn rest(&self) -> &'a str {
    &self.src[self.pos..]
  }

  fn bump(&mut self, len: usize) -> &'a str {
    let text = &self.src[self.pos..self.pos + len];
    self.line += text.matches('\n').count();
    self.pos += len;
    text
  }

  fn skip_trivia(&mut self) {
    loop {
      let rest = self.rest();
      let ws = rest.len()
        - rest
          .trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == ';')
          .len();
      if ws > 0 {
        self.bump(ws);
        continue;
      }

      if rest.starts_with("//") {
        let len = rest.find('\n').unwrap_or_else(|| rest.len());
        self.bump(len);
      } else if rest.starts_with("/*") {
        let len = rest[2..].find("*/").map_or(rest.len(), |end| end + 4);
        self.bump(len);
      } else {
        return;
      }
    }
  }

  /// Returns the next token and the line it starts on.
  fn next(&mut self) -> Option<(Token<'a>, usize)> {
    self.skip_trivia();
    let rest = self.rest();
    let line = self.line;
    let first = rest.chars().next()?;

    let span = |pred: &dyn Fn(char) -> bool, skip: usize| {
      skip
        + rest[skip..]
          .find(|c: char| !pred(c))
          .unwrap_or_else(|| rest.len() - skip)
    };

    let signed = (first == '-' || first == '+')
      && rest[1..].starts_with(|c: char| c.is_ascii_digit());
    if first.is_ascii_digit() || signed {
      let len = span(&|c| c.is_ascii_digit(), 1);
      let text = self.bump(len);
      return match text.parse::<i64>() {
        Ok(n) => Some((Token::Int(n), line)),
        Err(_) => Some((Token::Other(text), line)),
      };
    }

    if first.is_ascii_alphabetic() || first == '_' {
      let len = span(&|c| c.is_ascii_alphanumeric() || c == '_', 1);
      return Some((Token::Ident(self.bump(len)), line));
    }

    if first == '"' {
      let len = rest[1..].find('"').map_or(rest.len(), |end| end + 2);
      return Some((Token::Other(self.bump(len)), line));
    }

    Some((Token::Other(self.bump(first.len_utf8())), line))
  }

  fn peek(&self) -> Option<(Token<'a>, usize)> {
    let mut ahead = *self;
    ahead.next()
  }

  fn expect_int(&mut self, expected: &'static str) -> Result<i64, ConfigError> {
    match self.next() {
      Some((Token::Int(n), _)) => Ok(n),
      Some((tok, line)) => Err(ConfigError::Expected {
        line,
        expected,
        found: tok.describe(),
      }),
      None => Err(ConfigError::Expected {
        line: self.line,
        expected,
        found: "end of input".to_string(),
      }),
    }
  }
}

/// Parses a layout resource and applies it to a copy of `layouts`.
///
/// Widget names are resolved through `names`; explicit coordinates must land
/// inside a screen of `screen` size, after negative coordinates have been
/// moved in from the right and bottom edges.
///
/// On success, returns the edited copy. On failure, `layouts` has not been
/// touched.
pub fn parse(
  src: &str,
  names: &WidgetNames,
  screen: Point,
  layouts: &Layouts,
) -> Result<Layouts, ConfigError> {
  let mut out = layouts.clone();
  let mut scanner = Scanner::new(src);
  let mut layout = None;

  while let Some((tok, line)) = scanner.next() {
    let name = match tok {
      Token::Ident(name) => name,
      _ => continue,
    };

    if name.eq_ignore_ascii_case("HUD") {
      let index = scanner.expect_int("a layout index")?;
      if index < 0 || index >= out.count() as i64 {
        return Err(ConfigError::Layout {
          line,
          layout: index,
          max: out.count() - 1,
        });
      }
      layout = Some(index as usize);
      continue;
    }

    let layout = layout.ok_or_else(|| ConfigError::NoLayoutSelected {
      line,
      widget: name.to_string(),
    })?;
    let widget = names
      .lookup(name)
      .ok_or_else(|| ConfigError::UnknownWidget {
        line,
        name: name.to_string(),
      })?;

    let placement = match scanner.peek() {
      Some((Token::Int(x), _)) => {
        scanner.next();
        let y = scanner.expect_int("a y coordinate")?;
        let x = if x < 0 { x + screen.x() as i64 } else { x };
        let y = if y < 0 { y + screen.y() as i64 } else { y };
        let in_bounds = (0..screen.x() as i64).contains(&x)
          && (0..screen.y() as i64).contains(&y);
        if !in_bounds {
          return Err(ConfigError::OutOfBounds {
            line,
            widget: name.to_string(),
            x,
            y,
          });
        }
        (HAlign::Direct, VAlign::Direct, Point::new(x as i32, y as i32))
      }
      Some((Token::Ident(keyword), _)) => {
        scanner.next();
        let (h, v) = parse_alignment(keyword).ok_or_else(|| {
          ConfigError::UnknownAlignment {
            line,
            widget: name.to_string(),
            keyword: keyword.to_string(),
          }
        })?;
        (h, v, Point::zero())
      }
      Some((tok, line)) => {
        return Err(ConfigError::Expected {
          line,
          expected: "coordinates or an alignment",
          found: tok.describe(),
        })
      }
      None => {
        return Err(ConfigError::Expected {
          line,
          expected: "coordinates or an alignment",
          found: "end of input".to_string(),
        })
      }
    };

    let (h, v, pos) = placement;
    out
      .bind(layout, widget, h, v, pos)
      .map_err(|source| ConfigError::Bind {
        line,
        widget: name.to_string(),
        source,
      })?;
  }

  Ok(out)
}
