//! `curses` helper library.
//!
//! Note that this module doesn't *actually* use `libcurses`, and merely
//! emulates its behavior at a high level in terms of another library.

use std::io;
use std::io::Write as _;
use std::time::Duration;

use crossterm::event::Event;
use crossterm::event::KeyEvent;
use crossterm::style::Color;
use crossterm::style::Colors;

use crate::geo::Point;
use crate::gfx::canvas::Canvas;
use crate::gfx::texel;
use crate::gfx::texel::Texel;

/// Returns the current dimensions of the terminal window, as a column and row
/// count.
pub fn dims() -> anyhow::Result<Point> {
  let (cols, rows) = crossterm::terminal::size()?;
  Ok(Point::new(cols as i32, rows as i32))
}

/// A low-level curses context.
pub struct Curses<W: io::Write = io::Stdout> {
  w: W,
  // What the terminal currently shows; `None` forces a full redraw.
  shown: Option<Vec<Texel>>,
  shown_width: i32,
}

impl Curses {
  /// Initializes the `curses` environment.
  pub fn init() -> anyhow::Result<Curses> {
    Curses::with(io::stdout())
  }
}

impl<W: io::Write> Curses<W> {
  /// Initializes the `curses` environment for `w`.
  pub fn with(mut w: W) -> anyhow::Result<Curses<W>> {
    crossterm::execute!(
      w,
      crossterm::terminal::EnterAlternateScreen,
      crossterm::cursor::Hide,
      crossterm::terminal::DisableLineWrap,
    )?;
    crossterm::terminal::enable_raw_mode()?;

    Ok(Curses {
      w,
      shown: None,
      shown_width: 0,
    })
  }

  /// Draws every texel of `canvas` that differs from the last presented
  /// frame, then flushes.
  pub fn present(&mut self, canvas: &Canvas) -> anyhow::Result<()> {
    let width = canvas.dims().width();
    let texels: Vec<Texel> = canvas.rows().flatten().copied().collect();
    let previous = match self.shown.take() {
      Some(prev) if self.shown_width == width && prev.len() == texels.len() => {
        Some(prev)
      }
      _ => {
        crossterm::queue!(
          self.w,
          crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
        )?;
        None
      }
    };

    for (i, tx) in texels.iter().enumerate() {
      if let Some(prev) = &previous {
        if prev[i] == *tx {
          continue;
        }
      }
      let col = i as i32 % width.max(1);
      let row = i as i32 / width.max(1);
      self.draw(row as u16, col as u16, *tx)?;
    }
    self.w.flush()?;

    self.shown = Some(texels);
    self.shown_width = width;
    Ok(())
  }

  /// Forgets what the terminal shows, so the next frame is drawn in full.
  pub fn invalidate(&mut self) {
    self.shown = None;
  }

  fn draw(&mut self, row: u16, col: u16, texel: Texel) -> anyhow::Result<()> {
    crossterm::queue!(
      self.w,
      crossterm::cursor::MoveTo(col, row),
      crossterm::style::SetColors(Colors {
        foreground: Some(to_crossterm(texel.fg())),
        background: Some(to_crossterm(texel.bg())),
      }),
      crossterm::style::Print(texel.glyph().unwrap_or(' ')),
    )?;
    Ok(())
  }

  /// Returns every currently-buffered keyboard event, without blocking.
  ///
  /// A terminal resize invalidates the presented frame.
  pub fn keys(&mut self) -> anyhow::Result<Vec<KeyEvent>> {
    let mut keys = Vec::new();
    while crossterm::event::poll(Duration::default())? {
      match crossterm::event::read()? {
        Event::Key(e) => keys.push(e),
        Event::Resize(..) => self.invalidate(),
        _ => continue,
      }
    }
    Ok(keys)
  }

  /// Clean up whatever mess the terminal made.
  fn cleanup(&mut self) -> anyhow::Result<()> {
    crossterm::execute!(
      self.w,
      crossterm::style::ResetColor,
      crossterm::terminal::LeaveAlternateScreen,
      crossterm::cursor::Show,
      crossterm::terminal::EnableLineWrap,
    )?;
    crossterm::terminal::disable_raw_mode()?;
    self.w.flush()?;
    Ok(())
  }

  /// Destroys the `curses` environment, taking the process along with it.
  pub fn die(&mut self, exit: i32) -> ! {
    if let Err(e) = self.cleanup() {
      log::error!("failed to restore the terminal: {}", e);
    }
    std::process::exit(exit);
  }
}

impl<W: io::Write> Drop for Curses<W> {
  fn drop(&mut self) {
    if let Err(e) = self.cleanup() {
      log::error!("failed to restore the terminal: {}", e);
    }
  }
}

fn to_crossterm(color: texel::Color) -> Color {
  match color {
    texel::Color::Rgb(rgb) => Color::Rgb {
      r: rgb.red,
      g: rgb.green,
      b: rgb.blue,
    },
    texel::Color::Reset => Color::Reset,
  }
}
