//! Graphics and rendering library.

pub mod canvas;
pub mod curses;
pub mod texel;

pub use canvas::Canvas;
pub use curses::Curses;
