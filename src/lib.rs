//! `headsup`: a heads-up display engine for tic-driven games.
//!
//! The HUD is a set of small multiline text widgets overlaid on the game
//! view. Which widgets appear, and where, is described by *layouts* that can
//! be loaded from a small text resource; widget contents are rebuilt from game
//! state only on the simulation tics that need them, and drawing is a
//! separate read-only pass over the result.
//!
//! See [`hud::HudEngine`] for the entry point.

pub mod error;
pub mod geo;
pub mod gfx;
pub mod hud;
pub mod input;
pub mod options;
pub mod timing;
