//! Persisted HUD options.
//!
//! Options live in a TOML file; every key is optional, and a missing file is
//! the same as an empty one. Values outside their legal range are clamped
//! when loaded, with a warning in the log.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::OptionsError;
use crate::gfx::texel::ColorRange;
use crate::hud::markup;
use crate::hud::markup::Highlight;
use crate::hud::multiline::MAX_LINES;
use crate::timing::TICRATE;

/// The number of chat macros, selected with Alt and a digit.
pub const CHAT_MACROS: usize = 10;

/// How long the title and secret announcements stay up, in tics.
pub const ANNOUNCE_TICS: u32 = 5 * TICRATE;

/// Converts a duration in milliseconds into tics, rounding so that even a
/// zero duration lasts one tic.
pub fn ms_to_tics(ms: u32) -> u32 {
  (ms as u64 * TICRATE as u64 / 1000) as u32 + 1
}

/// Every persisted HUD option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudOptions {
  /// The active layout.
  pub hud_active: usize,
  /// Whether the full-screen HUD widgets are shown at all.
  pub hud_displayed: bool,

  /// How long messages stay up.
  pub message_timer_ms: u32,
  /// How long received chat lines stay up.
  pub chat_msg_timer_ms: u32,
  /// How long chat composition may sit idle before it is cancelled; zero
  /// never cancels it.
  pub chat_idle_timer_ms: u32,

  /// Lines kept by the message list.
  pub hud_msg_lines: usize,
  /// Whether the message widget keeps several lines.
  pub message_list: bool,
  /// Whether messages are centered on screen.
  pub message_centered: bool,
  /// Whether messages are colorized by `message_highlights`.
  pub message_colorized: bool,
  /// The needles colorized messages highlight.
  pub message_highlights: Vec<Highlight>,

  /// Whether ordinary messages are shown.
  pub show_messages: bool,
  /// Whether "A secret is revealed!" style notices are shown.
  pub hud_secret_message: bool,
  /// Whether the level title is announced at level start.
  pub hud_map_announce: bool,
  /// When stat widgets use the big font: 0 never, 1 on the automap, 2 on the
  /// HUD, 3 always.
  pub hud_widget_font: u8,

  /// Color of the message line.
  pub hudcolor_mesg: ColorRange,
  /// Color of the chat line.
  pub hudcolor_chat: ColorRange,
  /// Color of the level title.
  pub hudcolor_titl: ColorRange,

  /// Canned chat messages.
  pub chat_macros: Vec<String>,
}

impl Default for HudOptions {
  fn default() -> Self {
    Self {
      hud_active: 2,
      hud_displayed: true,
      message_timer_ms: 4000,
      chat_msg_timer_ms: 4000,
      chat_idle_timer_ms: 0,
      hud_msg_lines: 4,
      message_list: false,
      message_centered: false,
      message_colorized: false,
      message_highlights: markup::default_highlights(),
      show_messages: true,
      hud_secret_message: true,
      hud_map_announce: false,
      hud_widget_font: 0,
      hudcolor_mesg: ColorRange::None,
      hudcolor_chat: ColorRange::Gold,
      hudcolor_titl: ColorRange::Gold,
      chat_macros: [
        "No",
        "I'm ready to kick butt!",
        "I'm OK.",
        "I'm not looking too good!",
        "Help!",
        "You suck!",
        "Next time, scumbag...",
        "Come here!",
        "I'll take care of it.",
        "Yes",
      ]
      .iter()
      .map(|s| s.to_string())
      .collect(),
    }
  }
}

impl HudOptions {
  /// Loads options from the TOML file at `path`.
  ///
  /// A missing file yields the defaults.
  pub fn load(path: &Path) -> Result<Self, OptionsError> {
    if !path.exists() {
      log::info!("no options file at {:?}, using defaults", path);
      return Ok(Self::default());
    }

    let text =
      fs::read_to_string(path).map_err(|source| OptionsError::ReadFile {
        path: path.to_path_buf(),
        source,
      })?;
    let opts = Self::from_toml(&text).map_err(|source| {
      log::error!("failed to parse options file {:?}: {}", path, source);
      OptionsError::ParseToml {
        path: path.to_path_buf(),
        source,
      }
    })?;
    log::info!("loaded options from {:?}", path);
    Ok(opts)
  }

  /// Parses options from TOML text, clamping out-of-range values.
  pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
    let mut opts: Self = toml::from_str(text)?;
    opts.clamp();
    Ok(opts)
  }

  /// Clamps every option into its legal range.
  pub fn clamp(&mut self) {
    fn warn_clamp<T: PartialOrd + Copy + std::fmt::Debug>(
      name: &str,
      value: &mut T,
      min: T,
      max: T,
    ) {
      let clamped = if *value < min {
        min
      } else if *value > max {
        max
      } else {
        return;
      };
      log::warn!("{} = {:?} is out of range, using {:?}", name, value, clamped);
      *value = clamped;
    }

    warn_clamp("hud_active", &mut self.hud_active, 0, 2);
    warn_clamp("hud_msg_lines", &mut self.hud_msg_lines, 1, MAX_LINES);
    warn_clamp("hud_widget_font", &mut self.hud_widget_font, 0, 3);

    if self.chat_macros.len() != CHAT_MACROS {
      log::warn!(
        "expected {} chat macros, found {}",
        CHAT_MACROS,
        self.chat_macros.len()
      );
      self.chat_macros.resize(CHAT_MACROS, String::new());
    }
  }

  /// Returns how long messages stay up, in tics.
  pub fn message_tics(&self) -> u32 {
    ms_to_tics(self.message_timer_ms)
  }

  /// Returns how long received chat lines stay up, in tics.
  pub fn chat_tics(&self) -> u32 {
    ms_to_tics(self.chat_msg_timer_ms)
  }

  /// Returns how long chat composition may idle, in tics; zero means forever.
  pub fn chat_idle_tics(&self) -> u32 {
    match self.chat_idle_timer_ms {
      0 => 0,
      ms => ms_to_tics(ms),
    }
  }

  /// Returns the number of lines the message widget keeps.
  pub fn message_lines(&self) -> usize {
    if self.message_list {
      self.hud_msg_lines
    } else {
      1
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn empty_file_is_defaults() {
    assert_eq!(HudOptions::from_toml("").unwrap(), HudOptions::default());
  }

  #[test]
  fn partial_file_keeps_other_defaults() {
    let opts = HudOptions::from_toml(
      "hud_active = 1\nmessage_list = true\nhudcolor_mesg = \"red\"\n",
    )
    .unwrap();
    assert_eq!(opts.hud_active, 1);
    assert_eq!(opts.hudcolor_mesg, ColorRange::Red);
    assert_eq!(opts.message_lines(), 4);
    assert_eq!(opts.hudcolor_chat, ColorRange::Gold);
  }

  #[test]
  fn out_of_range_values_are_clamped() {
    let opts = HudOptions::from_toml(
      "hud_active = 9\nhud_msg_lines = 0\nhud_widget_font = 7\nchat_macros = [\"hi\"]\n",
    )
    .unwrap();
    assert_eq!(opts.hud_active, 2);
    assert_eq!(opts.hud_msg_lines, 1);
    assert_eq!(opts.hud_widget_font, 3);
    assert_eq!(opts.chat_macros.len(), CHAT_MACROS);
    assert_eq!(opts.chat_macros[0], "hi");
    assert_eq!(opts.chat_macros[9], "");
  }

  #[test]
  fn durations_convert_to_tics() {
    assert_eq!(ms_to_tics(4000), 141);
    assert_eq!(ms_to_tics(0), 1);
    let opts = HudOptions::default();
    assert_eq!(opts.chat_idle_tics(), 0);
    assert_eq!(ANNOUNCE_TICS, 175);
  }

  #[test]
  fn missing_file_is_defaults() {
    let path = Path::new("/nonexistent/headsup/options.toml");
    assert_eq!(HudOptions::load(path).unwrap(), HudOptions::default());
  }
}
