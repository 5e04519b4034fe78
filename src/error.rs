//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from editing the layout registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
  #[error("layout {layout} does not exist (there are {count})")]
  NoSuchLayout { layout: usize, count: usize },

  #[error("layout {layout} is full ({capacity} widgets)")]
  Full { layout: usize, capacity: usize },

  #[error("widget {widget} does not belong to this HUD")]
  NoSuchWidget { widget: usize },
}

/// Errors from parsing a HUD layout resource.
///
/// Every variant carries the line of the offending token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("line {line}: HUD ({layout}) must be between 0 and {max}")]
  Layout { line: usize, layout: i64, max: usize },

  #[error("line {line}: widget ({widget}) appears before any HUD statement")]
  NoLayoutSelected { line: usize, widget: String },

  #[error("line {line}: unknown widget ({name})")]
  UnknownWidget { line: usize, name: String },

  #[error("line {line}: cannot set alignment for widget ({widget}): unknown alignment ({keyword})")]
  UnknownAlignment {
    line: usize,
    widget: String,
    keyword: String,
  },

  #[error("line {line}: cannot set coordinates for widget ({widget}): ({x}, {y}) is off screen")]
  OutOfBounds {
    line: usize,
    widget: String,
    x: i64,
    y: i64,
  },

  #[error("line {line}: expected {expected}, found {found}")]
  Expected {
    line: usize,
    expected: &'static str,
    found: String,
  },

  #[error("line {line}: cannot place widget ({widget})")]
  Bind {
    line: usize,
    widget: String,
    #[source]
    source: LayoutError,
  },
}

/// Errors from loading persisted HUD options.
#[derive(Debug, Error)]
pub enum OptionsError {
  #[error("failed to read options file {path}")]
  ReadFile {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse options TOML in {path}")]
  ParseToml {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}
