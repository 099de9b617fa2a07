//! Listing presentation options, optionally loaded from a TOML file.

use std::{
  fs,
  path::Path,
};

use anyhow::{
  Context,
  Result,
};
use opmeter_lib::facts::Level;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Config {
  /// Column width reserved for the inline label in text output.
  pub label_width: usize,
  /// Show bss byte counts alongside initialized sizes.
  pub show_bss:    bool,
  /// Append the long-form detail (outcome labels, breakdown) to the label.
  pub show_detail: bool,
  pub colors:      Colors,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      label_width: 22,
      show_bss:    true,
      show_detail: false,
      colors:      Colors::default(),
    }
  }
}

impl Config {
  /// Load from `path` when given, fall back to the defaults otherwise.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let Some(path) = path else {
      return Ok(Self::default());
    };
    let raw = fs::read_to_string(path)
      .with_context(|| format!("failed to read config {}", path.display()))?;
    Self::from_toml(&raw).with_context(|| format!("failed to parse config {}", path.display()))
  }

  pub fn from_toml(raw: &str) -> Result<Self> {
    let raw: ConfigRaw = toml::from_str(raw)?;
    let defaults = Self::default();
    let color_defaults = defaults.colors;
    let colors = raw.colors.map_or(color_defaults, |colors| Colors {
      low:   colors.low.unwrap_or(color_defaults.low),
      med:   colors.med.unwrap_or(color_defaults.med),
      high:  colors.high.unwrap_or(color_defaults.high),
      vhigh: colors.vhigh.unwrap_or(color_defaults.vhigh),
      plain: colors.plain.unwrap_or(color_defaults.plain),
    });
    Ok(Self {
      label_width: raw.label_width.unwrap_or(defaults.label_width),
      show_bss: raw.show_bss.unwrap_or(defaults.show_bss),
      show_detail: raw.show_detail.unwrap_or(defaults.show_detail),
      colors,
    })
  }

  pub fn color_for(&self, level: Option<Level>) -> Color {
    match level {
      Some(Level::Low) => self.colors.low,
      Some(Level::Med) => self.colors.med,
      Some(Level::High) => self.colors.high,
      Some(Level::VHigh) => self.colors.vhigh,
      None => self.colors.plain,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigRaw {
  label_width: Option<usize>,
  show_bss:    Option<bool>,
  show_detail: Option<bool>,
  colors:      Option<ColorsRaw>,
}

/// Terminal colors per severity level, plus the fallback for lines without
/// a timing.
#[derive(Debug, Clone, Copy)]
pub struct Colors {
  pub low:   Color,
  pub med:   Color,
  pub high:  Color,
  pub vhigh: Color,
  pub plain: Color,
}

impl Default for Colors {
  fn default() -> Self {
    Self {
      low:   Color::Blue,
      med:   Color::Yellow,
      high:  Color::Red,
      vhigh: Color::BrightRed,
      plain: Color::Dim,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColorsRaw {
  low:   Option<Color>,
  med:   Option<Color>,
  high:  Option<Color>,
  vhigh: Option<Color>,
  plain: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Color {
  Default,
  Dim,
  Red,
  BrightRed,
  Green,
  Yellow,
  Blue,
  Magenta,
  Cyan,
}

impl Color {
  pub fn ansi(self) -> &'static str {
    match self {
      Self::Default => "",
      Self::Dim => "\x1b[2m",
      Self::Red => "\x1b[31m",
      Self::BrightRed => "\x1b[91m",
      Self::Green => "\x1b[32m",
      Self::Yellow => "\x1b[33m",
      Self::Blue => "\x1b[34m",
      Self::Magenta => "\x1b[35m",
      Self::Cyan => "\x1b[36m",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_for_missing_keys() {
    let config = Config::from_toml("label_width = 30").unwrap();
    assert_eq!(config.label_width, 30);
    assert!(config.show_bss);
    assert_eq!(config.colors.high, Color::Red);
  }

  #[test]
  fn colors_override_individually() {
    let config = Config::from_toml("[colors]\nvhigh = \"magenta\"").unwrap();
    assert_eq!(config.colors.vhigh, Color::Magenta);
    assert_eq!(config.colors.low, Color::Blue);
  }

  #[test]
  fn unknown_keys_are_rejected() {
    assert!(Config::from_toml("label_wdith = 30").is_err());
  }

  #[test]
  fn fallback_color_covers_untimed_lines() {
    let config = Config::default();
    assert_eq!(config.color_for(None), Color::Dim);
    assert_eq!(config.color_for(Some(Level::VHigh)), Color::BrightRed);
  }
}
