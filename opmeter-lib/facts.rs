//! Per-line cost facts produced by an [`Analyzer`](crate::analyzer::Analyzer).

use std::fmt;

use serde::{
  Deserialize,
  Serialize,
};
use smallvec::SmallVec;

use crate::Tendril;

/// Coarse classification of a line's primary cycle cost.
///
/// Presentation only; hosts map levels to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
  Low,
  Med,
  High,
  VHigh,
}

/// Breakdown of a computed cycle count: a base cost, an optional per-item
/// multiplier with its resolved repeat count, and an optional effective
/// address cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
  pub base:       u32,
  pub multiplier: Option<u32>,
  pub n:          u32,
  pub ea:         Option<u32>,
}

impl fmt::Display for Calculation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.base)?;
    if let Some(multiplier) = self.multiplier {
      write!(f, "(+{multiplier}*n)")?;
    }
    if let Some(ea) = self.ea {
      write!(f, " + {ea}")?;
    }
    if self.multiplier.is_some() {
      write!(f, ", n = {}", self.n)?;
    }
    Ok(())
  }
}

/// One or more alternative cycle counts for a single line.
///
/// Multiple values model mutually exclusive outcomes (branch taken vs not
/// taken) or size variants of one instruction. `values` is never empty;
/// `labels`, when present, pairs up with `values` index by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
  pub values:      SmallVec<[u32; 2]>,
  #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
  pub labels:      SmallVec<[Tendril; 2]>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub calculation: Option<Calculation>,
}

impl Timing {
  /// A timing with exactly one possible outcome.
  pub fn fixed(value: u32) -> Self {
    Self {
      values:      SmallVec::from_slice(&[value]),
      labels:      SmallVec::new(),
      calculation: None,
    }
  }

  /// A timing with several mutually exclusive outcomes.
  pub fn alternatives(values: impl IntoIterator<Item = u32>) -> Self {
    let values: SmallVec<[u32; 2]> = values.into_iter().collect();
    debug_assert!(!values.is_empty(), "a timing needs at least one value");
    Self {
      values,
      labels: SmallVec::new(),
      calculation: None,
    }
  }

  pub fn with_labels<I, T>(mut self, labels: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<Tendril>,
  {
    self.labels = labels.into_iter().map(Into::into).collect();
    debug_assert!(
      self.labels.is_empty() || self.labels.len() == self.values.len(),
      "labels must pair up with values"
    );
    self
  }

  pub fn with_calculation(mut self, calculation: Calculation) -> Self {
    self.calculation = Some(calculation);
    self
  }

  /// The value shown first and used for severity classification.
  pub fn primary(&self) -> u32 {
    self.values.first().copied().unwrap_or(0)
  }

  pub fn min(&self) -> u32 {
    self.values.iter().copied().min().unwrap_or(0)
  }

  pub fn max(&self) -> u32 {
    self.values.iter().copied().max().unwrap_or(0)
  }

  /// True when the outcomes actually differ. Equal alternatives collapse to
  /// a single number.
  pub fn is_range(&self) -> bool {
    self.min() != self.max()
  }
}

/// Derived facts for one source line.
///
/// The default value is the empty annotation: zero size, no timing. Lines
/// the analyzer cannot make sense of degrade to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCost {
  pub bytes:     u32,
  pub bss_bytes: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timing:    Option<Timing>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub level:     Option<Level>,
}

impl LineCost {
  /// Smallest possible cycle contribution of this line.
  pub fn min_cycles(&self) -> u32 {
    self.timing.as_ref().map(Timing::min).unwrap_or(0)
  }

  /// Largest possible cycle contribution of this line.
  pub fn max_cycles(&self) -> u32 {
    self.timing.as_ref().map(Timing::max).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.bytes == 0 && self.bss_bytes == 0 && self.timing.is_none()
  }
}
