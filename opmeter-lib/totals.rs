//! Folded byte and cycle sums over a contiguous line range.

use std::ops::{
  Add,
  AddAssign,
};

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  analyzer::Analyzer,
  facts::LineCost,
};

/// Aggregate over a sequence of line facts.
///
/// `min`/`max` sum the smallest and largest value of every line's timing;
/// `is_range` is true exactly when they differ, which happens as soon as one
/// line contributes a timing whose alternatives are not all equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
  pub bytes:     u64,
  pub bss_bytes: u64,
  pub min:       u64,
  pub max:       u64,
  pub is_range:  bool,
}

impl Totals {
  /// Single-pass fold. Addition is commutative, so the result does not
  /// depend on iteration order.
  pub fn aggregate<'a, I>(facts: I) -> Self
  where
    I: IntoIterator<Item = &'a LineCost>,
  {
    let mut totals = Totals::default();
    for cost in facts {
      totals.bytes = totals.bytes.saturating_add(u64::from(cost.bytes));
      totals.bss_bytes = totals.bss_bytes.saturating_add(u64::from(cost.bss_bytes));
      totals.min = totals.min.saturating_add(u64::from(cost.min_cycles()));
      totals.max = totals.max.saturating_add(u64::from(cost.max_cycles()));
    }
    totals.is_range = totals.min != totals.max;
    totals
  }

  pub fn is_empty(&self) -> bool {
    self.bytes == 0 && self.bss_bytes == 0 && self.max == 0
  }

  /// Compact status string: byte count, bss byte count in parentheses when
  /// nonzero, and the cycle total as a single number or a min-max span.
  pub fn status<A: Analyzer + ?Sized>(&self, analyzer: &A) -> String {
    let mut out = format!("Length: {}", self.bytes);
    if self.bss_bytes > 0 {
      out.push_str(&format!(" ({})", self.bss_bytes));
    }
    out.push_str(" Cycles: ");
    out.push_str(&analyzer.format_timing(self.min));
    if self.is_range {
      out.push('-');
      out.push_str(&analyzer.format_timing(self.max));
    }
    out
  }
}

impl Add for Totals {
  type Output = Totals;

  fn add(self, rhs: Totals) -> Totals {
    let min = self.min.saturating_add(rhs.min);
    let max = self.max.saturating_add(rhs.max);
    Totals {
      bytes: self.bytes.saturating_add(rhs.bytes),
      bss_bytes: self.bss_bytes.saturating_add(rhs.bss_bytes),
      min,
      max,
      is_range: min != max,
    }
  }
}

impl AddAssign for Totals {
  fn add_assign(&mut self, rhs: Totals) {
    *self = *self + rhs;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    analyzer::AnalyzeError,
    facts::Timing,
  };

  struct PlainAnalyzer;

  impl Analyzer for PlainAnalyzer {
    fn analyze(&self, _text: &str) -> Result<Vec<LineCost>, AnalyzeError> {
      Ok(Vec::new())
    }
  }

  fn move_and_branch() -> Vec<LineCost> {
    vec![
      LineCost {
        bytes: 2,
        timing: Some(Timing::fixed(4)),
        ..Default::default()
      },
      LineCost {
        bytes: 2,
        timing: Some(Timing::alternatives([10, 8])),
        ..Default::default()
      },
    ]
  }

  #[test]
  fn branch_ranges_spread_min_and_max() {
    let totals = Totals::aggregate(&move_and_branch());
    assert_eq!(totals.bytes, 4);
    assert_eq!(totals.min, 12);
    assert_eq!(totals.max, 14);
    assert!(totals.is_range);

    let tail = Totals::aggregate(&move_and_branch()[1..]);
    assert_eq!(tail.bytes, 2);
    assert_eq!(tail.min, 8);
    assert_eq!(tail.max, 10);
    assert!(tail.is_range);
  }

  #[test]
  fn lines_without_timing_contribute_size_only() {
    let facts = vec![
      LineCost {
        bytes: 4,
        bss_bytes: 32,
        ..Default::default()
      },
      LineCost::default(),
    ];
    let totals = Totals::aggregate(&facts);
    assert_eq!(totals.bytes, 4);
    assert_eq!(totals.bss_bytes, 32);
    assert_eq!(totals.min, 0);
    assert_eq!(totals.max, 0);
    assert!(!totals.is_range);
  }

  #[test]
  fn equal_alternatives_are_not_a_range() {
    let facts = vec![LineCost {
      timing: Some(Timing::alternatives([6, 6])),
      ..Default::default()
    }];
    assert!(!Totals::aggregate(&facts).is_range);
  }

  #[test]
  fn aggregate_is_additive_at_any_split() {
    let facts = move_and_branch();
    let whole = Totals::aggregate(&facts);
    for split in 0..=facts.len() {
      let sum = Totals::aggregate(&facts[..split]) + Totals::aggregate(&facts[split..]);
      assert_eq!(sum, whole);
    }
  }

  #[test]
  fn status_formats() {
    let analyzer = PlainAnalyzer;
    let fixed = Totals {
      bytes:     6,
      bss_bytes: 0,
      min:       20,
      max:       20,
      is_range:  false,
    };
    assert_eq!(fixed.status(&analyzer), "Length: 6 Cycles: 20");

    let spread = Totals {
      bytes:     4,
      bss_bytes: 16,
      min:       12,
      max:       14,
      is_range:  true,
    };
    assert_eq!(spread.status(&analyzer), "Length: 4 (16) Cycles: 12-14");
  }
}
