//! Table-driven stand-in for a real instruction analyzer.
//!
//! Ships a handful of common 68000 mnemonics with representative costs so
//! the tool produces something to look at out of the box. The engine treats
//! it like any other [`Analyzer`]; swap in a real one for serious numbers.

use opmeter_lib::{
  analyzer::{
    AnalyzeError,
    Analyzer,
  },
  facts::{
    Calculation,
    LineCost,
    Timing,
  },
};

/// (mnemonic, bytes, cycles per outcome)
const FIXED_OPS: &[(&str, u32, &[u32])] = &[
  ("nop", 2, &[4]),
  ("rts", 2, &[16]),
  ("rte", 2, &[20]),
  ("moveq", 2, &[4]),
  ("move.b", 2, &[4]),
  ("move.w", 2, &[4]),
  ("move.l", 2, &[4]),
  ("clr.w", 2, &[4]),
  ("clr.l", 2, &[6]),
  ("add.w", 2, &[4]),
  ("add.l", 2, &[8]),
  ("sub.w", 2, &[4]),
  ("sub.l", 2, &[8]),
  ("cmp.w", 2, &[4]),
  ("cmp.l", 2, &[6]),
  ("lea", 4, &[8]),
  ("jmp", 4, &[12]),
  ("jsr", 4, &[18]),
  ("bra", 2, &[10]),
  ("bsr", 2, &[18]),
  ("mulu", 2, &[70]),
  ("muls", 2, &[70]),
  ("divu", 2, &[140]),
  ("divs", 2, &[158]),
];

/// Conditional branches: taken vs not taken.
const BRANCH_OPS: &[&str] = &[
  "beq", "bne", "bcc", "bcs", "bpl", "bmi", "bge", "bgt", "ble", "blt", "bvc", "bvs",
];

const SHIFT_OPS: &[&str] = &["lsl", "lsr", "asl", "asr", "rol", "ror"];

pub struct DemoAnalyzer;

impl Analyzer for DemoAnalyzer {
  fn analyze(&self, text: &str) -> Result<Vec<LineCost>, AnalyzeError> {
    Ok(text.split('\n').map(|line| self.cost_for(line)).collect())
  }
}

impl DemoAnalyzer {
  fn cost_for(&self, line: &str) -> LineCost {
    let code = line.trim();
    if code.is_empty() || code.starts_with(';') || code.starts_with('*') {
      return LineCost::default();
    }

    let mut tokens = code.split_whitespace();
    let Some(mut mnemonic) = tokens.next() else {
      return LineCost::default();
    };
    if mnemonic.ends_with(':') {
      match tokens.next() {
        Some(next) => mnemonic = next,
        None => return LineCost::default(),
      }
    }
    let mnemonic = mnemonic.to_ascii_lowercase();
    let operands = tokens.next().unwrap_or("");
    let (base_mnemonic, size) = match mnemonic.split_once('.') {
      Some((base, size)) => (base, Some(size)),
      None => (mnemonic.as_str(), None),
    };

    if base_mnemonic == "dc" {
      let unit = size_bytes(size);
      let count = operands.split(',').filter(|item| !item.is_empty()).count() as u32;
      return LineCost {
        bytes: unit * count.max(1),
        ..Default::default()
      };
    }
    if base_mnemonic == "ds" {
      let unit = size_bytes(size);
      let count: u32 = operands.trim().parse().unwrap_or(1);
      return LineCost {
        bss_bytes: unit * count.max(1),
        ..Default::default()
      };
    }

    if SHIFT_OPS.contains(&base_mnemonic) {
      let base = if size == Some("l") { 8 } else { 6 };
      let n = immediate_count(operands);
      let timing = Timing::fixed(base + 2 * n).with_calculation(Calculation {
        base,
        multiplier: Some(2),
        n,
        ea: None,
      });
      return self.timed(2, timing);
    }

    if BRANCH_OPS.contains(&base_mnemonic) {
      let timing = Timing::alternatives([10, 8]).with_labels(["taken", "not taken"]);
      return self.timed(2, timing);
    }
    if base_mnemonic == "dbf" || base_mnemonic == "dbra" {
      let timing = Timing::alternatives([10, 14]).with_labels(["taken", "not taken"]);
      return self.timed(2, timing);
    }

    if let Some(&(_, bytes, cycles)) = FIXED_OPS.iter().find(|(name, ..)| *name == mnemonic) {
      let timing = if cycles.len() > 1 {
        Timing::alternatives(cycles.iter().copied())
      } else {
        Timing::fixed(cycles[0])
      };
      return self.timed(bytes, timing);
    }

    log::debug!("no cost table entry for {mnemonic:?}");
    LineCost::default()
  }

  fn timed(&self, bytes: u32, timing: Timing) -> LineCost {
    let level = self.timing_level(timing.primary());
    LineCost {
      bytes,
      bss_bytes: 0,
      level: Some(level),
      timing: Some(timing),
    }
  }
}

fn size_bytes(size: Option<&str>) -> u32 {
  match size {
    Some("b") => 1,
    Some("l") => 4,
    _ => 2,
  }
}

/// Shift count from an immediate first operand, e.g. `#3,d0`. Defaults to
/// one when the count is a register or missing.
fn immediate_count(operands: &str) -> u32 {
  let Some(rest) = operands.strip_prefix('#') else {
    return 1;
  };
  let digits = rest.split(',').next().unwrap_or("");
  digits.trim().parse().unwrap_or(1)
}
