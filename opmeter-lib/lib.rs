use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod analyzer;
pub mod facts;
pub mod overlay;
pub mod registry;
pub mod scratch;
pub mod session;
pub mod surface;
pub mod totals;

pub type Tendril = SmartString<LazyCompact>;
