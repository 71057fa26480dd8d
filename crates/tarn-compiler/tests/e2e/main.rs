//! End-to-end tests for the lowering pass
//!
//! These tests evaluate hand-built trees before and after lowering and
//! verify that the lowered form behaves the same, or differs exactly where
//! the lowering is defined to differ.

mod control_flow;
mod finally;
mod harness;
mod scripts;

pub use harness::*;
