//! kubic-ci tool runner
//!
//! The only place kubic-ci starts external processes. Commands talk to a
//! [`ToolRunner`]; production code uses [`SystemRunner`], tests use
//! `fake::ScriptedRunner` (behind the `testing` feature).

#[cfg(any(test, feature = "testing"))]
pub mod fake;
pub mod runner;
pub mod tools;

pub use runner::{Invocation, SystemRunner, ToolOutput, ToolRunner, run_checked};
