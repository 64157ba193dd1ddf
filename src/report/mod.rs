//! Reporting utilities: formatted terminal output for a forecast run.

pub mod format;

pub use format::*;
