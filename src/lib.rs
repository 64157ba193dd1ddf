//! `pe-forecast` library crate.
//!
//! The binary (`pe`) is a thin wrapper around this library so that:
//!
//! - the fitting and forecasting logic is testable without spawning processes
//! - the staged predictor can be embedded in other tools

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod forecast;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
