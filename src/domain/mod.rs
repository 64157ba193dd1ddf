//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - fiscal quarter labels and the numeric time axis (`Period`)
//! - loaded observations (`Observation`, `Dataset`)
//! - model hyperparameters (`SvrParams`, `KernelKind`, `Gamma`)
//! - forecast outputs (`ForecastResult`, `ForecastFile`)

pub mod period;
pub mod types;

pub use period::*;
pub use types::*;
