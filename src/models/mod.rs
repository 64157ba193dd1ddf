//! Fitted model representation.
//!
//! The model is a small value type so that fitting code and forecasting code
//! only share its prediction function.

pub mod model;

pub use model::*;
