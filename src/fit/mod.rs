//! Model fitting.
//!
//! Responsibilities:
//!
//! - standardize the loaded dataset into a training set (`prepare`)
//! - fit the epsilon-SVR on the standardized pairs (`svr`)

pub mod prepare;
pub mod svr;

pub use prepare::*;
pub use svr::*;
