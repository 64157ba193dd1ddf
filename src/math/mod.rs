//! Mathematical utilities: standardization and kernel functions.

pub mod kernel;
pub mod scaler;

pub use kernel::*;
pub use scaler::*;
