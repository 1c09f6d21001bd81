//! Numeric helpers shared by the estimator, engine, and validation code.

mod robust;
mod seed;

pub use robust::*;
pub use seed::*;
