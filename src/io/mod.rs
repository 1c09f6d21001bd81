//! Input/output helpers.
//!
//! - cleaned-panel CSV loading (`panel`)
//! - parameter and result JSON read/write (`export`)
//!
//! All file I/O lives here; the estimation and simulation core is pure.

pub mod export;
pub mod panel;

pub use export::*;
pub use panel::*;
