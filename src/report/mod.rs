//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimation/simulation core stays clean and testable
//! - output changes are localized

mod format;

pub use format::*;
