//! `solvency-sim` library crate.
//!
//! The binary (`solvency`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimator/simulator/engine are reusable from a serving layer
//! - code stays easy to navigate as the project grows
//!
//! The serving layer's two entry points are `engine::run_risk_assessment`
//! and `estimate::estimate_parameters`; both are pure functions of their
//! inputs plus an explicit seed.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod io;
pub mod math;
pub mod report;
pub mod simulate;
pub mod validate;
