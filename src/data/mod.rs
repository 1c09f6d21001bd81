//! Synthetic data generation.

mod sample;

pub use sample::{SampleConfig, generate_panel};
