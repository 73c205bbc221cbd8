//! CLI command implementations.

pub mod common;
pub mod rms;
pub mod spectrum;
pub mod thdn;
