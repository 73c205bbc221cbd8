//! Sonoqc Core - measurement primitives for two-channel audio path QC
//!
//! This crate holds the stateless and streaming building blocks that every
//! measurement in the workspace is assembled from:
//!
//! - [`StereoFrame`], [`StereoBlock`] and [`Channel`] - the interchange types
//!   for decoded left/right samples
//! - [`WindowKind`] - the fixed catalog of analysis windows, applied or
//!   removed in place
//! - [`MovingAverageHighPass`] - per-channel circular moving-average DC
//!   removal with half-buffer delay
//!
//! # Example
//!
//! ```rust
//! use sonoqc_core::{MovingAverageHighPass, WindowKind};
//!
//! let mut block = vec![1.0f32; 1024];
//! WindowKind::Hanning.apply(&mut block);
//!
//! let mut filter = MovingAverageHighPass::for_sample_rate(48000.0);
//! let mut last = None;
//! for _ in 0..10_000 {
//!     last = filter.process(0.25);
//! }
//! assert!(last.unwrap().abs() < 1e-4);
//! ```
//!
//! # no_std Support
//!
//! Disable the default `std` feature to use the crate with `alloc` only;
//! math goes through `libm`.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod frame;
pub mod high_pass;
pub mod window;

pub use frame::{Channel, StereoBlock, StereoFrame};
pub use high_pass::MovingAverageHighPass;
pub use window::{Direction, ParseWindowError, WindowKind};
