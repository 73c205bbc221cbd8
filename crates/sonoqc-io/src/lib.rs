//! PCM stream input layer for sonoqc measurements.
//!
//! This crate provides:
//!
//! - **Decoding**: [`PcmReader`] turns an interleaved little-endian stereo byte
//!   stream (16 or 32 bit) into normalized [`StereoFrame`]s
//! - **Frame sources**: the [`FrameSource`] trait, implemented by the reader
//!   and by [`HighPassSource`], which removes DC from each channel on the fly
//! - **Encoding**: [`encode_frame`] writes frames in the same format, used to
//!   build fixtures
//!
//! ## Quick Start
//!
//! ```rust
//! use sonoqc_io::{FrameSource, PcmReader, SampleWidth};
//!
//! let bytes: &[u8] = &[0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0xC0];
//! let mut reader = PcmReader::new(bytes, SampleWidth::Bits32);
//!
//! let frame = reader.next_frame()?;
//! assert_eq!(frame.left, 0.5);
//! assert_eq!(frame.right, -0.5);
//! # Ok::<(), sonoqc_io::Error>(())
//! ```

mod pcm;
mod source;

pub use pcm::{
    FULL_SCALE, PAD_BYTE, PcmReader, SampleWidth, ShortReadPolicy, decode_sample, encode_frame,
    encode_frames,
};
pub use source::{FrameSource, HighPassSource};

pub use sonoqc_core::{Channel, StereoBlock, StereoFrame};

/// Error types for PCM input operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying stream read error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before the requested data was available.
    #[error(
        "insufficient input: stream ended after {frames_read} complete frames ({missing_bytes} bytes missing)"
    )]
    InsufficientInput {
        /// Complete frames decoded before the stream ran out.
        frames_read: u64,
        /// Bytes still needed to satisfy the request.
        missing_bytes: u64,
    },

    /// The requested sample width is not supported.
    #[error("unsupported sample width: {0} bits (expected 16 or 32)")]
    UnsupportedWidth(u16),
}

impl Error {
    /// Create an insufficient input error.
    pub fn insufficient_input(frames_read: u64, missing_bytes: u64) -> Self {
        Error::InsufficientInput {
            frames_read,
            missing_bytes,
        }
    }

    /// Whether the error reports a stream that ran out of data.
    pub fn is_insufficient_input(&self) -> bool {
        matches!(self, Error::InsufficientInput { .. })
    }
}

/// Result type for PCM input operations.
pub type Result<T> = std::result::Result<T, Error>;
