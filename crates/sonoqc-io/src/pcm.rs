//! Interleaved stereo PCM decoding and encoding.
//!
//! Samples are signed little-endian integers left-justified in a 32-bit
//! container. 32-bit streams carry all four container bytes per sample;
//! 16-bit streams carry only the two most significant ones. Either way the
//! decoded value is `container / 2^31`, so the scale does not depend on the
//! width.

use crate::{Error, Result};
use sonoqc_core::StereoFrame;
use std::io::{ErrorKind, Read};

/// Divisor mapping the 32-bit container onto `[-1.0, 1.0)`.
pub const FULL_SCALE: f32 = 2_147_483_648.0;

/// Byte substituted for missing input under [`ShortReadPolicy::Pad`].
pub const PAD_BYTE: u8 = 0xFF;

/// Bits per sample on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleWidth {
    /// Two most significant container bytes per sample.
    Bits16,
    /// Full 32-bit container per sample.
    #[default]
    Bits32,
}

impl SampleWidth {
    /// Width from a bit count (16 or 32).
    pub fn from_bits(bits: u16) -> Result<Self> {
        match bits {
            16 => Ok(SampleWidth::Bits16),
            32 => Ok(SampleWidth::Bits32),
            other => Err(Error::UnsupportedWidth(other)),
        }
    }

    /// Bits per sample.
    pub fn bits(self) -> u16 {
        match self {
            SampleWidth::Bits16 => 16,
            SampleWidth::Bits32 => 32,
        }
    }

    /// Bytes per channel sample.
    pub fn bytes_per_sample(self) -> usize {
        usize::from(self.bits() / 8)
    }

    /// Bytes per stereo frame.
    pub fn bytes_per_frame(self) -> usize {
        2 * self.bytes_per_sample()
    }
}

/// What to do when the stream ends in the middle of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortReadPolicy {
    /// Abort with [`Error::InsufficientInput`].
    #[default]
    Fail,
    /// Substitute [`PAD_BYTE`] for every missing byte and carry on.
    ///
    /// For live sources that are known to be padded at the end; the padded
    /// samples decode to values just below zero.
    Pad,
}

/// Decode one channel sample from its wire bytes.
///
/// `bytes` must hold exactly `width.bytes_per_sample()` bytes.
#[inline]
pub fn decode_sample(bytes: &[u8], width: SampleWidth) -> f32 {
    let container = match width {
        SampleWidth::Bits32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        SampleWidth::Bits16 => i32::from_le_bytes([0, 0, bytes[0], bytes[1]]),
    };
    container as f32 / FULL_SCALE
}

/// Append one frame in wire format to `out`.
///
/// Values are rounded to the nearest representable sample and clamped to
/// the container range.
pub fn encode_frame(frame: StereoFrame, width: SampleWidth, out: &mut Vec<u8>) {
    for value in [frame.left, frame.right] {
        match width {
            SampleWidth::Bits32 => {
                let scaled = (f64::from(value) * f64::from(FULL_SCALE)).round();
                let container = scaled.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
                out.extend_from_slice(&container.to_le_bytes());
            }
            SampleWidth::Bits16 => {
                let scaled = (f64::from(value) * 32768.0).round();
                let sample = scaled.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
                out.extend_from_slice(&sample.to_le_bytes());
            }
        }
    }
}

/// Encode a sequence of frames in wire format.
pub fn encode_frames(frames: impl IntoIterator<Item = StereoFrame>, width: SampleWidth) -> Vec<u8> {
    let mut out = Vec::new();
    for frame in frames {
        encode_frame(frame, width, &mut out);
    }
    out
}

/// Decoder for an interleaved stereo PCM byte stream.
///
/// The stream is consumed forward only. Wrap unbuffered sources (files,
/// stdin) in a [`std::io::BufReader`].
///
/// # Example
///
/// ```rust
/// use sonoqc_io::{PcmReader, SampleWidth, ShortReadPolicy};
///
/// // One and a half 16-bit frames.
/// let bytes: &[u8] = &[0x00, 0x40, 0x00, 0xC0, 0x00, 0x20];
///
/// let mut strict = PcmReader::new(bytes, SampleWidth::Bits16);
/// assert!(strict.read_frame().is_ok());
/// assert!(strict.read_frame().unwrap_err().is_insufficient_input());
///
/// let mut lenient = PcmReader::new(bytes, SampleWidth::Bits16)
///     .with_policy(ShortReadPolicy::Pad);
/// lenient.read_frame().unwrap();
/// let padded = lenient.read_frame().unwrap();
/// assert_eq!(padded.left, 0.25);
/// assert!(padded.right < 0.0);
/// ```
#[derive(Debug)]
pub struct PcmReader<R> {
    inner: R,
    width: SampleWidth,
    policy: ShortReadPolicy,
    frames_read: u64,
    padded_bytes: u64,
}

impl<R: Read> PcmReader<R> {
    /// Create a strict reader ([`ShortReadPolicy::Fail`]).
    pub fn new(inner: R, width: SampleWidth) -> Self {
        Self {
            inner,
            width,
            policy: ShortReadPolicy::Fail,
            frames_read: 0,
            padded_bytes: 0,
        }
    }

    /// Set the short-read policy.
    pub fn with_policy(mut self, policy: ShortReadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sample width being decoded.
    pub fn width(&self) -> SampleWidth {
        self.width
    }

    /// Short-read policy in effect.
    pub fn policy(&self) -> ShortReadPolicy {
        self.policy
    }

    /// Frames decoded so far, including padded ones.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Bytes fabricated from [`PAD_BYTE`] so far.
    pub fn padded_bytes(&self) -> u64 {
        self.padded_bytes
    }

    /// Consume the reader, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Decode the next stereo frame.
    pub fn read_frame(&mut self) -> Result<StereoFrame> {
        let frame_len = self.width.bytes_per_frame();
        let mut buf = [0u8; 8];
        let got = self.read_up_to(&mut buf[..frame_len])?;

        if got < frame_len {
            let missing = (frame_len - got) as u64;
            self.on_short_read(missing)?;
            buf[got..frame_len].fill(PAD_BYTE);
        }

        let sample_len = self.width.bytes_per_sample();
        let frame = StereoFrame::new(
            decode_sample(&buf[..sample_len], self.width),
            decode_sample(&buf[sample_len..frame_len], self.width),
        );
        self.frames_read += 1;
        Ok(frame)
    }

    /// Discard `count` leading bytes.
    pub fn skip_bytes(&mut self, count: u64) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let skipped = std::io::copy(&mut (&mut self.inner).take(count), &mut std::io::sink())?;
        tracing::debug!(requested = count, skipped, "skipped leading bytes");

        if skipped < count {
            self.on_short_read(count - skipped)?;
        }
        Ok(())
    }

    /// Fill `buf` as far as the stream allows, returning the byte count.
    fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn on_short_read(&mut self, missing: u64) -> Result<()> {
        match self.policy {
            ShortReadPolicy::Fail => Err(Error::insufficient_input(self.frames_read, missing)),
            ShortReadPolicy::Pad => {
                if self.padded_bytes == 0 {
                    tracing::warn!(
                        frames_read = self.frames_read,
                        "input exhausted, padding with 0x{:02X}",
                        PAD_BYTE
                    );
                }
                self.padded_bytes += missing;
                Ok(())
            }
        }
    }
}
