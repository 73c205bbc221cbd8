//! Frame sources: anything that yields decoded stereo frames in stream order.

use crate::{PcmReader, Result};
use sonoqc_core::{Channel, MovingAverageHighPass, StereoBlock, StereoFrame};
use std::io::Read;

/// A forward-only supply of stereo frames.
///
/// Measurements pull frames through this trait so that the DC-removal stage
/// can be inserted or left out without the consumer knowing.
pub trait FrameSource {
    /// Produce the next frame.
    fn next_frame(&mut self) -> Result<StereoFrame>;

    /// Discard `count` frames.
    fn skip_frames(&mut self, count: u64) -> Result<()> {
        for _ in 0..count {
            self.next_frame()?;
        }
        Ok(())
    }

    /// Fill every frame of `block` in order.
    fn fill_block(&mut self, block: &mut StereoBlock) -> Result<()> {
        for i in 0..block.len() {
            let frame = self.next_frame()?;
            block.set(i, frame);
        }
        Ok(())
    }
}

impl<R: Read> FrameSource for PcmReader<R> {
    fn next_frame(&mut self) -> Result<StereoFrame> {
        self.read_frame()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn next_frame(&mut self) -> Result<StereoFrame> {
        (**self).next_frame()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<StereoFrame> {
        (**self).next_frame()
    }
}

/// Frame source that removes DC from each channel of another source.
///
/// Holds one [`MovingAverageHighPass`] per channel. The first call to
/// [`next_frame`](FrameSource::next_frame) pulls `H - 1` extra frames from
/// the inner source to prime both windows.
///
/// # Example
///
/// ```rust
/// use sonoqc_io::{FrameSource, HighPassSource, PcmReader, SampleWidth, StereoFrame, encode_frames};
///
/// let dc = encode_frames(vec![StereoFrame::new(0.25, -0.25); 64], SampleWidth::Bits32);
/// let reader = PcmReader::new(&dc[..], SampleWidth::Bits32);
/// let mut filtered = HighPassSource::new(reader, 16);
///
/// let frame = filtered.next_frame()?;
/// assert!(frame.left.abs() < 1e-6);
/// assert!(frame.right.abs() < 1e-6);
/// # Ok::<(), sonoqc_io::Error>(())
/// ```
#[derive(Debug)]
pub struct HighPassSource<S> {
    inner: S,
    left: MovingAverageHighPass,
    right: MovingAverageHighPass,
}

impl<S: FrameSource> HighPassSource<S> {
    /// Wrap `inner` with filters of `filter_len` samples per channel.
    pub fn new(inner: S, filter_len: usize) -> Self {
        Self {
            inner,
            left: MovingAverageHighPass::new(filter_len),
            right: MovingAverageHighPass::new(filter_len),
        }
    }

    /// Wrap `inner` with filters spanning a tenth of a second.
    pub fn for_sample_rate(inner: S, sample_rate: f32) -> Self {
        Self::new(
            inner,
            MovingAverageHighPass::len_for_sample_rate(sample_rate),
        )
    }

    /// Filter state for one channel.
    pub fn filter(&self, channel: Channel) -> &MovingAverageHighPass {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }

    /// Access the wrapped source.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consume the adapter, returning the wrapped source.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSource> FrameSource for HighPassSource<S> {
    fn next_frame(&mut self) -> Result<StereoFrame> {
        if !self.left.is_primed() {
            tracing::debug!(filter_len = self.left.len(), "priming high-pass filters");
        }

        loop {
            let raw = self.inner.next_frame()?;
            let left = self.left.process(raw.left);
            let right = self.right.process(raw.right);

            if let (Some(left), Some(right)) = (left, right) {
                return Ok(StereoFrame::new(left, right));
            }
        }
    }
}
