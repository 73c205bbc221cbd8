//! Stereo sample interchange types.
//!
//! [`StereoFrame`] is one decoded left/right pair, [`StereoBlock`] a pair of
//! equal-length channel buffers filled frame by frame for one analysis pass.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// One of the two channels of the measured audio path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Left channel (first in each interleaved frame).
    Left,
    /// Right channel (second in each interleaved frame).
    Right,
}

impl Channel {
    /// Both channels in interleave order.
    pub const ALL: [Channel; 2] = [Channel::Left, Channel::Right];

    /// Position of the channel within a frame (0 = left, 1 = right).
    pub fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }

    /// Human-readable channel name.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Left => "Left",
            Channel::Right => "Right",
        }
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded stereo frame, normalized to full scale (`[-1.0, 1.0)`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoFrame {
    /// Left channel sample.
    pub left: f32,
    /// Right channel sample.
    pub right: f32,
}

impl StereoFrame {
    /// Create a frame from a left/right pair.
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Sample for the given channel.
    #[inline]
    pub fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Left => self.left,
            Channel::Right => self.right,
        }
    }

    /// Mutable sample for the given channel.
    #[inline]
    pub fn get_mut(&mut self, channel: Channel) -> &mut f32 {
        match channel {
            Channel::Left => &mut self.left,
            Channel::Right => &mut self.right,
        }
    }
}

/// A pair of equal-length channel buffers.
///
/// Allocated once per measurement run at the configured transform length
/// and refilled for every averaging pass.
#[derive(Debug, Clone)]
pub struct StereoBlock {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoBlock {
    /// Create a zeroed block holding `len` frames.
    pub fn new(len: usize) -> Self {
        Self {
            left: vec![0.0; len],
            right: vec![0.0; len],
        }
    }

    /// Number of frames per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Check if the block holds no frames.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Store a frame at `index`.
    #[inline]
    pub fn set(&mut self, index: usize, frame: StereoFrame) {
        self.left[index] = frame.left;
        self.right[index] = frame.right;
    }

    /// Samples for one channel.
    pub fn channel(&self, channel: Channel) -> &[f32] {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }

    /// Mutable samples for one channel.
    pub fn channel_mut(&mut self, channel: Channel) -> &mut [f32] {
        match channel {
            Channel::Left => &mut self.left,
            Channel::Right => &mut self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_indices_follow_interleave_order() {
        assert_eq!(Channel::Left.index(), 0);
        assert_eq!(Channel::Right.index(), 1);
        assert_eq!(Channel::ALL, [Channel::Left, Channel::Right]);
    }

    #[test]
    fn frame_accessors_select_channel() {
        let mut frame = StereoFrame::new(0.25, -0.5);
        assert_eq!(frame.get(Channel::Left), 0.25);
        assert_eq!(frame.get(Channel::Right), -0.5);

        *frame.get_mut(Channel::Right) = 0.75;
        assert_eq!(frame.right, 0.75);
    }

    #[test]
    fn block_set_writes_both_channels() {
        let mut block = StereoBlock::new(4);
        block.set(2, StereoFrame::new(1.0, -1.0));

        assert_eq!(block.len(), 4);
        assert_eq!(block.channel(Channel::Left), &[0.0, 0.0, 1.0, 0.0]);
        assert_eq!(block.channel(Channel::Right), &[0.0, 0.0, -1.0, 0.0]);
    }
}
