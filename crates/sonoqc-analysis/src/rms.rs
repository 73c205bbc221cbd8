//! Time-domain RMS level meter.

use serde::Serialize;
use sonoqc_core::{Channel, StereoFrame};

/// Accumulates per-channel mean square over a fixed number of frames.
///
/// Each pushed sample contributes `sample² / frames`, so the running sums are
/// already means once the meter [is complete](Self::is_complete).
#[derive(Debug, Clone)]
pub struct RmsMeter {
    frames: u64,
    count: u64,
    sum: [f64; 2],
}

impl RmsMeter {
    /// Meter that averages over `frames` frames.
    pub fn new(frames: u64) -> Self {
        Self {
            frames,
            count: 0,
            sum: [0.0; 2],
        }
    }

    /// Frames the meter averages over.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames pushed so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether every configured frame has been pushed.
    pub fn is_complete(&self) -> bool {
        self.count >= self.frames
    }

    /// Add one frame.
    pub fn push(&mut self, frame: StereoFrame) {
        if self.frames == 0 {
            return;
        }
        let scale = self.frames as f64;
        for channel in Channel::ALL {
            let v = f64::from(frame.get(channel));
            self.sum[channel.index()] += v * v / scale;
        }
        self.count += 1;
    }

    /// RMS of the frames pushed, as a percentage of full scale.
    pub fn finish(&self) -> RmsResult {
        if self.count < self.frames {
            tracing::warn!(
                pushed = self.count,
                expected = self.frames,
                "finishing RMS before the full duration"
            );
        }
        RmsResult {
            left_percent: 100.0 * self.sum[0].sqrt(),
            right_percent: 100.0 * self.sum[1].sqrt(),
            frames: self.count,
        }
    }
}

/// RMS levels of both channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RmsResult {
    /// Left channel RMS in percent of full scale.
    pub left_percent: f64,
    /// Right channel RMS in percent of full scale.
    pub right_percent: f64,
    /// Frames measured.
    pub frames: u64,
}

impl RmsResult {
    /// RMS percentage for one channel.
    pub fn percent(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Left => self.left_percent,
            Channel::Right => self.right_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn full_scale_dc_is_one_hundred_percent() {
        let mut meter = RmsMeter::new(100);
        for _ in 0..100 {
            meter.push(StereoFrame::new(1.0, -1.0));
        }
        assert!(meter.is_complete());

        let result = meter.finish();
        assert!((result.left_percent - 100.0).abs() < 1e-9);
        assert!((result.right_percent - 100.0).abs() < 1e-9);
        assert_eq!(result.frames, 100);
    }

    #[test]
    fn sine_rms() {
        let n = 4800;
        let mut meter = RmsMeter::new(n);
        for i in 0..n {
            let phase = 2.0 * PI * 10.0 * i as f32 / n as f32;
            meter.push(StereoFrame::new(phase.sin(), 0.5 * phase.sin()));
        }
        let result = meter.finish();
        let expected = 100.0 / 2f64.sqrt();
        assert!((result.left_percent - expected).abs() < 1e-3);
        assert!((result.percent(Channel::Right) - expected / 2.0).abs() < 1e-3);
    }

    #[test]
    fn zero_duration_is_silent() {
        let mut meter = RmsMeter::new(0);
        meter.push(StereoFrame::new(1.0, 1.0));
        let result = meter.finish();
        assert_eq!(result.left_percent, 0.0);
        assert_eq!(result.frames, 0);
    }
}
