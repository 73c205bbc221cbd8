//! Measurement drivers that pull frames from a [`FrameSource`].
//!
//! Both drivers read exactly the frames they need and stop. Any preceding
//! skip or DC removal is the caller's choice of source.

use crate::error::{AnalysisError, Result};
use crate::rms::{RmsMeter, RmsResult};
use crate::spectrum::{Spectrum, SpectrumAccumulator};
use sonoqc_core::StereoBlock;
use sonoqc_io::FrameSource;

/// Fill and accumulate every pass of `accumulator` from `source`.
///
/// `on_pass` is called with the number of completed passes after each one,
/// which lets callers drive a progress display.
///
/// # Example
///
/// ```rust
/// use sonoqc_analysis::{SpectrumAccumulator, ThdnAnalyzer, measure::measure_spectrum};
/// use sonoqc_core::Channel;
/// use sonoqc_io::{PcmReader, SampleWidth, StereoFrame, encode_frames};
///
/// let bytes = encode_frames(vec![StereoFrame::default(); 256], SampleWidth::Bits32);
/// let mut reader = PcmReader::new(&bytes[..], SampleWidth::Bits32);
///
/// let accumulator = SpectrumAccumulator::new(128, 2)?;
/// let spectrum = measure_spectrum(&mut reader, accumulator, 48000.0, |_| {})?;
/// let result = ThdnAnalyzer::new().analyze(&spectrum, Channel::Left);
/// assert_eq!(result.thdn_percent, 100.0);
/// # Ok::<(), sonoqc_analysis::AnalysisError>(())
/// ```
pub fn measure_spectrum<S, F>(
    mut source: S,
    mut accumulator: SpectrumAccumulator,
    sample_rate: f32,
    mut on_pass: F,
) -> Result<Spectrum>
where
    S: FrameSource,
    F: FnMut(usize),
{
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(AnalysisError::InvalidSampleRate(sample_rate));
    }
    let mut block = StereoBlock::new(accumulator.fft_size());
    tracing::info!(
        fft_size = accumulator.fft_size(),
        averages = accumulator.averages(),
        window = %accumulator.window(),
        sample_rate,
        "measuring spectrum"
    );

    while !accumulator.is_complete() {
        source.fill_block(&mut block)?;
        accumulator.add_pass(&block)?;
        on_pass(accumulator.passes());
    }
    Ok(accumulator.finish(sample_rate))
}

/// Measure RMS over the next `frames` frames of `source`.
pub fn measure_rms<S: FrameSource>(mut source: S, frames: u64) -> Result<RmsResult> {
    tracing::info!(frames, "measuring rms");
    let mut meter = RmsMeter::new(frames);
    while !meter.is_complete() {
        meter.push(source.next_frame()?);
    }
    Ok(meter.finish())
}
