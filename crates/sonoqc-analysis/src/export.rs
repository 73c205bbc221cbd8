//! CSV export of averaged spectra.
//!
//! The table covers the audio band only: one row per bin from the bin
//! nearest 20 Hz to the bin nearest 20 kHz (clamped to Nyquist).
//!
//! ```text
//! Freq (Hz),Left,Right
//!    46.88,0.00001234,0.00000567
//! ```

use crate::spectrum::Spectrum;
use sonoqc_core::Channel;
use std::io::Write;
use std::path::Path;

/// Lowest exported frequency.
pub const CSV_LOW_HZ: f32 = 20.0;

/// Highest exported frequency.
pub const CSV_HIGH_HZ: f32 = 20_000.0;

/// Write `channels` of `spectrum` as CSV to `out`.
///
/// Columns follow the order of `channels`. The frequency column is printed
/// as `%8.2f` and amplitudes as `%10.8f`.
///
/// # Example
///
/// ```rust
/// use sonoqc_analysis::{Spectrum, export::write_spectrum_csv};
/// use sonoqc_core::Channel;
///
/// let spectrum = Spectrum::from_amplitudes(48000.0, 1024, vec![0.5; 513], vec![0.0; 513])?;
/// let mut csv = Vec::new();
/// write_spectrum_csv(&spectrum, &[Channel::Left], &mut csv)?;
///
/// let text = String::from_utf8(csv)?;
/// assert_eq!(text.lines().next(), Some("Freq (Hz),Left"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_spectrum_csv<W: Write>(
    spectrum: &Spectrum,
    channels: &[Channel],
    mut out: W,
) -> std::io::Result<()> {
    write!(out, "Freq (Hz)")?;
    for channel in channels {
        write!(out, ",{channel}")?;
    }
    writeln!(out)?;

    for k in spectrum.band(CSV_LOW_HZ, CSV_HIGH_HZ) {
        write!(out, "{:8.2}", spectrum.bin_frequency(k))?;
        for &channel in channels {
            write!(out, ",{:10.8}", spectrum.channel(channel)[k])?;
        }
        writeln!(out)?;
    }
    out.flush()
}

/// Write `channels` of `spectrum` as CSV to a new file at `path`.
pub fn export_spectrum_csv(
    spectrum: &Spectrum,
    channels: &[Channel],
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    write_spectrum_csv(spectrum, channels, std::io::BufWriter::new(file))
}
