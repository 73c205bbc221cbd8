//! Analysis window catalog.
//!
//! Every window is evaluated around the block centre: for a block of `N`
//! samples, `angle(i) = (i - N/2) * 2π / (N - 1)`. The cosine-sum windows are
//! unnormalized (Hanning peaks at 2.0), which keeps the spectrum scaling used
//! by the accumulator in the analysis crate.
//!
//! | Kind | weight(i) |
//! |------|-----------|
//! | Uniform | 1 |
//! | Hanning | 1 + cos(a) |
//! | Hamming | 1 + 0.857504 cos(a) |
//! | Blackman | 1 + 1.171912 cos(a) + 0.184449 cos(2a) |
//! | Flattop | 0.9994484 + 1.911456 cos(a) + 1.078578 cos(2a) + 0.183162 cos(3a) |
//! | P210 | 1 + 1.22258 cos(a) + 0.22258 cos(2a) |
//! | Triangle | 4 / (1 - \|i - N/2\| / (N/2)) |
//! | Exponential(r) | exp((i/N) ln(0.5) / max(r, 1e-20)) |
//! | Force(c, r) | gate(i) * Exponential(r) |
//!
//! The Force gate is 1 below `N*c`, a half-cosine fade from 1 to 0 over
//! `[N*c, 1.5*N*c)` and 0 beyond. When removing a window the gate is always 1.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};

use core::f64::consts::PI;
use core::str::FromStr;

/// Whether a window is multiplied into or divided out of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Multiply each sample by its weight.
    Apply,
    /// Divide each sample by its weight; zero weights force the sample to zero.
    Remove,
}

/// Window shapes supported by the measurement pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WindowKind {
    /// Rectangular (no weighting).
    Uniform,
    /// Raised cosine, peak 2.0 at the block centre.
    #[default]
    Hanning,
    /// Hamming.
    Hamming,
    /// Three-term Blackman.
    Blackman,
    /// Four-term flat-top for amplitude accuracy.
    Flattop,
    /// P210 three-term window.
    P210,
    /// Inverse triangle, rising towards the block edges.
    Triangle,
    /// Exponential decay reaching one half after `ratio` blocks.
    Exponential {
        /// Decay ratio; clamped to at least 1e-20.
        ratio: f32,
    },
    /// Gated exponential taper for transient (impact) capture.
    Force {
        /// Fraction of the block kept at full weight before the taper.
        constant: f32,
        /// Decay ratio of the exponential factor.
        ratio: f32,
    },
}

impl WindowKind {
    /// Canonical lowercase names, in catalog order.
    pub const NAMES: [&'static str; 9] = [
        "uniform",
        "hanning",
        "hamming",
        "blackman",
        "flattop",
        "p210",
        "triangle",
        "exponential",
        "force",
    ];

    /// Default exponential decay ratio.
    pub const DEFAULT_RATIO: f32 = 1.0;

    /// Canonical lowercase name of the window.
    pub fn name(&self) -> &'static str {
        match self {
            WindowKind::Uniform => "uniform",
            WindowKind::Hanning => "hanning",
            WindowKind::Hamming => "hamming",
            WindowKind::Blackman => "blackman",
            WindowKind::Flattop => "flattop",
            WindowKind::P210 => "p210",
            WindowKind::Triangle => "triangle",
            WindowKind::Exponential { .. } => "exponential",
            WindowKind::Force { .. } => "force",
        }
    }

    /// Multiply the window into `buffer`.
    pub fn apply(&self, buffer: &mut [f32]) {
        self.process(buffer, Direction::Apply);
    }

    /// Divide the window out of `buffer`.
    pub fn remove(&self, buffer: &mut [f32]) {
        self.process(buffer, Direction::Remove);
    }

    /// Apply or remove the window in place.
    pub fn process(&self, buffer: &mut [f32], direction: Direction) {
        let n = buffer.len();
        let shape = Shape::new(n);

        // Force taper progress; restarts on every call.
        let mut transition = 0usize;

        for (i, sample) in buffer.iter_mut().enumerate() {
            let weight = match *self {
                WindowKind::Force { constant, ratio } => {
                    let gate = force_gate(i, n, constant, direction, &mut transition);
                    gate * exponential(i, n, ratio)
                }
                _ => self.weight_at(&shape, i),
            };

            match direction {
                Direction::Apply => *sample = (f64::from(*sample) * weight) as f32,
                Direction::Remove => {
                    if weight == 0.0 {
                        *sample = 0.0;
                    } else {
                        *sample = (f64::from(*sample) / weight) as f32;
                    }
                }
            }
        }
    }

    /// Window weights for a block of `size` samples.
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        let mut coeffs = vec![1.0; size];
        self.apply(&mut coeffs);
        coeffs
    }

    fn weight_at(&self, shape: &Shape, i: usize) -> f64 {
        let angle = shape.angle(i);
        match *self {
            WindowKind::Uniform => 1.0,
            WindowKind::Hanning => 1.0 + libm::cos(angle),
            WindowKind::Hamming => 1.0 + 0.857504 * libm::cos(angle),
            WindowKind::Blackman => {
                1.0 + 1.171912 * libm::cos(angle) + 0.184449 * libm::cos(2.0 * angle)
            }
            WindowKind::Flattop => {
                0.9994484
                    + 1.911456 * libm::cos(angle)
                    + 1.078578 * libm::cos(2.0 * angle)
                    + 0.183162 * libm::cos(3.0 * angle)
            }
            WindowKind::P210 => {
                1.0 + 1.22258 * libm::cos(angle) + 0.22258 * libm::cos(2.0 * angle)
            }
            WindowKind::Triangle => shape.triangle(i),
            WindowKind::Exponential { ratio } => exponential(i, shape.len, ratio),
            WindowKind::Force { ratio, .. } => exponential(i, shape.len, ratio),
        }
    }
}

impl core::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WindowKind::Exponential { ratio } => write!(f, "exponential:{ratio}"),
            WindowKind::Force { constant, ratio } => write!(f, "force:{constant}:{ratio}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Error returned when a window specification cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWindowError(String);

impl core::fmt::Display for ParseWindowError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseWindowError {}

impl FromStr for WindowKind {
    type Err = ParseWindowError;

    /// Parse `name[:param[:param]]`.
    ///
    /// `exponential:RATIO` and `force:CONSTANT[:RATIO]` take parameters; the
    /// other windows take none. Names are case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let params = parts
            .map(|p| {
                p.trim()
                    .parse::<f32>()
                    .map_err(|_| ParseWindowError(format!("invalid window parameter '{p}' in '{s}'")))
            })
            .collect::<Result<Vec<f32>, _>>()?;

        let plain = |kind: WindowKind| {
            if params.is_empty() {
                Ok(kind)
            } else {
                Err(ParseWindowError(format!("window '{name}' takes no parameters")))
            }
        };

        match name.as_str() {
            "uniform" | "rectangular" | "none" => plain(WindowKind::Uniform),
            "hanning" | "hann" => plain(WindowKind::Hanning),
            "hamming" => plain(WindowKind::Hamming),
            "blackman" => plain(WindowKind::Blackman),
            "flattop" | "flat-top" => plain(WindowKind::Flattop),
            "p210" => plain(WindowKind::P210),
            "triangle" => plain(WindowKind::Triangle),
            "exponential" | "exp" => match params.as_slice() {
                [] => Ok(WindowKind::Exponential {
                    ratio: Self::DEFAULT_RATIO,
                }),
                [ratio] => Ok(WindowKind::Exponential { ratio: *ratio }),
                _ => Err(ParseWindowError(format!("too many parameters in '{s}'"))),
            },
            "force" => match params.as_slice() {
                [] => Ok(WindowKind::Force {
                    constant: 0.0,
                    ratio: Self::DEFAULT_RATIO,
                }),
                [constant] => Ok(WindowKind::Force {
                    constant: *constant,
                    ratio: Self::DEFAULT_RATIO,
                }),
                [constant, ratio] => Ok(WindowKind::Force {
                    constant: *constant,
                    ratio: *ratio,
                }),
                _ => Err(ParseWindowError(format!("too many parameters in '{s}'"))),
            },
            _ => Err(ParseWindowError(format!(
                "unknown window '{name}' (expected one of: {})",
                Self::NAMES.join(", ")
            ))),
        }
    }
}

/// Block geometry shared by the per-sample formulas.
struct Shape {
    len: usize,
    mid: f64,
    delta: f64,
}

impl Shape {
    fn new(len: usize) -> Self {
        let delta = if len > 1 {
            2.0 * PI / (len - 1) as f64
        } else {
            0.0
        };
        Self {
            len,
            mid: (len / 2) as f64,
            delta,
        }
    }

    #[inline]
    fn angle(&self, i: usize) -> f64 {
        (i as f64 - self.mid) * self.delta
    }

    /// Inverse triangle. The formula is singular where `|i - N/2| == N/2`;
    /// those samples take the value one step inside the edge.
    fn triangle(&self, i: usize) -> f64 {
        if self.mid < 1.0 {
            return 4.0;
        }
        let distance = (i as f64 - self.mid).abs().min(self.mid - 1.0);
        4.0 / (1.0 - distance / self.mid)
    }
}

#[inline]
fn exponential(i: usize, n: usize, ratio: f32) -> f64 {
    let scale = libm::log(0.5) / f64::from(ratio).max(1e-20);
    libm::exp((i as f64 / n as f64) * scale)
}

fn force_gate(
    i: usize,
    n: usize,
    constant: f32,
    direction: Direction,
    transition: &mut usize,
) -> f64 {
    let start = n as f64 * f64::from(constant);
    let index = i as f64;

    if direction == Direction::Remove || index < start {
        1.0
    } else if index >= start * 1.5 {
        0.0
    } else {
        let step = PI / (start / 2.0);
        let gate = 0.5 + 0.5 * libm::cos(step * *transition as f64);
        *transition += 1;
        gate
    }
}
