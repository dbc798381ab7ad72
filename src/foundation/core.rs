use crate::foundation::error::{RevealError, RevealResult};

pub use kurbo::{Point, Vec2};

/// Host clock reading in whole milliseconds.
///
/// The engine never reads a clock itself; every entry point takes the host's `now`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Millis(pub u64);

impl Millis {
    /// Clock origin.
    pub const ZERO: Self = Self(0);

    /// Timestamp `ms` milliseconds after `self` (saturating).
    pub fn after(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed since `earlier`, zero when `earlier` is in the future.
    pub fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Convert to seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> RevealResult<Self> {
        if den == 0 {
            return Err(RevealError::schedule("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(RevealError::schedule("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Host timestamp of frame `frame`, rounded down to whole milliseconds.
    pub fn frame_to_millis(self, frame: u64) -> Millis {
        let ms = u128::from(frame) * 1000 * u128::from(self.den) / u128::from(self.num);
        Millis(u64::try_from(ms).unwrap_or(u64::MAX))
    }

    /// Number of frames needed to cover `ms` milliseconds (ceil).
    pub fn frames_covering(self, ms: u64) -> u64 {
        let num = u128::from(ms) * u128::from(self.num);
        let den = 1000 * u128::from(self.den);
        u64::try_from(num.div_ceil(den)).unwrap_or(u64::MAX)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 60, den: 1 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
