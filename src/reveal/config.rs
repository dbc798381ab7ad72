use crate::{
    animation::spring::SpringParams,
    foundation::error::{RevealError, RevealResult},
    reveal::typing::TypingTiming,
};

/// Message typed over the poster when none is supplied.
pub const DEFAULT_MESSAGE: &str =
    "Once upon a time a kid wanted to be Spider-Man. He is a web developer now.";

/// How typing progress maps to media opacity and when playback is attempted.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum RevealPolicy {
    /// Hidden until typing is done, then full opacity and an immediate playback attempt.
    Gated {
        /// Delay of the single retry attempt; `None` disables it.
        #[serde(default = "default_retry_after_ms")]
        retry_after_ms: Option<u64>,
    },
    /// Opacity follows typing progress up to `cap`; playback is attempted early once
    /// progress exceeds `play_trigger`.
    Progressive { cap: f64, play_trigger: f64 },
}

fn default_retry_after_ms() -> Option<u64> {
    Some(400)
}

impl Default for RevealPolicy {
    fn default() -> Self {
        Self::Gated {
            retry_after_ms: default_retry_after_ms(),
        }
    }
}

impl RevealPolicy {
    pub fn validate(&self) -> RevealResult<()> {
        match *self {
            Self::Gated { .. } => Ok(()),
            Self::Progressive { cap, play_trigger } => {
                if !unit_interval(cap) {
                    return Err(RevealError::config("progressive cap must be in [0, 1]"));
                }
                if !unit_interval(play_trigger) {
                    return Err(RevealError::config(
                        "progressive play_trigger must be in [0, 1]",
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Tunables for one reveal-and-play controller.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Visible fraction at which the region counts as in view.
    pub in_view_ratio: f64,
    pub typing_speed_ms: u64,
    pub between_word_delay_ms: u64,
    pub policy: RevealPolicy,
    /// Smoothing applied to the opacity target.
    pub spring: SpringParams,
    /// Reduced motion: delay before jumping straight to the finished state.
    pub reduced_motion_delay_ms: u64,
    /// Exit fade for the overlay, applied by the presentation layer.
    pub overlay_exit_secs: f64,
    /// A hidden pointer is restored once the fading opacity falls to this.
    pub pointer_restore_threshold: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            in_view_ratio: 0.5,
            typing_speed_ms: 35,
            between_word_delay_ms: 110,
            policy: RevealPolicy::default(),
            spring: SpringParams::default(),
            reduced_motion_delay_ms: 120,
            overlay_exit_secs: 0.25,
            pointer_restore_threshold: 0.05,
        }
    }
}

impl RevealConfig {
    pub fn from_json_str(s: &str) -> RevealResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> RevealResult<()> {
        if !unit_interval(self.in_view_ratio) {
            return Err(RevealError::config("in_view_ratio must be in [0, 1]"));
        }
        if self.typing_speed_ms == 0 {
            return Err(RevealError::config("typing_speed_ms must be > 0"));
        }
        self.policy.validate()?;
        self.spring.validate()?;
        if !self.overlay_exit_secs.is_finite() || self.overlay_exit_secs < 0.0 {
            return Err(RevealError::config(
                "overlay_exit_secs must be finite and >= 0",
            ));
        }
        if !unit_interval(self.pointer_restore_threshold) {
            return Err(RevealError::config(
                "pointer_restore_threshold must be in [0, 1]",
            ));
        }
        Ok(())
    }

    pub fn typing_timing(&self) -> TypingTiming {
        TypingTiming {
            typing_speed_ms: self.typing_speed_ms,
            between_word_delay_ms: self.between_word_delay_ms,
            reduced_motion_delay_ms: self.reduced_motion_delay_ms,
        }
    }
}

fn unit_interval(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/config.rs"]
mod tests;
