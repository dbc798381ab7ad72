use crate::{
    foundation::error::{RevealError, RevealResult},
    reveal::{
        config::{DEFAULT_MESSAGE, RevealConfig},
        media::{MediaEvent, MediaSource},
    },
};

/// How the simulated media element answers playback attempts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoplayPolicy {
    /// Every attempt succeeds.
    #[default]
    Allow,
    /// Every attempt is rejected.
    Block,
    /// Only attempts caused by a user gesture succeed.
    RequireGesture,
}

/// One host input at a fixed time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptedEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub kind: ScriptedEventKind,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptedEventKind {
    /// Intersection update with the given visible ratio.
    Intersect { ratio: f64 },
    ManualPlay,
    Media { event: MediaEvent },
    SetMessage { message: String },
    Unmount,
}

/// A scripted run of one controller, replayable frame by frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_message")]
    pub message: String,
    /// No media surface is attached when absent.
    #[serde(default)]
    pub media: Option<MediaSource>,
    #[serde(default)]
    pub config: RevealConfig,
    #[serde(default)]
    pub reduced_motion: bool,
    #[serde(default = "default_true")]
    pub observer_supported: bool,
    #[serde(default)]
    pub autoplay: AutoplayPolicy,
    /// Time between a play request and its resolution.
    #[serde(default)]
    pub play_latency_ms: u64,
    pub duration_ms: u64,
    #[serde(default)]
    pub events: Vec<ScriptedEvent>,
}

fn default_message() -> String {
    DEFAULT_MESSAGE.to_owned()
}

fn default_true() -> bool {
    true
}

impl Scenario {
    pub fn from_json_str(s: &str) -> RevealResult<Self> {
        let scenario: Self = serde_json::from_str(s)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> RevealResult<()> {
        self.config.validate()?;
        if self.duration_ms == 0 {
            return Err(RevealError::scenario("duration_ms must be > 0"));
        }
        if !self.events.windows(2).all(|w| w[0].at_ms <= w[1].at_ms) {
            return Err(RevealError::scenario("events must be sorted by at_ms"));
        }
        for (i, ev) in self.events.iter().enumerate() {
            if ev.at_ms > self.duration_ms {
                return Err(RevealError::scenario(format!(
                    "event {i} at {}ms is past duration_ms",
                    ev.at_ms
                )));
            }
            if let ScriptedEventKind::Intersect { ratio } = ev.kind {
                if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
                    return Err(RevealError::scenario(format!(
                        "event {i} has intersection ratio outside [0, 1]"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scenario/model.rs"]
mod tests;
