use crate::{
    animation::spring::{Spring, SpringParams},
    foundation::core::Millis,
    reveal::{
        config::RevealPolicy,
        media::{PlayReason, PlaybackOutcome},
    },
    schedule::timer::TimerQueue,
};

/// Media-side state owned by the driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct MediaRevealState {
    /// Instantaneous opacity goal before smoothing.
    pub opacity_target: f64,
    pub playing: bool,
    pub autoplay_blocked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DriverTimer {
    Retry,
}

/// Turns typing progress into a smoothed opacity and playback attempts.
///
/// The driver never touches the media element; it answers with the [`PlayReason`]s the
/// controller should issue.
#[derive(Clone, Debug)]
pub struct MediaRevealDriver {
    policy: RevealPolicy,
    spring: Spring,
    state: MediaRevealState,
    // Set by `Done` or a manual play; progress updates no longer move the target.
    forced: bool,
    early_issued: bool,
    timers: TimerQueue<DriverTimer>,
}

impl MediaRevealDriver {
    pub fn new(policy: RevealPolicy, spring: SpringParams) -> Self {
        Self {
            policy,
            spring: Spring::new(spring, 0.0),
            state: MediaRevealState::default(),
            forced: false,
            early_issued: false,
            timers: TimerQueue::new(),
        }
    }

    pub fn policy(&self) -> RevealPolicy {
        self.policy
    }

    pub fn state(&self) -> MediaRevealState {
        self.state
    }

    /// Smoothed opacity, clamped for rendering.
    pub fn opacity(&self) -> f64 {
        self.spring.value().clamp(0.0, 1.0)
    }

    pub fn has_pending_retry(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Typing progress changed to `fraction` (0..=1).
    pub fn on_progress(&mut self, fraction: f64) -> Option<PlayReason> {
        let RevealPolicy::Progressive { cap, play_trigger } = self.policy else {
            if !self.forced {
                self.state.opacity_target = 0.0;
            }
            return None;
        };

        if !self.forced {
            self.state.opacity_target = (fraction * cap).clamp(0.0, cap);
        }
        if fraction > play_trigger && !self.early_issued && !self.state.playing {
            self.early_issued = true;
            tracing::debug!(fraction, "play trigger crossed");
            return Some(PlayReason::EarlyTrigger);
        }
        None
    }

    /// Typing finished: full reveal and an immediate attempt, plus the gated retry.
    pub fn on_done(&mut self, now: Millis) -> Option<PlayReason> {
        self.forced = true;
        self.state.opacity_target = 1.0;
        if let RevealPolicy::Gated {
            retry_after_ms: Some(ms),
        } = self.policy
        {
            self.timers.schedule(now.after(ms), DriverTimer::Retry);
        }
        (!self.state.playing).then_some(PlayReason::Reveal)
    }

    /// Manual play: full opacity no matter how the attempt ends.
    pub fn force_full(&mut self) {
        self.forced = true;
        self.state.opacity_target = 1.0;
    }

    /// Fire due timers. The retry is dropped if playback already started.
    pub fn advance(&mut self, now: Millis) -> Option<PlayReason> {
        let mut reason = None;
        while let Some((_, DriverTimer::Retry)) = self.timers.pop_due(now) {
            if !self.state.playing {
                reason = Some(PlayReason::Retry);
            }
        }
        reason
    }

    pub fn on_play_outcome(&mut self, outcome: &PlaybackOutcome) {
        match outcome {
            Ok(()) => {
                self.state.playing = true;
                self.state.autoplay_blocked = false;
            }
            Err(_) => {
                self.state.playing = false;
                self.state.autoplay_blocked = true;
            }
        }
    }

    pub fn on_media_play(&mut self) {
        self.state.playing = true;
        self.state.autoplay_blocked = false;
    }

    pub fn on_media_pause(&mut self) {
        self.state.playing = false;
    }

    /// Back to hidden and idle. The spring keeps its value and decays from there.
    pub fn reset(&mut self) {
        self.timers.cancel_all();
        self.state = MediaRevealState::default();
        self.forced = false;
        self.early_issued = false;
    }

    /// Smoothed value before clamping.
    pub fn spring_value(&self) -> f64 {
        self.spring.value()
    }

    /// Advance smoothing by `dt_secs`; returns the smoothed (unclamped) value.
    pub fn step_spring(&mut self, dt_secs: f64) -> f64 {
        self.spring.set_target(self.state.opacity_target);
        self.spring.step(dt_secs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/driver.rs"]
mod tests;
