use crate::{
    foundation::{core::Millis, error::RevealResult},
    reveal::{
        config::RevealConfig,
        driver::{MediaRevealDriver, MediaRevealState},
        media::{
            MediaEvent, MediaSource, MediaSurface, PlayReason, PlayRequest, PlayTicket,
            PlaybackOutcome,
        },
        pointer::{NoPointer, PointerAffordance},
        typing::{TypingEvent, TypingProgress, TypingSequencer},
        visibility::{IntersectionSample, ObserverSupport, VisibilityTracker},
    },
};

/// Host capabilities and preferences, read once per mount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    pub reduced_motion: bool,
    pub observer: ObserverSupport,
}

/// Everything the presentation layer needs for one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameOutput {
    pub at: Millis,
    pub in_view: bool,
    /// Spring-smoothed media opacity.
    pub opacity: f64,
    pub opacity_target: f64,
    pub playing: bool,
    pub autoplay_blocked: bool,
    /// Render the manual play control.
    pub show_play_button: bool,
    /// Overlay (poster + typed message) is mounted.
    pub show_message: bool,
    pub overlay_exit_secs: f64,
    pub pointer_hidden: bool,
    pub progress: TypingProgress,
    pub typed_text: String,
}

/// The reveal-and-play controller.
///
/// Wires visibility into the typing sequencer, typing into the media reveal driver, and
/// the driver into the attached [`MediaSurface`] and [`PointerAffordance`]. All state is
/// transient: leaving the viewport puts everything back to its initial values.
///
/// The host calls [`observe`](Self::observe) on intersection changes,
/// [`tick`](Self::tick) once per animation frame, and
/// [`playback_resolved`](Self::playback_resolved) when a play request settles.
pub struct RevealController {
    config: RevealConfig,
    source: MediaSource,
    env: Environment,

    visibility: VisibilityTracker,
    typing: TypingSequencer,
    driver: MediaRevealDriver,

    media: Option<Box<dyn MediaSurface>>,
    pointer: Box<dyn PointerAffordance>,
    // Last value this instance wrote to the pointer sink.
    pointer_hidden: bool,

    show_message: bool,
    mounted: bool,
    ticket_epoch: u64,
    next_ticket: u64,
    last_tick: Option<Millis>,
}

impl RevealController {
    pub fn new(message: &str, config: RevealConfig, env: Environment) -> RevealResult<Self> {
        config.validate()?;
        Ok(Self {
            visibility: VisibilityTracker::new(config.in_view_ratio, env.observer),
            typing: TypingSequencer::new(message, config.typing_timing(), env.reduced_motion),
            driver: MediaRevealDriver::new(config.policy, config.spring),
            config,
            source: MediaSource::default(),
            env,
            media: None,
            pointer: Box::new(NoPointer),
            pointer_hidden: false,
            show_message: false,
            mounted: false,
            ticket_epoch: 0,
            next_ticket: 0,
            last_tick: None,
        })
    }

    pub fn with_source(mut self, source: MediaSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_pointer(mut self, pointer: Box<dyn PointerAffordance>) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    pub fn environment(&self) -> Environment {
        self.env
    }

    pub fn typing(&self) -> &TypingSequencer {
        &self.typing
    }

    pub fn reveal_state(&self) -> MediaRevealState {
        self.driver.state()
    }

    pub fn in_view(&self) -> bool {
        self.visibility.in_view()
    }

    pub fn show_message(&self) -> bool {
        self.show_message
    }

    pub fn opacity(&self) -> f64 {
        self.driver.opacity()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// True while any typing step or playback retry is scheduled.
    pub fn has_pending_timers(&self) -> bool {
        self.typing.has_pending_timers() || self.driver.has_pending_retry()
    }

    pub fn mount(&mut self, now: Millis) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.last_tick = Some(now);
        self.visibility.mount();
        tracing::debug!(src = %self.source.src, "reveal controller mounted");
    }

    /// Tear down: cancels every timer and invalidates in-flight playback attempts.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.visibility.unmount();
        self.typing.stop();
        self.driver.reset();
        self.ticket_epoch += 1;
        self.show_message = false;
        if self.pointer_hidden {
            self.set_pointer_hidden(false);
        }
        self.mounted = false;
        tracing::debug!("reveal controller unmounted");
    }

    pub fn attach_media(&mut self, media: Box<dyn MediaSurface>) {
        self.media = Some(media);
    }

    pub fn detach_media(&mut self) -> Option<Box<dyn MediaSurface>> {
        self.media.take()
    }

    /// Feed an intersection observation.
    pub fn observe(&mut self, sample: IntersectionSample, now: Millis) {
        if !self.mounted {
            return;
        }
        match self.visibility.observe(sample) {
            Some(true) => self.enter_view(now),
            Some(false) => self.leave_view(),
            None => {}
        }
    }

    /// Replace the message. An active run restarts from the first word.
    pub fn set_message(&mut self, message: &str, now: Millis) {
        let events = self.typing.set_message(message, now);
        if events.is_empty() {
            return;
        }
        tracing::debug!("message changed; restarting reveal");
        self.reset_media();
        self.show_message = true;
        self.apply_typing_events(&events);
    }

    /// Advance timers and smoothing to `now` and return the frame snapshot.
    pub fn tick(&mut self, now: Millis) -> FrameOutput {
        if !self.mounted {
            return self.output(now);
        }

        let events = self.typing.advance(now);
        self.apply_typing_events(&events);
        if let Some(reason) = self.driver.advance(now) {
            self.attempt_play(reason);
        }

        let dt = self.last_tick.map_or(0, |prev| now.since(prev));
        self.last_tick = Some(now);
        let before = self.driver.spring_value();
        let value = self.driver.step_spring(dt as f64 / 1000.0);
        // A hide never outlives the media fading out.
        let decayed = value < before && value <= self.config.pointer_restore_threshold;
        if self.pointer_hidden && decayed {
            tracing::debug!(value, "opacity decayed; restoring pointer");
            self.set_pointer_hidden(false);
        }

        self.output(now)
    }

    /// Report how a playback attempt settled. Stale tickets are ignored.
    pub fn playback_resolved(&mut self, ticket: PlayTicket, outcome: PlaybackOutcome) {
        if !self.mounted || ticket.epoch != self.ticket_epoch {
            tracing::debug!(seq = ticket.seq, "ignoring stale playback resolution");
            return;
        }
        self.driver.on_play_outcome(&outcome);
        match outcome {
            Ok(()) => {
                tracing::debug!(seq = ticket.seq, "playback started");
                self.set_pointer_hidden(true);
            }
            Err(err) => {
                tracing::debug!(seq = ticket.seq, %err, "autoplay blocked");
                self.set_pointer_hidden(false);
            }
        }
    }

    /// The user pressed the play control.
    ///
    /// Always re-attempts playback, reveals the media, and dismisses the overlay, whatever
    /// the attempt ends up doing.
    pub fn manual_play(&mut self) -> Option<PlayTicket> {
        if !self.mounted {
            return None;
        }
        tracing::debug!("manual play");
        let ticket = self.attempt_play(PlayReason::Manual);
        self.show_message = false;
        self.driver.force_full();
        ticket
    }

    /// Events raised by the media element itself.
    pub fn media_event(&mut self, event: MediaEvent) {
        if !self.mounted {
            return;
        }
        match event {
            MediaEvent::CanPlay => {
                if self.typing.is_done() && !self.driver.state().playing {
                    self.attempt_play(PlayReason::CanPlay);
                }
            }
            MediaEvent::Play => {
                self.driver.on_media_play();
                self.set_pointer_hidden(true);
            }
            MediaEvent::Pause => {
                self.driver.on_media_pause();
                self.set_pointer_hidden(false);
            }
        }
    }

    pub fn output(&self, now: Millis) -> FrameOutput {
        let state = self.driver.state();
        FrameOutput {
            at: now,
            in_view: self.visibility.in_view(),
            opacity: self.driver.opacity(),
            opacity_target: state.opacity_target,
            playing: state.playing,
            autoplay_blocked: state.autoplay_blocked,
            show_play_button: state.autoplay_blocked,
            show_message: self.show_message,
            overlay_exit_secs: self.config.overlay_exit_secs,
            pointer_hidden: self.pointer_hidden,
            progress: self.typing.progress(),
            typed_text: self.typing.typed_text(),
        }
    }

    fn enter_view(&mut self, now: Millis) {
        tracing::debug!(at = now.0, "entered view");
        self.show_message = true;
        let events = self.typing.start(now);
        self.apply_typing_events(&events);
    }

    fn leave_view(&mut self) {
        tracing::debug!("left view; resetting");
        self.show_message = false;
        self.typing.stop();
        self.reset_media();
    }

    fn reset_media(&mut self) {
        self.driver.reset();
        self.ticket_epoch += 1;
        if let Some(media) = self.media.as_mut() {
            media.pause();
            media.rewind();
        }
        self.set_pointer_hidden(false);
    }

    fn apply_typing_events(&mut self, events: &[TypingEvent]) {
        for event in events {
            let reason = match event {
                TypingEvent::Done { at } => {
                    self.show_message = false;
                    self.driver.on_done(*at)
                }
                TypingEvent::Started
                | TypingEvent::CharRevealed { .. }
                | TypingEvent::WordCompleted { .. } => {
                    self.driver.on_progress(self.typing.completion_fraction())
                }
            };
            if let Some(reason) = reason {
                self.attempt_play(reason);
            }
        }
    }

    fn attempt_play(&mut self, reason: PlayReason) -> Option<PlayTicket> {
        let Some(media) = self.media.as_mut() else {
            tracing::debug!(?reason, "no media surface attached; playback attempt skipped");
            return None;
        };
        let ticket = PlayTicket {
            epoch: self.ticket_epoch,
            seq: self.next_ticket,
        };
        self.next_ticket += 1;
        tracing::debug!(?reason, seq = ticket.seq, "requesting playback");
        media.request_play(PlayRequest { ticket, reason });
        Some(ticket)
    }

    // The sink may be shared with other controllers, so every write goes through.
    fn set_pointer_hidden(&mut self, hidden: bool) {
        self.pointer_hidden = hidden;
        self.pointer.set_pointer_hidden(hidden);
    }
}

impl Drop for RevealController {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/controller.rs"]
mod tests;
