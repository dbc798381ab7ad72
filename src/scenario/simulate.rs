use std::{cell::RefCell, rc::Rc};

use crate::{
    foundation::{
        core::{Fps, Millis},
        error::RevealResult,
    },
    reveal::{
        controller::{Environment, FrameOutput, RevealController},
        media::{MediaSurface, PlayReason, PlayRequest, PlaybackOutcome, PlaybackRejection},
        visibility::{IntersectionSample, ObserverSupport},
    },
    scenario::model::{AutoplayPolicy, Scenario, ScriptedEventKind},
};

/// One playback attempt seen by the simulated media element.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AttemptRecord {
    pub requested_at: Millis,
    pub reason: PlayReason,
    pub seq: u64,
    /// `None` when the run ended before the attempt settled.
    pub resolved_at: Option<Millis>,
    pub started: Option<bool>,
}

/// Result of replaying a [`Scenario`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Trace {
    pub fps: Fps,
    pub frames: Vec<FrameOutput>,
    pub attempts: Vec<AttemptRecord>,
    pub pauses: usize,
    pub rewinds: usize,
}

impl Trace {
    /// First frame where `pred` holds.
    pub fn first_frame(&self, pred: impl Fn(&FrameOutput) -> bool) -> Option<&FrameOutput> {
        self.frames.iter().find(|f| pred(f))
    }

    pub fn last_frame(&self) -> Option<&FrameOutput> {
        self.frames.last()
    }
}

#[derive(Debug, Default)]
struct SimMedia {
    now: Millis,
    latency_ms: u64,
    autoplay: AutoplayPolicy,
    pending: Vec<(Millis, PlayRequest)>,
    attempts: Vec<AttemptRecord>,
    pauses: usize,
    rewinds: usize,
}

impl SimMedia {
    fn outcome_for(&self, reason: PlayReason) -> PlaybackOutcome {
        match self.autoplay {
            AutoplayPolicy::Allow => Ok(()),
            AutoplayPolicy::Block => Err(PlaybackRejection::NotAllowed),
            AutoplayPolicy::RequireGesture if reason.is_user_gesture() => Ok(()),
            AutoplayPolicy::RequireGesture => Err(PlaybackRejection::NotAllowed),
        }
    }

    /// Settle every pending attempt due at `now`, in request order.
    fn take_due(&mut self, now: Millis) -> Vec<(PlayRequest, PlaybackOutcome)> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].0 <= now {
                let (_, request) = self.pending.remove(i);
                let outcome = self.outcome_for(request.reason);
                if let Some(rec) = self
                    .attempts
                    .iter_mut()
                    .find(|a| a.seq == request.ticket.seq())
                {
                    rec.resolved_at = Some(now);
                    rec.started = Some(outcome.is_ok());
                }
                due.push((request, outcome));
            } else {
                i += 1;
            }
        }
        due
    }
}

struct SimSurface(Rc<RefCell<SimMedia>>);

impl MediaSurface for SimSurface {
    fn request_play(&mut self, request: PlayRequest) {
        let mut m = self.0.borrow_mut();
        let now = m.now;
        let due = now.after(m.latency_ms);
        m.pending.push((due, request));
        m.attempts.push(AttemptRecord {
            requested_at: now,
            reason: request.reason,
            seq: request.ticket.seq(),
            resolved_at: None,
            started: None,
        });
    }

    fn pause(&mut self) {
        self.0.borrow_mut().pauses += 1;
    }

    fn rewind(&mut self) {
        self.0.borrow_mut().rewinds += 1;
    }
}

/// Replay `scenario` at `fps`, recording one [`FrameOutput`] per frame.
///
/// Per frame: scripted events due by the frame time are applied in order, the controller
/// ticks, then playback attempts due by the frame time settle.
#[tracing::instrument(skip(scenario), fields(duration_ms = scenario.duration_ms))]
pub fn simulate(scenario: &Scenario, fps: Fps) -> RevealResult<Trace> {
    scenario.validate()?;

    let env = Environment {
        reduced_motion: scenario.reduced_motion,
        observer: if scenario.observer_supported {
            ObserverSupport::Available
        } else {
            ObserverSupport::Unsupported
        },
    };
    let mut ctl = RevealController::new(&scenario.message, scenario.config.clone(), env)?;

    let media = Rc::new(RefCell::new(SimMedia {
        latency_ms: scenario.play_latency_ms,
        autoplay: scenario.autoplay,
        ..SimMedia::default()
    }));
    if let Some(source) = &scenario.media {
        ctl = ctl.with_source(source.clone());
        ctl.attach_media(Box::new(SimSurface(Rc::clone(&media))));
    }
    ctl.mount(Millis::ZERO);

    let frame_count = fps.frames_covering(scenario.duration_ms);
    let mut frames = Vec::with_capacity(usize::try_from(frame_count + 1).unwrap_or(0));
    let mut events = scenario.events.iter().peekable();

    for frame in 0..=frame_count {
        let now = fps.frame_to_millis(frame);
        media.borrow_mut().now = now;

        while let Some(ev) = events.next_if(|ev| Millis(ev.at_ms) <= now) {
            tracing::trace!(at_ms = ev.at_ms, kind = ?ev.kind, "scripted event");
            match &ev.kind {
                ScriptedEventKind::Intersect { ratio } => {
                    ctl.observe(IntersectionSample::with_ratio(*ratio), now)
                }
                ScriptedEventKind::ManualPlay => {
                    ctl.manual_play();
                }
                ScriptedEventKind::Media { event } => ctl.media_event(*event),
                ScriptedEventKind::SetMessage { message } => ctl.set_message(message, now),
                ScriptedEventKind::Unmount => ctl.unmount(),
            }
        }

        ctl.tick(now);

        let due = media.borrow_mut().take_due(now);
        for (request, outcome) in due {
            ctl.playback_resolved(request.ticket, outcome);
        }

        frames.push(ctl.output(now));
    }

    drop(ctl);
    let media = media.borrow();
    tracing::debug!(
        frames = frames.len(),
        attempts = media.attempts.len(),
        "simulation finished"
    );
    Ok(Trace {
        fps,
        frames,
        attempts: media.attempts.clone(),
        pauses: media.pauses,
        rewinds: media.rewinds,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scenario/simulate.rs"]
mod tests;
