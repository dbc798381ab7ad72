use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use super::*;
use crate::reveal::{
    config::RevealPolicy, media::PlaybackRejection, typing::TypingPhase,
};

#[derive(Default)]
struct MediaLog {
    requests: Vec<PlayRequest>,
    pauses: usize,
    rewinds: usize,
}

struct RecordingMedia(Rc<RefCell<MediaLog>>);

impl MediaSurface for RecordingMedia {
    fn request_play(&mut self, request: PlayRequest) {
        self.0.borrow_mut().requests.push(request);
    }

    fn pause(&mut self) {
        self.0.borrow_mut().pauses += 1;
    }

    fn rewind(&mut self) {
        self.0.borrow_mut().rewinds += 1;
    }
}

struct Rig {
    ctl: RevealController,
    log: Rc<RefCell<MediaLog>>,
    pointer: Rc<Cell<bool>>,
}

impl Rig {
    fn new(message: &str, config: RevealConfig, env: Environment) -> Self {
        let log = Rc::new(RefCell::new(MediaLog::default()));
        let pointer = Rc::new(Cell::new(false));
        let mut ctl = RevealController::new(message, config, env)
            .unwrap()
            .with_pointer(Box::new(Rc::clone(&pointer)));
        ctl.attach_media(Box::new(RecordingMedia(Rc::clone(&log))));
        ctl.mount(Millis(0));
        Self { ctl, log, pointer }
    }

    fn gated(message: &str) -> Self {
        Self::new(message, RevealConfig::default(), Environment::default())
    }

    fn enter(&mut self, at: u64) {
        self.ctl
            .observe(IntersectionSample::with_ratio(1.0), Millis(at));
    }

    fn leave(&mut self, at: u64) {
        self.ctl.observe(IntersectionSample::hidden(), Millis(at));
    }

    /// Tick every `step` ms over `(from, to]`.
    fn run(&mut self, from: u64, to: u64, step: u64) -> FrameOutput {
        let mut out = self.ctl.output(Millis(from));
        let mut t = from;
        while t < to {
            t = (t + step).min(to);
            out = self.ctl.tick(Millis(t));
        }
        out
    }

    fn reasons(&self) -> Vec<PlayReason> {
        self.log.borrow().requests.iter().map(|r| r.reason).collect()
    }

    fn last_ticket(&self) -> PlayTicket {
        self.log.borrow().requests.last().unwrap().ticket
    }
}

#[test]
fn gated_happy_path_hello_world() {
    let mut rig = Rig::gated("Hello world");
    rig.enter(0);
    assert!(rig.ctl.show_message());

    let out = rig.run(0, 175, 5);
    assert_eq!(out.progress.char_index, 5);
    assert_eq!(out.progress.word_index, 0);
    assert_eq!(out.opacity_target, 0.0);

    let out = rig.run(175, 285, 5);
    assert_eq!(out.progress.word_index, 1);
    assert_eq!(out.progress.completed_words, 1);

    let out = rig.run(285, 565, 5);
    assert!(!out.progress.typing_done);
    assert!(out.show_message);
    assert!(rig.reasons().is_empty());

    let out = rig.run(565, 570, 5);
    assert!(out.progress.typing_done);
    assert_eq!(out.progress.completed_words, 2);
    assert!(!out.show_message);
    assert_eq!(out.opacity_target, 1.0);
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal]);

    // First attempt never resolves: one retry ~400ms later, and only one.
    rig.run(570, 965, 5);
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal]);
    rig.run(965, 2000, 5);
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal, PlayReason::Retry]);
}

#[test]
fn retry_skipped_once_playing() {
    let mut rig = Rig::gated("Hi");
    rig.enter(0);
    rig.run(0, 200, 10);
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal]);

    rig.ctl.playback_resolved(rig.last_ticket(), Ok(()));
    let out = rig.run(200, 1000, 10);
    assert!(out.playing);
    assert!(out.pointer_hidden);
    assert!(rig.pointer.get());
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal]);
}

#[test]
fn opacity_is_smoothed_after_reveal() {
    let mut rig = Rig::gated("Hi");
    rig.enter(0);
    let out = rig.run(0, 180, 10);
    assert_eq!(out.opacity_target, 1.0);
    assert!(out.opacity < 0.1, "no snap to full: {}", out.opacity);

    let out = rig.run(180, 2000, 16);
    assert!((out.opacity - 1.0).abs() < 1e-2);
}

#[test]
fn autoplay_blocked_then_manual_play() {
    let mut rig = Rig::gated("Hi");
    rig.enter(0);
    rig.run(0, 200, 10);

    rig.ctl
        .playback_resolved(rig.last_ticket(), Err(PlaybackRejection::NotAllowed));
    let out = rig.ctl.tick(Millis(210));
    assert!(out.autoplay_blocked);
    assert!(out.show_play_button);
    assert!(!out.playing);
    assert!(!out.pointer_hidden);

    // Retry also rejected.
    rig.run(210, 700, 10);
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal, PlayReason::Retry]);
    rig.ctl
        .playback_resolved(rig.last_ticket(), Err(PlaybackRejection::NotAllowed));

    let ticket = rig.ctl.manual_play().unwrap();
    let out = rig.ctl.tick(Millis(710));
    assert_eq!(rig.reasons().last(), Some(&PlayReason::Manual));
    assert!(!out.show_message);
    assert_eq!(out.opacity_target, 1.0);

    rig.ctl.playback_resolved(ticket, Ok(()));
    let out = rig.ctl.tick(Millis(720));
    assert!(out.playing);
    assert!(!out.show_play_button);
    assert!(rig.pointer.get());
}

#[test]
fn manual_play_forces_reveal_even_if_rejected() {
    let mut rig = Rig::new(
        "Hello there world",
        RevealConfig {
            policy: RevealPolicy::Progressive {
                cap: 0.3,
                play_trigger: 0.5,
            },
            ..RevealConfig::default()
        },
        Environment::default(),
    );
    rig.enter(0);
    rig.run(0, 400, 10);
    assert_eq!(rig.reasons(), vec![PlayReason::EarlyTrigger]);
    rig.ctl
        .playback_resolved(rig.last_ticket(), Err(PlaybackRejection::NotAllowed));

    let ticket = rig.ctl.manual_play().unwrap();
    rig.ctl
        .playback_resolved(ticket, Err(PlaybackRejection::NotAllowed));
    let out = rig.ctl.tick(Millis(410));
    assert_eq!(out.opacity_target, 1.0);
    assert!(!out.show_message);
    assert!(out.autoplay_blocked);
}

#[test]
fn leaving_mid_typing_resets_everything() {
    let mut rig = Rig::gated("Hello world");
    rig.enter(0);
    let out = rig.run(0, 355, 5);
    assert_eq!((out.progress.word_index, out.progress.char_index), (1, 2));

    rig.leave(355);
    let out = rig.ctl.output(Millis(355));
    assert!(!out.in_view);
    assert!(!out.show_message);
    assert_eq!(out.progress.phase, TypingPhase::Idle);
    assert_eq!(
        (
            out.progress.word_index,
            out.progress.char_index,
            out.progress.completed_words,
            out.progress.typing_done
        ),
        (0, 0, 0, false)
    );
    assert_eq!(out.opacity_target, 0.0);
    assert!(!rig.ctl.has_pending_timers());
    assert_eq!(rig.log.borrow().pauses, 1);
    assert_eq!(rig.log.borrow().rewinds, 1);

    let out = rig.run(355, 5000, 20);
    assert_eq!(out.progress.char_index, 0);
    assert!(rig.reasons().is_empty());
}

#[test]
fn reentry_is_indistinguishable_from_first_mount() {
    let mut rig = Rig::gated("Hello world");
    rig.enter(0);
    rig.run(0, 1500, 10);
    rig.ctl.playback_resolved(rig.last_ticket(), Ok(()));
    rig.leave(1500);
    rig.run(1500, 4000, 10);

    rig.enter(4000);
    let again = rig.run(4000, 4100, 10);

    let mut fresh = Rig::gated("Hello world");
    fresh.enter(0);
    let first = fresh.run(0, 100, 10);

    assert_eq!(again.progress, first.progress);
    assert_eq!(again.opacity_target, first.opacity_target);
    assert_eq!(again.playing, first.playing);
    assert_eq!(again.autoplay_blocked, first.autoplay_blocked);
    assert_eq!(again.show_message, first.show_message);
    assert!(again.opacity < 0.05);
}

#[test]
fn stale_resolution_after_leave_is_ignored() {
    let mut rig = Rig::gated("Hi");
    rig.enter(0);
    rig.run(0, 200, 10);
    let stale = rig.last_ticket();
    rig.leave(200);

    rig.ctl.playback_resolved(stale, Ok(()));
    let out = rig.ctl.tick(Millis(210));
    assert!(!out.playing);
    assert!(!rig.pointer.get());
}

#[test]
fn pointer_restored_on_leave() {
    let mut rig = Rig::gated("Hi");
    rig.enter(0);
    rig.run(0, 200, 10);
    rig.ctl.playback_resolved(rig.last_ticket(), Ok(()));
    assert!(rig.pointer.get());

    rig.leave(300);
    assert!(!rig.pointer.get());
    assert!(!rig.ctl.output(Millis(300)).pointer_hidden);
}

#[test]
fn pointer_stays_hidden_until_opacity_decays() {
    let mut rig = Rig::gated("Hi");
    rig.enter(0);
    rig.run(0, 200, 10);
    rig.ctl.playback_resolved(rig.last_ticket(), Ok(()));
    let out = rig.run(200, 1500, 10);
    assert!(out.opacity > 0.99);

    // The element starts playing again while the reveal fades out.
    rig.leave(1500);
    rig.ctl.media_event(MediaEvent::Play);
    assert!(rig.pointer.get());

    let threshold = rig.ctl.config().pointer_restore_threshold;
    let mut hidden_frames = 0;
    let mut restored = false;
    for t in (1516..3000).step_by(16) {
        let out = rig.ctl.tick(Millis(t));
        if out.opacity > threshold {
            assert!(!restored, "t={t} opacity={}", out.opacity);
            assert!(out.pointer_hidden, "t={t} opacity={}", out.opacity);
            assert!(rig.pointer.get());
            hidden_frames += 1;
        } else {
            assert!(!out.pointer_hidden, "t={t} opacity={}", out.opacity);
            assert!(!rig.pointer.get());
            restored = true;
        }
    }
    assert!(hidden_frames > 3);
    assert!(restored);
}

#[test]
fn rising_opacity_keeps_pointer_hidden() {
    let mut rig = Rig::gated("Hi");
    rig.enter(0);
    rig.run(0, 180, 10);
    rig.ctl.playback_resolved(rig.last_ticket(), Ok(()));
    // First frames after the reveal sit below the restore threshold.
    let out = rig.ctl.tick(Millis(181));
    assert!(out.opacity <= rig.ctl.config().pointer_restore_threshold);
    assert!(out.pointer_hidden);
    let out = rig.run(181, 1000, 10);
    assert!(out.pointer_hidden);
    assert!(rig.pointer.get());
}

#[test]
fn shared_pointer_last_writer_wins() {
    let shared = Rc::new(Cell::new(false));
    let mk = || {
        let mut ctl = RevealController::new("Hi", RevealConfig::default(), Environment::default())
            .unwrap()
            .with_pointer(Box::new(Rc::clone(&shared)));
        ctl.mount(Millis(0));
        ctl
    };
    let mut a = mk();
    let mut b = mk();

    a.media_event(MediaEvent::Play);
    b.media_event(MediaEvent::Play);
    assert!(shared.get());
    b.media_event(MediaEvent::Pause);
    assert!(!shared.get());

    a.media_event(MediaEvent::Play);
    assert!(shared.get());
    assert!(a.output(Millis(0)).pointer_hidden);
}

#[test]
fn unmount_leaves_foreign_pointer_state_alone() {
    let shared = Rc::new(Cell::new(false));
    let mut a = RevealController::new("Hi", RevealConfig::default(), Environment::default())
        .unwrap()
        .with_pointer(Box::new(Rc::clone(&shared)));
    let mut b = RevealController::new("Hi", RevealConfig::default(), Environment::default())
        .unwrap()
        .with_pointer(Box::new(Rc::clone(&shared)));
    a.mount(Millis(0));
    b.mount(Millis(0));

    a.media_event(MediaEvent::Play);
    drop(b);
    assert!(shared.get());
    a.unmount();
    assert!(!shared.get());
}

#[test]
fn retry_is_scheduled_from_done_deadline() {
    let mut rig = Rig::gated("Hi");
    rig.enter(0);
    // "Hi" is done at 180; coarse ticks observe it at 200.
    rig.ctl.tick(Millis(100));
    rig.ctl.tick(Millis(200));
    assert!(rig.ctl.typing().is_done());
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal]);

    rig.ctl.tick(Millis(579));
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal]);
    rig.ctl.tick(Millis(580));
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal, PlayReason::Retry]);
}

#[test]
fn missing_media_surface_is_a_noop() {
    let mut ctl =
        RevealController::new("Hi", RevealConfig::default(), Environment::default()).unwrap();
    ctl.mount(Millis(0));
    ctl.observe(IntersectionSample::with_ratio(1.0), Millis(0));
    let out = ctl.tick(Millis(1000));
    assert!(out.progress.typing_done);
    assert!(!out.playing);
    assert_eq!(ctl.manual_play(), None);
    ctl.media_event(MediaEvent::CanPlay);
}

#[test]
fn unsupported_observer_never_enters_view() {
    let mut rig = Rig::new(
        "Hi",
        RevealConfig::default(),
        Environment {
            reduced_motion: false,
            observer: ObserverSupport::Unsupported,
        },
    );
    rig.enter(0);
    let out = rig.run(0, 1000, 10);
    assert!(!out.in_view);
    assert!(!out.show_message);
    assert_eq!(out.progress.phase, TypingPhase::Idle);
}

#[test]
fn reduced_motion_finishes_after_fixed_delay() {
    let mut rig = Rig::new(
        "Hello world",
        RevealConfig::default(),
        Environment {
            reduced_motion: true,
            observer: ObserverSupport::Available,
        },
    );
    rig.enter(0);
    for t in 1..120 {
        let out = rig.ctl.tick(Millis(t));
        assert_eq!(out.progress.char_index, 0);
        assert!(!out.progress.typing_done);
        assert!(out.show_message);
    }
    let out = rig.ctl.tick(Millis(120));
    assert!(out.progress.typing_done);
    assert_eq!(out.progress.completed_words, 2);
    assert!(!out.show_message);
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal]);
}

#[test]
fn empty_message_reveals_on_entry() {
    let mut rig = Rig::gated("");
    rig.enter(0);
    let out = rig.ctl.output(Millis(0));
    assert!(out.progress.typing_done);
    assert_eq!(out.progress.completed_words, 0);
    assert!(!out.show_message);
    assert_eq!(out.opacity_target, 1.0);
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal]);
}

#[test]
fn progressive_attempts_early_then_on_done() {
    let mut rig = Rig::new(
        "ab cd",
        RevealConfig {
            policy: RevealPolicy::Progressive {
                cap: 1.0,
                play_trigger: 0.99,
            },
            ..RevealConfig::default()
        },
        Environment::default(),
    );
    rig.enter(0);

    // "ab" typed by 70, advance at 180, "cd" typed by 250.
    let out = rig.run(0, 245, 5);
    assert!(rig.reasons().is_empty());
    assert!(out.opacity_target > 0.5 && out.opacity_target < 1.0);

    let out = rig.run(245, 250, 5);
    assert_eq!(rig.reasons(), vec![PlayReason::EarlyTrigger]);
    assert!(out.show_message, "overlay stays until done");

    let out = rig.run(250, 360, 5);
    assert!(out.progress.typing_done);
    assert_eq!(
        rig.reasons(),
        vec![PlayReason::EarlyTrigger, PlayReason::Reveal]
    );
    // No gated retry in progressive mode.
    rig.run(360, 2000, 10);
    assert_eq!(rig.reasons().len(), 2);
}

#[test]
fn can_play_event_retries_after_done_only() {
    let mut rig = Rig::gated("Hi");
    rig.enter(0);
    rig.ctl.media_event(MediaEvent::CanPlay);
    assert!(rig.reasons().is_empty());

    rig.run(0, 200, 10);
    rig.ctl.media_event(MediaEvent::CanPlay);
    assert_eq!(rig.reasons(), vec![PlayReason::Reveal, PlayReason::CanPlay]);

    rig.ctl.media_event(MediaEvent::Play);
    assert!(rig.ctl.reveal_state().playing);
    assert!(rig.pointer.get());
    rig.ctl.media_event(MediaEvent::CanPlay);
    assert_eq!(rig.reasons().len(), 2);

    rig.ctl.media_event(MediaEvent::Pause);
    assert!(!rig.ctl.reveal_state().playing);
    assert!(!rig.pointer.get());
}

#[test]
fn message_change_restarts_run() {
    let mut rig = Rig::gated("Hello world");
    rig.enter(0);
    rig.run(0, 300, 10);
    rig.ctl.set_message("Bye", Millis(300));
    let out = rig.ctl.output(Millis(300));
    assert_eq!(out.progress.word_index, 0);
    assert_eq!(out.progress.total_words, 1);
    assert!(out.show_message);

    let out = rig.run(300, 300 + 3 * 35 + 110, 5);
    assert!(out.progress.typing_done);
}

#[test]
fn unmount_cancels_everything() {
    let mut rig = Rig::gated("Hello world");
    rig.enter(0);
    rig.run(0, 100, 10);
    rig.ctl.unmount();
    assert!(!rig.ctl.has_pending_timers());
    assert!(!rig.ctl.is_mounted());

    let out = rig.ctl.tick(Millis(5000));
    assert_eq!(out.progress.char_index, 0);
    assert!(!out.in_view);
    rig.enter(5000);
    assert!(!rig.ctl.in_view());
    assert!(rig.reasons().is_empty());
}
