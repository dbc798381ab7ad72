//! Revealplay is a headless controller for a "type the message, then reveal and play the
//! media" choreography.
//!
//! The host owns the clock and the platform:
//!
//! - Build a [`RevealController`] from a message and a [`RevealConfig`]
//! - Feed it intersection samples, animation-frame ticks, and playback results
//! - Render the [`FrameOutput`] it returns and forward its [`PlayRequest`]s to a media element
//!
//! [`simulate`] replays a scripted [`Scenario`] against the same controller, which is what
//! the `revealplay` binary does.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod cursor;
pub(crate) mod reveal;
pub(crate) mod scenario;
pub(crate) mod schedule;

pub use crate::foundation::core::{Fps, Millis, Point, Vec2};
pub use crate::foundation::error::{RevealError, RevealResult};

pub use crate::animation::spring::{Spring, SpringParams, step_response};
pub use crate::schedule::timer::{TimerHandle, TimerQueue};

pub use crate::reveal::config::{DEFAULT_MESSAGE, RevealConfig, RevealPolicy};
pub use crate::reveal::controller::{Environment, FrameOutput, RevealController};
pub use crate::reveal::driver::{MediaRevealDriver, MediaRevealState};
pub use crate::reveal::media::{
    MediaEvent, MediaSource, MediaSurface, PlayReason, PlayRequest, PlayTicket, PlaybackOutcome,
    PlaybackRejection,
};
pub use crate::reveal::pointer::{GlobalPointer, NoPointer, PointerAffordance};
pub use crate::reveal::typing::{
    TypedWord, TypingEvent, TypingPhase, TypingProgress, TypingSequencer, TypingTiming,
    WordState, tokenize,
};
pub use crate::reveal::visibility::{IntersectionSample, ObserverSupport, VisibilityTracker};

pub use crate::cursor::follower::{
    CursorConfig, CursorEnvironment, CursorFollower, CursorPose, wrap_degrees,
};

pub use crate::scenario::model::{AutoplayPolicy, Scenario, ScriptedEvent, ScriptedEventKind};
pub use crate::scenario::simulate::{AttemptRecord, Trace, simulate};
