/// Opaque locators for the media element and its poster frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MediaSource {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

/// Why a playback attempt was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayReason {
    /// Typing finished and the media was revealed.
    Reveal,
    /// Bounded retry after the reveal attempt (gated policy).
    Retry,
    /// Progressive policy crossed its trigger fraction.
    EarlyTrigger,
    /// The element reported it can play after typing finished.
    CanPlay,
    /// The user pressed the manual play control.
    Manual,
}

impl PlayReason {
    pub fn is_user_gesture(self) -> bool {
        matches!(self, Self::Manual)
    }
}

/// Identifies one playback attempt. Resolutions for tickets from before the last reset
/// are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct PlayTicket {
    pub(crate) epoch: u64,
    pub(crate) seq: u64,
}

impl PlayTicket {
    pub fn seq(self) -> u64 {
        self.seq
    }
}

/// A playback attempt handed to the media surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayRequest {
    pub ticket: PlayTicket,
    pub reason: PlayReason,
}

/// Platform refusal of a playback attempt. Always recovered locally.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackRejection {
    #[error("unattended playback not allowed")]
    NotAllowed,
    #[error("media source not supported")]
    NotSupported,
    #[error("playback aborted")]
    Aborted,
    #[error("playback failed: {0}")]
    Other(String),
}

pub type PlaybackOutcome = Result<(), PlaybackRejection>;

/// Events reported by the media element itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaEvent {
    CanPlay,
    Play,
    Pause,
}

/// The media element driven by a controller. One controller owns it at a time.
///
/// `request_play` starts an asynchronous attempt; the host reports the result back through
/// `RevealController::playback_resolved` with the same ticket.
pub trait MediaSurface {
    fn request_play(&mut self, request: PlayRequest);
    fn pause(&mut self);
    /// Seek to position zero.
    fn rewind(&mut self);
}
