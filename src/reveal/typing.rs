use crate::{foundation::core::Millis, schedule::timer::TimerQueue};

/// Delays driving the word-by-word reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypingTiming {
    pub typing_speed_ms: u64,
    pub between_word_delay_ms: u64,
    pub reduced_motion_delay_ms: u64,
}

impl Default for TypingTiming {
    fn default() -> Self {
        Self {
            typing_speed_ms: 35,
            between_word_delay_ms: 110,
            reduced_motion_delay_ms: 120,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypingPhase {
    Idle,
    Typing,
    Done,
}

/// Snapshot of the reveal counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TypingProgress {
    pub phase: TypingPhase,
    pub word_index: usize,
    pub char_index: usize,
    pub completed_words: usize,
    pub total_words: usize,
    pub typing_done: bool,
}

/// What a call to the sequencer changed, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypingEvent {
    Started,
    CharRevealed { word_index: usize, char_index: usize },
    WordCompleted { completed_words: usize },
    /// Typing finished; `at` is the scheduled deadline of the final step.
    Done { at: Millis },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TypingTimer {
    RevealChar,
    AdvanceWord,
    ReducedFinish,
}

/// Per-word render state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordState {
    Done,
    Current,
    Pending,
}

/// One word as it should currently be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypedWord<'a> {
    /// Revealed prefix (whole word once done, empty while pending).
    pub visible: &'a str,
    pub state: WordState,
    /// Done words are followed by a space.
    pub trailing_space: bool,
    /// Draw a caret after `visible`.
    pub caret: bool,
}

/// Word-by-word typing state machine: `Idle -> Typing -> Done`, back to `Idle` on `stop`.
///
/// Time only moves through [`TypingSequencer::advance`]. Each step is scheduled from the
/// deadline of the step before it, so output does not depend on how often the host ticks.
#[derive(Clone, Debug)]
pub struct TypingSequencer {
    message: String,
    words: Vec<String>,
    word_chars: Vec<usize>,
    timing: TypingTiming,
    reduced_motion: bool,

    phase: TypingPhase,
    word_index: usize,
    char_index: usize,
    completed_words: usize,
    typing_done: bool,

    timers: TimerQueue<TypingTimer>,
}

/// Split on any run of whitespace; empty and blank messages have no words.
pub fn tokenize(message: &str) -> Vec<String> {
    message.split_whitespace().map(str::to_owned).collect()
}

impl TypingSequencer {
    pub fn new(message: &str, timing: TypingTiming, reduced_motion: bool) -> Self {
        let mut seq = Self {
            message: String::new(),
            words: Vec::new(),
            word_chars: Vec::new(),
            timing,
            reduced_motion,
            phase: TypingPhase::Idle,
            word_index: 0,
            char_index: 0,
            completed_words: 0,
            typing_done: false,
            timers: TimerQueue::new(),
        };
        seq.load_message(message);
        seq
    }

    fn load_message(&mut self, message: &str) {
        self.message = message.to_owned();
        self.words = tokenize(message);
        self.word_chars = self.words.iter().map(|w| w.chars().count()).collect();
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn phase(&self) -> TypingPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.typing_done
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn has_pending_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn progress(&self) -> TypingProgress {
        TypingProgress {
            phase: self.phase,
            word_index: self.word_index,
            char_index: self.char_index,
            completed_words: self.completed_words,
            total_words: self.words.len(),
            typing_done: self.typing_done,
        }
    }

    /// `(completed_words + partial_word_progress) / total_words`, in `0..=1`.
    pub fn completion_fraction(&self) -> f64 {
        let total = self.words.len();
        if total == 0 {
            return if self.typing_done { 1.0 } else { 0.0 };
        }
        let partial = match self.word_chars.get(self.word_index) {
            Some(&len) if len > 0 => self.char_index as f64 / len as f64,
            _ => 0.0,
        };
        ((self.completed_words as f64 + partial) / total as f64).clamp(0.0, 1.0)
    }

    /// Begin a fresh run at `now`, discarding anything in flight.
    pub fn start(&mut self, now: Millis) -> Vec<TypingEvent> {
        self.reset_counters();
        self.phase = TypingPhase::Typing;

        let mut events = vec![TypingEvent::Started];
        if self.words.is_empty() {
            self.finish(now, &mut events);
        } else if self.reduced_motion {
            self.timers.schedule(
                now.after(self.timing.reduced_motion_delay_ms),
                TypingTimer::ReducedFinish,
            );
        } else {
            self.schedule_next(now);
        }
        tracing::debug!(
            words = self.words.len(),
            reduced_motion = self.reduced_motion,
            "typing started"
        );
        events
    }

    /// Return to `Idle`; every pending step is cancelled.
    pub fn stop(&mut self) {
        self.reset_counters();
        self.phase = TypingPhase::Idle;
    }

    /// Swap the message. A run in progress (or finished) restarts from the first word.
    pub fn set_message(&mut self, message: &str, now: Millis) -> Vec<TypingEvent> {
        if message == self.message {
            return Vec::new();
        }
        self.load_message(message);
        match self.phase {
            TypingPhase::Idle => {
                self.reset_counters();
                Vec::new()
            }
            TypingPhase::Typing | TypingPhase::Done => self.start(now),
        }
    }

    /// Run every step whose deadline is `<= now`.
    pub fn advance(&mut self, now: Millis) -> Vec<TypingEvent> {
        let mut events = Vec::new();
        while let Some((at, timer)) = self.timers.pop_due(now) {
            match timer {
                TypingTimer::RevealChar => {
                    self.char_index += 1;
                    tracing::trace!(word = self.word_index, ch = self.char_index, "char revealed");
                    events.push(TypingEvent::CharRevealed {
                        word_index: self.word_index,
                        char_index: self.char_index,
                    });
                    self.schedule_next(at);
                }
                TypingTimer::AdvanceWord => {
                    self.completed_words += 1;
                    self.word_index += 1;
                    self.char_index = 0;
                    tracing::trace!(completed = self.completed_words, "word completed");
                    events.push(TypingEvent::WordCompleted {
                        completed_words: self.completed_words,
                    });
                    if self.word_index >= self.words.len() {
                        self.finish(at, &mut events);
                    } else {
                        self.schedule_next(at);
                    }
                }
                TypingTimer::ReducedFinish => {
                    self.completed_words = self.words.len();
                    self.word_index = self.words.len();
                    self.char_index = 0;
                    self.finish(at, &mut events);
                }
            }
        }
        events
    }

    /// Render model for the overlay text.
    pub fn typed_words(&self) -> Vec<TypedWord<'_>> {
        self.words
            .iter()
            .enumerate()
            .map(|(i, word)| {
                if i < self.completed_words {
                    TypedWord {
                        visible: word,
                        state: WordState::Done,
                        trailing_space: true,
                        caret: false,
                    }
                } else if i == self.word_index && self.phase == TypingPhase::Typing {
                    TypedWord {
                        visible: char_prefix(word, self.char_index),
                        state: WordState::Current,
                        trailing_space: false,
                        caret: !self.reduced_motion,
                    }
                } else {
                    TypedWord {
                        visible: "",
                        state: WordState::Pending,
                        trailing_space: false,
                        caret: false,
                    }
                }
            })
            .collect()
    }

    /// Flattened visible text (no caret).
    pub fn typed_text(&self) -> String {
        let mut out = String::new();
        for w in self.typed_words() {
            out.push_str(w.visible);
            if w.trailing_space {
                out.push(' ');
            }
        }
        out
    }

    fn reset_counters(&mut self) {
        self.timers.cancel_all();
        self.word_index = 0;
        self.char_index = 0;
        self.completed_words = 0;
        self.typing_done = false;
    }

    fn schedule_next(&mut self, from: Millis) {
        let len = self.word_chars.get(self.word_index).copied().unwrap_or(0);
        if self.char_index < len {
            self.timers
                .schedule(from.after(self.timing.typing_speed_ms), TypingTimer::RevealChar);
        } else {
            self.timers.schedule(
                from.after(self.timing.between_word_delay_ms),
                TypingTimer::AdvanceWord,
            );
        }
    }

    fn finish(&mut self, at: Millis, events: &mut Vec<TypingEvent>) {
        self.timers.cancel_all();
        self.phase = TypingPhase::Done;
        self.typing_done = true;
        tracing::debug!(completed = self.completed_words, "typing done");
        events.push(TypingEvent::Done { at });
    }
}

fn char_prefix(word: &str, chars: usize) -> &str {
    match word.char_indices().nth(chars) {
        Some((byte, _)) => &word[..byte],
        None => word,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/typing.rs"]
mod tests;
