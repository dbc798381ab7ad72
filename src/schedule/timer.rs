use std::collections::BTreeMap;

use crate::foundation::core::Millis;

/// Handle to one scheduled timer, valid only within the epoch it was issued in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    at: Millis,
    seq: u64,
    epoch: u64,
}

impl TimerHandle {
    pub fn deadline(self) -> Millis {
        self.at
    }

    pub fn epoch(self) -> u64 {
        self.epoch
    }
}

/// Single-shot timers driven by an explicit `pop_due(now)` step.
///
/// There are no callbacks: the owner polls on every host tick and handles what comes out.
/// [`TimerQueue::cancel_all`] starts a new epoch, after which nothing scheduled earlier is
/// ever returned and earlier handles no longer cancel anything.
#[derive(Clone, Debug)]
pub struct TimerQueue<E> {
    // Keyed by (deadline, insertion order) so equal deadlines fire FIFO.
    entries: BTreeMap<(Millis, u64), E>,
    next_seq: u64,
    epoch: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
            epoch: 0,
        }
    }

    pub fn schedule(&mut self, at: Millis, event: E) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((at, seq), event);
        TimerHandle {
            at,
            seq,
            epoch: self.epoch,
        }
    }

    /// Cancel one timer. Returns `false` if it already fired or belongs to an older epoch.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        if handle.epoch != self.epoch {
            return false;
        }
        self.entries.remove(&(handle.at, handle.seq)).is_some()
    }

    /// Drop every pending timer and invalidate all outstanding handles.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
        self.epoch += 1;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Remove and return the earliest timer whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, E)> {
        let (&(at, _), _) = self.entries.first_key_value()?;
        if at > now {
            return None;
        }
        self.entries
            .pop_first()
            .map(|((at, _), event)| (at, event))
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.entries.first_key_value().map(|(&(at, _), _)| at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/timer.rs"]
mod tests;
