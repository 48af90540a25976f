// Active-index commit state machine. Separates "what the viewport shows most"
// (fast, noisy) from "what the UI declares active" (stable, debounced), with a
// manual-override lock that beats both.

use crate::types::{Candidate, Timestamp};

/// Debouncer state. `Pending` holds the trailing-timer anchor: any newer
/// proposal replaces the candidate and restarts the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebounceState {
    Idle,
    Pending {
        candidate: Candidate,
        scheduled_at: Timestamp,
    },
}

/// Outcome of an elapsed debounce window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommitOutcome {
    Committed(usize),
    /// Dropped because a manual lock was still in force.
    DroppedLocked(usize),
    /// Dropped because the candidate's ratio was below the minimum-visibility
    /// threshold at commit time (expected during fast scroll, not an error).
    DroppedBelowThreshold(usize),
}

/// Turns noisy candidate proposals into a stable committed active index.
#[derive(Debug)]
pub struct ActiveIndexDebouncer {
    state: DebounceState,
    committed: Option<usize>,
    lock_deadline: Option<Timestamp>,
    debounce_us: u64,
    lock_us: u64,
    min_ratio: f32,
}

impl ActiveIndexDebouncer {
    pub fn new(debounce_us: u64, lock_us: u64, min_ratio: f32) -> Self {
        ActiveIndexDebouncer {
            state: DebounceState::Idle,
            committed: None,
            lock_deadline: None,
            debounce_us,
            lock_us,
            min_ratio,
        }
    }

    /// Latest committed active index, if any commit or override has happened.
    pub fn committed(&self) -> Option<usize> {
        self.committed
    }

    pub fn is_locked(&self, now: Timestamp) -> bool {
        matches!(self.lock_deadline, Some(deadline) if now < deadline)
    }

    /// Trailing debounce: every proposal restarts the window with the new candidate.
    pub fn propose(&mut self, candidate: Candidate, now: Timestamp) {
        self.state = DebounceState::Pending {
            candidate,
            scheduled_at: now,
        };
    }

    /// Advance the wall clock. When a pending window has elapsed, resolve it:
    /// lock beats commit, threshold beats candidate. Idempotent to re-entry;
    /// returns `None` while idle or still pending.
    pub fn poll(&mut self, now: Timestamp) -> Option<CommitOutcome> {
        let DebounceState::Pending {
            candidate,
            scheduled_at,
        } = self.state
        else {
            return None;
        };

        if now.micros_since(scheduled_at) < self.debounce_us {
            return None;
        }
        self.state = DebounceState::Idle;

        if self.is_locked(now) {
            log::debug!(
                "drop candidate {} at {:.0}ms: manual lock in force",
                candidate.index,
                now.as_millis()
            );
            return Some(CommitOutcome::DroppedLocked(candidate.index));
        }

        if candidate.ratio < self.min_ratio {
            log::debug!(
                "drop candidate {}: ratio {:.2} below threshold {:.2}",
                candidate.index,
                candidate.ratio,
                self.min_ratio
            );
            return Some(CommitOutcome::DroppedBelowThreshold(candidate.index));
        }

        self.committed = Some(candidate.index);
        log::debug!("commit active card {}", candidate.index);
        Some(CommitOutcome::Committed(candidate.index))
    }

    /// Manual override: commits immediately, arms the lock, and cancels any
    /// pending automatic commit.
    pub fn activate(&mut self, index: usize, now: Timestamp) {
        self.committed = Some(index);
        self.lock_deadline = Some(now.saturating_add_micros(self.lock_us));
        self.state = DebounceState::Idle;
        log::debug!(
            "manual activate {}; auto-commits locked until {:.0}ms",
            index,
            now.as_millis() + (self.lock_us as f64) / 1000.0
        );
    }

    #[cfg(test)]
    fn state(&self) -> DebounceState {
        self.state
    }
}
