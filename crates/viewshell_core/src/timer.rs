//! Deferred work queue.
//!
//! # Responsibility
//! - Hold fire-and-forget timers and animation-frame callbacks as data.
//! - Hand due work back to the shell in a deterministic order.
//!
//! # Invariants
//! - Due timers are returned ordered by due time, then by scheduling order.
//! - A frame callback requested while frames are being drained runs on the
//!   next frame, never the current one.

use crate::dom::NodeId;
use std::time::Duration;

/// Deferred action owned by the shell or by one widget initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Drops the router's "entering" marker unless a later swap re-armed it.
    ClearEnterMarker { generation: u64 },
    /// Hides the splash screen if it is still visible.
    DismissSplash,
    /// Routed to the initializer named `owner`.
    Widget {
        owner: &'static str,
        node: NodeId,
        generation: u64,
    },
}

#[derive(Debug, Clone)]
struct ScheduledTimer {
    due: Duration,
    seq: u64,
    action: TimerAction,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<ScheduledTimer>,
    frames: Vec<TimerAction>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to run `delay` after `now`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, action: TimerAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(ScheduledTimer {
            due: now + delay,
            seq,
            action,
        });
    }

    pub fn request_frame(&mut self, action: TimerAction) {
        self.frames.push(action);
    }

    /// Removes and returns every timer due at `now`.
    pub fn take_due(&mut self, now: Duration) -> Vec<TimerAction> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|timer| timer.due <= now);
        self.timers = pending;
        due.sort_by_key(|timer| (timer.due, timer.seq));
        due.into_iter().map(|timer| timer.action).collect()
    }

    /// Removes and returns the callbacks queued for the next frame.
    pub fn take_frame(&mut self) -> Vec<TimerAction> {
        std::mem::take(&mut self.frames)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.due).min()
    }
}
