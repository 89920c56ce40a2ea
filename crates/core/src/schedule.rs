//! Schedule module - logical timeline for ticks and delayed cleanups
//!
//! Time only moves when the driver advances it. Two kinds of work are scheduled:
//!
//! - a periodic tick every [`TICK_MS`], active between `start_ticks` and `stop_ticks`
//! - one-shot cleanups, each tagged with the session generation that scheduled it
//!
//! [`Timeline::pop_due`] hands out due work strictly in time order, so the caller can
//! apply each item atomically before the next one is observed. When a cleanup and a tick
//! fall on the same instant the cleanup goes first; cleanups due at the same instant fire
//! in scheduling order.

use crate::reveal::Cleanup;
use crate::types::TICK_MS;

/// One-shot work item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledCleanup {
    pub due_ms: u64,
    pub generation: u32,
    pub cleanup: Cleanup,
    seq: u64,
}

/// Work that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Due {
    Tick,
    Cleanup(ScheduledCleanup),
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    now_ms: u64,
    next_tick_ms: Option<u64>,
    pending: Vec<ScheduledCleanup>,
    next_seq: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn ticking(&self) -> bool {
        self.next_tick_ms.is_some()
    }

    /// Start the periodic tick; the first one fires a full period from now
    pub fn start_ticks(&mut self) {
        self.next_tick_ms = Some(self.now_ms + TICK_MS as u64);
    }

    pub fn stop_ticks(&mut self) {
        self.next_tick_ms = None;
    }

    /// Schedule a one-shot cleanup `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u32, generation: u32, cleanup: Cleanup) {
        let item = ScheduledCleanup {
            due_ms: self.now_ms + delay_ms as u64,
            generation,
            cleanup,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.push(item);
    }

    pub fn pending(&self) -> &[ScheduledCleanup] {
        &self.pending
    }

    /// Drop every pending cleanup and stop the tick
    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.next_tick_ms = None;
    }

    /// Pop the earliest work due at or before `until_ms`, moving the clock to its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Due> {
        let cleanup_pos = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, c)| c.due_ms <= until_ms)
            .min_by_key(|(_, c)| (c.due_ms, c.seq))
            .map(|(i, _)| i);

        let tick_due = self.next_tick_ms.filter(|&t| t <= until_ms);

        match (cleanup_pos, tick_due) {
            (Some(pos), Some(tick)) if self.pending[pos].due_ms > tick => Some(self.fire_tick(tick)),
            (Some(pos), _) => {
                let item = self.pending.remove(pos);
                self.now_ms = self.now_ms.max(item.due_ms);
                Some(Due::Cleanup(item))
            }
            (None, Some(tick)) => Some(self.fire_tick(tick)),
            (None, None) => None,
        }
    }

    fn fire_tick(&mut self, at_ms: u64) -> Due {
        self.now_ms = self.now_ms.max(at_ms);
        self.next_tick_ms = Some(at_ms + TICK_MS as u64);
        Due::Tick
    }

    /// Move the clock to `until_ms` once nothing more is due
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
