//! Clock module - tick-driven countdowns
//!
//! A session owns two of these: the pre-game countdown (3 ticks) and the play clock
//! (the difficulty's time limit). Both are advanced one whole tick at a time by the
//! session; neither knows about pause; the session simply does not tick the play clock
//! while paused.

/// Result of advancing a countdown by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Still running with this many ticks left
    Running(u32),
    /// Reached zero on this tick; the countdown is now stopped
    Expired,
    /// Already stopped; the tick had no effect
    Inert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Countdown {
    remaining: u32,
    running: bool,
}

impl Countdown {
    /// A running countdown. Starting at zero yields an already-stopped countdown.
    pub fn new(ticks: u32) -> Self {
        Self {
            remaining: ticks,
            running: ticks > 0,
        }
    }

    /// A countdown that never runs
    pub fn stopped(ticks: u32) -> Self {
        Self {
            remaining: ticks,
            running: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn tick(&mut self) -> CountdownTick {
        if !self.running {
            return CountdownTick::Inert;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            CountdownTick::Expired
        } else {
            CountdownTick::Running(self.remaining)
        }
    }
}
