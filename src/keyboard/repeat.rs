// SPDX-License-Identifier: GPL-3.0-only

//! Hold-to-repeat timer for backspace.

use std::time::{Duration, Instant};

use crate::config::Config;

/// Explicit start/stop timer keyed to the pressed state of backspace.
///
/// Nothing fires before the hold threshold. After it, one repeat is due per
/// elapsed interval, counted from the threshold.
#[derive(Debug, Clone)]
pub struct RepeatTimer {
    threshold: Duration,
    interval: Duration,
    pressed_at: Option<Instant>,
    fired: u32,
}

impl RepeatTimer {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            threshold: config.long_press_threshold,
            interval: config.repeat_interval,
            pressed_at: None,
            fired: 0,
        }
    }

    /// Arms the timer. Restarting an armed timer resets it.
    pub fn start(&mut self, now: Instant) {
        self.pressed_at = Some(now);
        self.fired = 0;
    }

    pub fn stop(&mut self) {
        self.pressed_at = None;
        self.fired = 0;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Returns how many repeats became due since the last poll.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(pressed_at) = self.pressed_at else {
            return 0;
        };
        let held = now.saturating_duration_since(pressed_at);
        if held < self.threshold {
            return 0;
        }

        let since_threshold = held - self.threshold;
        let interval = self.interval.as_millis().max(1);
        let total = u32::try_from(since_threshold.as_millis() / interval + 1).unwrap_or(u32::MAX);

        let due = total.saturating_sub(self.fired);
        self.fired = total;
        due
    }
}
