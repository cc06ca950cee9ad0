// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnect backoff policy.
//!
//! [`ReconnectState::decide`] is a pure function: given the current state it
//! says whether another attempt is allowed, how long to wait, and what the
//! state looks like afterwards. The caller owns the state and applies the
//! returned `next` value.
//!
//! Delays grow geometrically from `min_delay` and are clamped to
//! `[min_delay, max_delay]`. With the default factor of 2:
//!
//! ```text
//! min=1000ms max=30000ms: 1000, 2000, 4000, 8000, 16000, 30000, 30000, ...
//! ```

use std::time::Duration;

/// Default minimum delay between attempts.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(5000);

/// Default maximum delay between attempts.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(25000);

/// Default growth factor.
pub const DEFAULT_FACTOR: f64 = 2.0;

/// Outcome of consulting the policy after a failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Wait `delay`, then try again. `next` replaces the current state.
    Retry { delay: Duration, next: ReconnectState },
    /// The attempt budget is spent.
    Exhausted,
}

/// Reconnect bookkeeping owned by the connection state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectState {
    attempts_made: u32,
    /// Zero until the first retry after a success.
    current_delay: Duration,
    min_delay: Duration,
    max_delay: Duration,
    /// 0 = unlimited.
    max_attempts: u32,
    factor: f64,
}

impl Default for ReconnectState {
    fn default() -> Self {
        ReconnectState::new(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY, 0)
    }
}

impl ReconnectState {
    /// Creates a policy state. `max_delay` is raised to `min_delay` if lower.
    pub fn new(min_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        ReconnectState {
            attempts_made: 0,
            current_delay: Duration::ZERO,
            min_delay,
            max_delay: max_delay.max(min_delay),
            max_attempts,
            factor: DEFAULT_FACTOR,
        }
    }

    /// Sets the growth factor. Values below 1.0 (or non-finite) become 1.0.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.set_factor(factor);
        self
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Sets the attempt cap (0 = unlimited).
    pub fn set_max_attempts(&mut self, attempts: u32) {
        self.max_attempts = attempts;
    }

    /// Sets the minimum delay, raising the maximum if it would fall below.
    pub fn set_min_delay(&mut self, delay: Duration) {
        self.min_delay = delay;
        if self.max_delay < delay {
            self.max_delay = delay;
        }
    }

    /// Sets the maximum delay, lowering the minimum if it would exceed it.
    pub fn set_max_delay(&mut self, delay: Duration) {
        self.max_delay = delay;
        if self.min_delay > delay {
            self.min_delay = delay;
        }
    }

    pub fn set_factor(&mut self, factor: f64) {
        self.factor = if factor.is_finite() && factor >= 1.0 {
            factor
        } else {
            1.0
        };
    }

    /// Forget previous failures. Called on every successful open.
    pub fn reset(&mut self) {
        self.attempts_made = 0;
        self.current_delay = Duration::ZERO;
    }

    /// Returns true if no further attempts are allowed.
    pub fn is_exhausted(&self) -> bool {
        self.max_attempts > 0 && self.attempts_made >= self.max_attempts
    }

    /// Decide what to do after a failed attempt.
    pub fn decide(&self) -> Decision {
        if self.is_exhausted() {
            return Decision::Exhausted;
        }

        let delay = self.next_delay();
        let mut next = self.clone();
        next.attempts_made = self.attempts_made.saturating_add(1);
        next.current_delay = delay;

        Decision::Retry { delay, next }
    }

    fn next_delay(&self) -> Duration {
        if self.current_delay.is_zero() {
            return self.min_delay;
        }
        let grown = Duration::try_from_secs_f64(self.current_delay.as_secs_f64() * self.factor)
            .unwrap_or(self.max_delay);
        grown.clamp(self.min_delay, self.max_delay)
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
