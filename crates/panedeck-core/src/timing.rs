#![forbid(unsafe_code)]

//! Debounce and throttle helpers for high-frequency host events.
//!
//! Both helpers are clock-agnostic: callers pass `now` explicitly, which keeps
//! them deterministic under test and usable on `wasm32` hosts through
//! [`web_time::Instant`].
//!
//! # Semantics
//!
//! - [`Debouncer`] coalesces a burst of items into one batch. A batch becomes
//!   due once the input has been quiet for `window`, or once the oldest queued
//!   item has waited `max_wait` (bounded latency under continuous input).
//! - [`Throttle`] admits at most one tick per `interval`. Ticks that arrive
//!   early are dropped, never queued.

use web_time::{Duration, Instant};

/// Trailing-edge batcher with a latency cap.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    max_wait: Duration,
    pending: Vec<T>,
    first_at: Option<Instant>,
    last_at: Option<Instant>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer. `max_wait` is raised to at least `window`.
    #[must_use]
    pub fn new(window: Duration, max_wait: Duration) -> Self {
        Self {
            window,
            max_wait: max_wait.max(window),
            pending: Vec::new(),
            first_at: None,
            last_at: None,
        }
    }

    /// Quiet period required before a batch is released.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Queue one item observed at `now`.
    pub fn push(&mut self, item: T, now: Instant) {
        if self.first_at.is_none() {
            self.first_at = Some(now);
        }
        self.last_at = Some(now);
        self.pending.push(item);
    }

    /// Queue several items observed at the same instant.
    pub fn extend(&mut self, items: impl IntoIterator<Item = T>, now: Instant) {
        for item in items {
            self.push(item, now);
        }
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Instant at which the current batch becomes due, if any is queued.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        let (first, last) = (self.first_at?, self.last_at?);
        Some((last + self.window).min(first + self.max_wait))
    }

    /// Whether a batch is due at `now`.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    /// Release the batch if it is due.
    pub fn poll(&mut self, now: Instant) -> Option<Vec<T>> {
        if !self.is_due(now) {
            return None;
        }
        Some(self.flush())
    }

    /// Release everything queued regardless of timing.
    pub fn flush(&mut self) -> Vec<T> {
        self.first_at = None;
        self.last_at = None;
        std::mem::take(&mut self.pending)
    }

    /// Drop everything queued.
    pub fn clear(&mut self) {
        let _ = self.flush();
    }
}

/// Leading-edge rate limiter.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns `true` (and records `now`) if a tick is admitted.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Forget the last admitted tick so the next call is admitted.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn debouncer_waits_for_quiet_period() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(ms(100), ms(400));
        debouncer.push(1, t0);
        debouncer.push(2, t0 + ms(50));
        assert!(debouncer.poll(t0 + ms(120)).is_none());
        assert_eq!(debouncer.poll(t0 + ms(150)), Some(vec![1, 2]));
        assert!(debouncer.is_empty());
        assert!(debouncer.deadline().is_none());
    }

    #[test]
    fn debouncer_caps_latency_under_continuous_input() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(ms(100), ms(250));
        for step in 0..5 {
            debouncer.push(step, t0 + ms(step * 60));
        }
        // Last push at 240ms would normally delay to 340ms; the cap releases at 250ms.
        assert_eq!(debouncer.deadline(), Some(t0 + ms(250)));
        assert_eq!(debouncer.poll(t0 + ms(250)).map(|b| b.len()), Some(5));
    }

    #[test]
    fn throttle_drops_early_ticks() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(ms(80));
        assert!(throttle.ready(t0));
        assert!(!throttle.ready(t0 + ms(40)));
        assert!(throttle.ready(t0 + ms(80)));
        throttle.reset();
        assert!(throttle.ready(t0 + ms(81)));
    }
}
