//! Ticketed debouncing for keyup handlers.
//!
//! Each trigger replaces the pending payload and hands out a new ticket. A
//! host with timers schedules a callback per ticket and only the latest
//! ticket yields the payload; a host without timers calls [`Debounced::poll`]
//! with the current time.

use std::time::Duration;

use web_time::Instant;

/// Keyup debounce used when no settings are supplied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
struct Pending<T> {
    ticket: u64,
    at: Instant,
    payload: T,
}

/// Keeps the latest payload until its interval elapses without a newer one.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    interval: Duration,
    generation: u64,
    pending: Option<Pending<T>>,
}

impl<T> Default for Debounced<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl<T> Debounced<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the pending payload and return its ticket.
    pub fn trigger(&mut self, payload: T) -> u64 {
        self.trigger_at(payload, Instant::now())
    }

    pub fn trigger_at(&mut self, payload: T, at: Instant) -> u64 {
        self.generation += 1;
        self.pending = Some(Pending {
            ticket: self.generation,
            at,
            payload,
        });
        self.generation
    }

    /// Take the payload if `ticket` is still the latest one.
    pub fn take(&mut self, ticket: u64) -> Option<T> {
        match &self.pending {
            Some(p) if p.ticket == ticket => self.pending.take().map(|p| p.payload),
            _ => None,
        }
    }

    /// Take the payload once the interval has elapsed since the last trigger.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if now.saturating_duration_since(p.at) >= self.interval => {
                self.pending.take().map(|p| p.payload)
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
