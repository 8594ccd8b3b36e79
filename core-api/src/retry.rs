//! Retry policy: decision table and backoff schedule.
//!
//! The engine consumes an explicit table (status class → decision) and a
//! small per-call schedule instead of branching on status ranges inline, so
//! the policy is unit-testable on its own.
//!
//! The policy only distinguishes status-code class, not HTTP method: a
//! state-changing POST is retried under the same rules as a GET. Callers
//! that cannot tolerate automatic re-sends set `retries(0)` on the
//! descriptor.

use bridge_traits::http::HttpResponse;
use std::time::Duration;

/// What to do with a non-2xx status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Surface immediately; never retried.
    Terminal,
    /// Transient (5xx): retry on the `base × (attempt + 1)` schedule.
    Backoff,
    /// 429: retry, preferring the server's `Retry-After` hint.
    HonorRetryAfter,
}

/// Status-class decision table.
pub fn decide(status: u16) -> RetryDecision {
    match status {
        429 => RetryDecision::HonorRetryAfter,
        500..=599 => RetryDecision::Backoff,
        _ => RetryDecision::Terminal,
    }
}

/// Parse a `Retry-After` header as integer seconds.
///
/// HTTP-date values and anything else unparseable are treated as absent so
/// the backoff schedule applies instead.
pub fn retry_after_hint(response: &HttpResponse) -> Option<Duration> {
    response
        .header("Retry-After")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Per-call attempt state: 0-based attempt index plus the remaining budget.
///
/// `budget = N` allows N additional attempts after the first, so a call with
/// `retries = 2` makes at most 3 network attempts.
#[derive(Debug)]
pub struct RetrySchedule {
    attempt: u32,
    budget: u32,
    base: Duration,
}

impl RetrySchedule {
    pub fn new(budget: u32, base: Duration) -> Self {
        Self {
            attempt: 0,
            budget,
            base,
        }
    }

    /// Index of the attempt currently in flight.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Consume one retry from the budget.
    ///
    /// Returns the wait before the next attempt — the server hint when given,
    /// else `base × (attempt + 1)` — or `None` when the budget is exhausted
    /// and the call must go terminal.
    pub fn next_delay(&mut self, hint: Option<Duration>) -> Option<Duration> {
        if self.attempt >= self.budget {
            return None;
        }
        let delay = hint.unwrap_or(self.base * (self.attempt + 1));
        self.attempt += 1;
        Some(delay)
    }
}
