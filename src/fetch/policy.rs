//! Retry state machine and delay policy
//!
//! Every decision the fetch loop takes about waiting is a pure function of
//! the attempt index, the error seen and the recent success rate. Randomness
//! only enters through the caller-supplied RNG, so the policy can be tested
//! without sleeping.

use crate::config::{secs, FetchConfig};
use crate::fetch::FetchError;
use rand::Rng;
use std::time::Duration;

/// Below this recent success rate the jitter range is widened
const LOW_SUCCESS_RATE: f64 = 0.5;

/// Above this recent success rate the jitter range is narrowed
const HIGH_SUCCESS_RATE: f64 = 0.8;

const WIDEN_FACTOR: f64 = 2.0;
const NARROW_FACTOR: f64 = 0.5;

/// State of one fetch's retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// About to issue attempt number `attempt` (0-based)
    Attempting { attempt: u32 },
    /// Waiting after a failed attempt before the next one
    Cooldown { attempt: u32, wait: Duration },
    /// A valid page was obtained
    Succeeded { attempts: u32 },
    /// Every allowed attempt failed
    Exhausted { attempts: u32 },
}

/// Delay and cooldown settings for the fetch loop
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    base_delay: Duration,
    jitter_min: Duration,
    jitter_max: Duration,
    forbidden_cooldown: Duration,
    rate_limit_cooldown: Duration,
    server_error_cooldown: Duration,
    default_cooldown: Duration,
    blocked_cooldown: Duration,
    invalid_content_cooldown: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            base_delay: secs(config.base_delay),
            jitter_min: secs(config.jitter_min),
            jitter_max: secs(config.jitter_max),
            forbidden_cooldown: secs(config.forbidden_cooldown),
            rate_limit_cooldown: secs(config.rate_limit_cooldown),
            server_error_cooldown: secs(config.server_error_cooldown),
            default_cooldown: secs(config.default_cooldown),
            blocked_cooldown: secs(config.blocked_cooldown),
            invalid_content_cooldown: secs(config.invalid_content_cooldown),
            max_backoff: secs(config.max_backoff),
        }
    }

    /// Same policy with a different base delay
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Jitter range for the given recent success rate
    ///
    /// The range is widened when most recent attempts failed and narrowed
    /// when almost all succeeded. With no history the configured range is used.
    pub fn jitter_bounds(&self, success_rate: Option<f64>) -> (Duration, Duration) {
        let factor = match success_rate {
            Some(rate) if rate < LOW_SUCCESS_RATE => WIDEN_FACTOR,
            Some(rate) if rate > HIGH_SUCCESS_RATE => NARROW_FACTOR,
            _ => 1.0,
        };

        (
            self.jitter_min.mul_f64(factor),
            self.jitter_max.mul_f64(factor),
        )
    }

    /// `base` plus a jitter drawn from the adaptive range
    pub fn delay_with_jitter<R: Rng>(
        &self,
        base: Duration,
        success_rate: Option<f64>,
        rng: &mut R,
    ) -> Duration {
        let (low, high) = self.jitter_bounds(success_rate);
        let jitter = if high > low {
            Duration::from_secs_f64(rng.gen_range(low.as_secs_f64()..=high.as_secs_f64()))
        } else {
            low
        };
        base + jitter
    }

    /// Delay slept before every attempt
    pub fn pre_attempt_delay<R: Rng>(&self, success_rate: Option<f64>, rng: &mut R) -> Duration {
        self.delay_with_jitter(self.base_delay, success_rate, rng)
    }

    /// Wait imposed after a failed attempt (0-based `attempt`)
    ///
    /// | Error | Wait |
    /// |-------|------|
    /// | HTTP 403 | forbidden cooldown |
    /// | HTTP 429 | rate-limit cooldown x (attempt + 1) |
    /// | HTTP 5xx | server-error cooldown |
    /// | Other status | default cooldown |
    /// | Challenge page | blocked cooldown |
    /// | Too few keywords | invalid-content cooldown |
    /// | Timeout / transport | base delay x 2^attempt, capped |
    pub fn cooldown(&self, attempt: u32, error: &FetchError) -> Duration {
        match error {
            FetchError::ServerRejected { status: 403 } => self.forbidden_cooldown,
            FetchError::ServerRejected { status: 429 } => {
                self.rate_limit_cooldown.saturating_mul(attempt + 1)
            }
            FetchError::ServerRejected { status } if (500..600).contains(status) => {
                self.server_error_cooldown
            }
            FetchError::ServerRejected { .. } => self.default_cooldown,
            FetchError::ContentBlocked { .. } => self.blocked_cooldown,
            FetchError::ContentInvalid { .. } => self.invalid_content_cooldown,
            FetchError::NetworkTransient { .. } => self.backoff(attempt),
            FetchError::ExhaustedRetries { last, .. } => self.cooldown(attempt, last),
        }
    }

    /// Exponential transport backoff: base delay doubled per attempt
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.base_delay.saturating_mul(factor).min(self.max_backoff)
    }

    /// Next state after attempt `attempt` finished
    ///
    /// `error` is None when the attempt produced a valid page. No cooldown
    /// follows the final allowed attempt.
    pub fn transition(
        &self,
        attempt: u32,
        max_retries: u32,
        error: Option<&FetchError>,
    ) -> RetryState {
        let attempts = attempt + 1;

        match error {
            None => RetryState::Succeeded { attempts },
            Some(_) if attempts >= max_retries.max(1) => RetryState::Exhausted { attempts },
            Some(error) => RetryState::Cooldown {
                attempt,
                wait: self.cooldown(attempt, error),
            },
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}
