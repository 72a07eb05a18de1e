// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Repeat-until-ready polling with exponential backoff.
//!
//! [`BackoffPoller`] runs a caller-supplied probe until it yields a value. The
//! probe decides what is retryable: `Ok(None)` means "not ready, try again",
//! `Err(_)` aborts immediately. Polling is bounded both by an attempt cap and
//! by a wall-clock budget, whichever is hit first, and can be cancelled from
//! another task through a [`CancellationToken`].
//!
//! # Example
//!
//! ```rust,no_run
//! use usdc_bridge_rs::{BackoffConfig, BackoffPoller, CancellationToken};
//! use usdc_bridge_rs::providers::TokioClock;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let poller = BackoffPoller::new(Arc::new(TokioClock::new()));
//! let cancel = CancellationToken::new();
//!
//! let value: Result<u32, _> = poller
//!     .poll(&BackoffConfig::fast_transfer(), &cancel, |attempt| async move {
//!         Ok::<_, std::convert::Infallible>((attempt == 3).then_some(42))
//!     })
//!     .await;
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::traits::Clock;

/// Backoff and budget settings for a [`BackoffPoller`] run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    /// Delay after the first unsuccessful attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Factor applied to the delay after every unsuccessful attempt.
    pub backoff_multiplier: f64,
    /// Maximum number of probe invocations. Zero is treated as one.
    pub max_attempts: u32,
    /// Wall-clock budget measured from the first attempt.
    pub total_timeout: Duration,
}

impl Default for BackoffConfig {
    /// 2s initial delay growing by 1.5x up to 30s, 120 attempts, 30 minute budget.
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 1.5,
            max_attempts: 120,
            total_timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl BackoffConfig {
    /// Preset for fast-finality transfers, which usually attest in under 30 seconds.
    pub fn fast_transfer() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 1.5,
            max_attempts: 60,
            total_timeout: Duration::from_secs(5 * 60),
        }
    }

    /// Preset for standard-finality transfers (13-19 minutes on Ethereum and its L2s).
    pub fn standard_transfer() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 1.5,
            max_attempts: 90,
            total_timeout: Duration::from_secs(40 * 60),
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = timeout;
        self
    }

    /// Delay that follows `current`, capped at `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let multiplier = self.backoff_multiplier.max(1.0);
        Duration::try_from_secs_f64(current.as_secs_f64() * multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Which bound ended a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutCause {
    /// The wall-clock budget ran out.
    Timeout,
    /// The attempt cap was reached.
    MaxAttempts,
}

impl fmt::Display for TimeoutCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::MaxAttempts => f.write_str("max_attempts"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PollError<E> {
    #[error("polling gave up ({cause}) after {attempts} attempts in {elapsed:?}")]
    Timeout {
        cause: TimeoutCause,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("polling cancelled")]
    Cancelled,

    #[error("probe failed: {0}")]
    Probe(E),
}

/// Cloneable cancellation flag shared between a poller and whoever may stop it.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Signals cancellation and wakes every task waiting on [`cancelled`](Self::cancelled).
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            // The sender lives in `self`, so the channel cannot close while we wait.
            std::future::pending::<()>().await;
        }
    }
}

/// Generic repeat-until-ready primitive.
#[derive(Clone)]
pub struct BackoffPoller {
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for BackoffPoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffPoller").finish_non_exhaustive()
    }
}

impl BackoffPoller {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Invokes `probe` until it returns `Ok(Some(_))`.
    ///
    /// The probe receives the 1-based attempt number. After every `Ok(None)` the
    /// poller checks the attempt cap, then the wall-clock budget, and otherwise
    /// sleeps for the current delay (never past the remaining budget) while
    /// watching `cancel`. An `Err` from the probe is returned as
    /// [`PollError::Probe`] without further attempts.
    ///
    /// Because the last sleep is clipped to the remaining budget, a poll ends no
    /// later than `total_timeout` plus one probe duration.
    pub async fn poll<T, E, F, Fut>(
        &self,
        config: &BackoffConfig,
        cancel: &CancellationToken,
        mut probe: F,
    ) -> std::result::Result<T, PollError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = std::result::Result<Option<T>, E>>,
    {
        let started = self.clock.now();
        let max_attempts = config.max_attempts.max(1);
        let mut delay = config.initial_delay;
        let mut attempt = 0u32;

        loop {
            if cancel.is_cancelled() {
                debug!(attempt = attempt, event = "poll_cancelled");
                return Err(PollError::Cancelled);
            }

            attempt += 1;
            if let Some(value) = probe(attempt).await.map_err(PollError::Probe)? {
                debug!(attempt = attempt, event = "poll_ready");
                return Ok(value);
            }

            let elapsed = self.clock.now().saturating_duration_since(started);

            if attempt >= max_attempts {
                warn!(
                    attempts = attempt,
                    elapsed_secs = elapsed.as_secs(),
                    event = "poll_max_attempts_reached"
                );
                return Err(PollError::Timeout {
                    cause: TimeoutCause::MaxAttempts,
                    attempts: attempt,
                    elapsed,
                });
            }

            if elapsed >= config.total_timeout {
                warn!(
                    attempts = attempt,
                    elapsed_secs = elapsed.as_secs(),
                    event = "poll_timeout"
                );
                return Err(PollError::Timeout {
                    cause: TimeoutCause::Timeout,
                    attempts: attempt,
                    elapsed,
                });
            }

            let wait = delay.min(config.total_timeout - elapsed);
            debug!(
                attempt = attempt,
                sleep_ms = wait.as_millis() as u64,
                event = "poll_not_ready"
            );

            tokio::select! {
                _ = self.clock.sleep(wait) => {}
                _ = cancel.cancelled() => {
                    debug!(attempt = attempt, event = "poll_cancelled");
                    return Err(PollError::Cancelled);
                }
            }

            delay = config.next_delay(delay);
        }
    }
}
