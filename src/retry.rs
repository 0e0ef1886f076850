//! Bounded retry for transient gateway calls
//!
//! Retrying is opt-in per call site. Route mutations never go through here.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_secs() -> u64 {
    5
}

/// Retry settings as they appear in the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay between attempts (seconds)
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_secs: default_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            delay: Duration::from_secs(settings.delay_secs),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no delay
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Run `op` until it succeeds or the attempts are used up
    ///
    /// Returns the last error. At least one attempt is always made.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    debug!("Attempt {}/{} failed: {}; retrying in {:?}", attempt, attempts, e, self.delay);
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!("Attempt {}/{} failed: {}; giving up", attempt, attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::default();

        let result: Result<u32, String> = policy
            .run(move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 { Err(format!("attempt {}", n)) } else { Ok(n) }
            })
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_secs(5),
        };

        let started = tokio::time::Instant::now();
        let result: Result<(), String> = policy
            .run(move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Err(format!("attempt {}", n))
            })
            .await;

        assert_eq!(result, Err("attempt 2".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy {
            max_attempts: 0,
            delay: Duration::ZERO,
        };

        let result: Result<(), &str> = policy
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("down")
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_from_settings() {
        let policy = RetryPolicy::from(&RetrySettings::default());
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(5));
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
