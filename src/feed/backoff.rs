//! Reconnect delays for the push feed

use crate::config::ReconnectConfig;
use std::time::Duration;

/// Exponential backoff schedule with an optional attempt limit
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    max_attempts: Option<u32>,
    attempt: u32,
}

impl Backoff {
    pub fn new(config: &ReconnectConfig) -> Self {
        let initial = Duration::from_millis(config.initial_delay_ms);
        Self {
            initial,
            max: Duration::from_millis(config.max_delay_ms).max(initial),
            multiplier: if config.multiplier.is_finite() && config.multiplier >= 1.0 {
                config.multiplier
            } else {
                1.0
            },
            max_attempts: config.max_attempts,
            attempt: 0,
        }
    }

    /// Delay before the next attempt, or `None` once the limit is reached
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.max_attempts.is_some_and(|max| self.attempt >= max) {
            return None;
        }

        let factor = self.multiplier.powi(self.attempt.min(64) as i32);
        let millis = (self.initial.as_millis() as f64 * factor).min(self.max.as_millis() as f64);
        self.attempt += 1;
        Some(Duration::from_millis(millis as u64))
    }

    /// Failed attempts since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Start over after a successful connection
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(initial: u64, max: u64, multiplier: f64, attempts: Option<u32>) -> ReconnectConfig {
        ReconnectConfig {
            initial_delay_ms: initial,
            max_delay_ms: max,
            multiplier,
            max_attempts: attempts,
        }
    }

    #[test]
    fn grows_until_capped() {
        let mut backoff = Backoff::new(&config(100, 500, 2.0, None));
        let delays: Vec<_> = (0..5).map(|_| backoff.next_delay().unwrap()).collect();
        assert_eq!(
            delays,
            [100, 200, 400, 500, 500].map(Duration::from_millis)
        );
    }

    #[test]
    fn stops_after_max_attempts() {
        let mut backoff = Backoff::new(&config(10, 1000, 2.0, Some(2)));
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert_eq!(backoff.next_delay(), None);
        assert_eq!(backoff.attempts(), 2);
    }

    #[test]
    fn reset_restarts_schedule() {
        let mut backoff = Backoff::new(&config(100, 10_000, 3.0, Some(2)));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn bad_multiplier_falls_back_to_constant() {
        let mut backoff = Backoff::new(&config(50, 1000, 0.0, None));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(50)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn huge_attempt_counts_do_not_overflow() {
        let mut backoff = Backoff::new(&config(1000, 30_000, 10.0, None));
        for _ in 0..100 {
            assert!(backoff.next_delay().unwrap() <= Duration::from_secs(30));
        }
    }
}
