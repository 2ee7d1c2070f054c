use std::time::Duration;

use rand::Rng;

use crate::configs::Reconnect;

/// Exponential reconnect delay with equal jitter.
///
/// The n-th delay is `initial * 2^n` capped at `max`; half of it is fixed and
/// the other half is drawn uniformly, so retries from many clients spread out.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
            attempt: 0,
        }
    }

    pub fn from_settings(reconnect: &Reconnect) -> Self {
        Self::new(reconnect.initial_delay(), reconnect.max_delay())
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay before the next retry, without jitter.
    pub fn ceiling(&self) -> Duration {
        let factor = 2u32.saturating_pow(self.attempt.min(31));
        self.initial.saturating_mul(factor).min(self.max)
    }

    pub fn next_delay(&mut self) -> Duration {
        self.next_delay_with(&mut rand::rng())
    }

    pub fn next_delay_with<R: Rng>(&mut self, rng: &mut R) -> Duration {
        let ceiling = self.ceiling();
        self.attempt = self.attempt.saturating_add(1);

        let half = ceiling / 2;
        let spread = (ceiling - half).as_millis() as u64;
        let jitter = if spread == 0 { 0 } else { rng.random_range(0..=spread) };

        half + Duration::from_millis(jitter)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
