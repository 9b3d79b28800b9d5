//! Request pacing
//!
//! Holds the fixed retry pause and draws the politeness delay slept between
//! catalog pages.

use crate::config::PacingConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Produces the delays used by the ingestion loop
pub struct Pacer {
    config: PacingConfig,
    rng: StdRng,
}

impl Pacer {
    /// Creates a pacer seeded from the operating system
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a pacer with a fixed seed, for reproducible delays
    pub fn with_seed(config: PacingConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pause between two attempts at the same page
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.config.retry_delay_ms)
    }

    /// Draws the next politeness delay
    ///
    /// Uniform over `min, min + step, ..., max`. With the default settings
    /// that is one of the ten values 0.5 s to 5.0 s.
    pub fn politeness_delay(&mut self) -> Duration {
        let PacingConfig {
            min_delay_ms,
            max_delay_ms,
            step_ms,
            ..
        } = self.config;

        if max_delay_ms <= min_delay_ms || step_ms == 0 {
            return Duration::from_millis(min_delay_ms);
        }

        let steps = (max_delay_ms - min_delay_ms) / step_ms;
        let chosen = self.rng.gen_range(0..=steps);
        Duration::from_millis(min_delay_ms + chosen * step_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_delays_are_half_second_steps() {
        let mut pacer = Pacer::with_seed(PacingConfig::default(), 7);
        let mut seen = HashSet::new();

        for _ in 0..500 {
            let delay = pacer.politeness_delay().as_millis() as u64;
            assert!((500..=5000).contains(&delay), "delay {} out of range", delay);
            assert_eq!(delay % 500, 0);
            seen.insert(delay);
        }

        // 500 draws over 10 values should hit all of them
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_zero_delay() {
        let config = PacingConfig {
            retry_delay_ms: 0,
            min_delay_ms: 0,
            max_delay_ms: 0,
            step_ms: 0,
        };
        let mut pacer = Pacer::new(config);

        assert_eq!(pacer.politeness_delay(), Duration::ZERO);
        assert_eq!(pacer.retry_delay(), Duration::ZERO);
    }

    #[test]
    fn test_retry_delay_default() {
        let pacer = Pacer::new(PacingConfig::default());
        assert_eq!(pacer.retry_delay(), Duration::from_secs(2));
    }
}
