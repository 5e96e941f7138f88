use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::EngineError;

/// Timing of the phase cycle loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleConfig {
    /// Shortest phase, inclusive.
    pub min_phase: Duration,
    /// Longest phase, exclusive.
    pub max_phase: Duration,
    /// Sleep between two elapsed-time checks.
    pub poll_interval: Duration,
    /// Fixed RNG seed for reproducible runs. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            min_phase: Duration::from_millis(4000),
            max_phase: Duration::from_millis(6000),
            poll_interval: Duration::from_millis(1),
            seed: None,
        }
    }
}

impl CycleConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.min_phase >= self.max_phase {
            return Err(EngineError::InvalidConfig(format!(
                "min_phase {:?} must be shorter than max_phase {:?}",
                self.min_phase, self.max_phase
            )));
        }
        if as_nanos(self.max_phase).is_none() {
            return Err(EngineError::InvalidConfig(format!(
                "max_phase {:?} is too long",
                self.max_phase
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(EngineError::InvalidConfig(
                "poll_interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Uniform draw from `[min_phase, max_phase)` at nanosecond resolution.
    ///
    /// Only meaningful on a validated config. An empty range yields
    /// `min_phase`.
    pub fn draw_phase_duration<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let (Some(min), Some(max)) = (as_nanos(self.min_phase), as_nanos(self.max_phase)) else {
            return self.min_phase;
        };
        if min >= max {
            return self.min_phase;
        }
        Duration::from_nanos(rng.gen_range(min..max))
    }
}

fn as_nanos(duration: Duration) -> Option<u64> {
    u64::try_from(duration.as_nanos()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_signal_timing() {
        let config = CycleConfig::default();
        assert_eq!(config.min_phase, Duration::from_millis(4000));
        assert_eq!(config.max_phase, Duration::from_millis(6000));
        assert_eq!(config.poll_interval, Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn draws_stay_in_half_open_range() {
        let config = CycleConfig {
            seed: Some(42),
            ..Default::default()
        };
        let mut rng = config.rng();
        for _ in 0..10_000 {
            let d = config.draw_phase_duration(&mut rng);
            assert!(d >= config.min_phase && d < config.max_phase, "{d:?}");
        }
    }

    #[test]
    fn sub_millisecond_bounds_are_respected() {
        let config = CycleConfig {
            min_phase: Duration::from_micros(1500),
            max_phase: Duration::from_micros(1900),
            poll_interval: Duration::from_micros(100),
            seed: Some(3),
        };
        assert!(config.validate().is_ok());

        let mut rng = config.rng();
        for _ in 0..10_000 {
            let d = config.draw_phase_duration(&mut rng);
            assert!(d >= config.min_phase && d < config.max_phase, "{d:?}");
        }
    }

    #[test]
    fn rejects_max_phase_beyond_nanosecond_range() {
        let config = CycleConfig {
            max_phase: Duration::MAX,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn seeded_draws_repeat() {
        let config = CycleConfig {
            seed: Some(7),
            ..Default::default()
        };
        let mut a = config.rng();
        let mut b = config.rng();
        for _ in 0..100 {
            assert_eq!(
                config.draw_phase_duration(&mut a),
                config.draw_phase_duration(&mut b)
            );
        }
    }

    #[test]
    fn rejects_empty_range() {
        let config = CycleConfig {
            min_phase: Duration::from_millis(500),
            max_phase: Duration::from_millis(500),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let config = CycleConfig {
            poll_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }
}
