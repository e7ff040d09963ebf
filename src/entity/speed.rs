//! Per-frame step size, ramping linearly while an entity keeps moving.
//!
//! Entities start slow and accelerate by a fixed increment every moving frame until the
//! maximum is reached. Stopping, or being rolled back after a collision, drops the step to
//! a small reset value so obstacles can be approached closely without overshooting.

use crate::constants::{MAX_STEP, RESET_STEP, STEP_INCREMENT};

/// Ramp parameters, in pixels per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepConfig {
    /// Value a new entity starts with.
    pub initial: f64,
    /// Added after every moving frame.
    pub increment: f64,
    /// Upper bound of the ramp.
    pub max: f64,
    /// Value used after stopping or rolling back.
    pub reset: f64,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            initial: STEP_INCREMENT,
            increment: STEP_INCREMENT,
            max: MAX_STEP,
            reset: RESET_STEP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    current: f64,
    config: StepConfig,
}

impl Step {
    pub fn new(config: StepConfig) -> Self {
        Self {
            current: config.initial,
            config,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn config(&self) -> &StepConfig {
        &self.config
    }

    /// Overrides the current step, clamped to the configured maximum.
    pub fn set(&mut self, step: f64) {
        self.current = step.min(self.config.max);
    }

    /// Distance covered this frame: the current step scaled by the frame's step factor,
    /// rounded to a whole pixel.
    pub fn distance(&self, step_factor: f64) -> f64 {
        (self.current * step_factor).round()
    }

    /// Advances the ramp by one increment, capping at the maximum.
    pub fn advance(&mut self) {
        self.current = (self.current + self.config.increment).min(self.config.max);
    }

    /// Drops back to the reset value.
    pub fn reset(&mut self) {
        self.current = self.config.reset;
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::new(StepConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_caps_at_max() {
        let mut step = Step::default();
        for _ in 0..100 {
            step.advance();
            assert!(step.current() <= MAX_STEP);
        }
        assert_eq!(step.current(), MAX_STEP);
    }

    #[test]
    fn test_distance_rounds_half_up() {
        let step = Step::default();
        assert_eq!(step.current(), 0.5);
        assert_eq!(step.distance(1.0), 1.0);
    }

    #[test]
    fn test_reset_value() {
        let mut step = Step::default();
        step.set(4.0);
        step.reset();
        assert_eq!(step.current(), RESET_STEP);
    }
}
