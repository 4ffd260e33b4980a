//! Windowed PID controller for fan regulation.
//!
//! - Uses `f32` math, no heap unless the `std` feature is on
//! - Error is `measurement - set_point`: hotter than desired means positive output
//! - Integral and derivative are computed over sliding windows of past errors
//!   (see [`crate::estimator`]) instead of running accumulators
//! - Output is raw and unclamped; see [`crate::clamp`]
//!
//! Example
//! ```ignore
//! let mut pid = PidController::new(&ControllerConfig::default())?;
//! let raw = pid.step(cpu_temp_c);
//! ```

use serde::Serialize;

use crate::config::{ControllerConfig, DerivativeMode, Gains};
use crate::error::ConfigError;
use crate::estimator::{derivative_term, integral_term};
use crate::history::ErrorHistory;

/// Individual contributions of one controller step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PidTerms {
    pub error: f32,
    pub integral: f32,
    pub derivative: f32,
    /// `kp * (error + integral + derivative)`
    pub output: f32,
}

#[derive(Debug, Clone)]
pub struct PidController {
    // Setpoint
    set_point: f32,

    // Gains
    gains: Gains,
    integral_time: f32,
    derivative_time: f32,
    sample_interval: f32,
    derivative_mode: DerivativeMode,

    // State
    history: ErrorHistory,
}

impl PidController {
    /// Create a controller from a configuration, deriving the gains.
    pub fn new(config: &ControllerConfig) -> Result<Self, ConfigError> {
        let gains = config.validate()?;
        Ok(Self::with_gains(config, gains))
    }

    pub(crate) fn with_gains(config: &ControllerConfig, gains: Gains) -> Self {
        Self {
            set_point: config.set_point,
            gains,
            integral_time: config.integral_time,
            derivative_time: config.derivative_time,
            sample_interval: config.sample_interval,
            derivative_mode: config.derivative_mode,
            history: ErrorHistory::new(gains.history_capacity()),
        }
    }

    /// Run one PID compute step and return the raw control signal.
    pub fn step(&mut self, measurement: f32) -> f32 {
        self.evaluate(measurement).output
    }

    /// Run one PID compute step and return every term.
    pub fn evaluate(&mut self, measurement: f32) -> PidTerms {
        let error = measurement - self.set_point;
        self.history.record(error);

        let integral = integral_term(
            &self.history,
            self.gains.integral_window,
            self.integral_time,
        );
        let derivative = derivative_term(
            &self.history,
            self.gains.derivative_window,
            self.derivative_time,
            self.sample_interval,
            self.derivative_mode,
        );

        PidTerms {
            error,
            integral,
            derivative,
            output: self.gains.kp * (error + integral + derivative),
        }
    }

    /// Forget all past errors.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &ErrorHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PidController {
        PidController::new(&ControllerConfig::default()).unwrap()
    }

    #[test]
    fn zero_error_gives_zero_output() {
        let mut pid = controller();
        for _ in 0..20 {
            let terms = pid.evaluate(65.0);
            assert_eq!(terms.error, 0.0);
            assert_eq!(terms.output, 0.0);
        }
    }

    #[test]
    fn first_step_has_no_derivative() {
        let mut pid = controller();
        let terms = pid.evaluate(70.0);
        assert_eq!(terms.error, 5.0);
        assert_eq!(terms.integral, 1.0);
        assert_eq!(terms.derivative, 0.0);
        assert!((terms.output - 0.4).abs() < 1e-6);
    }

    #[test]
    fn proportional_term_is_one_at_max_temperature() {
        let mut pid = controller();
        let terms = pid.evaluate(80.0);
        assert_eq!(terms.error, 15.0);
        // P alone would be exactly 1; integral pushes it above.
        assert!(terms.output > 1.0);
    }

    #[test]
    fn output_grows_while_integral_fills() {
        let mut pid = controller();
        let mut last = f32::MIN;
        for _ in 0..10 {
            let out = pid.step(70.0);
            assert!(out > last);
            last = out;
        }
        // Window full: error 5, integral 10 * 5 / 5 = 10, derivative 0.
        assert!((pid.step(70.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn history_is_bounded_by_largest_window() {
        let mut pid = controller();
        for i in 0..100 {
            pid.step(60.0 + (i % 7) as f32);
            assert!(pid.history().len() <= 10);
        }
        assert_eq!(pid.history().capacity(), 10);
    }

    #[test]
    #[cfg(feature = "std")]
    fn history_follows_a_long_integral_window() {
        let config = ControllerConfig {
            sample_interval: 0.1,
            integral_time: 10.0,
            ..Default::default()
        };
        let mut pid = PidController::new(&config).unwrap();
        for _ in 0..150 {
            pid.step(70.0);
        }
        assert_eq!(pid.history().len(), 100);
        // 100 samples of error 5 over Ti = 10 s
        let terms = pid.evaluate(70.0);
        assert!((terms.integral - 50.0).abs() < 1e-3);
    }

    #[test]
    fn derivative_reacts_to_rising_temperature() {
        let mut pid = controller();
        pid.step(66.0);
        let terms = pid.evaluate(68.0);
        // Literal mode: Td (1.0) * (3 - 1)
        assert_eq!(terms.derivative, 2.0);
    }

    #[test]
    fn rate_scaled_mode_is_switchable() {
        let config = ControllerConfig {
            derivative_mode: DerivativeMode::RateScaled,
            ..Default::default()
        };
        let mut pid = PidController::new(&config).unwrap();
        pid.step(66.0);
        let terms = pid.evaluate(68.0);
        // (3 - 1) / 0.5 s * 1.0
        assert_eq!(terms.derivative, 4.0);
    }

    #[test]
    fn reset_clears_history() {
        let mut pid = controller();
        pid.step(70.0);
        pid.reset();
        assert!(pid.history().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ControllerConfig {
            max_temperature: 65.0,
            ..Default::default()
        };
        assert!(PidController::new(&config).is_err());
    }
}
