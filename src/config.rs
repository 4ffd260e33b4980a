//! Controller configuration and the gains derived from it.
//!
//! The configuration is fixed for the lifetime of the process. It is
//! validated once by [`ControllerConfig::validate`], which also derives
//! the proportional gain and the estimator window sizes.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::history::MAX_WINDOW_SIZE;

/// How the derivative estimator scales the finite difference over its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DerivativeMode {
    /// `Td * (e_newest - e_oldest)`. The gain grows with the time constant.
    #[default]
    Literal,
    /// `Td * (e_newest - e_oldest) / window_span`, i.e. `Td * de/dt`.
    RateScaled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Desired temperature in degrees Celsius.
    pub set_point: f32,
    /// Temperature at which the proportional term alone reaches full output.
    pub max_temperature: f32,
    /// Seconds between two samples.
    pub sample_interval: f32,
    /// Integration time in seconds.
    pub integral_time: f32,
    /// Derivative time in seconds.
    pub derivative_time: f32,
    /// Lowest duty cycle that still starts the fan. Anything below is 0.
    pub min_duty_cycle: f32,
    /// Duty cycle above which the fan is driven fully on.
    pub max_duty_cycle: f32,
    /// PWM frequency in Hz, tuned for the least fan whine.
    pub pwm_frequency: f32,
    /// Output pin, BCM numbering.
    pub pwm_pin: u8,
    pub derivative_mode: DerivativeMode,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            set_point: 65.0,
            max_temperature: 80.0,
            sample_interval: 0.5,
            integral_time: 5.0,
            derivative_time: 1.0,
            min_duty_cycle: 0.4,
            max_duty_cycle: 1.0,
            pwm_frequency: 10.0,
            pwm_pin: 18,
            derivative_mode: DerivativeMode::Literal,
        }
    }
}

/// Constants derived from a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    /// `1 / (max_temperature - set_point)`
    pub kp: f32,
    pub integral_window: usize,
    pub derivative_window: usize,
}

impl Gains {
    /// Number of samples the error history has to retain.
    pub fn history_capacity(&self) -> usize {
        self.integral_window.max(self.derivative_window)
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<Gains, ConfigError> {
        let values = [
            self.set_point,
            self.max_temperature,
            self.sample_interval,
            self.integral_time,
            self.derivative_time,
            self.min_duty_cycle,
            self.max_duty_cycle,
            self.pwm_frequency,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite);
        }

        if self.max_temperature <= self.set_point {
            return Err(ConfigError::MaxTemperatureNotAboveSetPoint);
        }
        if self.sample_interval <= 0.0 {
            return Err(ConfigError::NonPositiveSampleInterval);
        }
        if self.integral_time <= 0.0 || self.derivative_time <= 0.0 {
            return Err(ConfigError::NonPositiveTimeConstant);
        }
        if !(0.0..=1.0).contains(&self.min_duty_cycle)
            || !(0.0..=1.0).contains(&self.max_duty_cycle)
            || self.min_duty_cycle > self.max_duty_cycle
        {
            return Err(ConfigError::InvalidDutyCycleRange);
        }
        if self.pwm_frequency <= 0.0 {
            return Err(ConfigError::NonPositivePwmFrequency);
        }

        let integral_window = window_size(self.integral_time, self.sample_interval)?;
        let derivative_window = window_size(self.derivative_time, self.sample_interval)?;

        Ok(Gains {
            kp: 1.0 / (self.max_temperature - self.set_point),
            integral_window,
            derivative_window,
        })
    }

    /// Sample interval in whole microseconds.
    pub fn sample_interval_us(&self) -> u32 {
        let us = self.sample_interval * 1_000_000.0;
        if us >= u32::MAX as f32 {
            u32::MAX
        } else {
            us as u32
        }
    }
}

/// `round(time_constant / interval)`, bounded by [`MAX_WINDOW_SIZE`].
fn window_size(time_constant: f32, interval: f32) -> Result<usize, ConfigError> {
    let ratio = time_constant / interval;
    if !ratio.is_finite() || ratio >= (MAX_WINDOW_SIZE as f32 + 0.5) {
        return Err(ConfigError::WindowTooLarge);
    }
    // ratio is positive, so adding one half and truncating rounds half up
    let size = (ratio + 0.5) as usize;
    if size == 0 {
        return Err(ConfigError::EmptyWindow);
    }
    Ok(size)
}
