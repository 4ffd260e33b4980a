use core::fmt;

/// Reason a [`crate::ControllerConfig`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration value is NaN or infinite.
    NonFinite,
    /// Maximum temperature is not above the set-point.
    MaxTemperatureNotAboveSetPoint,
    /// Sample interval is zero or negative.
    NonPositiveSampleInterval,
    /// Integral or derivative time constant is zero or negative.
    NonPositiveTimeConstant,
    /// A time constant is shorter than half a sample interval.
    EmptyWindow,
    /// A window does not fit into the error history. Only reachable with
    /// the fixed-size history of `no_std` builds, or with absurd ratios.
    WindowTooLarge,
    /// Duty-cycle bounds are outside [0, 1] or min exceeds max.
    InvalidDutyCycleRange,
    /// PWM frequency is zero or negative.
    NonPositivePwmFrequency,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonFinite => write!(f, "Configuration value is not finite"),
            ConfigError::MaxTemperatureNotAboveSetPoint => {
                write!(f, "Maximum temperature must be above the set-point")
            }
            ConfigError::NonPositiveSampleInterval => {
                write!(f, "Sample interval must be positive")
            }
            ConfigError::NonPositiveTimeConstant => write!(f, "Time constants must be positive"),
            ConfigError::EmptyWindow => {
                write!(f, "Time constant is shorter than half a sample interval")
            }
            ConfigError::WindowTooLarge => write!(
                f,
                "Window exceeds {} samples",
                crate::history::MAX_WINDOW_SIZE
            ),
            ConfigError::InvalidDutyCycleRange => write!(f, "Invalid duty cycle range"),
            ConfigError::NonPositivePwmFrequency => write!(f, "PWM frequency must be positive"),
        }
    }
}

/// Fan controller error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    SensorUnavailable,
    ActuatorUnavailable,
    ConfigurationInvalid(ConfigError),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::ConfigurationInvalid(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SensorUnavailable => write!(f, "Temperature sensor unavailable"),
            Error::ActuatorUnavailable => write!(f, "Fan actuator unavailable"),
            Error::ConfigurationInvalid(cause) => write!(f, "Invalid configuration: {}", cause),
        }
    }
}
