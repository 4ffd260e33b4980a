#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub use log;

pub mod clamp;
pub mod config;
pub mod error;
pub mod estimator;
pub mod fan;
pub mod fan_controller;
pub mod history;
pub mod pid;
pub mod temperature_sensor;

#[cfg(feature = "std")]
pub mod fan_sysfs;
#[cfg(feature = "std")]
pub mod sysfs;
#[cfg(feature = "std")]
pub mod temperature_sensor_sysfs;
#[cfg(feature = "std")]
pub mod thermal_model;

pub use config::{ControllerConfig, DerivativeMode};
pub use error::{ConfigError, Error};
pub use fan_controller::{FanController, Status};

pub static VERSION: &str = "v0.1";

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Fired once by whoever owns process lifetime (signal handler, supervisor)
/// to stop the control loop.
pub static SHUTDOWN_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();
