use crate::log::*;
use std::path::PathBuf;

use crate::fan::Fan;
use crate::sysfs::{write_attribute, SysfsError};

/// First PWM controller on a Raspberry Pi.
pub const DEFAULT_PWM_CHIP: &str = "/sys/class/pwm/pwmchip0";

/// Hardware PWM channel routed to a BCM pin.
pub fn channel_for_pin(pin: u8) -> Option<u8> {
    match pin {
        12 | 18 => Some(0),
        13 | 19 => Some(1),
        _ => None,
    }
}

/// Fan on a Linux sysfs PWM channel.
///
/// Frequency and duty cycle are written as nanosecond `period` and
/// `duty_cycle` attributes. The channel is enabled by the first duty cycle
/// write, so the output stays idle until the controller starts driving it.
pub struct SysfsFan {
    channel_dir: PathBuf,
    period_ns: u64,
    duty_ns: u64,
    enabled: bool,
}

impl SysfsFan {
    /// Open the channel for `pin` on `chip`, exporting it if needed.
    pub fn new(chip: impl Into<PathBuf>, pin: u8) -> Result<Self, SysfsError> {
        let chip = chip.into();
        let channel = channel_for_pin(pin).ok_or(SysfsError::UnsupportedPin(pin))?;
        let channel_dir = chip.join(format!("pwm{}", channel));

        if !channel_dir.exists() {
            info!("Exporting PWM channel {} of {}", channel, chip.display());
            write_attribute(&chip.join("export"), channel)?;
        }

        Ok(Self {
            channel_dir,
            period_ns: 0,
            duty_ns: 0,
            enabled: false,
        })
    }

    fn write(&self, attribute: &str, value: impl core::fmt::Display) -> Result<(), SysfsError> {
        write_attribute(&self.channel_dir.join(attribute), value)
    }
}

impl Fan for SysfsFan {
    type Error = SysfsError;

    async fn set_pwm_frequency(&mut self, hz: f32) -> Result<(), Self::Error> {
        let period_ns = (1e9 / hz as f64).round() as u64;

        // The kernel rejects a period shorter than the current duty cycle.
        // Before the first period write that duty cycle is whatever an
        // earlier run left behind.
        if self.period_ns == 0 || self.duty_ns > period_ns {
            self.write("duty_cycle", 0)?;
            self.duty_ns = 0;
        }
        self.write("period", period_ns)?;
        self.period_ns = period_ns;
        debug!("PWM period set to {}ns ({}Hz)", period_ns, hz);
        Ok(())
    }

    async fn set_duty_cycle(&mut self, duty: f32) -> Result<(), Self::Error> {
        if self.period_ns == 0 {
            return Err(SysfsError::PeriodNotSet);
        }
        let duty_ns = (self.period_ns as f64 * duty.clamp(0.0, 1.0) as f64).round() as u64;
        self.write("duty_cycle", duty_ns)?;
        self.duty_ns = duty_ns;

        if !self.enabled {
            self.write("enable", 1)?;
            self.enabled = true;
        }
        Ok(())
    }
}
