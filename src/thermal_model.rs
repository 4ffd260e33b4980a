//! Simulated processor and fan for running the controller without hardware.
//!
//! A first-order thermal plant: the SoC adds a constant amount of heat per
//! second and loses heat to ambient proportionally to the temperature
//! difference (Newton's law of cooling). The fan multiplies the loss.

use core::cell::RefCell;
use core::convert::Infallible;

use crate::fan::Fan;
use crate::temperature_sensor::TemperatureSensor;

#[derive(Debug, Clone)]
pub struct ThermalModel {
    temperature: f32,
    ambient: f32,
    /// Degrees per second added by the processor load.
    heating_rate: f32,
    /// Fraction of the difference to ambient lost per second, fan off.
    loss_coefficient: f32,
    /// Extra loss factor at full fan speed.
    fan_boost: f32,
    duty_cycle: f32,
    pwm_frequency: f32,
    /// Seconds simulated per reading.
    time_step: f32,
}

impl ThermalModel {
    /// Plant that settles around 85°C without a fan and 37°C with full fan.
    pub fn new(initial_temperature: f32, time_step: f32) -> Self {
        Self {
            temperature: initial_temperature,
            ambient: 25.0,
            heating_rate: 1.2,
            loss_coefficient: 0.02,
            fan_boost: 4.0,
            duty_cycle: 0.0,
            pwm_frequency: 0.0,
            time_step,
        }
    }

    pub fn with_ambient(mut self, ambient: f32) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn duty_cycle(&self) -> f32 {
        self.duty_cycle
    }

    pub fn pwm_frequency(&self) -> f32 {
        self.pwm_frequency
    }

    /// Advance the simulation by one time step.
    pub fn advance(&mut self) {
        let difference = self.temperature - self.ambient;
        let loss = self.loss_coefficient * difference * (1.0 + self.fan_boost * self.duty_cycle);
        self.temperature += (self.heating_rate - loss) * self.time_step;

        if self.temperature < self.ambient {
            self.temperature = self.ambient;
        }
    }
}

/// Sensor half of a shared [`ThermalModel`]. Every reading advances time.
pub struct SimulatedSensor<'a> {
    model: &'a RefCell<ThermalModel>,
}

impl<'a> SimulatedSensor<'a> {
    pub fn new(model: &'a RefCell<ThermalModel>) -> Self {
        Self { model }
    }
}

impl TemperatureSensor for SimulatedSensor<'_> {
    type Error = Infallible;

    async fn read_temperature(&mut self) -> Result<f32, Self::Error> {
        let mut model = self.model.borrow_mut();
        model.advance();
        Ok(model.temperature)
    }
}

/// Fan half of a shared [`ThermalModel`].
pub struct SimulatedFan<'a> {
    model: &'a RefCell<ThermalModel>,
}

impl<'a> SimulatedFan<'a> {
    pub fn new(model: &'a RefCell<ThermalModel>) -> Self {
        Self { model }
    }
}

impl Fan for SimulatedFan<'_> {
    type Error = Infallible;

    async fn set_pwm_frequency(&mut self, hz: f32) -> Result<(), Self::Error> {
        self.model.borrow_mut().pwm_frequency = hz;
        Ok(())
    }

    async fn set_duty_cycle(&mut self, duty: f32) -> Result<(), Self::Error> {
        self.model.borrow_mut().duty_cycle = duty;
        Ok(())
    }
}
