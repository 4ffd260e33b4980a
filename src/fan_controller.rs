use crate::log::*;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use serde::Serialize;

use crate::{
    clamp::DutyCycleClamp,
    config::ControllerConfig,
    error::Error,
    fan::Fan,
    pid::{PidController, PidTerms},
    temperature_sensor::TemperatureSensor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Running,
    Stopped,
}

/// One line of the per-tick debug log.
#[derive(Debug, Serialize)]
struct TickReport {
    tick: u32,
    temperature: f32,
    terms: PidTerms,
    duty_cycle: f32,
}

/// Closed-loop fan regulator: sample, compute, actuate, wait.
///
/// Owns the PID state exclusively. [`FanController::run`] consumes the
/// controller, so a stopped controller can never be restarted.
pub struct FanController {
    config: ControllerConfig,
    pid: PidController,
    clamp: DutyCycleClamp,
    ticks: u32,
}

impl FanController {
    /// Validate `config` and build a controller. Nothing touches the
    /// hardware until [`FanController::run`].
    pub fn new(config: ControllerConfig) -> Result<Self, Error> {
        let gains = config.validate()?;
        Ok(Self {
            pid: PidController::with_gains(&config, gains),
            clamp: DutyCycleClamp::new(config.min_duty_cycle, config.max_duty_cycle),
            config,
            ticks: 0,
        })
    }

    /// Number of completed control steps.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Run the control loop until `shutdown` fires or the hardware fails.
    ///
    /// The fan is switched off on every exit path. Cancellation is a clean
    /// stop and returns `Ok(())`; a sensor or actuator failure is returned
    /// after the fan has been switched off.
    pub async fn run<S, F, D, M>(
        mut self,
        sensor: &mut S,
        fan: &mut F,
        delay: &mut D,
        shutdown: &Signal<M, ()>,
    ) -> Result<(), Error>
    where
        S: TemperatureSensor,
        F: Fan,
        D: DelayNs,
        M: RawMutex,
    {
        self.log_config();

        let result = match self.enter_running_state(fan).await {
            Ok(()) => self.running(sensor, fan, delay, shutdown).await,
            Err(err) => Err(err),
        };

        self.enter_stopped_state(fan).await;
        result
    }

    async fn enter_running_state<F: Fan>(&mut self, fan: &mut F) -> Result<(), Error> {
        fan.set_pwm_frequency(self.config.pwm_frequency)
            .await
            .map_err(actuator_error)?;
        fan.set_duty_cycle(0.0).await.map_err(actuator_error)?;
        info!(
            "Fan controller running, set point {}°C, sampling every {}s",
            self.config.set_point, self.config.sample_interval
        );
        Ok(())
    }

    async fn running<S, F, D, M>(
        &mut self,
        sensor: &mut S,
        fan: &mut F,
        delay: &mut D,
        shutdown: &Signal<M, ()>,
    ) -> Result<(), Error>
    where
        S: TemperatureSensor,
        F: Fan,
        D: DelayNs,
        M: RawMutex,
    {
        let interval_us = self.config.sample_interval_us();
        let mut status = Status::Running;

        while status == Status::Running {
            if shutdown.signaled() {
                info!("Shutdown requested");
                break;
            }

            let temperature = sensor.read_temperature().await.map_err(|err| {
                error!("Temperature read failed: {:?}", err);
                Error::SensorUnavailable
            })?;

            let duty_cycle = self.tick(temperature);
            fan.set_duty_cycle(duty_cycle)
                .await
                .map_err(actuator_error)?;

            status = match select(delay.delay_us(interval_us), shutdown.wait()).await {
                Either::First(()) => Status::Running,
                Either::Second(()) => {
                    info!("Shutdown requested");
                    Status::Stopped
                }
            };
        }
        Ok(())
    }

    /// Best-effort: a failing fan is logged, never escalated.
    async fn enter_stopped_state<F: Fan>(&mut self, fan: &mut F) {
        info!("Switching fan off after {} ticks", self.ticks);
        if let Err(err) = fan.set_duty_cycle(0.0).await {
            error!("Could not switch fan off: {:?}", err);
        }
    }

    /// One control step: PID, then clamp. Returns the duty cycle to apply.
    pub fn tick(&mut self, temperature: f32) -> f32 {
        let terms = self.pid.evaluate(temperature);
        let duty_cycle = self.clamp.apply(terms.output);
        self.ticks = self.ticks.wrapping_add(1);

        if log_enabled!(Level::Debug) {
            let report = TickReport {
                tick: self.ticks,
                temperature,
                terms,
                duty_cycle,
            };
            match serde_json_core::to_string::<_, 256>(&report) {
                Ok(json) => debug!("{}", json.as_str()),
                Err(_) => debug!("{:?}", report),
            }
        }

        duty_cycle
    }

    fn log_config(&self) {
        match serde_json_core::to_string::<_, 512>(&self.config) {
            Ok(json) => info!("Configuration: {}", json.as_str()),
            Err(_) => info!("Configuration: {:?}", self.config),
        }
    }
}

fn actuator_error<E: core::fmt::Debug>(err: E) -> Error {
    error!("Fan write failed: {:?}", err);
    Error::ActuatorUnavailable
}
