use core::fmt::Debug;

/// PWM output driving the cooling fan.
#[allow(async_fn_in_trait)]
pub trait Fan {
    type Error: Debug;

    /// Set the PWM base frequency. Called once before the first duty cycle.
    async fn set_pwm_frequency(&mut self, hz: f32) -> Result<(), Self::Error>;

    /// Set the duty cycle, `0.0` (off) to `1.0` (fully on).
    async fn set_duty_cycle(&mut self, duty: f32) -> Result<(), Self::Error>;
}
