use core::fmt::Debug;

/// A source of processor temperature readings, in degrees Celsius.
#[allow(async_fn_in_trait)]
pub trait TemperatureSensor {
    type Error: Debug;

    async fn read_temperature(&mut self) -> Result<f32, Self::Error>;
}
