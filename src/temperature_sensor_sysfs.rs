use std::path::PathBuf;

use crate::sysfs::{read_attribute, SysfsError};
use crate::temperature_sensor::TemperatureSensor;

/// SoC thermal zone on a Raspberry Pi.
pub const DEFAULT_THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Reads a Linux thermal zone, which reports millidegrees Celsius.
pub struct SysfsTemperatureSensor {
    path: PathBuf,
}

impl SysfsTemperatureSensor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read_blocking(&self) -> Result<f32, SysfsError> {
        let content = read_attribute(&self.path)?;
        let millidegrees: i32 = content
            .parse()
            .map_err(|_| SysfsError::Parse(self.path.clone(), content))?;
        Ok(millidegrees as f32 / 1000.0)
    }
}

impl Default for SysfsTemperatureSensor {
    fn default() -> Self {
        Self::new(DEFAULT_THERMAL_ZONE)
    }
}

impl TemperatureSensor for SysfsTemperatureSensor {
    type Error = SysfsError;

    async fn read_temperature(&mut self) -> Result<f32, Self::Error> {
        self.read_blocking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysfs::scratch_dir;
    use embassy_futures::block_on;
    use std::fs;

    #[test]
    fn reads_millidegrees() {
        let dir = scratch_dir("thermal-ok");
        let path = dir.join("temp");
        fs::write(&path, "52300\n").unwrap();

        let mut sensor = SysfsTemperatureSensor::new(&path);
        let temperature = block_on(sensor.read_temperature()).unwrap();
        assert!((temperature - 52.3).abs() < 1e-4);
    }

    #[test]
    fn negative_temperatures() {
        let dir = scratch_dir("thermal-negative");
        let path = dir.join("temp");
        fs::write(&path, "-1500").unwrap();

        let sensor = SysfsTemperatureSensor::new(&path);
        assert_eq!(sensor.read_blocking().unwrap(), -1.5);
    }

    #[test]
    fn missing_zone_is_an_error() {
        let dir = scratch_dir("thermal-missing");
        let sensor = SysfsTemperatureSensor::new(dir.join("nope"));
        assert!(matches!(sensor.read_blocking(), Err(SysfsError::Io(..))));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = scratch_dir("thermal-garbage");
        let path = dir.join("temp");
        fs::write(&path, "hot").unwrap();

        let sensor = SysfsTemperatureSensor::new(&path);
        assert!(matches!(sensor.read_blocking(), Err(SysfsError::Parse(..))));
    }
}
