//! Plain-text attribute access for Linux sysfs drivers.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// sysfs driver error
#[derive(Debug)]
pub enum SysfsError {
    Io(PathBuf, io::Error),
    Parse(PathBuf, String),
    UnsupportedPin(u8),
    PeriodNotSet,
}

impl fmt::Display for SysfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SysfsError::Io(path, err) => write!(f, "{}: {}", path.display(), err),
            SysfsError::Parse(path, content) => {
                write!(f, "{}: unexpected content {:?}", path.display(), content)
            }
            SysfsError::UnsupportedPin(pin) => write!(f, "No PWM channel on pin {}", pin),
            SysfsError::PeriodNotSet => write!(f, "PWM frequency not set"),
        }
    }
}

impl std::error::Error for SysfsError {}

pub(crate) fn read_attribute(path: &Path) -> Result<String, SysfsError> {
    fs::read_to_string(path)
        .map(|s| s.trim().into())
        .map_err(|err| SysfsError::Io(path.to_path_buf(), err))
}

pub(crate) fn write_attribute(path: &Path, value: impl fmt::Display) -> Result<(), SysfsError> {
    fs::write(path, format!("{}", value)).map_err(|err| SysfsError::Io(path.to_path_buf(), err))
}

/// Scratch directory for sysfs driver tests.
#[cfg(test)]
pub(crate) fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "fan-controller-{}-{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}
