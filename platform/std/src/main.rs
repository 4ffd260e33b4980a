use core::cell::RefCell;
use std::path::PathBuf;
use std::process;
use std::thread;

use clap::Parser;
use embassy_executor::Executor;
use embassy_time::Delay;
use log::*;
use nix::sys::signal::{SigSet, Signal as UnixSignal};
use static_cell::StaticCell;

use fan_controller::fan_sysfs::{SysfsFan, DEFAULT_PWM_CHIP};
use fan_controller::temperature_sensor_sysfs::{SysfsTemperatureSensor, DEFAULT_THERMAL_ZONE};
use fan_controller::thermal_model::{SimulatedFan, SimulatedSensor, ThermalModel};
use fan_controller::{ControllerConfig, DerivativeMode, Error, FanController, SHUTDOWN_SIGNAL};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum DerivativeModeArg {
    Literal,
    RateScaled,
}

/// Regulate the processor fan with a windowed PID loop.
#[derive(Debug, Parser)]
#[clap(version, long_about = None)]
struct Args {
    /// Desired processor temperature in °C
    #[clap(long, default_value_t = 65.0)]
    set_point: f32,

    /// Temperature at which the proportional term alone drives the fan fully on
    #[clap(long, default_value_t = 80.0)]
    max_temperature: f32,

    /// Seconds between two samples
    #[clap(long, default_value_t = 0.5)]
    sample_interval: f32,

    /// Integration time in seconds
    #[clap(long, default_value_t = 5.0)]
    integral_time: f32,

    /// Derivative time in seconds
    #[clap(long, default_value_t = 1.0)]
    derivative_time: f32,

    /// Lowest duty cycle that still starts the fan
    #[clap(long, default_value_t = 0.4)]
    min_duty_cycle: f32,

    /// Duty cycle above which the fan runs fully on
    #[clap(long, default_value_t = 1.0)]
    max_duty_cycle: f32,

    /// PWM frequency in Hz with the least fan whine
    #[clap(long, default_value_t = 10.0)]
    pwm_frequency: f32,

    /// PWM output pin (BCM numbering)
    #[clap(long, default_value_t = 18)]
    pin: u8,

    /// How the derivative term scales with the derivative time
    #[clap(long, value_enum, default_value = "literal")]
    derivative_mode: DerivativeModeArg,

    /// Run against a simulated processor instead of the hardware
    #[clap(long)]
    simulate: bool,

    /// Thermal zone to read the processor temperature from
    #[clap(long, default_value = DEFAULT_THERMAL_ZONE)]
    thermal_zone: PathBuf,

    /// sysfs PWM chip driving the fan
    #[clap(long, default_value = DEFAULT_PWM_CHIP)]
    pwm_chip: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            set_point: self.set_point,
            max_temperature: self.max_temperature,
            sample_interval: self.sample_interval,
            integral_time: self.integral_time,
            derivative_time: self.derivative_time,
            min_duty_cycle: self.min_duty_cycle,
            max_duty_cycle: self.max_duty_cycle,
            pwm_frequency: self.pwm_frequency,
            pwm_pin: self.pin,
            derivative_mode: match self.derivative_mode {
                DerivativeModeArg::Literal => DerivativeMode::Literal,
                DerivativeModeArg::RateScaled => DerivativeMode::RateScaled,
            },
        }
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalAction {
    /// Ask the control loop to switch the fan off and return.
    Stop,
    /// The loop did not react to an earlier request, give up on it.
    Exit,
}

fn signal_action(previous: usize) -> SignalAction {
    match previous {
        0 => SignalAction::Stop,
        _ => SignalAction::Exit,
    }
}

/// Block SIGINT and SIGTERM for this thread and every thread spawned after
/// it, and turn their delivery into a shutdown request. A second signal
/// terminates the process even if the loop is stuck in I/O.
fn watch_signals() -> nix::Result<()> {
    let mut mask = SigSet::empty();
    mask.add(UnixSignal::SIGINT);
    mask.add(UnixSignal::SIGTERM);
    mask.thread_block()?;

    thread::spawn(move || {
        let mut received = 0;
        loop {
            let signal = match mask.wait() {
                Ok(signal) => signal,
                Err(err) => {
                    error!("Waiting for signals failed: {}", err);
                    return;
                }
            };

            match signal_action(received) {
                SignalAction::Stop => {
                    info!("Received {:?}, stopping", signal);
                    SHUTDOWN_SIGNAL.signal(());
                }
                SignalAction::Exit => {
                    warn!("Received {:?} again, exiting without switching the fan off", signal);
                    process::exit(1);
                }
            }
            received += 1;
        }
    });
    Ok(())
}

#[embassy_executor::task]
async fn controller_task(args: Args) {
    let config = args.controller_config();
    let sample_interval = config.sample_interval;
    let pin = config.pwm_pin;

    let controller = match FanController::new(config) {
        Ok(controller) => controller,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    let result = if args.simulate {
        info!("Running against simulated processor");
        let model = RefCell::new(ThermalModel::new(45.0, sample_interval));
        controller
            .run(
                &mut SimulatedSensor::new(&model),
                &mut SimulatedFan::new(&model),
                &mut Delay,
                &SHUTDOWN_SIGNAL,
            )
            .await
    } else {
        let mut sensor = SysfsTemperatureSensor::new(&args.thermal_zone);
        match SysfsFan::new(&args.pwm_chip, pin) {
            Ok(mut fan) => {
                controller
                    .run(&mut sensor, &mut fan, &mut Delay, &SHUTDOWN_SIGNAL)
                    .await
            }
            Err(err) => {
                error!("Cannot open PWM output: {}", err);
                Err(Error::ActuatorUnavailable)
            }
        }
    };

    match result {
        Ok(()) => {
            info!("Fan controller stopped");
            process::exit(0);
        }
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    }
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(args.log_level())
        .format_timestamp_nanos()
        .init();

    info!("Fan controller {}", fan_controller::VERSION);

    // Before the executor and its timer thread exist, so no thread is left
    // with the default (terminating) disposition.
    if let Err(err) = watch_signals() {
        error!("Cannot install signal handling: {}", err);
        process::exit(1);
    }

    let executor = EXECUTOR.init(Executor::new());
    executor.run(move |spawner| {
        spawner.spawn(controller_task(args).unwrap());
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_signal_stops_second_exits() {
        assert_eq!(signal_action(0), SignalAction::Stop);
        assert_eq!(signal_action(1), SignalAction::Exit);
        assert_eq!(signal_action(5), SignalAction::Exit);
    }

    #[test]
    fn defaults_match_reference_tuning() {
        let args = Args::parse_from(["fan-controller"]);
        let config = args.controller_config();
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(args.log_level(), LevelFilter::Info);
    }

    #[test]
    fn short_sample_interval_is_accepted() {
        let args = Args::parse_from(["fan-controller", "--sample-interval", "0.01"]);
        assert!(FanController::new(args.controller_config()).is_ok());
    }
}
