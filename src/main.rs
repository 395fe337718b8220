#![warn(missing_docs)]

//! Entry point for the `dispowerd` binary.

use clap::Parser;
use dispowerd::config::Config;
use dispowerd::control::daemon::PowerDaemon;
use dispowerd::control::dbus_controller::{BusType, DisplayPowerDBusController};
use dispowerd::core::state_machine::PowerStateMachine;
use dispowerd::core::types::{InactivityTimeout, ProximityState};
use dispowerd::system::brightness::SysfsBrightness;
use dispowerd::system::display_power::DpmsDisplayPower;
use dispowerd::system::event_sink::LoggingEventSink;
use dispowerd::system::proximity::EvdevProximity;
use dispowerd::system::SystemEnvironment;
use dispowerd::timer::TokioTimer;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Display power state machine daemon")]
struct Args {
    /// Path to the daemon's TOML configuration file.
    #[clap(
        long,
        env = "DISPOWERD_CONFIG_PATH",
        default_value = "/etc/dispowerd/config.toml"
    )]
    config: PathBuf,

    /// Run on the session bus instead of the system bus.
    #[clap(long)]
    session_bus: bool,
}

fn initialize_logging() {
    flexi_logger::Logger::try_with_env_or_str("info")
        .expect("invalid RUST_LOG filter")
        .start()
        .expect("failed to start logger");
    log_panics::init();
}

async fn load_config(path: &PathBuf) -> anyhow::Result<Config> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(Config::from_toml_str(&contents)?)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    initialize_logging();

    let config = load_config(&args.config).await.unwrap_or_else(|e| {
        log::warn!(
            "couldn't read configuration from {:?} ({}), falling back to defaults",
            args.config,
            e
        );
        Config::default_for_testing()
    });
    log::info!("starting with configuration: {:?}", config);

    let (alarm_tx, alarm_rx) = mpsc::unbounded_channel();
    let timer = Arc::new(TokioTimer::new(alarm_tx));

    let brightness = SysfsBrightness::new(&config.backlight_device).unwrap_or_else(|e| {
        panic!(
            "couldn't initialize backlight device {:?}: {}",
            config.backlight_device, e
        )
    });
    let display_power = DpmsDisplayPower::new();
    let event_sink = Arc::new(LoggingEventSink::new());

    // The proximity driver itself (an evdev or sensor-HAL poller) lives
    // outside this crate; the sender just keeps the watch channel alive
    // until a real driver is wired in.
    let (_proximity_tx, proximity_rx) = watch::channel(ProximityState::Far);
    let proximity = EvdevProximity::new(proximity_rx);

    let environment = SystemEnvironment::new(
        timer.clone(),
        brightness,
        display_power,
        event_sink.clone(),
        proximity,
    );

    let state_machine = PowerStateMachine::new(
        environment,
        config.state_machine.fixed,
        config.state_machine.initial_normal_display_off_timeout,
    );

    let daemon = PowerDaemon::new(state_machine);
    let daemon_port = daemon
        .spawn(alarm_rx)
        .await
        .expect("power daemon failed to start");

    if let InactivityTimeout::Infinite = config.state_machine.initial_normal_display_off_timeout {
        log::info!("starting with inactivity timeout disabled");
    }

    let bus_type = if args.session_bus {
        BusType::Session
    } else {
        BusType::System
    };
    let dbus_controller = DisplayPowerDBusController::new(
        "/org/dispowerd/Manager",
        "org.dispowerd.Manager",
        bus_type,
        daemon_port.clone(),
    );
    let dbus_handle = match dbus_controller.spawn().await {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::error!("couldn't start D-Bus API: {}", e);
            None
        }
    };

    tokio::signal::ctrl_c().await.expect("signal wait failed");
    log::info!("shutting down");

    if let Some(handle) = dbus_handle {
        handle.await_shutdown().await;
    }
    daemon_port.await_shutdown().await;
}
