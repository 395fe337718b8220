//! Concrete, real-world backends for the collaborators the state machine
//! needs (`crate::core::collaborators`), plus [SystemEnvironment], which
//! bundles them all into one [crate::core::collaborators::Environment].

pub mod brightness;
pub mod display_power;
pub mod event_sink;
pub mod proximity;

use crate::core::collaborators::{
    BrightnessControl, DisplayPowerControl, DisplayPowerEventSink, PowerButtonEventSink,
    ProximitySensor, Timer,
};
use crate::core::types::{AlarmId, DisplayPowerChangeReason, ProximityState};
use crate::timer::TokioTimer;
use brightness::SysfsBrightness;
use display_power::DpmsDisplayPower;
use event_sink::LoggingEventSink;
use proximity::EvdevProximity;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// The real system's [crate::core::collaborators::Environment], bundling
/// one concrete backend per collaborator trait.
pub struct SystemEnvironment {
    timer: Arc<TokioTimer>,
    brightness: SysfsBrightness,
    display_power: DpmsDisplayPower,
    event_sink: Arc<LoggingEventSink>,
    proximity: EvdevProximity,
}

impl SystemEnvironment {
    pub fn new(
        timer: Arc<TokioTimer>,
        brightness: SysfsBrightness,
        display_power: DpmsDisplayPower,
        event_sink: Arc<LoggingEventSink>,
        proximity: EvdevProximity,
    ) -> SystemEnvironment {
        SystemEnvironment {
            timer,
            brightness,
            display_power,
            event_sink,
            proximity,
        }
    }

    pub fn event_sink(&self) -> Arc<LoggingEventSink> {
        self.event_sink.clone()
    }
}

impl Timer for SystemEnvironment {
    fn now(&self) -> Instant {
        self.timer.now()
    }
    fn schedule_alarm_in(&self, duration: Duration) -> AlarmId {
        self.timer.schedule_alarm_in(duration)
    }
    fn cancel_alarm(&self, id: AlarmId) {
        self.timer.cancel_alarm(id)
    }
}

impl BrightnessControl for SystemEnvironment {
    fn set_off_brightness(&self) {
        self.brightness.set_off_brightness()
    }
    fn set_dim_brightness(&self) {
        self.brightness.set_dim_brightness()
    }
    fn set_normal_brightness(&self) {
        self.brightness.set_normal_brightness()
    }
}

impl DisplayPowerControl for SystemEnvironment {
    fn turn_on(&self) {
        self.display_power.turn_on()
    }
    fn turn_off(&self) {
        self.display_power.turn_off()
    }
}

impl DisplayPowerEventSink for SystemEnvironment {
    fn notify_display_power_on(&self, reason: DisplayPowerChangeReason) {
        self.event_sink.notify_display_power_on(reason)
    }
    fn notify_display_power_off(&self, reason: DisplayPowerChangeReason) {
        self.event_sink.notify_display_power_off(reason)
    }
}

impl PowerButtonEventSink for SystemEnvironment {
    fn notify_long_press(&self) {
        self.event_sink.notify_long_press()
    }
}

impl ProximitySensor for SystemEnvironment {
    fn proximity_state(&self) -> ProximityState {
        self.proximity.proximity_state()
    }
    fn enable_proximity_events(&self) {
        self.proximity.enable_proximity_events()
    }
    fn disable_proximity_events(&self) {
        self.proximity.disable_proximity_events()
    }
}
