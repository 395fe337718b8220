//! A recording, in-memory [Environment] implementation for exercising
//! [super::state_machine::PowerStateMachine] and [crate::control::daemon::PowerDaemon]
//! without any real collaborators.

use super::collaborators::{
    BrightnessControl, DisplayPowerControl, DisplayPowerEventSink, PowerButtonEventSink,
    ProximitySensor, Timer,
};
use super::types::{AlarmId, DisplayPowerChangeReason, ProximityState};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// One observed call into a collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    SetOffBrightness,
    SetDimBrightness,
    SetNormalBrightness,
    DisplayOn,
    DisplayOff,
    NotifyDisplayPowerOn(DisplayPowerChangeReason),
    NotifyDisplayPowerOff(DisplayPowerChangeReason),
    NotifyLongPress,
    EnableProximityEvents,
    DisableProximityEvents,
}

#[derive(Debug, Default)]
struct Inner {
    calls: Vec<RecordedCall>,
    next_alarm_id: u64,
    cancelled: Vec<AlarmId>,
    proximity_state: Option<ProximityState>,
}

/// Test double implementing every collaborator trait the state machine
/// needs. Cheap to clone - all state lives behind a shared [Arc]/[Mutex], so
/// it stays `Send` and can back a [PowerDaemon](crate::control::daemon::PowerDaemon)
/// actor the same way a real [Environment] would.
#[derive(Clone)]
pub struct MockEnvironment {
    inner: Arc<Mutex<Inner>>,
}

impl MockEnvironment {
    pub fn new(initial_proximity: ProximityState) -> Self {
        MockEnvironment {
            inner: Arc::new(Mutex::new(Inner {
                calls: Vec::new(),
                next_alarm_id: 1,
                cancelled: Vec::new(),
                proximity_state: Some(initial_proximity),
            })),
        }
    }

    pub fn set_proximity(&self, state: ProximityState) {
        self.inner.lock().unwrap().proximity_state = Some(state);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn take_calls(&self) -> Vec<RecordedCall> {
        std::mem::take(&mut self.inner.lock().unwrap().calls)
    }

    pub fn was_cancelled(&self, id: AlarmId) -> bool {
        self.inner.lock().unwrap().cancelled.contains(&id)
    }

    fn record(&self, call: RecordedCall) {
        self.inner.lock().unwrap().calls.push(call);
    }
}

impl Timer for MockEnvironment {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn schedule_alarm_in(&self, _duration: Duration) -> AlarmId {
        let mut inner = self.inner.lock().unwrap();
        let id = AlarmId(inner.next_alarm_id);
        inner.next_alarm_id += 1;
        id
    }

    fn cancel_alarm(&self, id: AlarmId) {
        self.inner.lock().unwrap().cancelled.push(id);
    }
}

impl BrightnessControl for MockEnvironment {
    fn set_off_brightness(&self) {
        self.record(RecordedCall::SetOffBrightness);
    }

    fn set_dim_brightness(&self) {
        self.record(RecordedCall::SetDimBrightness);
    }

    fn set_normal_brightness(&self) {
        self.record(RecordedCall::SetNormalBrightness);
    }
}

impl DisplayPowerControl for MockEnvironment {
    fn turn_on(&self) {
        self.record(RecordedCall::DisplayOn);
    }

    fn turn_off(&self) {
        self.record(RecordedCall::DisplayOff);
    }
}

impl DisplayPowerEventSink for MockEnvironment {
    fn notify_display_power_on(&self, reason: DisplayPowerChangeReason) {
        self.record(RecordedCall::NotifyDisplayPowerOn(reason));
    }

    fn notify_display_power_off(&self, reason: DisplayPowerChangeReason) {
        self.record(RecordedCall::NotifyDisplayPowerOff(reason));
    }
}

impl PowerButtonEventSink for MockEnvironment {
    fn notify_long_press(&self) {
        self.record(RecordedCall::NotifyLongPress);
    }
}

impl ProximitySensor for MockEnvironment {
    fn proximity_state(&self) -> ProximityState {
        self.inner
            .lock()
            .unwrap()
            .proximity_state
            .expect("proximity state requested before it was set")
    }

    fn enable_proximity_events(&self) {
        self.record(RecordedCall::EnableProximityEvents);
    }

    fn disable_proximity_events(&self) {
        self.record(RecordedCall::DisableProximityEvents);
    }
}
