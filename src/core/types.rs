//! Data types shared by the state machine and its collaborators.

use std::time::Duration;

/// Current power state of the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPowerMode {
    Off,
    On,
}

/// Snapshot of [DisplayPowerMode] taken when the power button is pressed.
///
/// `Unknown` models "no recorded value", distinct from either real mode, and
/// is only ever observed between a release and the next press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PressSnapshot {
    Unknown,
    Off,
    On,
}

impl From<DisplayPowerMode> for PressSnapshot {
    fn from(mode: DisplayPowerMode) -> Self {
        match mode {
            DisplayPowerMode::Off => PressSnapshot::Off,
            DisplayPowerMode::On => PressSnapshot::On,
        }
    }
}

/// Tag accompanying every display on/off notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPowerChangeReason {
    Unknown,
    PowerButton,
    Activity,
    Proximity,
    Notification,
    Call,
    CallDone,
}

/// State reported by the proximity sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityState {
    Near,
    Far,
}

/// Opaque handle for a scheduled alarm.
///
/// "No alarm armed" is modelled with `Option<AlarmId>` rather than a
/// reserved sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlarmId(pub u64);

/// Independent veto sources over the inactivity-driven display-off.
///
/// The overall allowance is the logical AND of every source below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InactivityTimeoutAllowance {
    Client,
    Notification,
}

const ALLOWANCE_COUNT: usize = 2;

impl InactivityTimeoutAllowance {
    fn index(self) -> usize {
        match self {
            InactivityTimeoutAllowance::Client => 0,
            InactivityTimeoutAllowance::Notification => 1,
        }
    }
}

/// A fixed-size map from [InactivityTimeoutAllowance] to its current value.
///
/// Initialised to all-true ("allowed"). Deliberately avoids any dynamic
/// growth - the set of allowance sources is closed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AllowanceVector([bool; ALLOWANCE_COUNT]);

impl AllowanceVector {
    pub(crate) fn new() -> Self {
        AllowanceVector([true; ALLOWANCE_COUNT])
    }

    pub(crate) fn set(&mut self, source: InactivityTimeoutAllowance, allowed: bool) {
        self.0[source.index()] = allowed;
    }

    pub(crate) fn all_allowed(&self) -> bool {
        self.0.iter().all(|allowed| *allowed)
    }
}

/// The normal inactivity-off timeout, which can be disabled entirely at
/// runtime through [crate::core::state_machine::PowerStateMachine::handle_set_inactivity_timeout].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InactivityTimeout {
    Finite(Duration),
    Infinite,
}

impl InactivityTimeout {
    pub(crate) fn finite(self) -> Option<Duration> {
        match self {
            InactivityTimeout::Finite(d) => Some(d),
            InactivityTimeout::Infinite => None,
        }
    }
}
