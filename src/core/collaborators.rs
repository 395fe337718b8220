//! Outbound collaborator contracts consumed by the state machine.
//!
//! Every method here is synchronous and treated by the state machine as
//! infallible and instantaneous (no handler ever suspends or retries, see
//! the concurrency notes on [super::state_machine::PowerStateMachine]).
//! Concrete implementations that need to perform real, possibly-async I/O
//! (D-Bus calls, sysfs writes, sensor polling) do so on a spawned task and
//! treat these calls as fire-and-forget.

use super::types::{AlarmId, DisplayPowerChangeReason, ProximityState};
use std::time::Duration;
use tokio::time::Instant;

/// Monotonic clock and named-alarm scheduling.
pub trait Timer: Send {
    /// Current monotonic instant, as seen by the timer.
    fn now(&self) -> Instant;

    /// Schedule an alarm `duration` in the future. Guaranteed to return a
    /// fresh, unique id; `handle_alarm` is invoked with that id at or after
    /// the scheduled instant, unless cancelled first.
    fn schedule_alarm_in(&self, duration: Duration) -> AlarmId;

    /// Cancel a previously scheduled alarm. A no-op for an id that has
    /// already fired or was never scheduled by this timer.
    fn cancel_alarm(&self, id: AlarmId);
}

/// Backlight control.
pub trait BrightnessControl: Send {
    fn set_off_brightness(&self);
    fn set_dim_brightness(&self);
    fn set_normal_brightness(&self);
}

/// Display hardware power control.
pub trait DisplayPowerControl: Send {
    fn turn_on(&self);
    fn turn_off(&self);
}

/// Reports display power transitions to the rest of the system.
pub trait DisplayPowerEventSink: Send {
    fn notify_display_power_on(&self, reason: DisplayPowerChangeReason);
    fn notify_display_power_off(&self, reason: DisplayPowerChangeReason);
}

/// Reports power-button gestures the state machine itself does not act on.
pub trait PowerButtonEventSink: Send {
    fn notify_long_press(&self);
}

/// Proximity sensor: a synchronous current reading plus idempotent
/// subscription control over its event stream.
pub trait ProximitySensor: Send {
    fn proximity_state(&self) -> ProximityState;
    fn enable_proximity_events(&self);
    fn disable_proximity_events(&self);
}

/// The full set of collaborators a [super::state_machine::PowerStateMachine]
/// needs. Implemented once for the real system stack (see `crate::system`)
/// and once for tests (see [super::mock]).
///
/// `'static` lets [PowerStateMachine](super::state_machine::PowerStateMachine)
/// be owned by a [crate::control::daemon::PowerDaemon] actor, which
/// `armaf::Server` requires to be `'static` itself.
pub trait Environment:
    Timer
    + BrightnessControl
    + DisplayPowerControl
    + DisplayPowerEventSink
    + PowerButtonEventSink
    + ProximitySensor
    + 'static
{
}

impl<T> Environment for T where
    T: Timer
        + BrightnessControl
        + DisplayPowerControl
        + DisplayPowerEventSink
        + PowerButtonEventSink
        + ProximitySensor
        + 'static
{
}
