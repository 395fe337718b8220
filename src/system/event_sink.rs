//! Reports display power transitions and power-button gestures, implementing
//! [crate::core::collaborators::DisplayPowerEventSink] and
//! [crate::core::collaborators::PowerButtonEventSink].
//!
//! Logs user-visible transitions at `info` and broadcasts them on a
//! `tokio::sync::broadcast` channel so the D-Bus surface
//! (`control::dbus_controller`) or any future subscriber can observe
//! transitions without the core - or this sink - knowing anything about
//! D-Bus.

use crate::core::collaborators::{DisplayPowerEventSink, PowerButtonEventSink};
use crate::core::types::DisplayPowerChangeReason;
use tokio::sync::broadcast;

/// An event published by [LoggingEventSink].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    DisplayOn(DisplayPowerChangeReason),
    DisplayOff(DisplayPowerChangeReason),
    LongPress,
}

pub struct LoggingEventSink {
    sender: broadcast::Sender<PowerEvent>,
}

impl LoggingEventSink {
    pub fn new() -> LoggingEventSink {
        let (sender, _) = broadcast::channel(16);
        LoggingEventSink { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PowerEvent> {
        self.sender.subscribe()
    }

    fn publish(&self, event: PowerEvent) {
        // No subscribers is the common case (no client is watching) and is
        // not an error.
        let _ = self.sender.send(event);
    }
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPowerEventSink for LoggingEventSink {
    fn notify_display_power_on(&self, reason: DisplayPowerChangeReason) {
        log::info!("display turned on ({:?})", reason);
        self.publish(PowerEvent::DisplayOn(reason));
    }

    fn notify_display_power_off(&self, reason: DisplayPowerChangeReason) {
        log::info!("display turned off ({:?})", reason);
        self.publish(PowerEvent::DisplayOff(reason));
    }
}

impl PowerButtonEventSink for LoggingEventSink {
    fn notify_long_press(&self) {
        log::info!("power button long press detected");
        self.publish(PowerEvent::LongPress);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let sink = LoggingEventSink::new();
        let mut rx = sink.subscribe();
        sink.notify_display_power_on(DisplayPowerChangeReason::Activity);
        assert_eq!(
            rx.recv().await.unwrap(),
            PowerEvent::DisplayOn(DisplayPowerChangeReason::Activity)
        );
    }
}
