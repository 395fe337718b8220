//! Proximity sensor collaborator, implementing
//! [crate::core::collaborators::ProximitySensor].
//!
//! A driver task (not written here - it would poll an evdev proximity node
//! or a platform sensor HAL) feeds readings into a `tokio::sync::watch`
//! channel; this struct only exposes the synchronous snapshot read and
//! idempotent subscription toggle the state machine needs.

use crate::core::collaborators::ProximitySensor;
use crate::core::types::ProximityState as CoreProximityState;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

pub struct EvdevProximity {
    state: watch::Receiver<CoreProximityState>,
    events_enabled: AtomicBool,
}

impl EvdevProximity {
    /// `state` is fed by the sensor driver task; it always holds the most
    /// recently observed reading, defaulting to whatever the driver
    /// initializes it with.
    pub fn new(state: watch::Receiver<CoreProximityState>) -> EvdevProximity {
        EvdevProximity {
            state,
            events_enabled: AtomicBool::new(true),
        }
    }

    pub fn events_enabled(&self) -> bool {
        self.events_enabled.load(Ordering::SeqCst)
    }
}

impl ProximitySensor for EvdevProximity {
    fn proximity_state(&self) -> CoreProximityState {
        *self.state.borrow()
    }

    fn enable_proximity_events(&self) {
        self.events_enabled.store(true, Ordering::SeqCst);
        log::debug!("proximity events enabled");
    }

    fn disable_proximity_events(&self) {
        self.events_enabled.store(false, Ordering::SeqCst);
        log::debug!("proximity events disabled");
    }
}
