//! Turns the display hardware on and off, implementing
//! [crate::core::collaborators::DisplayPowerControl].
//!
//! Reduced to the two idempotent operations the state machine needs. Each
//! transition is logged at `info`, so it stays externally observable
//! through the journal even without a real DPMS/DRM backend wired in.

use crate::core::collaborators::DisplayPowerControl;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct DpmsDisplayPower {
    on: AtomicBool,
}

impl DpmsDisplayPower {
    pub fn new() -> DpmsDisplayPower {
        DpmsDisplayPower {
            on: AtomicBool::new(false),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }
}

impl Default for DpmsDisplayPower {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPowerControl for DpmsDisplayPower {
    fn turn_on(&self) {
        if !self.on.swap(true, Ordering::SeqCst) {
            log::info!("display power: on");
        }
    }

    fn turn_off(&self) {
        if self.on.swap(false, Ordering::SeqCst) {
            log::info!("display power: off");
        }
    }
}
