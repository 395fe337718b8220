//! The concrete, tokio-backed implementation of [crate::core::collaborators::Timer].
//!
//! The state machine itself never touches a clock besides through this
//! trait. Each armed alarm is one spawned `tokio::time::sleep` task; firing
//! posts the id back onto an unbounded channel the owning actor drains, and
//! cancelling aborts the task outright so a cancelled id can never be
//! observed on the channel afterwards.

use crate::core::collaborators::Timer;
use crate::core::types::AlarmId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Delivers fired [AlarmId]s to whoever owns the other end of the channel
/// passed to [TokioTimer::new].
pub type AlarmSender = mpsc::UnboundedSender<AlarmId>;

pub struct TokioTimer {
    next_id: AtomicU64,
    armed: Arc<Mutex<HashMap<AlarmId, JoinHandle<()>>>>,
    alarm_tx: AlarmSender,
}

impl TokioTimer {
    pub fn new(alarm_tx: AlarmSender) -> TokioTimer {
        TokioTimer {
            next_id: AtomicU64::new(1),
            armed: Arc::new(Mutex::new(HashMap::new())),
            alarm_tx,
        }
    }

    /// Number of alarms currently armed, for diagnostics/tests.
    pub fn armed_count(&self) -> usize {
        self.armed.lock().unwrap().len()
    }
}

impl Timer for TokioTimer {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn schedule_alarm_in(&self, duration: Duration) -> AlarmId {
        let id = AlarmId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let tx = self.alarm_tx.clone();
        let armed = self.armed.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            armed.lock().unwrap().remove(&id);
            if tx.send(id).is_err() {
                log::debug!("alarm {:?} fired after its receiver was dropped", id);
            }
        });
        self.armed.lock().unwrap().insert(id, handle);
        log::debug!("armed alarm {:?} for {:?}", id, duration);
        id
    }

    fn cancel_alarm(&self, id: AlarmId) {
        if let Some(handle) = self.armed.lock().unwrap().remove(&id) {
            handle.abort();
            log::debug!("cancelled alarm {:?}", id);
        } else {
            log::debug!("cancel_alarm: id {:?} already fired or unknown, ignoring", id);
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        for (_, handle) in self.armed.lock().unwrap().drain() {
            handle.abort();
        }
    }
}
