//! The daemon event loop: the single actor that owns the
//! [PowerStateMachine] exclusively and drains one [armaf::ActorPort] of
//! [PowerEvent]s, guaranteeing the non-reentrant, one-event-at-a-time
//! dispatch the state machine's concurrency model requires.
//!
//! Generic over [Environment] so the same actor can be driven by either the
//! real system backends or a recording test double; the initialize/handle/
//! tear-down plumbing comes from [armaf::Server] and [armaf::spawn_server],
//! leaving `handle_message` as the only part specific to this daemon.

use crate::armaf::{self, ActorPort, Server};
use crate::core::collaborators::Environment;
use crate::core::state_machine::PowerStateMachine;
use crate::core::types::{AlarmId, InactivityTimeout};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Every inbound event the state machine can react to.
#[derive(Debug, Clone, Copy)]
pub enum PowerEvent {
    PowerButtonPress,
    PowerButtonRelease,
    Alarm(AlarmId),
    ActiveCall,
    NoActiveCall,
    Notification,
    NoNotification,
    EnableInactivityTimeout,
    DisableInactivityTimeout,
    SetInactivityTimeout(InactivityTimeout),
    ProximityFar,
    ProximityNear,
    TurnOnDisplay,
    UserActivityChangingPowerState,
    UserActivityExtendingPowerState,
}

pub type PowerDaemonPort = ActorPort<PowerEvent, (), anyhow::Error>;

/// Errors that can arise while starting the daemon actor.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to start power daemon actor: {0}")]
    Spawn(#[source] anyhow::Error),
}

pub struct PowerDaemon<E: Environment> {
    state_machine: PowerStateMachine<E>,
}

impl<E: Environment> PowerDaemon<E> {
    pub fn new(state_machine: PowerStateMachine<E>) -> PowerDaemon<E> {
        PowerDaemon { state_machine }
    }

    #[cfg(test)]
    pub(crate) fn state_machine(&self) -> &PowerStateMachine<E> {
        &self.state_machine
    }

    /// Spawns the daemon actor and a small bridging task that forwards
    /// alarms fired by the timer onto the same serialized port as every
    /// other event, so alarm delivery can never race with, or interleave
    /// inside, another handler.
    pub async fn spawn(
        self,
        mut alarm_rx: mpsc::UnboundedReceiver<AlarmId>,
    ) -> Result<PowerDaemonPort, DaemonError> {
        let port = armaf::spawn_server(self).await.map_err(DaemonError::Spawn)?;
        let bridge_port = port.clone();
        tokio::spawn(async move {
            while let Some(id) = alarm_rx.recv().await {
                if bridge_port.request(PowerEvent::Alarm(id)).await.is_err() {
                    log::debug!("power daemon port closed, stopping alarm bridge");
                    return;
                }
            }
        });
        Ok(port)
    }
}

#[async_trait]
impl<E: Environment> Server<PowerEvent, ()> for PowerDaemon<E> {
    fn get_name(&self) -> String {
        "PowerDaemon".to_owned()
    }

    async fn handle_message(&mut self, payload: PowerEvent) -> Result<()> {
        let sm = &mut self.state_machine;
        match payload {
            PowerEvent::PowerButtonPress => sm.handle_power_button_press(),
            PowerEvent::PowerButtonRelease => sm.handle_power_button_release(),
            PowerEvent::Alarm(id) => sm.handle_alarm(id),
            PowerEvent::ActiveCall => sm.handle_active_call(),
            PowerEvent::NoActiveCall => sm.handle_no_active_call(),
            PowerEvent::Notification => sm.handle_notification(),
            PowerEvent::NoNotification => sm.handle_no_notification(),
            PowerEvent::EnableInactivityTimeout => sm.handle_enable_inactivity_timeout(),
            PowerEvent::DisableInactivityTimeout => sm.handle_disable_inactivity_timeout(),
            PowerEvent::SetInactivityTimeout(timeout) => {
                sm.handle_set_inactivity_timeout(timeout)
            }
            PowerEvent::ProximityFar => sm.handle_proximity_far(),
            PowerEvent::ProximityNear => sm.handle_proximity_near(),
            PowerEvent::TurnOnDisplay => sm.handle_turn_on_display(),
            PowerEvent::UserActivityChangingPowerState => {
                sm.handle_user_activity_changing_power_state()
            }
            PowerEvent::UserActivityExtendingPowerState => {
                sm.handle_user_activity_extending_power_state()
            }
        }
        Ok(())
    }
}
