//! The D-Bus surface clients and notifiers use to drive the state machine.
//!
//! A `zbus` `#[dbus_interface]` impl wrapping a single [armaf::ActorPort],
//! spawned under a [armaf::Handle]/[armaf::HandleChild] pair and torn down
//! the same way: each D-Bus method call is forwarded as one `PowerEvent`
//! to the daemon actor and its result mapped onto a D-Bus error.

use crate::armaf::Handle;
use crate::control::daemon::{PowerDaemonPort, PowerEvent};
use crate::core::types::InactivityTimeout;
use anyhow::Result;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum BusType {
    Session,
    System,
}

pub struct DisplayPowerDBusController {
    path: String,
    name: String,
    bus_type: BusType,
    daemon_port: PowerDaemonPort,
}

impl DisplayPowerDBusController {
    pub fn new(
        path: &str,
        name: &str,
        bus_type: BusType,
        daemon_port: PowerDaemonPort,
    ) -> DisplayPowerDBusController {
        DisplayPowerDBusController {
            path: path.to_owned(),
            name: name.to_owned(),
            bus_type,
            daemon_port,
        }
    }

    pub async fn spawn(self) -> Result<Handle> {
        let (handle, mut handle_child) = Handle::new();
        let builder = match self.bus_type {
            BusType::System => zbus::ConnectionBuilder::system()?,
            BusType::Session => zbus::ConnectionBuilder::session()?,
        };
        let path = self.path.clone();
        let connection = builder
            .name(self.name.as_str())?
            .serve_at(path.as_str(), self)?
            .build()
            .await?;

        log::debug!("display power D-Bus surface bound");
        tokio::spawn(async move {
            let connection = connection;
            handle_child.should_terminate().await;
            if let Err(e) = connection.object_server().remove::<Self, _>(path).await {
                log::error!("failed to unregister D-Bus object: {}", e);
            }
            log::debug!("display power D-Bus surface terminated");
        });
        Ok(handle)
    }

    async fn forward(&self, event: PowerEvent) -> zbus::fdo::Result<()> {
        self.daemon_port
            .request(event)
            .await
            .map_err(|e| zbus::fdo::Error::Failed(format!("{}", e)))
    }
}

#[zbus::dbus_interface(name = "org.dispowerd.Manager")]
impl DisplayPowerDBusController {
    async fn enable_inactivity_timeout(&self) -> zbus::fdo::Result<()> {
        self.forward(PowerEvent::EnableInactivityTimeout).await
    }

    async fn disable_inactivity_timeout(&self) -> zbus::fdo::Result<()> {
        self.forward(PowerEvent::DisableInactivityTimeout).await
    }

    async fn set_inactivity_timeout(&self, seconds: u32) -> zbus::fdo::Result<()> {
        let timeout = if seconds == 0 {
            InactivityTimeout::Infinite
        } else {
            InactivityTimeout::Finite(Duration::from_secs(seconds as u64))
        };
        self.forward(PowerEvent::SetInactivityTimeout(timeout))
            .await
    }

    async fn notification(&self) -> zbus::fdo::Result<()> {
        self.forward(PowerEvent::Notification).await
    }

    async fn no_notification(&self) -> zbus::fdo::Result<()> {
        self.forward(PowerEvent::NoNotification).await
    }

    async fn active_call(&self) -> zbus::fdo::Result<()> {
        self.forward(PowerEvent::ActiveCall).await
    }

    async fn no_active_call(&self) -> zbus::fdo::Result<()> {
        self.forward(PowerEvent::NoActiveCall).await
    }

    async fn turn_on_display(&self) -> zbus::fdo::Result<()> {
        self.forward(PowerEvent::TurnOnDisplay).await
    }
}
