//! Control-layer actors: the daemon event loop and the D-Bus client surface.

pub mod daemon;
pub mod dbus_controller;
