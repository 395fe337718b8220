//! A framework for working with actor-based software systems loosely based on
//! the "Actor-based Runtime Model of Adaptable Feedback Control Loops" paper.

mod ports;
mod server;

#[doc(inline)]
pub use ports::*;

#[doc(inline)]
pub use server::{spawn_server, Server};

#[cfg(test)]
mod test_ports;
#[cfg(test)]
mod test_server;
