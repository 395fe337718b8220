//! The display power state machine: the reactive core of the daemon.
//!
//! Everything outside this module exists to drive events into
//! [state_machine::PowerStateMachine] and to give its [collaborators::Environment]
//! collaborators something real to act on.

pub mod collaborators;
pub mod state_machine;
pub mod types;

#[cfg(test)]
pub mod mock;
