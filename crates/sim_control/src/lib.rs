//! Client side of the simulator control bus.
//!
//! Commands are multipart ZeroMQ messages published to the simulator:
//!
//! ```text
//!   frame 0 : "Sim"
//!   frame 1 : command name ("Teleport")
//!   frame 2 : target object name
//!   frame 3 : protobuf payload (PoseStamped)
//! ```
//!
//! Delivery is fire-and-forget; the simulator never acknowledges a command.

pub mod client;
pub mod messages;

pub use client::{teleport_frames, ControlError, SimControl};
