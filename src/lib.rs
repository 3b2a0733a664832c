//! ofguard - whitelist-enforcing SDN controller
//!
//! Learns host locations from the packets switches punt to the controller,
//! enforces a directed whitelist of IPv4 pairs, and installs per-flow rules
//! for permitted traffic. The OpenFlow session layer is an external
//! collaborator reached through [`controller::SwitchActuator`].

pub mod config;
pub mod controller;
pub mod error;
pub mod management;
pub mod protocol;
pub mod replay;
pub mod telemetry;

pub use error::{Error, Result};
