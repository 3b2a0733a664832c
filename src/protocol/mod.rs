//! Wire formats inspected by the controller
//!
//! Only the headers needed for classification are decoded: Ethernet II,
//! ARP over Ethernet/IPv4, and the fixed part of the IPv4 header.

pub mod arp;
pub mod ethernet;
pub mod ipv4;
pub mod types;

pub use types::*;
