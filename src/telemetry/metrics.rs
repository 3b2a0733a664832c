//! Controller counters.
//!
//! Lock-free counters bumped from the event handlers and read by the
//! stats tick and the management surface.

use crate::controller::{Decision, DropReason};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter for thread-safe increment operations.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters for everything the controller decides.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Switches that completed bring-up.
    pub switches_connected: Counter,
    /// Packet-in events received.
    pub packet_in: Counter,
    /// ARP packets relayed with a PacketOut.
    pub arp_forwarded: Counter,
    /// IPv4 packets relayed with a PacketOut.
    pub ip_forwarded: Counter,
    /// FlowMods issued, including table-miss rules.
    pub flows_installed: Counter,
    /// Packets dropped because the pair is not whitelisted.
    pub policy_denied: Counter,
    /// Packets dropped because the destination was never seen.
    pub unknown_destination: Counter,
    /// Packets dropped because they could not be parsed.
    pub malformed: Counter,
    /// Non-ARP frames without an IPv4 header.
    pub not_ipv4: Counter,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a decision under the matching counter.
    ///
    /// `arp` tells ARP relays apart from IPv4 relays, which both surface as
    /// plain forwards.
    pub fn record_decision(&self, decision: &Decision, arp: bool) {
        match decision {
            Decision::Forward { .. } if arp => self.arp_forwarded.inc(),
            Decision::Forward { .. } => self.ip_forwarded.inc(),
            Decision::InstallAndForward { .. } => {
                self.flows_installed.inc();
                self.ip_forwarded.inc();
            }
            Decision::Install { .. } => self.flows_installed.inc(),
            Decision::Drop(reason) => match reason {
                DropReason::Malformed => self.malformed.inc(),
                DropReason::NotIpv4 => self.not_ipv4.inc(),
                DropReason::PolicyDenied => self.policy_denied.inc(),
                DropReason::UnknownDestination => self.unknown_destination.inc(),
            },
        }
    }

    /// Exports all counters as key-value pairs.
    pub fn export(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("switches_connected", self.switches_connected.get()),
            ("packet_in", self.packet_in.get()),
            ("arp_forwarded", self.arp_forwarded.get()),
            ("ip_forwarded", self.ip_forwarded.get()),
            ("flows_installed", self.flows_installed.get()),
            ("policy_denied", self.policy_denied.get()),
            ("unknown_destination", self.unknown_destination.get()),
            ("malformed", self.malformed.get()),
            ("not_ipv4", self.not_ipv4.get()),
        ]
    }
}
