//! Learned topology: host locations and per-switch MAC tables
//!
//! Both maps follow last-observation-wins. Nothing ages out; a host that
//! moves stays reachable at its old location until it sends from the new one.

use crate::protocol::MacAddr;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;

/// OpenFlow datapath identifier
pub type SwitchId = u64;

/// OpenFlow port number
pub type PortNo = u32;

/// Where a host was last seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    pub mac: MacAddr,
    pub switch: SwitchId,
    pub port: PortNo,
}

#[derive(Debug, Default)]
struct Inner {
    hosts: HashMap<Ipv4Addr, HostRecord>,
    port_tables: HashMap<SwitchId, HashMap<MacAddr, PortNo>>,
}

/// Shared topology store
///
/// All access goes through one lock so a reader never sees a host record
/// without the matching port-table entry written by the same packet.
#[derive(Debug, Default)]
pub struct TopologyStore {
    inner: RwLock<Inner>,
}

impl TopologyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) where `ip` lives
    pub fn record_host(&self, ip: Ipv4Addr, mac: MacAddr, switch: SwitchId, port: PortNo) {
        self.inner
            .write()
            .hosts
            .insert(ip, HostRecord { mac, switch, port });
    }

    pub fn lookup_host(&self, ip: &Ipv4Addr) -> Option<HostRecord> {
        self.inner.read().hosts.get(ip).copied()
    }

    /// Record the port `mac` was seen on, creating the switch table if needed
    pub fn record_port(&self, switch: SwitchId, mac: MacAddr, port: PortNo) {
        self.inner
            .write()
            .port_tables
            .entry(switch)
            .or_default()
            .insert(mac, port);
    }

    pub fn lookup_port(&self, switch: SwitchId, mac: &MacAddr) -> Option<PortNo> {
        self.inner.read().port_tables.get(&switch)?.get(mac).copied()
    }

    /// Record both the host location and the port-table entry for one packet
    pub fn learn(&self, ip: Ipv4Addr, mac: MacAddr, switch: SwitchId, port: PortNo) {
        let mut inner = self.inner.write();
        inner.hosts.insert(ip, HostRecord { mac, switch, port });
        inner
            .port_tables
            .entry(switch)
            .or_default()
            .insert(mac, port);
    }

    /// Create an empty port table for a newly connected switch.
    /// An existing table is left untouched.
    pub fn init_switch(&self, switch: SwitchId) {
        self.inner.write().port_tables.entry(switch).or_default();
    }

    pub fn has_switch(&self, switch: SwitchId) -> bool {
        self.inner.read().port_tables.contains_key(&switch)
    }

    /// Snapshot of all host records, ordered by IP
    pub fn hosts(&self) -> Vec<(Ipv4Addr, HostRecord)> {
        let inner = self.inner.read();
        let mut hosts: Vec<_> = inner.hosts.iter().map(|(ip, r)| (*ip, *r)).collect();
        hosts.sort_by_key(|(ip, _)| *ip);
        hosts
    }

    /// Snapshot of every switch's MAC table
    pub fn port_tables(&self) -> BTreeMap<SwitchId, BTreeMap<MacAddr, PortNo>> {
        self.inner
            .read()
            .port_tables
            .iter()
            .map(|(sw, table)| (*sw, table.iter().map(|(m, p)| (*m, *p)).collect()))
            .collect()
    }

    pub fn host_count(&self) -> usize {
        self.inner.read().hosts.len()
    }

    pub fn switch_count(&self) -> usize {
        self.inner.read().port_tables.len()
    }
}
