//! Forwarding decisions and the flow rules they carry

use super::{PortNo, SwitchId};
use crate::protocol::EtherType;
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// OpenFlow 1.3 reserved port: send to the controller
pub const OFPP_CONTROLLER: PortNo = 0xffff_fffd;

/// OpenFlow 1.3 reserved ports start here; physical ports are below it
pub const OFPP_MAX: PortNo = 0xffff_ff00;

/// max_len meaning "do not buffer, send the whole packet"
pub const OFPCML_NO_BUFFER: u16 = 0xffff;

/// Priority of the table-miss rule installed at bring-up
pub const TABLE_MISS_PRIORITY: u16 = 0;

/// Match predicate of a flow rule. Absent fields are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlowMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eth_type: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_src: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_dst: Option<Ipv4Addr>,
}

impl FlowMatch {
    /// Match everything
    pub fn any() -> Self {
        Self::default()
    }

    /// eth_type=0x0800 with exact source and destination address
    pub fn ipv4_pair(src: Ipv4Addr, dst: Ipv4Addr) -> Self {
        Self {
            eth_type: Some(EtherType::Ipv4 as u16),
            ipv4_src: Some(src),
            ipv4_dst: Some(dst),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Flow rule action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Output { port: PortNo, max_len: u16 },
}

impl Action {
    pub fn output(port: PortNo) -> Self {
        Action::Output {
            port,
            max_len: OFPCML_NO_BUFFER,
        }
    }

    pub fn to_controller() -> Self {
        Action::Output {
            port: OFPP_CONTROLLER,
            max_len: OFPCML_NO_BUFFER,
        }
    }
}

/// A match-action directive for a switch flow table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowRule {
    pub priority: u16,
    pub flow_match: FlowMatch,
    pub actions: Vec<Action>,
    /// Seconds of inactivity before the switch removes the rule; 0 = never
    pub idle_timeout: u16,
}

impl FlowRule {
    /// Priority-0 catch-all that punts unmatched packets, unbuffered
    pub fn table_miss() -> Self {
        Self {
            priority: TABLE_MISS_PRIORITY,
            flow_match: FlowMatch::any(),
            actions: vec![Action::to_controller()],
            idle_timeout: 0,
        }
    }

    /// Output port of the first output action, if any
    pub fn out_port(&self) -> Option<PortNo> {
        self.actions.iter().find_map(|action| match action {
            Action::Output { port, .. } => Some(*port),
        })
    }
}

/// Why a packet produced no output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Missing or unparseable header for the protocol it claimed to be
    Malformed,
    /// Not ARP and carries no IPv4 header
    NotIpv4,
    /// Pair not in the whitelist
    PolicyDenied,
    /// Destination never observed
    UnknownDestination,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DropReason::Malformed => "malformed",
            DropReason::NotIpv4 => "not ipv4",
            DropReason::PolicyDenied => "policy denied",
            DropReason::UnknownDestination => "unknown destination",
        };
        f.write_str(s)
    }
}

/// Outcome of handling one switch event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Send the triggering packet once, no rule
    Forward {
        switch: SwitchId,
        in_port: PortNo,
        out_port: PortNo,
    },
    /// Install `rule` on `switch`, then send the triggering packet to `out_port`
    InstallAndForward {
        switch: SwitchId,
        in_port: PortNo,
        out_port: PortNo,
        rule: FlowRule,
    },
    /// Install `rule` with no packet to send
    Install { switch: SwitchId, rule: FlowRule },
    Drop(DropReason),
}
