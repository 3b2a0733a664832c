//! Trace replay
//!
//! A trace is a TOML list of switch events described by their header
//! fields. Each packet event is encoded into an Ethernet frame and pushed
//! through the event loop exactly as a switch session would.
//!
//! ```toml
//! [[event]]
//! type = "connect"
//! switch = 1
//!
//! [[event]]
//! type = "arp"
//! switch = 1
//! in_port = 1
//! sender_mac = "00:00:00:00:00:01"
//! sender_ip = "10.0.0.1"
//! target_ip = "10.0.0.2"
//! ```

use crate::controller::{run_event_loop, Controller, EventSender, PortNo, SwitchEvent, SwitchId};
use crate::management::{Management, StatsView, TopologyView, WhitelistView};
use crate::protocol::arp::{ArpOp, ArpPacket};
use crate::protocol::ethernet::FrameBuilder;
use crate::protocol::{ipv4, EtherType, MacAddr};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const REPLAY_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArpKind {
    #[default]
    Request,
    Reply,
}

/// One event of a trace file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TraceEvent {
    Connect {
        switch: SwitchId,
    },
    Arp {
        switch: SwitchId,
        in_port: PortNo,
        #[serde(default)]
        op: ArpKind,
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        #[serde(default = "zero_mac")]
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    },
    Ipv4 {
        switch: SwitchId,
        in_port: PortNo,
        src_mac: MacAddr,
        dst_mac: MacAddr,
        src_ip: Ipv4Addr,
        dst_ip: Ipv4Addr,
        #[serde(default = "default_ip_protocol")]
        protocol: u8,
        /// 802.1Q VLAN id; untagged when absent
        #[serde(default)]
        vlan: Option<u16>,
    },
    /// Arbitrary ethertype with a zeroed payload
    Raw {
        switch: SwitchId,
        in_port: PortNo,
        ethertype: u16,
        #[serde(default)]
        src_mac: Option<MacAddr>,
        #[serde(default)]
        payload_len: usize,
    },
}

fn zero_mac() -> MacAddr {
    MacAddr::ZERO
}

fn default_ip_protocol() -> u8 {
    // ICMP
    1
}

impl TraceEvent {
    /// Encode into the event a switch session would deliver
    pub fn to_switch_event(&self) -> SwitchEvent {
        match self {
            TraceEvent::Connect { switch } => SwitchEvent::SwitchConnected { switch: *switch },
            TraceEvent::Arp {
                switch,
                in_port,
                op,
                sender_mac,
                sender_ip,
                target_mac,
                target_ip,
            } => {
                let packet = ArpPacket {
                    op: match op {
                        ArpKind::Request => ArpOp::Request,
                        ArpKind::Reply => ArpOp::Reply,
                    },
                    sender_mac: *sender_mac,
                    sender_ip: *sender_ip,
                    target_mac: *target_mac,
                    target_ip: *target_ip,
                };
                let dst = match op {
                    ArpKind::Request => MacAddr::BROADCAST,
                    ArpKind::Reply => *target_mac,
                };
                let data = FrameBuilder::new(EtherType::Arp as u16)
                    .dst_mac(dst)
                    .src_mac(*sender_mac)
                    .payload(&packet.to_bytes())
                    .build();
                SwitchEvent::PacketIn {
                    switch: *switch,
                    in_port: *in_port,
                    data,
                }
            }
            TraceEvent::Ipv4 {
                switch,
                in_port,
                src_mac,
                dst_mac,
                src_ip,
                dst_ip,
                protocol,
                vlan,
            } => {
                let mut builder = FrameBuilder::new(EtherType::Ipv4 as u16)
                    .dst_mac(*dst_mac)
                    .src_mac(*src_mac);
                if let Some(vid) = vlan {
                    builder = builder.vlan(*vid);
                }
                let data = builder
                    .payload(&ipv4::build_packet(*src_ip, *dst_ip, *protocol, &[0u8; 8]))
                    .build();
                SwitchEvent::PacketIn {
                    switch: *switch,
                    in_port: *in_port,
                    data,
                }
            }
            TraceEvent::Raw {
                switch,
                in_port,
                ethertype,
                src_mac,
                payload_len,
            } => {
                let data = FrameBuilder::new(*ethertype)
                    .src_mac(src_mac.unwrap_or(MacAddr::ZERO))
                    .payload(&vec![0u8; *payload_len])
                    .build();
                SwitchEvent::PacketIn {
                    switch: *switch,
                    in_port: *in_port,
                    data,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Trace {
    #[serde(default, rename = "event")]
    pub events: Vec<TraceEvent>,
}

impl Trace {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Parse(format!("trace: {}", e)))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// State of the controller once a trace has been replayed
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub events: u64,
    pub topology: TopologyView,
    pub whitelist: WhitelistView,
    pub stats: StatsView,
    pub counters: BTreeMap<&'static str, u64>,
}

/// Feed every trace event through the event loop and report the outcome
pub async fn replay(
    controller: Arc<Controller>,
    trace: &Trace,
    stats_interval: Option<Duration>,
) -> Result<ReplayReport> {
    let (tx, rx) = EventSender::channel(REPLAY_CHANNEL_CAPACITY);

    let events: Vec<SwitchEvent> = trace.events.iter().map(TraceEvent::to_switch_event).collect();
    let produce = async move {
        for event in events {
            tx.send(event).await?;
        }
        Ok::<_, Error>(())
    };

    let (sent, handled) = tokio::join!(
        produce,
        run_event_loop(controller.clone(), rx, stats_interval)
    );
    sent?;

    let mgmt = Management::for_controller(&controller);
    Ok(ReplayReport {
        events: handled,
        topology: mgmt.topology(),
        whitelist: mgmt.whitelist(),
        stats: mgmt.stats(),
        counters: controller.metrics().export().into_iter().collect(),
    })
}
