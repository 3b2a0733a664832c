//! In-process switch fabric
//!
//! Drives a [`Controller`] the way switch sessions would and records every
//! operation it issues.

use ofguard::config::Config;
use ofguard::controller::{
    Controller, Decision, ForwardingParams, PolicyStore, PortNo, RecordingActuator, SwitchId,
};
use ofguard::management::Management;
use ofguard::protocol::arp::ArpPacket;
use ofguard::protocol::ethernet::FrameBuilder;
use ofguard::protocol::{ipv4, EtherType, MacAddr};
use std::net::Ipv4Addr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct Host {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
}

pub const H1: Host = Host {
    ip: Ipv4Addr::new(10, 0, 0, 1),
    mac: MacAddr([0xaa, 0, 0, 0, 0, 0x01]),
};
pub const H2: Host = Host {
    ip: Ipv4Addr::new(10, 0, 0, 2),
    mac: MacAddr([0xbb, 0, 0, 0, 0, 0x02]),
};
pub const H3: Host = Host {
    ip: Ipv4Addr::new(10, 0, 0, 3),
    mac: MacAddr([0xcc, 0, 0, 0, 0, 0x03]),
};

pub struct Fabric {
    pub controller: Controller,
    pub actuator: Arc<RecordingActuator>,
}

impl Fabric {
    /// h1 <-> h2 whitelisted, default forwarding parameters
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn with_policy(policy: PolicyStore) -> Self {
        let actuator = Arc::new(RecordingActuator::new());
        let controller = Controller::new(actuator.clone(), policy, ForwardingParams::default());
        Self {
            controller,
            actuator,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let actuator = Arc::new(RecordingActuator::new());
        let controller = Controller::from_config(config, actuator.clone());
        Self {
            controller,
            actuator,
        }
    }

    pub fn management(&self) -> Management {
        Management::for_controller(&self.controller)
    }

    pub fn connect(&self, switch: SwitchId) -> Decision {
        self.controller.switch_connected(switch)
    }

    /// `from` broadcasts a who-has for `target`
    pub fn arp_request(&self, switch: SwitchId, port: PortNo, from: Host, target: Host) -> Decision {
        let arp = ArpPacket::request(from.mac, from.ip, target.ip);
        let frame = FrameBuilder::new(EtherType::Arp as u16)
            .src_mac(from.mac)
            .payload(&arp.to_bytes())
            .build();
        self.controller.packet_in(switch, port, &frame)
    }

    /// `from` sends an IPv4 packet to `to`
    pub fn ip(&self, switch: SwitchId, port: PortNo, from: Host, to: Host) -> Decision {
        self.controller.packet_in(switch, port, &self.ip_frame(from, to))
    }

    pub fn ip_frame(&self, from: Host, to: Host) -> Vec<u8> {
        FrameBuilder::new(EtherType::Ipv4 as u16)
            .src_mac(from.mac)
            .dst_mac(to.mac)
            .payload(&ipv4::build_packet(from.ip, to.ip, 1, &[0u8; 16]))
            .build()
    }

    /// Same as [`Fabric::ip_frame`] with an 802.1Q tag
    pub fn tagged_ip_frame(&self, from: Host, to: Host, vid: u16) -> Vec<u8> {
        FrameBuilder::new(EtherType::Ipv4 as u16)
            .src_mac(from.mac)
            .dst_mac(to.mac)
            .vlan(vid)
            .payload(&ipv4::build_packet(from.ip, to.ip, 1, &[0u8; 16]))
            .build()
    }
}
