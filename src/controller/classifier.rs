//! Packet-in classification

use crate::protocol::arp::ArpPacket;
use crate::protocol::ethernet::Frame;
use crate::protocol::ipv4::Ipv4Header;
use crate::protocol::{EtherType, MacAddr};
use crate::Result;
use std::net::Ipv4Addr;

/// Addressing of a punted IPv4 packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Summary {
    pub src_mac: MacAddr,
    pub dst_mac: MacAddr,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
}

/// What a punted frame turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Arp(ArpPacket),
    Ipv4(Ipv4Summary),
    /// Routed to the IP path but carried no IPv4 header
    NotIpv4 { ethertype: u16 },
}

/// Classify a raw frame by its EtherType.
///
/// One VLAN tag is stepped over, so a tagged frame classifies by its inner
/// EtherType. Only ARP goes to the ARP path. Every other EtherType takes the
/// IP path and is accepted there only if it is IPv4 and the payload parses
/// as an IPv4 header. Unknown EtherTypes are not rejected up front.
pub fn classify(data: &[u8]) -> Result<Classified> {
    let frame = Frame::parse(data)?;
    let ethertype = frame.ethertype();

    match EtherType::from_u16(ethertype) {
        Some(EtherType::Arp) => ArpPacket::parse(frame.payload()).map(Classified::Arp),
        Some(EtherType::Ipv4) => match Ipv4Header::parse(frame.payload()) {
            Ok(ip) => Ok(Classified::Ipv4(Ipv4Summary {
                src_mac: frame.src_mac(),
                dst_mac: frame.dst_mac(),
                src_ip: ip.src_addr(),
                dst_ip: ip.dst_addr(),
            })),
            Err(_) => Ok(Classified::NotIpv4 { ethertype }),
        },
        _ => Ok(Classified::NotIpv4 { ethertype }),
    }
}
