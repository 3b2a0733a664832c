//! Ethernet II framing, with at most one 802.1Q/802.1ad tag

use super::{EtherType, MacAddr};
use crate::{Error, Result};

/// Length of an untagged Ethernet II header
pub const HEADER_LEN: usize = 14;

/// Length of one VLAN tag (TPID + TCI)
pub const VLAN_TAG_LEN: usize = 4;

/// Parsed Ethernet frame borrowing the packet-in payload
///
/// A single VLAN tag is stepped over: `ethertype` and `payload` describe
/// the encapsulated packet.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    buffer: &'a [u8],
    header_len: usize,
}

impl<'a> Frame<'a> {
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        if buffer.len() < HEADER_LEN {
            return Err(Error::InvalidPacket(format!(
                "frame too short: {} bytes",
                buffer.len()
            )));
        }

        let outer = u16::from_be_bytes([buffer[12], buffer[13]]);
        let header_len = match EtherType::from_u16(outer) {
            Some(t) if t.is_vlan_tag() => HEADER_LEN + VLAN_TAG_LEN,
            _ => HEADER_LEN,
        };
        if buffer.len() < header_len {
            return Err(Error::InvalidPacket(format!(
                "truncated VLAN tag: {} bytes",
                buffer.len()
            )));
        }

        Ok(Self { buffer, header_len })
    }

    pub fn dst_mac(&self) -> MacAddr {
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&self.buffer[0..6]);
        MacAddr(mac)
    }

    pub fn src_mac(&self) -> MacAddr {
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&self.buffer[6..12]);
        MacAddr(mac)
    }

    /// EtherType of the encapsulated packet, after any VLAN tag
    pub fn ethertype(&self) -> u16 {
        let at = self.header_len - 2;
        u16::from_be_bytes([self.buffer[at], self.buffer[at + 1]])
    }

    pub fn payload(&self) -> &'a [u8] {
        &self.buffer[self.header_len..]
    }
}

/// Builds Ethernet frames, optionally 802.1Q tagged
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    dst: MacAddr,
    src: MacAddr,
    vlan: Option<u16>,
    ethertype: u16,
    payload: Vec<u8>,
}

impl FrameBuilder {
    pub fn new(ethertype: u16) -> Self {
        Self {
            dst: MacAddr::BROADCAST,
            src: MacAddr::ZERO,
            vlan: None,
            ethertype,
            payload: Vec::new(),
        }
    }

    pub fn dst_mac(mut self, mac: MacAddr) -> Self {
        self.dst = mac;
        self
    }

    pub fn src_mac(mut self, mac: MacAddr) -> Self {
        self.src = mac;
        self
    }

    /// Tag with an 802.1Q VLAN id (priority 0)
    pub fn vlan(mut self, vid: u16) -> Self {
        self.vlan = Some(vid & 0x0fff);
        self
    }

    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(HEADER_LEN + VLAN_TAG_LEN + self.payload.len());
        frame.extend_from_slice(&self.dst.0);
        frame.extend_from_slice(&self.src.0);
        if let Some(vid) = self.vlan {
            frame.extend_from_slice(&(EtherType::Vlan as u16).to_be_bytes());
            frame.extend_from_slice(&vid.to_be_bytes());
        }
        frame.extend_from_slice(&self.ethertype.to_be_bytes());
        frame.extend_from_slice(&self.payload);
        frame
    }
}
