//! IPv4 header (RFC 791)

use crate::{Error, Result};
use std::net::Ipv4Addr;

/// Minimum IPv4 header size (no options)
pub const MIN_HEADER_LEN: usize = 20;

/// Parsed IPv4 header borrowing the frame payload
#[derive(Debug, Clone, Copy)]
pub struct Ipv4Header<'a> {
    buffer: &'a [u8],
}

impl<'a> Ipv4Header<'a> {
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        if buffer.len() < MIN_HEADER_LEN {
            return Err(Error::InvalidPacket("IPv4 header too short".into()));
        }
        if buffer[0] >> 4 != 4 {
            return Err(Error::InvalidPacket(format!(
                "IP version {}",
                buffer[0] >> 4
            )));
        }

        let header_len = usize::from(buffer[0] & 0x0f) * 4;
        if header_len < MIN_HEADER_LEN || buffer.len() < header_len {
            return Err(Error::InvalidPacket(format!(
                "bad IPv4 header length {header_len}"
            )));
        }

        Ok(Self { buffer })
    }

    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.buffer[12], self.buffer[13], self.buffer[14], self.buffer[15])
    }

    pub fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.buffer[16], self.buffer[17], self.buffer[18], self.buffer[19])
    }
}

/// Internet checksum over a header
pub fn checksum(header: &[u8]) -> u16 {
    let mut sum: u32 = header
        .chunks(2)
        .map(|pair| u32::from(u16::from_be_bytes([pair[0], *pair.get(1).unwrap_or(&0)])))
        .sum();

    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}

/// Build a minimal IPv4 packet (no options, TTL 64) around `payload`
pub fn build_packet(src: Ipv4Addr, dst: Ipv4Addr, protocol: u8, payload: &[u8]) -> Vec<u8> {
    let total_len = (MIN_HEADER_LEN + payload.len()) as u16;
    let mut packet = vec![0u8; MIN_HEADER_LEN];
    packet[0] = 0x45;
    packet[2..4].copy_from_slice(&total_len.to_be_bytes());
    packet[8] = 64;
    packet[9] = protocol;
    packet[12..16].copy_from_slice(&src.octets());
    packet[16..20].copy_from_slice(&dst.octets());
    let csum = checksum(&packet);
    packet[10..12].copy_from_slice(&csum.to_be_bytes());
    packet.extend_from_slice(payload);
    packet
}
