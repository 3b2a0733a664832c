//! ARP handling
//!
//! Learns the sender's location, then relays the message only to a target
//! the controller already knows about. ARP is never flooded and never gets a
//! flow rule, so every ARP packet keeps coming back to the controller.

use super::{Decision, DropReason, PolicyStore, PortNo, SwitchId, TopologyStore, OFPP_CONTROLLER};
use crate::protocol::arp::ArpPacket;
use tracing::{info, warn};

/// Process an ARP packet punted by `switch` on `in_port`
pub fn process_arp(
    packet: &ArpPacket,
    switch: SwitchId,
    in_port: PortNo,
    topology: &TopologyStore,
    policy: &PolicyStore,
) -> Decision {
    let src = packet.sender_ip.to_string();
    let dst = packet.target_ip.to_string();

    topology.learn(packet.sender_ip, packet.sender_mac, switch, in_port);

    info!(
        "ARP {:?}: {} ({}) -> {} on switch {} port {}",
        packet.op, src, packet.sender_mac, dst, switch, in_port
    );

    if !policy.is_allowed(&src, &dst) {
        warn!("ARP denied: {} -> {}", src, dst);
        return Decision::Drop(DropReason::PolicyDenied);
    }

    let Some(target) = topology.lookup_host(&packet.target_ip) else {
        warn!("ARP target {} unknown, dropping", dst);
        return Decision::Drop(DropReason::UnknownDestination);
    };

    // Emitted on the switch where the target was learned. On the ingress
    // switch of a two-switch fabric, the target's port number names some
    // other local port (or the ingress port itself). The ingress port means
    // nothing on the target's switch, so the packet is injected as if from
    // the controller.
    let in_port = if target.switch == switch {
        in_port
    } else {
        OFPP_CONTROLLER
    };

    Decision::Forward {
        switch: target.switch,
        in_port,
        out_port: target.port,
    }
}
