//! IPv4 handling and flow-rule synthesis

use super::classifier::Ipv4Summary;
use super::{
    Action, Decision, DropReason, FlowMatch, FlowRule, HostRecord, PolicyStore, PortNo, SwitchId,
    TopologyStore,
};
use crate::protocol::MacAddr;
use std::collections::HashMap;
use tracing::{info, warn};

/// Port that leads from one switch to the other in the reference two-switch fabric
pub const DEFAULT_INTER_SWITCH_PORT: PortNo = 3;

/// Priority of per-pair IPv4 rules; must stay above the table-miss rule
pub const DEFAULT_FLOW_PRIORITY: u16 = 10;

/// Idle timeout of per-pair IPv4 rules, in seconds
pub const DEFAULT_FLOW_IDLE_TIMEOUT: u16 = 30;

/// How egress ports are chosen and what installed rules look like
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingParams {
    /// Fallback egress when the destination MAC is not local
    pub inter_switch_port: PortNo,
    /// Explicit (switch, peer switch) -> port adjacencies
    pub links: HashMap<(SwitchId, SwitchId), PortNo>,
    pub flow_priority: u16,
    pub flow_idle_timeout: u16,
}

impl Default for ForwardingParams {
    fn default() -> Self {
        Self {
            inter_switch_port: DEFAULT_INTER_SWITCH_PORT,
            links: HashMap::new(),
            flow_priority: DEFAULT_FLOW_PRIORITY,
            flow_idle_timeout: DEFAULT_FLOW_IDLE_TIMEOUT,
        }
    }
}

impl ForwardingParams {
    /// Pick the egress port on `switch` towards `dst`.
    ///
    /// A destination MAC learned on this switch wins. Otherwise a configured
    /// link towards the destination's switch is used, and failing that the
    /// fixed inter-switch port. With no links configured this is only correct
    /// for two switches joined by a single link.
    pub fn egress_port(
        &self,
        topology: &TopologyStore,
        switch: SwitchId,
        dst_mac: &MacAddr,
        dst: &HostRecord,
    ) -> PortNo {
        if let Some(port) = topology.lookup_port(switch, dst_mac) {
            return port;
        }
        if dst.switch != switch {
            if let Some(port) = self.links.get(&(switch, dst.switch)) {
                return *port;
            }
        }
        self.inter_switch_port
    }
}

/// Process an IPv4 packet punted by `switch` on `in_port`
pub fn process_ipv4(
    packet: &Ipv4Summary,
    switch: SwitchId,
    in_port: PortNo,
    topology: &TopologyStore,
    policy: &PolicyStore,
    params: &ForwardingParams,
) -> Decision {
    let src = packet.src_ip.to_string();
    let dst = packet.dst_ip.to_string();

    topology.learn(packet.src_ip, packet.src_mac, switch, in_port);

    info!("IP: {} -> {} on switch {} port {}", src, dst, switch, in_port);

    if !policy.is_allowed(&src, &dst) {
        warn!("IP denied: {} -> {}", src, dst);
        return Decision::Drop(DropReason::PolicyDenied);
    }

    let Some(dst_host) = topology.lookup_host(&packet.dst_ip) else {
        warn!("IP destination {} unknown, dropping", dst);
        return Decision::Drop(DropReason::UnknownDestination);
    };

    let out_port = params.egress_port(topology, switch, &packet.dst_mac, &dst_host);

    info!("IP allowed: {} -> {} via port {}", src, dst, out_port);

    Decision::InstallAndForward {
        switch,
        in_port,
        out_port,
        rule: FlowRule {
            priority: params.flow_priority,
            flow_match: FlowMatch::ipv4_pair(packet.src_ip, packet.dst_ip),
            actions: vec![Action::output(out_port)],
            idle_timeout: params.flow_idle_timeout,
        },
    }
}
