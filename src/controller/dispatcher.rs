//! Event dispatch
//!
//! Routes each switch event to its handler and carries out the resulting
//! decision against the actuator. Handling is synchronous and runs to
//! completion; events for different switches may arrive from any thread.

use super::arp_handler::process_arp;
use super::classifier::{classify, Classified};
use super::ip_handler::{process_ipv4, ForwardingParams};
use super::lifecycle::switch_connected;
use super::{Decision, DropReason, PolicyStore, PortNo, SwitchActuator, SwitchId, TopologyStore};
use crate::config::Config;
use crate::telemetry::MetricsRegistry;
use std::sync::Arc;
use tracing::{debug, trace};

/// Events delivered by the switch collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchEvent {
    SwitchConnected {
        switch: SwitchId,
    },
    PacketIn {
        switch: SwitchId,
        in_port: PortNo,
        data: Vec<u8>,
    },
}

/// The forwarding-decision engine
pub struct Controller {
    topology: Arc<TopologyStore>,
    policy: Arc<PolicyStore>,
    params: ForwardingParams,
    actuator: Arc<dyn SwitchActuator>,
    metrics: Arc<MetricsRegistry>,
}

impl Controller {
    pub fn new(
        actuator: Arc<dyn SwitchActuator>,
        policy: PolicyStore,
        params: ForwardingParams,
    ) -> Self {
        Self {
            topology: Arc::new(TopologyStore::new()),
            policy: Arc::new(policy),
            params,
            actuator,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Build a controller with the whitelist seed and forwarding settings of `config`
    pub fn from_config(config: &Config, actuator: Arc<dyn SwitchActuator>) -> Self {
        Self::new(
            actuator,
            PolicyStore::with_pairs(config.whitelist_pairs()),
            config.forwarding_params(),
        )
    }

    pub fn handle_event(&self, event: &SwitchEvent) -> Decision {
        match event {
            SwitchEvent::SwitchConnected { switch } => self.switch_connected(*switch),
            SwitchEvent::PacketIn {
                switch,
                in_port,
                data,
            } => self.packet_in(*switch, *in_port, data),
        }
    }

    pub fn switch_connected(&self, switch: SwitchId) -> Decision {
        let decision = switch_connected(switch, &self.topology);
        self.metrics.switches_connected.inc();
        self.metrics.record_decision(&decision, false);
        self.apply(&decision, &[]);
        decision
    }

    pub fn packet_in(&self, switch: SwitchId, in_port: PortNo, data: &[u8]) -> Decision {
        self.metrics.packet_in.inc();

        let classified = match classify(data) {
            Ok(c) => c,
            Err(e) => {
                debug!("Ignoring packet-in from switch {} port {}: {}", switch, in_port, e);
                let decision = Decision::Drop(DropReason::Malformed);
                self.metrics.record_decision(&decision, false);
                return decision;
            }
        };

        let (decision, arp) = match &classified {
            Classified::Arp(arp) => (
                process_arp(arp, switch, in_port, &self.topology, &self.policy),
                true,
            ),
            Classified::Ipv4(ip) => (
                process_ipv4(
                    ip,
                    switch,
                    in_port,
                    &self.topology,
                    &self.policy,
                    &self.params,
                ),
                false,
            ),
            Classified::NotIpv4 { ethertype } => {
                trace!("No IPv4 header in ethertype 0x{:04x}, ignoring", ethertype);
                (Decision::Drop(DropReason::NotIpv4), false)
            }
        };

        self.metrics.record_decision(&decision, arp);
        self.apply(&decision, data);
        decision
    }

    /// Issue the switch operations a decision calls for.
    /// The rule goes out before the packet so follow-up packets hit it.
    fn apply(&self, decision: &Decision, data: &[u8]) {
        match decision {
            Decision::Forward {
                switch,
                in_port,
                out_port,
            } => self.actuator.send_packet(*switch, *in_port, *out_port, data),
            Decision::InstallAndForward {
                switch,
                in_port,
                out_port,
                rule,
            } => {
                self.actuator.install_rule(*switch, rule);
                self.actuator.send_packet(*switch, *in_port, *out_port, data);
            }
            Decision::Install { switch, rule } => self.actuator.install_rule(*switch, rule),
            Decision::Drop(_) => {}
        }
    }

    pub fn topology(&self) -> &Arc<TopologyStore> {
        &self.topology
    }

    pub fn policy(&self) -> &Arc<PolicyStore> {
        &self.policy
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }
}
