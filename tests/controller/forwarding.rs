//! Forwarding scenarios
//!
//! Topology:
//! ```text
//!   h1 (10.0.0.1) --p1-- s1 --p3====p3-- s2 --p1-- h3 (10.0.0.3)
//!   h2 (10.0.0.2) --p2--/
//! ```

use super::fabric::{Fabric, H1, H2, H3};
use ofguard::config::{Config, LinkConfig};
use ofguard::controller::{
    Action, Decision, DropReason, FlowMatch, FlowRule, IpPair, PolicyStore, SwitchOp,
    OFPCML_NO_BUFFER, OFPP_CONTROLLER,
};
use std::sync::Arc;
use std::thread;

/// Bring-up installs the table-miss rule and an empty port table
#[test]
fn test_switch_bring_up() {
    let fabric = Fabric::new();
    fabric.connect(1);

    let rules = fabric.actuator.installed_rules();
    assert_eq!(rules.len(), 1);
    let (switch, rule) = &rules[0];
    assert_eq!(*switch, 1);
    assert_eq!(rule.priority, 0);
    assert!(rule.flow_match.is_empty());
    assert_eq!(
        rule.actions,
        vec![Action::Output {
            port: OFPP_CONTROLLER,
            max_len: OFPCML_NO_BUFFER
        }]
    );

    let topo = fabric.management().topology();
    assert_eq!(topo.switches.len(), 1);
    assert!(topo.switches[0].ports.is_empty());
}

/// Permitted pair with a known destination: one rule, one packet-out
#[test]
fn test_permit_and_learn() {
    let fabric = Fabric::new();
    fabric.connect(1);
    fabric.arp_request(1, 2, H2, H1);
    fabric.actuator.take();

    let frame = fabric.ip_frame(H1, H2);
    fabric.controller.packet_in(1, 1, &frame);

    assert_eq!(
        fabric.actuator.ops(),
        vec![
            SwitchOp::InstallRule {
                switch: 1,
                rule: FlowRule {
                    priority: 10,
                    flow_match: FlowMatch::ipv4_pair(H1.ip, H2.ip),
                    actions: vec![Action::output(2)],
                    idle_timeout: 30,
                },
            },
            SwitchOp::SendPacket {
                switch: 1,
                in_port: 1,
                out_port: 2,
                data: frame,
            },
        ]
    );
}

/// An 802.1Q-tagged packet is handled like an untagged one
#[test]
fn test_vlan_tagged_ipv4() {
    let fabric = Fabric::new();
    fabric.arp_request(1, 2, H2, H1);
    fabric.actuator.take();

    let frame = fabric.tagged_ip_frame(H1, H2, 10);
    assert_eq!(&frame[12..18], &[0x81, 0x00, 0x00, 0x0a, 0x08, 0x00]);

    let decision = fabric.controller.packet_in(1, 1, &frame);
    assert!(matches!(
        decision,
        Decision::InstallAndForward { switch: 1, in_port: 1, out_port: 2, .. }
    ));

    let rules = fabric.actuator.installed_rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].1.flow_match, FlowMatch::ipv4_pair(H1.ip, H2.ip));
    assert_eq!(fabric.actuator.sent_packets(), vec![(1, 1, 2)]);

    let hosts = fabric.management().topology().hosts;
    assert_eq!(hosts.len(), 2);
    assert!(hosts.iter().any(|h| h.ip == H1.ip && h.port == 1));
}

/// A pair outside the whitelist never reaches the actuator
#[test]
fn test_default_deny() {
    let fabric = Fabric::new();
    fabric.connect(1);
    fabric.connect(2);
    fabric.arp_request(2, 1, H3, H1);
    fabric.ip(2, 1, H3, H1);
    fabric.actuator.take();

    assert_eq!(
        fabric.arp_request(1, 1, H1, H3),
        Decision::Drop(DropReason::PolicyDenied)
    );
    assert_eq!(
        fabric.ip(1, 1, H1, H3),
        Decision::Drop(DropReason::PolicyDenied)
    );
    assert!(fabric.actuator.is_empty());

    // Denied traffic still teaches the controller where h1 lives
    let hosts = fabric.management().topology().hosts;
    assert!(hosts.iter().any(|h| h.ip == H1.ip && h.switch == 1));
}

#[test]
fn test_unknown_destination() {
    let fabric = Fabric::new();
    fabric.connect(1);
    fabric.actuator.take();

    assert_eq!(
        fabric.arp_request(1, 1, H1, H2),
        Decision::Drop(DropReason::UnknownDestination)
    );
    assert_eq!(
        fabric.ip(1, 1, H1, H2),
        Decision::Drop(DropReason::UnknownDestination)
    );
    assert!(fabric.actuator.is_empty());
}

#[test]
fn test_arp_never_installs_rules() {
    let fabric = Fabric::new();
    fabric.arp_request(1, 1, H1, H2);
    fabric.arp_request(1, 2, H2, H1);
    fabric.arp_request(1, 1, H1, H2);

    assert!(fabric.actuator.installed_rules().is_empty());
    assert_eq!(fabric.actuator.sent_packets(), vec![(1, 2, 1), (1, 1, 2)]);
}

/// ARP for a host on another switch is emitted on that host's switch
#[test]
fn test_arp_across_switches() {
    let mut config = Config::default();
    config.whitelist.push(IpPair::new("10.0.0.1", "10.0.0.3"));
    let fabric = Fabric::from_config(&config);

    fabric.arp_request(2, 1, H3, H1);
    fabric.actuator.take();

    assert_eq!(
        fabric.arp_request(1, 1, H1, H3),
        Decision::Forward {
            switch: 2,
            in_port: OFPP_CONTROLLER,
            out_port: 1
        }
    );
}

/// A relayed ARP never leaves the ingress switch on the target's port number
#[test]
fn test_arp_relay_stays_off_ingress_switch() {
    let mut config = Config::default();
    config.whitelist.push(IpPair::new("10.0.0.1", "10.0.0.3"));
    let fabric = Fabric::from_config(&config);
    fabric.connect(1);
    fabric.connect(2);

    // h3 sits on s2 port 1, which is also h1's port number on s1
    fabric.arp_request(2, 1, H3, H1);
    fabric.actuator.take();

    fabric.arp_request(1, 1, H1, H3);
    assert_eq!(
        fabric.actuator.sent_packets(),
        vec![(2, OFPP_CONTROLLER, 1)]
    );
    assert!(fabric.actuator.installed_rules().is_empty());
}

/// Destination on another switch goes out the inter-switch port
#[test]
fn test_cross_switch_fallback() {
    let mut config = Config::default();
    config.whitelist.push(IpPair::new("10.0.0.1", "10.0.0.3"));
    let fabric = Fabric::from_config(&config);
    fabric.connect(1);
    fabric.connect(2);
    fabric.arp_request(2, 1, H3, H1);
    fabric.actuator.take();

    fabric.ip(1, 1, H1, H3);

    let rules = fabric.actuator.installed_rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].0, 1);
    assert_eq!(rules[0].1.out_port(), Some(3));
    assert_eq!(fabric.actuator.sent_packets(), vec![(1, 1, 3)]);
}

/// A configured adjacency replaces the fixed inter-switch port
#[test]
fn test_configured_link() {
    let mut config = Config::default();
    config.whitelist.push(IpPair::new("10.0.0.1", "10.0.0.3"));
    config.links.push(LinkConfig {
        switch: 1,
        peer: 2,
        port: 4,
    });
    let fabric = Fabric::from_config(&config);
    fabric.arp_request(2, 1, H3, H1);
    fabric.actuator.take();

    fabric.ip(1, 1, H1, H3);
    assert_eq!(fabric.actuator.sent_packets(), vec![(1, 1, 4)]);
}

/// A host seen on a new port is reached there from then on
#[test]
fn test_host_move() {
    let fabric = Fabric::new();
    fabric.arp_request(1, 2, H2, H1);
    fabric.arp_request(1, 5, H2, H1);
    fabric.actuator.take();

    fabric.ip(1, 1, H1, H2);
    assert_eq!(fabric.actuator.sent_packets(), vec![(1, 1, 5)]);
}

/// Whitelist changes apply to the next packet
#[test]
fn test_runtime_whitelist_change() {
    let fabric = Fabric::with_policy(PolicyStore::new());
    fabric.arp_request(1, 2, H2, H1);

    assert_eq!(
        fabric.ip(1, 1, H1, H2),
        Decision::Drop(DropReason::PolicyDenied)
    );

    let mgmt = fabric.management();
    assert!(mgmt
        .add_pair(r#"{"src": "10.0.0.1", "dst": "10.0.0.2"}"#)
        .is_success());
    assert!(matches!(
        fabric.ip(1, 1, H1, H2),
        Decision::InstallAndForward { out_port: 2, .. }
    ));

    assert!(mgmt
        .remove_pair(r#"{"src": "10.0.0.1", "dst": "10.0.0.2"}"#)
        .is_success());
    assert_eq!(
        fabric.ip(1, 1, H1, H2),
        Decision::Drop(DropReason::PolicyDenied)
    );
}

/// Events from several switches handled concurrently
#[test]
fn test_concurrent_switches() {
    let fabric = Arc::new(Fabric::new());

    let handles: Vec<_> = (1..=4u64)
        .map(|switch| {
            let fabric = fabric.clone();
            thread::spawn(move || {
                fabric.connect(switch);
                for _ in 0..50 {
                    fabric.arp_request(switch, 1, H1, H2);
                    fabric.arp_request(switch, 2, H2, H1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = fabric.management().stats();
    assert_eq!(stats.total_switches, 4);
    assert_eq!(stats.total_hosts, 2);
    assert_eq!(fabric.controller.metrics().packet_in.get(), 400);
    assert_eq!(fabric.actuator.installed_rules().len(), 4);
}
