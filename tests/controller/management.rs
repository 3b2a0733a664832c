//! Management surface against a live controller

use super::fabric::{Fabric, H1, H2, H3};
use serde_json::{json, Value};

#[test]
fn test_snapshots_after_traffic() {
    let fabric = Fabric::new();
    fabric.connect(1);
    fabric.connect(2);
    fabric.arp_request(1, 1, H1, H2);
    fabric.arp_request(1, 2, H2, H1);
    fabric.arp_request(2, 1, H3, H1);

    let mgmt = fabric.management();
    let topo = serde_json::to_value(mgmt.topology()).unwrap();
    assert_eq!(
        topo,
        json!({
            "hosts": [
                {"ip": "10.0.0.1", "mac": "aa:00:00:00:00:01", "switch": 1, "port": 1},
                {"ip": "10.0.0.2", "mac": "bb:00:00:00:00:02", "switch": 1, "port": 2},
                {"ip": "10.0.0.3", "mac": "cc:00:00:00:00:03", "switch": 2, "port": 1}
            ],
            "switches": [
                {"switch_id": 1, "ports": [
                    {"mac": "aa:00:00:00:00:01", "port": 1},
                    {"mac": "bb:00:00:00:00:02", "port": 2}
                ]},
                {"switch_id": 2, "ports": [
                    {"mac": "cc:00:00:00:00:03", "port": 1}
                ]}
            ]
        })
    );

    assert_eq!(
        serde_json::to_value(mgmt.stats()).unwrap(),
        json!({"total_hosts": 3, "total_switches": 2, "whitelist_rules": 2})
    );
}

#[test]
fn test_whitelist_idempotence() {
    let fabric = Fabric::new();
    let mgmt = fabric.management();
    let body = r#"{"src": "10.0.0.1", "dst": "10.0.0.3"}"#;

    mgmt.add_pair(body);
    mgmt.add_pair(body);
    assert_eq!(mgmt.stats().whitelist_rules, 3);

    mgmt.remove_pair(body);
    let resp = mgmt.remove_pair(body);
    assert!(resp.is_success());
    assert_eq!(mgmt.stats().whitelist_rules, 2);
}

#[test]
fn test_whitelist_listing() {
    let fabric = Fabric::new();
    let value = serde_json::to_value(fabric.management().whitelist()).unwrap();

    assert_eq!(
        value,
        json!({"whitelist": [
            {"src": "10.0.0.1", "dst": "10.0.0.2"},
            {"src": "10.0.0.2", "dst": "10.0.0.1"}
        ]})
    );
}

#[test]
fn test_malformed_request() {
    let fabric = Fabric::new();
    let mgmt = fabric.management();

    let resp = mgmt.add_pair(r#"{"dst": "10.0.0.3"}"#);
    let value: Value = serde_json::to_value(&resp).unwrap();
    assert_eq!(value["status"], "error");
    assert!(value["message"].as_str().unwrap().contains("src"));
    assert_eq!(mgmt.stats().whitelist_rules, 2);
}
