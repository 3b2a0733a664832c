//! Configuration validation

use super::{Config, MAX_STATS_INTERVAL_SECS};
use crate::controller::{PortNo, OFPP_MAX};
use crate::telemetry::is_known_level;
use std::collections::HashSet;
use std::net::Ipv4Addr;

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn print_diagnostics(&self) {
        for warning in &self.warnings {
            println!("[WARN] {}", warning);
        }
        for error in &self.errors {
            println!("[ERROR] {}", error);
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_controller(config, &mut result);
    validate_whitelist(config, &mut result);
    validate_links(config, &mut result);
    validate_logging(config, &mut result);

    result
}

/// 0 is not a port; OFPP_MAX and above are the reserved logical ports
fn is_physical_port(port: PortNo) -> bool {
    port != 0 && port < OFPP_MAX
}

fn validate_controller(config: &Config, result: &mut ValidationResult) {
    let ctl = &config.controller;

    if !is_physical_port(ctl.inter_switch_port) {
        result.error(format!(
            "controller.inter_switch_port: {} is a reserved OpenFlow port",
            ctl.inter_switch_port
        ));
    }

    // Would tie with the table-miss rule
    if ctl.flow_priority == 0 {
        result.error("controller.flow_priority: must be greater than 0");
    }

    if ctl.flow_idle_timeout == 0 {
        result.warn("controller.flow_idle_timeout: 0 means installed flows never expire");
    }

    if ctl.stats_interval_secs == 0 {
        result.warn("controller.stats_interval_secs: 0 disables periodic stats");
    } else if ctl.stats_interval_secs > MAX_STATS_INTERVAL_SECS {
        result.error(format!(
            "controller.stats_interval_secs: {} exceeds the maximum of {}",
            ctl.stats_interval_secs, MAX_STATS_INTERVAL_SECS
        ));
    }
}

fn validate_whitelist(config: &Config, result: &mut ValidationResult) {
    let mut seen = HashSet::new();

    for (i, pair) in config.whitelist.iter().enumerate() {
        for (field, addr) in [("src", &pair.src), ("dst", &pair.dst)] {
            if !is_canonical_ipv4(addr) {
                result.warn(format!(
                    "whitelist[{}].{}: '{}' is not a dotted-quad IPv4 address and will never match traffic",
                    i, field, addr
                ));
            }
        }

        if pair.src == pair.dst {
            result.warn(format!(
                "whitelist[{}]: '{}' paired with itself",
                i, pair.src
            ));
        }

        if !seen.insert(pair) {
            result.warn(format!("whitelist[{}]: duplicate pair {}", i, pair));
        }
    }
}

/// Packet addresses are compared as their dotted-quad rendering
fn is_canonical_ipv4(addr: &str) -> bool {
    addr.parse::<Ipv4Addr>()
        .map(|ip| ip.to_string() == addr)
        .unwrap_or(false)
}

fn validate_links(config: &Config, result: &mut ValidationResult) {
    let mut seen = HashSet::new();

    for (i, link) in config.links.iter().enumerate() {
        if !is_physical_port(link.port) {
            result.error(format!(
                "links[{}]: port {} is a reserved OpenFlow port",
                i, link.port
            ));
        }

        if link.switch == link.peer {
            result.error(format!(
                "links[{}]: switch {} linked to itself",
                i, link.switch
            ));
        }

        if !seen.insert((link.switch, link.peer)) {
            result.error(format!(
                "links[{}]: duplicate link from switch {} to switch {}",
                i, link.switch, link.peer
            ));
        }
    }
}

fn validate_logging(config: &Config, result: &mut ValidationResult) {
    if !is_known_level(&config.logging.level) {
        result.warn(format!(
            "logging.level: unknown level '{}', using info",
            config.logging.level
        ));
    }
}
