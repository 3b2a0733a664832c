//! Configuration types

use crate::controller::{
    ForwardingParams, IpPair, PortNo, SwitchId, DEFAULT_FLOW_IDLE_TIMEOUT, DEFAULT_FLOW_PRIORITY,
    DEFAULT_INTER_SWITCH_PORT,
};
use crate::telemetry::LogConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Interval of the stats log line, in seconds
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 60;

/// Longest accepted stats interval (one day)
pub const MAX_STATS_INTERVAL_SECS: u64 = 86_400;

/// User-defined configuration (config.toml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Seed whitelist. An absent key means the built-in seed, an empty
    /// array means deny everything.
    #[serde(default = "default_whitelist")]
    pub whitelist: Vec<IpPair>,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
    #[serde(default)]
    pub logging: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            whitelist: default_whitelist(),
            links: Vec::new(),
            logging: LogConfig::default(),
        }
    }
}

/// h1 and h2 of the reference two-switch topology, both directions
fn default_whitelist() -> Vec<IpPair> {
    vec![
        IpPair::new("10.0.0.1", "10.0.0.2"),
        IpPair::new("10.0.0.2", "10.0.0.1"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Egress port used when the destination sits on another switch
    pub inter_switch_port: PortNo,
    pub flow_priority: u16,
    /// Seconds of inactivity before a switch removes a flow
    pub flow_idle_timeout: u16,
    /// 0 disables the periodic stats line
    pub stats_interval_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            inter_switch_port: DEFAULT_INTER_SWITCH_PORT,
            flow_priority: DEFAULT_FLOW_PRIORITY,
            flow_idle_timeout: DEFAULT_FLOW_IDLE_TIMEOUT,
            stats_interval_secs: DEFAULT_STATS_INTERVAL_SECS,
        }
    }
}

/// Port on `switch` that leads to `peer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub switch: SwitchId,
    pub peer: SwitchId,
    pub port: PortNo,
}

impl Config {
    pub fn whitelist_pairs(&self) -> Vec<IpPair> {
        self.whitelist.clone()
    }

    pub fn forwarding_params(&self) -> ForwardingParams {
        ForwardingParams {
            inter_switch_port: self.controller.inter_switch_port,
            links: self
                .links
                .iter()
                .map(|l| ((l.switch, l.peer), l.port))
                .collect(),
            flow_priority: self.controller.flow_priority,
            flow_idle_timeout: self.controller.flow_idle_timeout,
        }
    }

    pub fn stats_interval(&self) -> Option<Duration> {
        match self.controller.stats_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
