//! Management surface
//!
//! Read-only snapshots of the learned topology and the whitelist, plus the
//! two whitelist mutators. Every type here serializes to the JSON body an
//! HTTP front end would return as-is.

use crate::controller::{Controller, IpPair, PolicyStore, PortNo, SwitchId, TopologyStore};
use crate::protocol::MacAddr;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostView {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
    pub switch: SwitchId,
    pub port: PortNo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortView {
    pub mac: MacAddr,
    pub port: PortNo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchView {
    pub switch_id: SwitchId,
    pub ports: Vec<PortView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologyView {
    pub hosts: Vec<HostView>,
    pub switches: Vec<SwitchView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhitelistView {
    pub whitelist: Vec<IpPair>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsView {
    pub total_hosts: usize,
    pub total_switches: usize,
    pub whitelist_rules: usize,
}

/// Body of a whitelist add/remove request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PairRequest {
    pub src: String,
    pub dst: String,
}

impl PairRequest {
    /// Parse a request body. Both fields are required and must be non-empty.
    pub fn from_json(body: &str) -> Result<Self> {
        let req: PairRequest = serde_json::from_str(body)
            .map_err(|e| Error::InvalidRequest(e.to_string()))?;

        if req.src.trim().is_empty() {
            return Err(Error::InvalidRequest("'src' must not be empty".to_string()));
        }
        if req.dst.trim().is_empty() {
            return Err(Error::InvalidRequest("'dst' must not be empty".to_string()));
        }

        Ok(req)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Result envelope of a mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationResponse {
    pub status: Status,
    pub message: String,
}

impl MutationResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
        }
    }

    pub fn error(err: &Error) -> Self {
        Self {
            status: Status::Error,
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// HTTP status a front end should answer with
    pub fn http_status(&self) -> u16 {
        match self.status {
            Status::Success => 200,
            Status::Error => 400,
        }
    }
}

/// Handle onto the controller's shared stores
#[derive(Debug, Clone)]
pub struct Management {
    topology: Arc<TopologyStore>,
    policy: Arc<PolicyStore>,
}

impl Management {
    pub fn new(topology: Arc<TopologyStore>, policy: Arc<PolicyStore>) -> Self {
        Self { topology, policy }
    }

    pub fn for_controller(controller: &Controller) -> Self {
        Self::new(controller.topology().clone(), controller.policy().clone())
    }

    pub fn topology(&self) -> TopologyView {
        let hosts = self
            .topology
            .hosts()
            .into_iter()
            .map(|(ip, rec)| HostView {
                ip,
                mac: rec.mac,
                switch: rec.switch,
                port: rec.port,
            })
            .collect();

        let switches = self
            .topology
            .port_tables()
            .into_iter()
            .map(|(switch_id, table)| SwitchView {
                switch_id,
                ports: table
                    .into_iter()
                    .map(|(mac, port)| PortView { mac, port })
                    .collect(),
            })
            .collect();

        TopologyView { hosts, switches }
    }

    pub fn whitelist(&self) -> WhitelistView {
        WhitelistView {
            whitelist: self.policy.pairs(),
        }
    }

    pub fn stats(&self) -> StatsView {
        StatsView {
            total_hosts: self.topology.host_count(),
            total_switches: self.topology.switch_count(),
            whitelist_rules: self.policy.len(),
        }
    }

    /// Add a pair from a JSON body. Adding a present pair still succeeds.
    pub fn add_pair(&self, body: &str) -> MutationResponse {
        match PairRequest::from_json(body) {
            Ok(req) => {
                self.policy.add(&req.src, &req.dst);
                info!("Whitelist pair added: {} -> {}", req.src, req.dst);
                MutationResponse::success(format!("Added {} -> {}", req.src, req.dst))
            }
            Err(e) => MutationResponse::error(&e),
        }
    }

    /// Remove a pair from a JSON body. Removing an absent pair still succeeds.
    pub fn remove_pair(&self, body: &str) -> MutationResponse {
        match PairRequest::from_json(body) {
            Ok(req) => {
                self.policy.remove(&req.src, &req.dst);
                info!("Whitelist pair removed: {} -> {}", req.src, req.dst);
                MutationResponse::success(format!("Removed {} -> {}", req.src, req.dst))
            }
            Err(e) => MutationResponse::error(&e),
        }
    }
}
