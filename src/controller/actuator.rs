//! Switch-facing side effects
//!
//! The OpenFlow session layer implements [`SwitchActuator`]; the controller
//! only ever issues the two primitives below and never waits for an answer.

use super::{FlowRule, PortNo, SwitchId};
use parking_lot::Mutex;
use tracing::info;

/// Operations the controller issues against switches
pub trait SwitchActuator: Send + Sync {
    /// FlowMod add of `rule` on `switch`
    fn install_rule(&self, switch: SwitchId, rule: &FlowRule);

    /// PacketOut of `data` on `switch`, unbuffered
    fn send_packet(&self, switch: SwitchId, in_port: PortNo, out_port: PortNo, data: &[u8]);
}

/// One issued operation, as captured by [`RecordingActuator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOp {
    InstallRule {
        switch: SwitchId,
        rule: FlowRule,
    },
    SendPacket {
        switch: SwitchId,
        in_port: PortNo,
        out_port: PortNo,
        data: Vec<u8>,
    },
}

/// Keeps every issued operation in order
#[derive(Debug, Default)]
pub struct RecordingActuator {
    ops: Mutex<Vec<SwitchOp>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<SwitchOp> {
        self.ops.lock().clone()
    }

    /// Drain the recorded operations
    pub fn take(&self) -> Vec<SwitchOp> {
        std::mem::take(&mut *self.ops.lock())
    }

    pub fn installed_rules(&self) -> Vec<(SwitchId, FlowRule)> {
        self.ops
            .lock()
            .iter()
            .filter_map(|op| match op {
                SwitchOp::InstallRule { switch, rule } => Some((*switch, rule.clone())),
                SwitchOp::SendPacket { .. } => None,
            })
            .collect()
    }

    pub fn sent_packets(&self) -> Vec<(SwitchId, PortNo, PortNo)> {
        self.ops
            .lock()
            .iter()
            .filter_map(|op| match op {
                SwitchOp::SendPacket {
                    switch,
                    in_port,
                    out_port,
                    ..
                } => Some((*switch, *in_port, *out_port)),
                SwitchOp::InstallRule { .. } => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.lock().is_empty()
    }
}

impl SwitchActuator for RecordingActuator {
    fn install_rule(&self, switch: SwitchId, rule: &FlowRule) {
        self.ops.lock().push(SwitchOp::InstallRule {
            switch,
            rule: rule.clone(),
        });
    }

    fn send_packet(&self, switch: SwitchId, in_port: PortNo, out_port: PortNo, data: &[u8]) {
        self.ops.lock().push(SwitchOp::SendPacket {
            switch,
            in_port,
            out_port,
            data: data.to_vec(),
        });
    }
}

/// Logs each operation instead of sending it anywhere
#[derive(Debug, Default)]
pub struct LoggingActuator;

impl SwitchActuator for LoggingActuator {
    fn install_rule(&self, switch: SwitchId, rule: &FlowRule) {
        info!(
            switch,
            priority = rule.priority,
            idle_timeout = rule.idle_timeout,
            out_port = ?rule.out_port(),
            "FlowMod {:?}",
            rule.flow_match
        );
    }

    fn send_packet(&self, switch: SwitchId, in_port: PortNo, out_port: PortNo, data: &[u8]) {
        info!(switch, in_port, out_port, len = data.len(), "PacketOut");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_keeps_order() {
        let act = RecordingActuator::new();
        act.install_rule(1, &FlowRule::table_miss());
        act.send_packet(1, 1, 2, &[1, 2, 3]);

        let ops = act.ops();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], SwitchOp::InstallRule { switch: 1, .. }));
        assert_eq!(
            ops[1],
            SwitchOp::SendPacket {
                switch: 1,
                in_port: 1,
                out_port: 2,
                data: vec![1, 2, 3]
            }
        );
        assert_eq!(act.installed_rules().len(), 1);
        assert_eq!(act.sent_packets(), vec![(1, 1, 2)]);
    }

    #[test]
    fn test_take_drains() {
        let act = RecordingActuator::new();
        act.send_packet(1, 1, 2, &[]);
        assert_eq!(act.take().len(), 1);
        assert!(act.is_empty());
    }
}
