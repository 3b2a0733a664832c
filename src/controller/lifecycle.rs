//! Switch bring-up

use super::{Decision, FlowRule, SwitchId, TopologyStore};
use tracing::info;

/// A switch finished its handshake: punt everything it can't match and give
/// it an empty MAC table.
///
/// Disconnects are not tracked; a switch that goes away keeps its table.
pub fn switch_connected(switch: SwitchId, topology: &TopologyStore) -> Decision {
    info!("Switch {} connected", switch);
    topology.init_switch(switch);

    Decision::Install {
        switch,
        rule: FlowRule::table_miss(),
    }
}
