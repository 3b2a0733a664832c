//! Forwarding-decision engine
//!
//! Learns topology from packet-ins, enforces the whitelist, and turns each
//! event into a [`Decision`] that is carried out through a [`SwitchActuator`].

mod actuator;
mod arp_handler;
mod classifier;
mod decision;
mod dispatcher;
mod event_loop;
mod ip_handler;
mod lifecycle;
mod policy;
mod topology;

pub use actuator::{LoggingActuator, RecordingActuator, SwitchActuator, SwitchOp};
pub use arp_handler::process_arp;
pub use classifier::{classify, Classified, Ipv4Summary};
pub use decision::{
    Action, Decision, DropReason, FlowMatch, FlowRule, OFPCML_NO_BUFFER, OFPP_CONTROLLER,
    OFPP_MAX, TABLE_MISS_PRIORITY,
};
pub use dispatcher::{Controller, SwitchEvent};
pub use event_loop::{run_event_loop, EventSender};
pub use ip_handler::{
    process_ipv4, ForwardingParams, DEFAULT_FLOW_IDLE_TIMEOUT, DEFAULT_FLOW_PRIORITY,
    DEFAULT_INTER_SWITCH_PORT,
};
pub use lifecycle::switch_connected;
pub use policy::{IpPair, PolicyStore};
pub use topology::{HostRecord, PortNo, SwitchId, TopologyStore};
