//! Async front end for the controller
//!
//! Switch sessions push [`SwitchEvent`]s into a bounded channel; a single task
//! drains it and hands each event to the [`Controller`]. A periodic tick logs
//! the counters.

use super::{Controller, SwitchEvent};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

/// Cloneable handle for feeding events to the loop
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<SwitchEvent>,
}

impl EventSender {
    /// Create a sender and the receiver [`run_event_loop`] consumes
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SwitchEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub async fn send(&self, event: SwitchEvent) -> Result<()> {
        self.tx.send(event).await.map_err(|_| Error::ChannelClosed)
    }
}

/// Process events until every sender is dropped.
///
/// `stats_interval` of `None` disables the periodic counter dump.
/// Returns the number of events handled.
pub async fn run_event_loop(
    controller: Arc<Controller>,
    mut rx: mpsc::Receiver<SwitchEvent>,
    stats_interval: Option<Duration>,
) -> u64 {
    let now = Instant::now();
    let stats_start = match stats_interval.filter(|d| !d.is_zero()) {
        Some(period) => match now.checked_add(period) {
            Some(start) => Some((start, period)),
            None => {
                warn!("Stats interval {:?} out of range, periodic stats disabled", period);
                None
            }
        },
        None => None,
    };
    let stats_enabled = stats_start.is_some();
    // Never polled when disabled
    let (start, period) = stats_start.unwrap_or((now, Duration::from_secs(3600)));
    let mut stats_timer = interval_at(start, period);

    let mut handled = 0u64;

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(event) => {
                        let decision = controller.handle_event(&event);
                        debug!("Event handled: {:?}", decision);
                        handled += 1;
                    }
                    None => break,
                }
            }
            _ = stats_timer.tick(), if stats_enabled => {
                log_stats(&controller);
            }
        }
    }

    info!("Event channel closed after {} events", handled);
    handled
}

fn log_stats(controller: &Controller) {
    let topo = controller.topology();
    info!(
        hosts = topo.host_count(),
        switches = topo.switch_count(),
        whitelist_rules = controller.policy().len(),
        "Controller stats {:?}",
        controller.metrics().export()
    );
}
