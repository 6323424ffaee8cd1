// Communication channels for the battery monitor
use super::types::{ConnectionState, MonitorEvent, SupervisorCommand};
use tokio::sync::{broadcast, mpsc, watch};

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 64;

pub struct MonitorChannels {
    pub command_tx: mpsc::Sender<SupervisorCommand>,
    pub command_rx: mpsc::Receiver<SupervisorCommand>,
    pub event_tx: broadcast::Sender<MonitorEvent>,
    pub state_tx: watch::Sender<ConnectionState>,
    pub state_rx: watch::Receiver<ConnectionState>,
}

/// Helper function to create the supervisor's channels.
///
/// Events fan out to any number of observers (including none); the state
/// watch always holds the latest `ConnectionState`.
pub fn create_monitor_channels() -> MonitorChannels {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
    let (state_tx, state_rx) = watch::channel(ConnectionState::default());
    MonitorChannels {
        command_tx,
        command_rx,
        event_tx,
        state_tx,
        state_rx,
    }
}
