// Battery monitor module
// Keeps one Android device connected over USB, TCP or wireless debugging and
// reports its battery level, plus an independent pair-then-connect workflow.

pub mod channels;
pub mod connector;
pub mod discoverer;
pub mod pairing;
pub mod poller;
pub mod supervisor;
pub mod types;


// Re-export the main types and functions for easy access
pub use channels::{MonitorChannels, create_monitor_channels};
pub use connector::DeviceConnector;
pub use discoverer::DeviceDiscoverer;
pub use pairing::{PairError, PairingSession};
pub use poller::{BATTERY_COMMAND, PollFailure, TelemetryPoller, parse_battery_level};
pub use supervisor::{ConnectionSupervisor, MonitorHandle, SupervisorStopped};
pub use types::{
    BatteryReading, ConnectOutcome, ConnectionPhase, ConnectionState, DeviceId, MonitorEvent,
    MonitorTiming, PairingRequest, PairingResult, SupervisorCommand, TransportConfig,
    TransportMode,
};
