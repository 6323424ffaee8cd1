// Connection supervisor: Connecting -> Discovering -> Tracking, forever.
use super::channels::create_monitor_channels;
use super::connector::DeviceConnector;
use super::discoverer::DeviceDiscoverer;
use super::poller::TelemetryPoller;
use super::types::{
    ConnectionPhase, ConnectionState, MonitorEvent, MonitorTiming, SupervisorCommand,
    TransportConfig,
};
use crate::adb::AdbClient;
use log::{debug, error, info, warn};
use std::marker::PhantomData;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
#[error("connection supervisor is not running")]
pub struct SupervisorStopped;

/// Owns `ConnectionState` and drives connector, discoverer and poller.
///
/// One cycle is one future. A settings change drops it, which cancels every
/// timer and in-flight poll of that cycle before the next one starts.
pub struct ConnectionSupervisor<C, F> {
    make_client: F,
    config: TransportConfig,
    timing: MonitorTiming,
    command_rx: mpsc::Receiver<SupervisorCommand>,
    event_tx: broadcast::Sender<MonitorEvent>,
    state_tx: watch::Sender<ConnectionState>,
    _client: PhantomData<fn() -> C>,
}

impl<C, F> ConnectionSupervisor<C, F>
where
    C: AdbClient,
    F: Fn(&TransportConfig) -> C + Send + 'static,
{
    pub fn new(
        make_client: F,
        config: TransportConfig,
        timing: MonitorTiming,
        command_rx: mpsc::Receiver<SupervisorCommand>,
        event_tx: broadcast::Sender<MonitorEvent>,
        state_tx: watch::Sender<ConnectionState>,
    ) -> Self {
        Self {
            make_client,
            config: config.normalized(),
            timing,
            command_rx,
            event_tx,
            state_tx,
            _client: PhantomData,
        }
    }

    /// Start the control loop on its own task. `make_client` builds the ADB
    /// client for each cycle so a new binary path takes effect on restart.
    pub fn spawn(make_client: F, config: TransportConfig, timing: MonitorTiming) -> MonitorHandle
    where
        C: 'static,
    {
        let channels = create_monitor_channels();
        let supervisor = Self::new(
            make_client,
            config,
            timing,
            channels.command_rx,
            channels.event_tx.clone(),
            channels.state_tx,
        );
        let task = tokio::spawn(supervisor.run());
        MonitorHandle {
            command_tx: channels.command_tx,
            event_tx: channels.event_tx,
            state_rx: channels.state_rx,
            task,
        }
    }

    pub async fn run(mut self) {
        info!("🚀 Connection supervisor started");
        let mut config = self.config.clone();

        loop {
            let client = (self.make_client)(&config);
            let next = {
                let cycle = Self::run_cycle(
                    &client,
                    &config,
                    self.timing,
                    &self.event_tx,
                    &self.state_tx,
                );
                tokio::pin!(cycle);

                loop {
                    tokio::select! {
                        // The cycle never completes on its own.
                        _ = &mut cycle => {}
                        command = self.command_rx.recv() => match command {
                            Some(SupervisorCommand::ApplySettings(new_config)) => {
                                let new_config = new_config.normalized();
                                if new_config == config {
                                    debug!("Settings unchanged, keeping the current cycle");
                                    continue;
                                }
                                info!("⚙️ Settings changed, restarting connection cycle");
                                break Some(new_config);
                            }
                            Some(SupervisorCommand::Shutdown) | None => break None,
                        }
                    }
                }
            };

            match next {
                Some(new_config) => config = new_config,
                None => break,
            }
        }

        transition(&self.state_tx, &self.event_tx, |state| {
            state.phase = ConnectionPhase::Idle;
            state.device = None;
        });
        info!("🛑 Connection supervisor stopped");
    }

    async fn run_cycle(
        client: &C,
        config: &TransportConfig,
        timing: MonitorTiming,
        events: &broadcast::Sender<MonitorEvent>,
        state: &watch::Sender<ConnectionState>,
    ) {
        transition(state, events, |s| {
            s.phase = ConnectionPhase::Connecting;
            s.device = None;
            s.discovery_attempts = 0;
            s.cycle += 1;
            s.transport = None;
        });

        let outcome = DeviceConnector::new(client, timing.connect_timeout)
            .connect(config)
            .await;
        state.send_modify(|s| s.transport = Some(outcome.clone()));
        let _ = events.send(MonitorEvent::TransportResolved(outcome));

        let discoverer = DeviceDiscoverer::new(client);
        let poller = TelemetryPoller::new(client, events, timing.poll_interval, timing.poll_timeout);
        // A device that stays listed after failing a poll is given one poll
        // interval before it is polled again.
        let mut first_poll_delay = Duration::ZERO;

        loop {
            transition(state, events, |s| {
                s.phase = ConnectionPhase::Discovering;
                s.device = None;
            });

            match discoverer.discover().await {
                Ok(Some(device)) => {
                    transition(state, events, |s| {
                        s.phase = ConnectionPhase::Tracking;
                        s.device = Some(device.clone());
                        s.discovery_attempts = 0;
                    });

                    let failure = poller.track(&device, first_poll_delay).await;
                    info!("🔌 Lost {device}, searching again");
                    let _ = events.send(MonitorEvent::DeviceLost {
                        device,
                        reason: failure.to_string(),
                    });
                    let _ = events.send(MonitorEvent::Battery(None));
                    first_poll_delay = timing.poll_interval;
                }
                Ok(None) => {
                    first_poll_delay = Duration::ZERO;
                    info!(
                        "🔌 No device found, retrying in {}s...",
                        timing.discovery_backoff.as_secs()
                    );
                    let _ = events.send(MonitorEvent::Battery(None));
                    back_off(state, events, timing).await;
                }
                Err(e) => {
                    first_poll_delay = Duration::ZERO;
                    if e.is_configuration_error() {
                        error!("❌ Error listing devices: {e}");
                    } else {
                        warn!("⚠️ Error listing devices: {e}");
                    }
                    back_off(state, events, timing).await;
                }
            }
        }
    }
}

async fn back_off(
    state: &watch::Sender<ConnectionState>,
    events: &broadcast::Sender<MonitorEvent>,
    timing: MonitorTiming,
) {
    transition(state, events, |s| {
        s.phase = ConnectionPhase::BackingOff;
        s.discovery_attempts += 1;
    });
    tokio::time::sleep(timing.discovery_backoff).await;
}

/// Mutate the owned state and tell observers about it.
fn transition(
    state: &watch::Sender<ConnectionState>,
    events: &broadcast::Sender<MonitorEvent>,
    update: impl FnOnce(&mut ConnectionState),
) {
    state.send_modify(update);
    let snapshot = state.borrow().clone();
    debug!(
        "Connection state: {:?} (device: {:?}, cycle {})",
        snapshot.phase, snapshot.device, snapshot.cycle
    );
    let _ = events.send(MonitorEvent::StateChanged(snapshot));
}

/// Caller-side handle to a running supervisor.
pub struct MonitorHandle {
    command_tx: mpsc::Sender<SupervisorCommand>,
    event_tx: broadcast::Sender<MonitorEvent>,
    state_rx: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// A new observer. Observers only see events sent after subscribing.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Reapplying the active settings is a no-op.
    pub async fn apply_settings(&self, config: TransportConfig) -> Result<(), SupervisorStopped> {
        self.command_tx
            .send(SupervisorCommand::ApplySettings(config))
            .await
            .map_err(|_| SupervisorStopped)
    }

    /// Stop the loop and wait until its timers are gone.
    pub async fn shutdown(self) {
        let _ = self.command_tx.send(SupervisorCommand::Shutdown).await;
        if let Err(e) = self.task.await {
            error!("❌ Connection supervisor task failed: {e}");
        }
    }
}
