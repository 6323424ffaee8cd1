use adb_battery_monitor::adb::AdbBackend;
use adb_battery_monitor::args::{Args, print_help};
use adb_battery_monitor::battery_monitor::{
    ConnectOutcome, ConnectionPhase, ConnectionSupervisor, MonitorEvent, MonitorHandle, MonitorTiming,
    PairError, PairingRequest, PairingResult, PairingSession, TransportConfig,
};
use log::{error, info, warn};
use tokio::sync::{broadcast, mpsc};

fn main() {
    let args = match Args::parse() {
        Ok(Some(args)) => args,
        Ok(None) => return,
        Err(message) => {
            eprintln!("❌ {message}");
            print_help();
            std::process::exit(2);
        }
    };

    let default_filter = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };
    rt.block_on(run(args));
}

async fn run(args: Args) {
    let kind = args.backend;
    info!(
        "🚀 Monitoring battery over {:?} (impl='{}')",
        args.config.mode,
        kind.as_str()
    );

    let handle = ConnectionSupervisor::spawn(
        move |config: &TransportConfig| AdbBackend::new(kind, config.binary_path.as_deref()),
        args.config.clone(),
        MonitorTiming::default(),
    );
    let printer = tokio::spawn(print_events(handle.subscribe(), args.json));

    let (pair_tx, mut pair_rx) = mpsc::channel(1);
    if let Some(request) = args.pairing.clone() {
        let client = AdbBackend::new(kind, args.config.binary_path.as_deref());
        tokio::spawn(async move {
            info!("🤝 Pairing with {}...", request.target());
            let result = PairingSession::new(client).pair(&request).await;
            let _ = pair_tx.send((request, result)).await;
        });
    } else {
        drop(pair_tx);
    }

    loop {
        tokio::select! {
            Some((request, result)) = pair_rx.recv() => {
                on_paired(&handle, &args, request, result).await;
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("❌ Unable to listen for Ctrl-C: {e}");
                }
                info!("🛑 Shutting down...");
                break;
            }
        }
    }

    handle.shutdown().await;
    if let Err(e) = printer.await {
        error!("❌ Event printer failed: {e}");
    }
}

/// A successful pairing becomes the wireless setting; the supervisor restarts
/// its cycle against the new target.
async fn on_paired(
    handle: &MonitorHandle,
    args: &Args,
    request: PairingRequest,
    result: Result<String, PairError>,
) {
    let succeeded = result.is_ok();
    let summary = PairingResult::from(result);
    if args.json {
        match serde_json::to_string(&summary) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("⚠️ Could not serialize pairing result: {e}"),
        }
    } else if summary.success {
        println!("✅ {}", summary.message);
    } else {
        println!("❌ {}", summary.message);
    }

    if succeeded {
        let target = request.target();
        let config = TransportConfig::wireless(target.host, target.port)
            .with_binary_path(args.config.binary_path.clone());
        if let Err(e) = handle.apply_settings(config).await {
            error!("❌ {e}");
        }
    }
}

async fn print_events(mut events: broadcast::Receiver<MonitorEvent>, json: bool) {
    loop {
        match events.recv().await {
            Ok(event) if json => match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!("⚠️ Could not serialize event: {e}"),
            },
            Ok(event) => {
                if let Some(line) = describe(&event) {
                    println!("{line}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("⚠️ Display fell behind, {skipped} events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn describe(event: &MonitorEvent) -> Option<String> {
    match event {
        MonitorEvent::Battery(Some(reading)) => Some(format!("🔋 Battery: {}%", reading.level)),
        MonitorEvent::Battery(None) => Some("🔋 Battery: unavailable".to_string()),
        MonitorEvent::TransportResolved(ConnectOutcome::Usb) => Some("🔌 Transport: USB".to_string()),
        MonitorEvent::TransportResolved(ConnectOutcome::Connected { target }) => {
            Some(format!("📶 Transport: connected to {target}"))
        }
        MonitorEvent::TransportResolved(ConnectOutcome::FellBackToUsb { reason }) => {
            Some(format!("⚠️ Transport: falling back to USB ({reason})"))
        }
        MonitorEvent::DeviceLost { device, reason } => {
            Some(format!("📴 Lost {device}: {reason}"))
        }
        MonitorEvent::StateChanged(state) => match state.phase {
            ConnectionPhase::Tracking => state
                .device
                .as_ref()
                .map(|device| format!("📱 Tracking {device}")),
            ConnectionPhase::Idle => Some("⏹️ Monitor stopped".to_string()),
            ConnectionPhase::Connecting
            | ConnectionPhase::Discovering
            | ConnectionPhase::BackingOff => None,
        },
    }
}
