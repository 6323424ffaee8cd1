use crate::adb::{BackendKind, TcpTarget};
use crate::battery_monitor::types::{DEFAULT_HOST, DEFAULT_PORT};
use crate::battery_monitor::{PairingRequest, TransportConfig, TransportMode};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub config: TransportConfig,
    pub backend: BackendKind,
    /// Pair with this target while monitoring, then switch to it.
    pub pairing: Option<PairingRequest>,
    pub json: bool,
    pub debug_mode: bool,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Run(Args),
    Help,
    Version,
}

impl Args {
    /// Parse the process arguments, printing help or version itself.
    /// `Ok(None)` means there is nothing left to do; `Err` is a usage error
    /// the caller reports with a non-zero exit status.
    pub fn parse() -> Result<Option<Self>, String> {
        Self::settle(Self::parse_from(env::args().skip(1)))
    }

    fn settle(parsed: Result<Parsed, String>) -> Result<Option<Self>, String> {
        match parsed? {
            Parsed::Run(args) => Ok(Some(args)),
            Parsed::Help => {
                print_help();
                Ok(None)
            }
            Parsed::Version => {
                println!(
                    "ADB Battery Monitor v{} (c) {}",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                Ok(None)
            }
        }
    }

    pub fn parse_from<I, S>(args: I) -> Result<Parsed, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mode: Option<TransportMode> = None;
        let mut host: Option<String> = None;
        let mut port: Option<u16> = None;
        let mut binary_path: Option<PathBuf> = None;
        let mut backend = BackendKind::default();
        let mut pair_target: Option<TcpTarget> = None;
        let mut code: Option<String> = None;
        let mut json = false;
        let mut debug_mode = false;

        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" || arg == "-h" {
                return Ok(Parsed::Help);
            } else if arg == "--version" || arg == "-v" {
                return Ok(Parsed::Version);
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--json" {
                json = true;
            } else if let Some(val) = arg.strip_prefix("--mode=") {
                mode = Some(val.parse()?);
            } else if let Some(val) = arg.strip_prefix("--host=") {
                host = Some(val.trim().to_string());
            } else if let Some(val) = arg.strip_prefix("--port=") {
                match val.parse::<u16>() {
                    Ok(p) if p != 0 => port = Some(p),
                    _ => return Err(format!("Invalid port value: {val}")),
                }
            } else if let Some(val) = arg.strip_prefix("--adb=") {
                binary_path = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--impl=") {
                backend = val.parse()?;
            } else if let Some(val) = arg.strip_prefix("--pair=") {
                pair_target = Some(
                    TcpTarget::parse(val)
                        .ok_or_else(|| format!("Invalid pairing target '{val}', expected HOST:PORT"))?,
                );
            } else if let Some(val) = arg.strip_prefix("--code=") {
                code = Some(val.trim().to_string());
            } else {
                return Err(format!("Unknown argument: {arg}"));
            }
        }

        let pairing = match (pair_target, code) {
            (Some(target), Some(code)) if !code.is_empty() => {
                Some(PairingRequest::new(target.host, target.port, code))
            }
            (Some(_), _) => return Err("--pair needs a non-empty --code=CODE".to_string()),
            (None, Some(_)) => return Err("--code is only valid together with --pair".to_string()),
            (None, None) => None,
        };

        let mode = mode.unwrap_or_default();
        // Wireless without a host waits for pairing and monitors over USB meanwhile.
        let host = host.unwrap_or_else(|| match mode {
            TransportMode::Wireless => String::new(),
            TransportMode::Usb | TransportMode::Tcp => DEFAULT_HOST.to_string(),
        });
        let config = TransportConfig {
            mode,
            host,
            port: port.unwrap_or(DEFAULT_PORT),
            binary_path,
        }
        .normalized();

        Ok(Parsed::Run(Args {
            config,
            backend,
            pairing,
            json,
            debug_mode,
        }))
    }
}

pub fn print_help() {
    println!("🔋 ADB Battery Monitor");
    println!();
    println!("USAGE:");
    println!("    adb-battery-monitor [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --mode=<usb|tcp|wireless>  Transport to the device (default: usb)");
    println!("    --host=HOST                Device address for tcp/wireless (default: 127.0.0.1 for tcp)");
    println!("    --port=PORT                Device port for tcp/wireless (default: 5555)");
    println!("    --adb=PATH                 Custom adb executable (shell impl only)");
    println!("    --impl=<shell|rust>        ADB implementation (default: shell)");
    println!("                               The rust implementation needs a running ADB server.");
    println!("    --pair=HOST:PORT           Pair for wireless debugging while monitoring");
    println!("    --code=CODE                Pairing code shown on the device");
    println!("    --json                     Print events as JSON lines");
    println!("    --debug                    Enable debug logging");
    println!("    --help, -h                 Show this help message");
    println!("    --version, -v              Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    adb-battery-monitor");
    println!("    adb-battery-monitor --mode=tcp --host=192.168.1.20");
    println!("    adb-battery-monitor --mode=wireless --pair=192.168.1.20:37099 --code=123456");
    println!("    adb-battery-monitor --impl=rust --json");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Args {
        match Args::parse_from(args) {
            Ok(Parsed::Run(args)) => args,
            other => panic!("Expected run arguments, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_to_usb_shell() {
        let args = run(&[]);
        assert_eq!(args.config, TransportConfig::usb());
        assert_eq!(args.backend, BackendKind::Shell);
        assert_eq!(args.pairing, None);
        assert!(!args.json);
        assert!(!args.debug_mode);
    }

    #[test]
    fn test_tcp_mode_fills_default_endpoint() {
        let args = run(&["--mode=tcp"]);
        assert_eq!(args.config, TransportConfig::tcp("127.0.0.1", 5555));
        assert_eq!(
            args.config.tcp_target(),
            Some(TcpTarget::new("127.0.0.1", 5555))
        );
    }

    #[test]
    fn test_wireless_without_host_has_no_target() {
        let args = run(&["--mode=wireless"]);
        assert_eq!(args.config.mode, TransportMode::Wireless);
        assert_eq!(args.config.tcp_target(), None);
    }

    #[test]
    fn test_full_command_line() {
        let args = run(&[
            "--mode=wireless",
            "--host=192.168.1.20",
            "--port=41234",
            "--adb=/opt/platform-tools/adb",
            "--impl=rust",
            "--pair=192.168.1.20:37099",
            "--code=123456",
            "--json",
            "--debug",
        ]);
        assert_eq!(
            args.config,
            TransportConfig::wireless("192.168.1.20", 41234)
                .with_binary_path(Some(PathBuf::from("/opt/platform-tools/adb")))
        );
        assert_eq!(args.backend, BackendKind::Rust);
        assert_eq!(
            args.pairing,
            Some(PairingRequest::new("192.168.1.20", 37099, "123456"))
        );
        assert!(args.json);
        assert!(args.debug_mode);
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(Args::parse_from(["--debug", "-h"]), Ok(Parsed::Help));
        assert_eq!(Args::parse_from(["--version"]), Ok(Parsed::Version));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(Args::parse_from(["--mode=bluetooth"]).is_err());
        assert!(Args::parse_from(["--port=0"]).is_err());
        assert!(Args::parse_from(["--port=70000"]).is_err());
        assert!(Args::parse_from(["--impl=java"]).is_err());
        assert!(Args::parse_from(["--pair=192.168.1.20"]).is_err());
        assert!(Args::parse_from(["--pair=192.168.1.20:37099"]).is_err());
        assert!(Args::parse_from(["--code=123456"]).is_err());
        assert!(Args::parse_from(["--screenshot"]).is_err());
    }

    #[test]
    fn test_usage_errors_reach_the_caller() {
        assert_eq!(
            Args::settle(Args::parse_from(["--port=0"])),
            Err("Invalid port value: 0".to_string())
        );
        assert_eq!(Args::settle(Args::parse_from(["--help"])), Ok(None));
        assert!(matches!(
            Args::settle(Args::parse_from(["--json"])),
            Ok(Some(args)) if args.json
        ));
    }
}
