// Tests for the ADB capability layer
// Focus: parsing of `adb` output, target parsing, backend selection

#[cfg(test)]
mod parsing_tests {
    use super::super::backend::BackendKind;
    use super::super::error::AdbError;
    use super::super::rust_impl::RustAdb;
    use super::super::shell::{ShellAdb, resolve_adb_binary};
    use super::super::types::{Device, TcpTarget};
    use adb_client::{DeviceShort, DeviceState};
    use std::path::Path;

    #[test]
    fn test_parse_devices_multiple() {
        let adb_output = "List of devices attached\n1d36d8f1               device usb:1-4 product:OnePlus6 model:ONEPLUS_A6000 device:OnePlus6 transport_id:2\n192.168.1.5:5555       device product:OnePlus6 model:ONEPLUS_A6000 device:OnePlus6 transport_id:3\n";
        let devices = ShellAdb::parse_devices(adb_output);
        assert_eq!(
            devices,
            vec![
                Device {
                    name: "1d36d8f1".to_string(),
                    transport_id: Some("2".to_string())
                },
                Device {
                    name: "192.168.1.5:5555".to_string(),
                    transport_id: Some("3".to_string())
                },
            ]
        );
    }

    #[test]
    fn test_parse_devices_skips_unusable_states() {
        let adb_output = "List of devices attached\nemulator-5554          offline transport_id:1\nR58M123ABC             unauthorized usb:1-2 transport_id:4\n1d36d8f1               device usb:1-4 transport_id:2\n\n";
        let devices = ShellAdb::parse_devices(adb_output);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "1d36d8f1");
    }

    #[test]
    fn test_parse_devices_empty_listing() {
        let adb_output = "* daemon started successfully\nList of devices attached\n\n";
        assert!(ShellAdb::parse_devices(adb_output).is_empty());
    }

    #[test]
    fn test_connect_output_classification() {
        assert!(!ShellAdb::connect_failed("connected to 192.168.1.5:5555"));
        assert!(!ShellAdb::connect_failed("already connected to 192.168.1.5:5555"));
        assert!(ShellAdb::connect_failed(
            "failed to connect to '192.168.1.5:5555': Connection refused"
        ));
        assert!(ShellAdb::connect_failed(
            "cannot connect to 10.0.0.9:5555: No route to host (113)"
        ));
    }

    #[test]
    fn test_pair_output_classification() {
        assert!(!ShellAdb::pair_failed(
            "Successfully paired to 192.168.1.5:37099 [guid=adb-XYZ]"
        ));
        assert!(ShellAdb::pair_failed("Failed: Wrong password or connection was dropped."));
        assert!(ShellAdb::pair_failed("error: unknown host service"));
    }

    #[test]
    fn test_tcp_target_parse() {
        assert_eq!(
            TcpTarget::parse("192.168.1.5:5555"),
            Some(TcpTarget::new("192.168.1.5", 5555))
        );
        assert_eq!(
            TcpTarget::parse(" phone.lan:37099 "),
            Some(TcpTarget::new("phone.lan", 37099))
        );
        assert_eq!(TcpTarget::parse("192.168.1.5"), None);
        assert_eq!(TcpTarget::parse(":5555"), None);
        assert_eq!(TcpTarget::parse("192.168.1.5:0"), None);
        assert_eq!(TcpTarget::parse("192.168.1.5:99999"), None);
        assert_eq!(TcpTarget::new("10.0.0.2", 5555).to_string(), "10.0.0.2:5555");
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("shell".parse::<BackendKind>(), Ok(BackendKind::Shell));
        assert_eq!("rust".parse::<BackendKind>(), Ok(BackendKind::Rust));
        assert!("usb".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::default(), BackendKind::Shell);
    }

    #[test]
    fn test_resolve_prefers_existing_configured_binary() {
        let path = std::env::temp_dir().join(format!("fake-adb-{}", std::process::id()));
        std::fs::write(&path, b"#!/bin/sh\n").unwrap();

        assert_eq!(resolve_adb_binary(Some(path.as_path())), path);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_resolve_ignores_missing_configured_binary() {
        let missing = Path::new("/definitely/not/here/adb");
        assert_ne!(resolve_adb_binary(Some(missing)), missing);
        assert_ne!(resolve_adb_binary(Some(Path::new(""))), Path::new(""));
    }

    #[test]
    fn test_error_diagnostic_is_tool_text() {
        let err = AdbError::CommandFailed {
            command: "adb -s abc shell dumpsys battery".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "error: device 'abc' not found".to_string(),
        };
        assert_eq!(err.diagnostic(), "error: device 'abc' not found");
        assert!(err.to_string().contains("adb -s abc shell dumpsys battery"));
        assert!(!err.is_configuration_error());

        let missing = AdbError::BinaryNotFound {
            path: "/nope/adb".into(),
        };
        assert!(missing.is_configuration_error());
    }

    #[test]
    fn test_rust_backend_keeps_only_usable_devices() {
        let listed = [
            ("R58M123ABC", DeviceState::Device),
            ("192.168.1.5:5555", DeviceState::Offline),
            ("emulator-5554", DeviceState::Unauthorized),
            ("1d36d8f1", DeviceState::Authorizing),
            ("192.168.1.7:5555", DeviceState::Connecting),
        ];
        let devices: Vec<Device> = listed
            .into_iter()
            .filter_map(|(identifier, state)| {
                RustAdb::from_device_short(DeviceShort {
                    identifier: identifier.to_string(),
                    state,
                })
            })
            .collect();
        assert_eq!(
            devices,
            vec![Device {
                name: "R58M123ABC".to_string(),
                transport_id: None
            }]
        );
    }
}
