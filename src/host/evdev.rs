//! # Linux evdev Host
//!
//! Enumerates `/dev/input/event*` nodes and describes them as [`HostDevice`]s.
//!
//! ## Source Detection
//!
//! | Source | Requirement |
//! |--------|-------------|
//! | Gamepad | key set contains `BTN_SOUTH` |
//! | Joystick | `ABS_X` and `ABS_Y` plus `BTN_TRIGGER` or `BTN_SOUTH` |
//! | Keyboard | key set contains `KEY_A` |
//!
//! ## Controller Numbers
//!
//! A single controller often exposes several event nodes (buttons and
//! sticks, motion sensors, touchpad). Nodes whose physical path shares the
//! same prefix (everything before the last `/`) get the same controller
//! number. Numbers start at 1 and stay stable for the lifetime of the
//! [`EvdevHost`]; 0 marks a device that is not a game controller.

use evdev::{AbsoluteAxisType, Device, Key};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

use super::translate::EventTranslator;
use super::{AxisRange, HostDevice, HostEvent, HostInput, InputSources};
use crate::error::{ControllerBridgeError, Result};

/// Prefix of evdev event nodes
const EVENT_NODE_PREFIX: &str = "event";

/// Capabilities that decide a device's input sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub gamepad_buttons: bool,
    pub joystick_buttons: bool,
    pub stick_axes: bool,
    pub keyboard_keys: bool,
}

impl Capabilities {
    fn of(device: &Device) -> Self {
        let keys = device.supported_keys();
        let has_key = |key: Key| keys.map_or(false, |set| set.contains(key));
        let axes = device.supported_absolute_axes();
        let has_axis = |axis: AbsoluteAxisType| axes.map_or(false, |set| set.contains(axis));

        Self {
            gamepad_buttons: has_key(Key::BTN_SOUTH),
            joystick_buttons: has_key(Key::BTN_TRIGGER),
            stick_axes: has_axis(AbsoluteAxisType::ABS_X) && has_axis(AbsoluteAxisType::ABS_Y),
            keyboard_keys: has_key(Key::KEY_A),
        }
    }

    #[must_use]
    pub fn sources(&self) -> InputSources {
        let mut sources = InputSources::NONE;
        if self.gamepad_buttons {
            sources = sources | InputSources::GAMEPAD;
        }
        if self.stick_axes && (self.joystick_buttons || self.gamepad_buttons) {
            sources = sources | InputSources::JOYSTICK;
        }
        if self.keyboard_keys {
            sources = sources | InputSources::KEYBOARD;
        }
        sources
    }
}

/// Host input backed by the Linux evdev interface
#[derive(Debug)]
pub struct EvdevHost {
    root: PathBuf,
    controller_numbers: Mutex<HashMap<String, i32>>,
}

impl EvdevHost {
    /// Creates a host that scans event nodes under `root` (usually `/dev/input`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            controller_numbers: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists event nodes under the root, sorted by node number.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the root directory cannot be read.
    pub fn event_nodes(&self) -> Result<Vec<PathBuf>> {
        let mut nodes: Vec<(i32, PathBuf)> = std::fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter_map(|path| node_number(&path).map(|number| (number, path)))
            .collect();

        nodes.sort();
        Ok(nodes.into_iter().map(|(_, path)| path).collect())
    }

    /// Opens every event node and describes it.
    ///
    /// Nodes that cannot be opened (permissions, unplugged mid-scan) are
    /// skipped.
    pub fn scan(&self) -> Vec<(PathBuf, HostDevice)> {
        let nodes = match self.event_nodes() {
            Ok(nodes) => nodes,
            Err(e) => {
                debug!("Could not list {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        let mut devices = Vec::with_capacity(nodes.len());
        for path in nodes {
            match Device::open(&path) {
                Ok(device) => {
                    let described = self.describe(&path, &device);
                    debug!(
                        "Found input device: {} \"{}\" ({:04x}:{:04x}, controller: {})",
                        path.display(),
                        described.name,
                        described.vendor_id,
                        described.product_id,
                        described.controller_number
                    );
                    devices.push((path, described));
                }
                Err(e) => {
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        devices
    }

    fn describe(&self, path: &Path, device: &Device) -> HostDevice {
        let sources = Capabilities::of(device).sources();
        let controller_number = if sources.is_game_controller() {
            let group = group_key(device.physical_path(), device.unique_name(), path);
            self.controller_number_for(&group)
        } else {
            0
        };

        HostDevice {
            id: node_number(path).unwrap_or(-1),
            name: device.name().unwrap_or("Unknown").to_string(),
            sources,
            controller_number,
            vendor_id: device.input_id().vendor(),
            product_id: device.input_id().product(),
            axes: axis_ranges(device),
        }
    }

    fn controller_number_for(&self, group: &str) -> i32 {
        let mut numbers = self
            .controller_numbers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let next = numbers.len() as i32 + 1;
        *numbers.entry(group.to_string()).or_insert_with(|| {
            info!("Assigned controller number {} to {}", next, group);
            next
        })
    }
}

impl HostInput for EvdevHost {
    fn devices(&self) -> Vec<HostDevice> {
        self.scan().into_iter().map(|(_, device)| device).collect()
    }
}

/// Reads one event node until it fails, handing every translated event to
/// `on_event`.
///
/// # Errors
///
/// Returns `Device` when the node cannot be opened and `Io` when reading
/// stops (typically because the controller was unplugged).
pub async fn read_events<F>(path: &Path, device: &HostDevice, mut on_event: F) -> Result<()>
where
    F: FnMut(HostEvent),
{
    let opened = Device::open(path).map_err(|e| open_error(path, e))?;
    // Axes may have moved since the device was enumerated
    let current = HostDevice {
        axes: reseed_axes(&device.axes, &axis_ranges(&opened)),
        ..device.clone()
    };
    let mut stream = opened.into_event_stream().map_err(|e| open_error(path, e))?;
    let mut translator = EventTranslator::new(&current);

    info!("Reading events from {} (\"{}\")", path.display(), device.name);
    loop {
        let event = stream.next_event().await?;
        if let Some(host_event) = translator.translate(&event) {
            on_event(host_event);
        }
    }
}

fn axis_ranges(device: &Device) -> Vec<AxisRange> {
    let Some(axes) = device.supported_absolute_axes() else {
        return Vec::new();
    };
    let Ok(state) = device.get_abs_state() else {
        return Vec::new();
    };

    axes.iter()
        .filter_map(|axis| {
            let info = state.get(usize::from(axis.0))?;
            let range = AxisRange::new(i32::from(axis.0), info.minimum, info.maximum);
            Some(range.with_value(info.value))
        })
        .collect()
}

/// Takes the readings of `fresh` for the axes of `known`, keeping its order.
fn reseed_axes(known: &[AxisRange], fresh: &[AxisRange]) -> Vec<AxisRange> {
    known
        .iter()
        .map(|range| match fresh.iter().find(|f| f.axis == range.axis) {
            Some(f) => range.with_value(f.value),
            None => *range,
        })
        .collect()
}

fn open_error(path: &Path, e: std::io::Error) -> ControllerBridgeError {
    ControllerBridgeError::Device(format!("Failed to open {}: {}", path.display(), e))
}

/// Extracts `N` from an `eventN` node path.
fn node_number(path: &Path) -> Option<i32> {
    path.file_name()?
        .to_str()?
        .strip_prefix(EVENT_NODE_PREFIX)?
        .parse()
        .ok()
}

/// Key grouping the event nodes of one physical controller.
///
/// Bluetooth pads report the local adapter as their physical path, so the
/// unique name (the pad's own address) is part of the key when present.
fn group_key(physical_path: Option<&str>, unique_name: Option<&str>, node: &Path) -> String {
    let base = match physical_path.filter(|phys| !phys.is_empty()) {
        Some(phys) => match phys.rsplit_once('/') {
            Some((prefix, _)) => prefix.to_string(),
            None => phys.to_string(),
        },
        None => node.to_string_lossy().to_string(),
    };

    match unique_name.filter(|uniq| !uniq.is_empty()) {
        Some(uniq) => format!("{}#{}", base, uniq),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamepad_capabilities() {
        let caps = Capabilities {
            gamepad_buttons: true,
            stick_axes: true,
            ..Default::default()
        };
        let sources = caps.sources();
        assert!(sources.contains(InputSources::GAMEPAD));
        assert!(sources.contains(InputSources::JOYSTICK));
    }

    #[test]
    fn test_flight_stick_capabilities() {
        let caps = Capabilities {
            joystick_buttons: true,
            stick_axes: true,
            ..Default::default()
        };
        let sources = caps.sources();
        assert!(!sources.contains(InputSources::GAMEPAD));
        assert!(sources.contains(InputSources::JOYSTICK));
        assert!(sources.is_game_controller());
    }

    #[test]
    fn test_axes_without_buttons_are_not_a_joystick() {
        // Accelerometer nodes report ABS_X/ABS_Y but no buttons
        let caps = Capabilities {
            stick_axes: true,
            ..Default::default()
        };
        assert!(!caps.sources().is_game_controller());
    }

    #[test]
    fn test_keyboard_capabilities() {
        let caps = Capabilities {
            keyboard_keys: true,
            ..Default::default()
        };
        assert_eq!(caps.sources(), InputSources::KEYBOARD);
        assert!(!caps.sources().is_game_controller());
    }

    #[test]
    fn test_node_number() {
        assert_eq!(node_number(Path::new("/dev/input/event0")), Some(0));
        assert_eq!(node_number(Path::new("/dev/input/event17")), Some(17));
        assert_eq!(node_number(Path::new("/dev/input/mouse0")), None);
        assert_eq!(node_number(Path::new("/dev/input/js0")), None);
        assert_eq!(node_number(Path::new("/dev/input/eventX")), None);
    }

    #[test]
    fn test_group_key_strips_input_suffix() {
        let node = Path::new("/dev/input/event5");
        let usb = "usb-0000:00:14.0-1";
        assert_eq!(group_key(Some("usb-0000:00:14.0-1/input0"), None, node), usb);
        assert_eq!(group_key(Some("usb-0000:00:14.0-1/input3"), Some(""), node), usb);
        assert_eq!(group_key(Some(""), None, node), "/dev/input/event5");
        assert_eq!(group_key(None, None, node), "/dev/input/event5");
    }

    #[test]
    fn test_bluetooth_pads_on_one_adapter_get_own_numbers() {
        let host = EvdevHost::new("/dev/input");
        let adapter = Some("a0:5a:5c:11:22:33");

        let pad_a = group_key(adapter, Some("4c:b9:9b:00:00:01"), Path::new("/dev/input/event20"));
        let pad_a_motion =
            group_key(adapter, Some("4c:b9:9b:00:00:01"), Path::new("/dev/input/event21"));
        let pad_b = group_key(adapter, Some("4c:b9:9b:00:00:02"), Path::new("/dev/input/event24"));

        let number_a = host.controller_number_for(&pad_a);
        let number_b = host.controller_number_for(&pad_b);
        assert_ne!(number_a, number_b);
        // Sub-devices of one pad still share its number
        assert_eq!(host.controller_number_for(&pad_a_motion), number_a);
    }

    #[test]
    fn test_reseed_axes_takes_current_readings() {
        let known = vec![AxisRange::new(0, 0, 255), AxisRange::new(2, 0, 255)];
        let fresh = vec![AxisRange::new(2, 0, 255).with_value(0)];

        let seeded = reseed_axes(&known, &fresh);
        assert_eq!(seeded.len(), 2);
        // No fresh reading: enumeration value kept
        assert_eq!(seeded[0].value, known[0].value);
        assert_eq!(seeded[1].axis, 2);
        assert_eq!(seeded[1].value, 0);
    }

    #[test]
    fn test_controller_numbers_are_stable() {
        let host = EvdevHost::new("/dev/input");
        assert_eq!(host.controller_number_for("usb-1"), 1);
        assert_eq!(host.controller_number_for("usb-2"), 2);
        assert_eq!(host.controller_number_for("usb-1"), 1);
        assert_eq!(host.controller_number_for("bt-3"), 3);
    }

    #[test]
    fn test_event_nodes_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["event10", "event2", "mouse0", "event0"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let host = EvdevHost::new(dir.path());
        let nodes = host.event_nodes().unwrap();
        let names: Vec<_> = nodes
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["event0", "event2", "event10"]);
    }

    #[test]
    fn test_scan_skips_unopenable_nodes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("event0"), b"not a device").unwrap();

        let host = EvdevHost::new(dir.path());
        assert!(host.scan().is_empty());
        assert!(host.devices().is_empty());
    }

    #[test]
    fn test_missing_root_yields_no_devices() {
        let host = EvdevHost::new("/nonexistent/input");
        assert!(host.event_nodes().is_err());
        assert!(host.devices().is_empty());
    }

    #[tokio::test]
    async fn test_read_events_missing_node_fails() {
        let device = crate::host::fixtures::gamepad(0, 1);
        let result = read_events(Path::new("/nonexistent/event0"), &device, |_| {}).await;
        assert!(matches!(result, Err(ControllerBridgeError::Device(_))));
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_scan_with_real_hardware() {
        // This test requires at least one connected game controller
        let host = EvdevHost::new("/dev/input");
        let controllers: Vec<_> = host
            .devices()
            .into_iter()
            .filter(|d| d.sources.is_game_controller())
            .collect();

        assert!(!controllers.is_empty(), "Should detect a connected controller");
        assert!(controllers.iter().all(|d| d.controller_number > 0));
    }
}
