//! # Device Registry
//!
//! Turns the host's device list into ported [`PhysicalDevice`]s.
//!
//! ## Port Assignment
//!
//! Host devices are walked in host order. Only devices with a gamepad or
//! joystick source qualify. The first qualifying device of each controller
//! number produces a physical device on the next free port (starting at 0);
//! later sub-devices with the same controller number are skipped. Ports are
//! therefore the first-encounter order of controller numbers, not the host's
//! own numbering, and an unchanged host list always yields the same ports.

use std::collections::HashSet;
use tracing::{debug, warn};

use super::device::{InputDevice, PhysicalDevice};
use crate::host::HostInput;

/// Per-port vibration settings, read on every enumeration
pub trait VibrationSettings: Send + Sync {
    /// Whether the controller on `port` should drive the system vibrator.
    fn use_system_vibrator(&self, port: u32) -> bool;
}

impl VibrationSettings for Vec<bool> {
    fn use_system_vibrator(&self, port: u32) -> bool {
        self.get(port as usize).copied().unwrap_or(false)
    }
}

/// Enumerates host controllers and assigns ports
#[derive(Debug, Clone, Copy)]
pub struct DeviceRegistry {
    port_limit: u32,
}

impl DeviceRegistry {
    /// Creates a registry that assigns ports below `port_limit`.
    ///
    /// The limit is the overlay's reserved port, so a physical controller
    /// can never take it.
    #[must_use]
    pub fn new(port_limit: u32) -> Self {
        Self { port_limit }
    }

    /// Lists the host's controllers, ordered by assigned port.
    ///
    /// An empty host device list yields an empty result.
    pub fn enumerate(
        &self,
        host: &dyn HostInput,
        vibration: &dyn VibrationSettings,
    ) -> Vec<PhysicalDevice> {
        let mut seen = HashSet::new();
        let mut devices = Vec::new();
        let mut port: u32 = 0;

        for host_device in host.devices() {
            if !host_device.sources.is_game_controller() {
                continue;
            }
            if seen.contains(&host_device.controller_number) {
                debug!(
                    "Device {} shares controller number {} with an earlier device",
                    host_device.id, host_device.controller_number
                );
                continue;
            }
            if port >= self.port_limit {
                warn!(
                    "No free port for \"{}\" (controller {}), all {} ports are taken",
                    host_device.name, host_device.controller_number, self.port_limit
                );
                continue;
            }

            seen.insert(host_device.controller_number);
            let vibrates = vibration.use_system_vibrator(port);
            let device = PhysicalDevice::new(&host_device, port, vibrates);
            debug!(
                "Controller {} \"{}\" -> port {}",
                device.controller_number(),
                device.name(),
                device.port()
            );
            devices.push(device);
            port += 1;
        }

        devices
    }
}
